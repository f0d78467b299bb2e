use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use log::*;
use serde::Deserialize;
use structopt::StructOpt;

use foodcart::cart::{CartView, ShowCart, UpdateQuantity};
use foodcart::editor::{EditorState, Field, FoodApi, FoodEditor, FoodForm};
use foodcart::food::{Food, FoodId};
use foodcart::menu::{CategoryFilter, Menu, ShowCategories, ShowMenu};
use foodcart::services::{Commandable, Queryable};

#[derive(Debug, StructOpt)]
#[structopt(name = "fc", about = "Food cart CLI")]
struct Opt {
    /// Configuration file
    #[structopt(parse(from_os_str))]
    config: PathBuf,
    #[structopt(subcommand)]
    command: Commands,
}

#[derive(Debug, StructOpt)]
enum Commands {
    #[structopt(name = "cart", about = "Work with the session cart")]
    Cart(CartCommand),
    #[structopt(name = "menu", about = "Browse a menu file")]
    Menu(MenuOpt),
    #[structopt(name = "food", about = "Edit remote food items")]
    Food(FoodCommand),
}

#[derive(Debug, StructOpt)]
enum CartCommand {
    #[structopt(name = "open", about = "Open the cart with a food item")]
    Open {
        /// JSON food descriptor to add
        #[structopt(long = "food", parse(from_os_str))]
        food: Option<PathBuf>,
    },
    #[structopt(name = "update", about = "Change a line item's quantity")]
    Update {
        id: String,
        #[structopt(allow_hyphen_values = true)]
        amount: i64,
    },
    #[structopt(name = "show", about = "Show the cart")]
    Show,
}

#[derive(Debug, StructOpt)]
struct MenuOpt {
    /// JSON menu file
    #[structopt(parse(from_os_str))]
    menu: PathBuf,
    #[structopt(short = "c", long = "category", default_value = "All")]
    category: CategoryFilter,
    /// Order this item: open the cart with it
    #[structopt(long = "order")]
    order: Option<String>,
}

#[derive(Debug, StructOpt)]
struct Fields {
    #[structopt(long = "name")]
    name: Option<String>,
    #[structopt(long = "description")]
    description: Option<String>,
    #[structopt(long = "price")]
    price: Option<String>,
    #[structopt(long = "category")]
    category: Option<String>,
    #[structopt(long = "note")]
    note: Option<String>,
    /// Replacement image to upload
    #[structopt(long = "image", parse(from_os_str))]
    image: Option<PathBuf>,
}

#[derive(Debug, StructOpt)]
enum FoodCommand {
    #[structopt(name = "show", about = "Fetch a food item")]
    Show { id: FoodId },
    #[structopt(name = "update", about = "Edit and save a food item")]
    Update {
        id: FoodId,
        #[structopt(flatten)]
        fields: Fields,
    },
    #[structopt(name = "create", about = "Create a food item")]
    Create {
        #[structopt(flatten)]
        fields: Fields,
    },
    #[structopt(name = "delete", about = "Delete a food item")]
    Delete { id: FoodId },
}

#[derive(Deserialize, Debug)]
struct Config {
    #[serde(flatten)]
    foodcart: foodcart::config::Config,
    #[serde(default)]
    env_logger: foodcart::config::EnvLogger,
}

impl Fields {
    fn edits(&self) -> Vec<(Field, &str)> {
        vec![
            (Field::Name, self.name.as_ref()),
            (Field::Description, self.description.as_ref()),
            (Field::Price, self.price.as_ref()),
            (Field::Category, self.category.as_ref()),
            (Field::Note, self.note.as_ref()),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v.as_str())))
        .collect()
    }
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    let mut config_buf = String::new();
    File::open(&opt.config)
        .with_context(|| format!("open {:?}", opt.config))?
        .read_to_string(&mut config_buf)?;
    let mut config: Config = toml::from_str(&config_buf).context("parse config")?;

    config.env_logger.builder().init();
    debug!("Options: {:?}", opt);
    config.foodcart.apply_env()?;

    let fc = foodcart::FoodCart::new(&config.foodcart)?;

    match opt.command {
        Commands::Cart(cmd) => cart(&fc, cmd),
        Commands::Menu(opt) => menu(&fc, opt),
        Commands::Food(cmd) => food(&fc, cmd),
    }
}

fn cart(fc: &foodcart::FoodCart, cmd: CartCommand) -> Result<()> {
    let mut store = fc.cart();
    match cmd {
        CartCommand::Open { food } => {
            let food = match food {
                Some(path) => {
                    let file = File::open(&path).with_context(|| format!("open {:?}", path))?;
                    let food: Food = serde_json::from_reader(BufReader::new(file))
                        .with_context(|| format!("parse food {:?}", path))?;
                    Some(food)
                }
                None => None,
            };
            print!("{}", CartView::mount(&mut store, food.as_ref())?);
        }
        CartCommand::Update { id, amount } => {
            let id = FoodId::resolve(&id, store.items().iter().map(|item| &item.id));
            store.execute(UpdateQuantity { id, amount })?;
            print!("{}", store.query(ShowCart)?);
        }
        CartCommand::Show => {
            print!("{}", store.query(ShowCart)?);
        }
    }
    Ok(())
}

fn menu(fc: &foodcart::FoodCart, opt: MenuOpt) -> Result<()> {
    let menu = Menu::load(&opt.menu)?;

    if let Some(id) = opt.order {
        let id = FoodId::resolve(&id, menu.items().iter().map(|item| &item.id));
        let item = menu
            .get(&id)
            .ok_or_else(|| anyhow!("No item {} on the menu", id))?;
        let mut store = fc.cart();
        let page = CartView::mount(&mut store, Some(&item.to_food()))?;
        print!("{}", page);
        return Ok(());
    }

    println!("Categories: {}", menu.query(ShowCategories)?.join(", "));
    println!("Showing: {}", opt.category);
    for item in menu.query(ShowMenu(opt.category))? {
        print!("{}: {} ({:.2})", item.id, item.name, item.price);
        if let Some(note) = item.note.as_ref() {
            print!(" [{}]", note);
        }
        println!();
    }
    Ok(())
}

fn food(fc: &foodcart::FoodCart, cmd: FoodCommand) -> Result<()> {
    let mut editor = fc.editor()?;
    match cmd {
        FoodCommand::Show { id } => {
            let item = load(&mut editor, id)?;
            println!("{}", serde_json::to_string_pretty(&item)?);
        }
        FoodCommand::Update { id, fields } => {
            load(&mut editor, id)?;
            for (field, value) in fields.edits() {
                editor.edit(field, value).map_err(|a| anyhow!("{}", a))?;
            }
            if let Some(image) = fields.image {
                if !fs::metadata(&image).map(|m| m.is_file()).unwrap_or(false) {
                    warn!("Image {:?} does not look like a file", image);
                }
                editor.replace_image(image).map_err(|a| anyhow!("{}", a))?;
            }
            editor.save().map_err(|a| anyhow!("{}", a))?;
            println!("Saved.");
        }
        FoodCommand::Create { fields } => {
            let mut form = FoodForm::default();
            for (field, value) in fields.edits() {
                form.set(field, value).map_err(|a| anyhow!("{}", a))?;
            }
            form.image = fields.image;
            editor.create(&form).map_err(|a| anyhow!("{}", a))?;
            println!("Created.");
        }
        FoodCommand::Delete { id } => {
            load(&mut editor, id)?;
            editor.delete().map_err(|a| anyhow!("{}", a))?;
            println!("Deleted.");
        }
    }
    Ok(())
}

fn load<A: FoodApi + Send + Sync + 'static>(
    editor: &mut FoodEditor<A>,
    id: FoodId,
) -> Result<foodcart::menu::MenuItem> {
    editor.open(id);
    match editor.wait() {
        EditorState::Editing(draft) => Ok(draft.original.clone()),
        EditorState::Failed(msg) => Err(anyhow!("{}", msg)),
        other => Err(anyhow!("Unexpected editor state: {:?}", other)),
    }
}
