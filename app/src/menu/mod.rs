use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use log::*;

use crate::food::FoodId;
use crate::services::{Queryable, Request};

mod models;

pub use self::models::MenuItem;

pub const ALL: &str = "All";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    Category(String),
}

/// A read-only list of food items as supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct Menu {
    items: Vec<MenuItem>,
}

#[derive(Debug, Clone)]
pub struct ShowMenu(pub CategoryFilter);

#[derive(Debug, Clone, Copy)]
pub struct ShowCategories;

impl Menu {
    pub fn new(items: Vec<MenuItem>) -> Self {
        Menu { items }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("open menu {:?}", path))?;
        let items: Vec<MenuItem> = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parse menu {:?}", path))?;
        debug!("Loaded {} menu items from {:?}", items.len(), path);
        Ok(Menu { items })
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    /// `All`, then each distinct category in order of first appearance.
    pub fn categories(&self) -> Vec<String> {
        let mut categories = vec![ALL.to_string()];
        for item in self.items.iter() {
            if !categories.contains(&item.category) {
                categories.push(item.category.clone());
            }
        }
        categories
    }

    pub fn filter<'a>(&'a self, filter: &'a CategoryFilter) -> impl 'a + Iterator<Item = &'a MenuItem> {
        self.items.iter().filter(move |item| filter.matches(item))
    }

    pub fn get(&self, id: &FoodId) -> Option<&MenuItem> {
        self.items.iter().find(|item| &item.id == id)
    }
}

impl CategoryFilter {
    pub fn matches(&self, item: &MenuItem) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Category(name) => &item.category == name,
        }
    }
}

impl Default for CategoryFilter {
    fn default() -> Self {
        CategoryFilter::All
    }
}

impl FromStr for CategoryFilter {
    type Err = std::convert::Infallible;
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        if src == ALL {
            Ok(CategoryFilter::All)
        } else {
            Ok(CategoryFilter::Category(src.to_string()))
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CategoryFilter::All => write!(fmt, "{}", ALL),
            CategoryFilter::Category(name) => write!(fmt, "{}", name),
        }
    }
}

impl Request for ShowMenu {
    type Resp = Vec<MenuItem>;
}

impl Request for ShowCategories {
    type Resp = Vec<String>;
}

impl Queryable<ShowMenu> for Menu {
    fn query(&self, ShowMenu(filter): ShowMenu) -> Result<Vec<MenuItem>> {
        Ok(self.filter(&filter).cloned().collect())
    }
}

impl Queryable<ShowCategories> for Menu {
    fn query(&self, _: ShowCategories) -> Result<Vec<String>> {
        Ok(self.categories())
    }
}
