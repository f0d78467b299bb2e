use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::mpsc::{channel, Receiver};
use std::thread;

use anyhow::Result;
use tempfile::TempDir;

use foodcart::cart::{AddToCart, CartPage, CartView, ShowCart, UpdateQuantity, CART_KEY};
use foodcart::config::{ApiConfig, Config, StorageConfig};
use foodcart::editor::{EditorState, FoodApi};
use foodcart::food::{Food, FoodId};
use foodcart::menu::{Menu, MenuItem};
use foodcart::services::{Commandable, Queryable};
use foodcart::FoodCart;
use infra::storage::{FileStorage, Storage};

struct Session {
    dir: TempDir,
}

impl Session {
    fn new() -> Result<Self> {
        env_logger::try_init().unwrap_or_default();
        Ok(Session {
            dir: tempfile::tempdir()?,
        })
    }

    /// Each call is a fresh page load against the same session.
    fn load_page(&self) -> Result<FoodCart> {
        let config = Config {
            storage: StorageConfig {
                path: Some(self.dir.path().to_path_buf()),
            },
            api: None,
        };
        FoodCart::new(&config)
    }
}

fn total(page: &CartPage) -> f64 {
    match page {
        CartPage::Ready { total, .. } => *total,
        CartPage::MissingFood => panic!("cart page shows a warning"),
    }
}

#[test]
fn cart_scenario_survives_reloads() -> Result<()> {
    let session = Session::new()?;
    let pizza = Food::new(1, "Pizza", 100.0);

    let page = CartView::mount(&mut session.load_page()?.cart(), Some(&pizza))?;
    assert_eq!(total(&page), 100.0);

    let page = CartView::mount(&mut session.load_page()?.cart(), Some(&pizza))?;
    assert_eq!(total(&page), 200.0);

    {
        let fc = session.load_page()?;
        let mut cart = fc.cart();
        cart.execute(UpdateQuantity {
            id: FoodId::Number(1),
            amount: -5,
        })?;
        assert_eq!(total(&cart.query(ShowCart)?), 100.0);

        let before = cart.cart().clone();
        cart.execute(UpdateQuantity {
            id: FoodId::Number(99),
            amount: -1,
        })?;
        assert_eq!(cart.cart(), &before);
    }

    let fc = session.load_page()?;
    let cart = fc.cart();
    assert_eq!(cart.items().len(), 1);
    assert_eq!(cart.items()[0].quantity, 1);
    Ok(())
}

#[test]
fn typed_id_reaches_a_string_keyed_line() -> Result<()> {
    let session = Session::new()?;
    let fc = session.load_page()?;
    let mut cart = fc.cart();
    cart.execute(AddToCart(Food::new("7", "Spring rolls", 3.0)))?;

    let id = FoodId::resolve("7", cart.items().iter().map(|item| &item.id));
    cart.execute(UpdateQuantity { id, amount: 2 })?;

    assert_eq!(cart.items()[0].quantity, 3);
    assert_eq!(cart.total(), 9.0);
    Ok(())
}

#[test]
fn corrupt_session_starts_empty() -> Result<()> {
    let session = Session::new()?;
    FileStorage::new(session.dir.path()).set(CART_KEY, "[{\"id\":")?;

    let fc = session.load_page()?;
    assert!(fc.cart().cart().is_empty());
    Ok(())
}

#[test]
fn ordering_from_the_menu_fills_the_cart() -> Result<()> {
    let session = Session::new()?;
    let menu = Menu::new(vec![MenuItem {
        id: FoodId::from("tea"),
        name: "Milk tea".to_string(),
        description: "boba".to_string(),
        image_path: "/tea.png".to_string(),
        price: 4.5,
        category: "Drinks".to_string(),
        note: Some("less sugar".to_string()),
    }]);

    let fc = session.load_page()?;
    let mut cart = fc.cart();
    for _ in 0..3 {
        let tea = menu.get(&FoodId::from("tea")).expect("tea on menu");
        cart.execute(AddToCart(tea.to_food()))?;
    }

    let reloaded = session.load_page()?;
    let cart = reloaded.cart();
    assert_eq!(cart.items()[0].image, "/tea.png");
    assert_eq!(cart.items()[0].quantity, 3);
    assert_eq!(cart.total(), 13.5);
    Ok(())
}

#[test]
fn opening_cart_without_food_warns() -> Result<()> {
    let session = Session::new()?;
    let fc = session.load_page()?;
    assert_eq!(CartView::mount(&mut fc.cart(), None)?, CartPage::MissingFood);
    assert_eq!(FileStorage::new(session.dir.path()).get(CART_KEY)?, None);
    Ok(())
}

/// Answers a single HTTP request, reporting its request line.
fn one_shot_server(status: &'static str, body: &'static str) -> Result<(String, Receiver<String>)> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    let (tx, rx) = channel();
    thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
        let mut request_line = String::new();
        reader.read_line(&mut request_line).expect("request line");
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).expect("header");
            if line == "\r\n" || line.is_empty() {
                break;
            }
        }
        let mut stream = stream;
        write!(
            stream,
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
        .expect("respond");
        tx.send(request_line.trim_end().to_string()).expect("report");
    });
    Ok((format!("http://{}/api/foods", addr), rx))
}

fn app_with_api(url: &str) -> Result<FoodCart> {
    let config = Config {
        storage: StorageConfig::default(),
        api: Some(ApiConfig { url: url.parse()? }),
    };
    FoodCart::new(&config)
}

#[test]
fn editor_fetches_over_http() -> Result<()> {
    env_logger::try_init().unwrap_or_default();
    let (url, requests) = one_shot_server(
        "200 OK",
        r#"{"id": 5, "name": "Dumplings", "description": "pork", "imagePath": "/d.png", "price": 6.5, "category": "Snacks"}"#,
    )?;
    let mut editor = app_with_api(&url)?.editor()?;

    editor.open(FoodId::Number(5));
    match editor.wait() {
        EditorState::Editing(draft) => {
            assert_eq!(draft.form.name, "Dumplings");
            assert_eq!(draft.original.image_path, "/d.png");
        }
        other => panic!("Expected to be editing; got {:?}", other),
    }
    assert_eq!(requests.recv()?, "GET /api/foods/5 HTTP/1.1");
    Ok(())
}

#[test]
fn editor_reports_http_failure_in_place() -> Result<()> {
    env_logger::try_init().unwrap_or_default();
    let (url, _requests) = one_shot_server("503 Service Unavailable", "{}")?;
    let mut editor = app_with_api(&url)?.editor()?;

    editor.open(FoodId::Number(5));
    match editor.wait() {
        EditorState::Failed(msg) => assert!(msg.contains("503"), "{}", msg),
        other => panic!("Expected failure; got {:?}", other),
    }
    Ok(())
}

#[test]
fn http_delete_hits_the_resource() -> Result<()> {
    env_logger::try_init().unwrap_or_default();
    let (url, requests) = one_shot_server("204 No Content", "")?;
    let api = ApiConfig { url: url.parse()? }.build()?;

    api.delete(&FoodId::from("old-soup"))?;
    assert_eq!(requests.recv()?, "DELETE /api/foods/old-soup HTTP/1.1");
    Ok(())
}

#[test]
fn editor_needs_an_api_url() -> Result<()> {
    let session = Session::new()?;
    assert!(session.load_page()?.editor().is_err());
    Ok(())
}
