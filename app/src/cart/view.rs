use std::fmt;

use anyhow::Result;
use log::*;

use infra::storage::Storage;

use super::models::LineItem;
use super::store::CartStore;
use crate::food::Food;

pub const MISSING_FOOD_WARNING: &str = "No food item was selected. Choose something from the menu first.";

/// What the cart view shows once mounted.
#[derive(Debug, Clone, PartialEq)]
pub enum CartPage {
    MissingFood,
    Ready { items: Vec<LineItem>, total: f64 },
}

pub struct CartView;

impl CartView {
    /// Mounts the cart view with the food it was navigated to with. Without
    /// one the view only shows a warning and the cart is left alone.
    pub fn mount<S: Storage>(store: &mut CartStore<S>, food: Option<&Food>) -> Result<CartPage> {
        let food = match food {
            Some(food) => food,
            None => {
                info!("Cart view opened without a food item");
                return Ok(CartPage::MissingFood);
            }
        };
        store.add_to_cart(food)?;
        Ok(CartView::page(store))
    }

    pub fn page<S: Storage>(store: &CartStore<S>) -> CartPage {
        CartPage::Ready {
            items: store.items().to_vec(),
            total: store.total(),
        }
    }
}

impl fmt::Display for CartPage {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CartPage::MissingFood => writeln!(fmt, "{}", MISSING_FOOD_WARNING),
            CartPage::Ready { items, total } => {
                if items.is_empty() {
                    writeln!(fmt, "Your cart is empty.")?;
                }
                for item in items.iter() {
                    writeln!(
                        fmt,
                        "{:>3} x {} [{}] @ {:.2} = {:.2}",
                        item.quantity,
                        item.name,
                        item.id,
                        item.price,
                        item.subtotal()
                    )?;
                }
                writeln!(fmt, "Total: {:.2}", total)
            }
        }
    }
}
