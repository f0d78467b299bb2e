use anyhow::{Context, Result};
use log::*;

use infra::documents::Documents;
use infra::storage::Storage;

use super::models::{Cart, LineItem};
use crate::food::{Food, FoodId};

/// Slot the cart is kept under in session storage.
pub const CART_KEY: &str = "cart";

/// Owns the session's cart and writes it back to storage after every change.
#[derive(Debug)]
pub struct CartStore<S> {
    docs: Documents<S>,
    cart: Cart,
}

impl<S: Storage> CartStore<S> {
    /// Rehydrates the cart from `storage`. Anything that cannot be read back
    /// as a valid cart counts as no prior cart.
    pub fn open(storage: S) -> Self {
        let docs = Documents::wrap(storage);
        let cart = match docs.load::<Cart>(CART_KEY) {
            Ok(Some(cart)) => {
                debug!("Rehydrated cart with {} line items", cart.len());
                cart
            }
            Ok(None) => {
                debug!("No persisted cart; starting empty");
                Cart::new()
            }
            Err(e) => {
                warn!("Discarding unreadable cart: {:#}", e);
                Cart::new()
            }
        };
        CartStore { docs, cart }
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn items(&self) -> &[LineItem] {
        self.cart.items()
    }

    pub fn total(&self) -> f64 {
        self.cart.total()
    }

    pub fn add_to_cart(&mut self, food: &Food) -> Result<()> {
        debug!("Add {} ({:?}) to cart", food.id, food.name);
        self.cart.add(food);
        self.persist()
    }

    pub fn update_quantity(&mut self, id: &FoodId, amount: i64) -> Result<()> {
        if !self.cart.adjust(id, amount) {
            debug!("No line item {} to adjust", id);
            return Ok(());
        }
        trace!("Adjusted {} by {}", id, amount);
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        self.docs.save(CART_KEY, &self.cart).context("persist cart")
    }
}
