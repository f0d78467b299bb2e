use anyhow::Result;

use infra::storage::Storage;

use crate::food::{Food, FoodId};
use crate::services::{Commandable, Queryable, Request};

mod models;
mod store;
mod view;

pub use self::models::{Cart, InvalidCart, LineItem};
pub use self::store::{CartStore, CART_KEY};
pub use self::view::{CartPage, CartView, MISSING_FOOD_WARNING};

#[derive(Debug, Clone)]
pub struct AddToCart(pub Food);

#[derive(Debug, Clone)]
pub struct UpdateQuantity {
    pub id: FoodId,
    pub amount: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct ShowCart;

impl Request for AddToCart {
    type Resp = ();
}

impl Request for UpdateQuantity {
    type Resp = ();
}

impl Request for ShowCart {
    type Resp = CartPage;
}

impl<S: Storage> Commandable<AddToCart> for CartStore<S> {
    fn execute(&mut self, AddToCart(food): AddToCart) -> Result<()> {
        self.add_to_cart(&food)
    }
}

impl<S: Storage> Commandable<UpdateQuantity> for CartStore<S> {
    fn execute(&mut self, req: UpdateQuantity) -> Result<()> {
        self.update_quantity(&req.id, req.amount)
    }
}

impl<S: Storage> Queryable<ShowCart> for CartStore<S> {
    fn query(&self, _: ShowCart) -> Result<CartPage> {
        Ok(CartView::page(self))
    }
}
