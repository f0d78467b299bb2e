use std::collections::HashSet;
use std::convert::TryFrom;

use err_derive::Error;
use serde::{Deserialize, Serialize};

use crate::food::{Food, FoodId};

/// One food entry in the cart. The descriptive fields are a snapshot taken
/// when the food was first added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: FoodId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    pub price: f64,
    pub quantity: u32,
}

/// Ordered line items, unique by id, each with a quantity of at least one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<LineItem>", into = "Vec<LineItem>")]
pub struct Cart {
    items: Vec<LineItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidCart {
    #[error(display = "duplicate line item {}", _0)]
    Duplicate(FoodId),
    #[error(display = "line item {} has quantity {}", _0, _1)]
    Quantity(FoodId, u32),
}

impl LineItem {
    fn of(food: &Food) -> Self {
        LineItem {
            id: food.id.clone(),
            name: food.name.clone(),
            description: food.description.clone(),
            image: food.image.clone(),
            price: food.price,
            quantity: 1,
        }
    }

    pub fn subtotal(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn get(&self, id: &FoodId) -> Option<&LineItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.items.iter().map(LineItem::subtotal).sum()
    }

    /// Bumps the quantity of an existing line, keeping its snapshot, or
    /// appends a fresh line with quantity one.
    pub fn add(&mut self, food: &Food) {
        match self.items.iter_mut().find(|item| item.id == food.id) {
            Some(item) => item.quantity = item.quantity.saturating_add(1),
            None => self.items.push(LineItem::of(food)),
        }
    }

    /// Applies `amount` to the quantity of `id`, flooring at one. Returns
    /// whether a line matched.
    pub fn adjust(&mut self, id: &FoodId, amount: i64) -> bool {
        let item = match self.items.iter_mut().find(|item| &item.id == id) {
            Some(item) => item,
            None => return false,
        };
        let next = i64::from(item.quantity).saturating_add(amount).max(1);
        item.quantity = u32::try_from(next).unwrap_or(u32::MAX);
        // Unreachable while the floor above holds; kept so that a zero
        // quantity can never be stored.
        self.items.retain(|item| item.quantity > 0);
        true
    }
}

impl TryFrom<Vec<LineItem>> for Cart {
    type Error = InvalidCart;
    fn try_from(items: Vec<LineItem>) -> Result<Self, Self::Error> {
        let mut seen = HashSet::new();
        for item in items.iter() {
            if item.quantity == 0 {
                return Err(InvalidCart::Quantity(item.id.clone(), item.quantity));
            }
            if !seen.insert(&item.id) {
                return Err(InvalidCart::Duplicate(item.id.clone()));
            }
        }
        Ok(Cart { items })
    }
}

impl From<Cart> for Vec<LineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}
