use serde::{Deserialize, Serialize};

use crate::food::{Food, FoodId};

/// A food item as the catalogue serves it.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: FoodId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_path: String,
    pub price: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl MenuItem {
    /// The descriptor handed to the cart view when this item is ordered.
    pub fn to_food(&self) -> Food {
        Food {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            image: self.image_path.clone(),
            price: self.price,
        }
    }
}
