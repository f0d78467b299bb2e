use anyhow::{anyhow, Result};
use log::*;

use infra::storage::Storage;

pub mod cart;
pub mod config;
pub mod editor;
pub mod food;
pub mod menu;
pub mod services;

use crate::cart::CartStore;
use crate::editor::{FoodEditor, HttpFoodApi};

pub struct FoodCart {
    storage: Box<dyn Storage>,
    api: Option<config::ApiConfig>,
}

impl FoodCart {
    pub fn new(config: &config::Config) -> Result<Self> {
        info!("Booting foodcart");
        let storage = config.storage.build();
        let api = config.api.clone();
        Ok(FoodCart { storage, api })
    }

    pub fn cart(&self) -> CartStore<&dyn Storage> {
        CartStore::open(&*self.storage)
    }

    pub fn editor(&self) -> Result<FoodEditor<HttpFoodApi>> {
        let api = self
            .api
            .as_ref()
            .ok_or_else(|| anyhow!("No [api] url configured"))?
            .build()?;
        Ok(FoodEditor::new(api))
    }
}
