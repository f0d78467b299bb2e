use std::io;
use std::path::PathBuf;

use err_derive::Error;
use log::*;
use reqwest::blocking::{multipart, Client, Response};
use url::Url;

use super::FoodForm;
use crate::food::FoodId;
use crate::menu::MenuItem;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(display = "api url {} cannot hold a food id", _0)]
    BaseUrl(Url),
    #[error(display = "request failed: {}", _0)]
    Transport(#[error(source)] reqwest::Error),
    #[error(display = "server answered {}", _0)]
    Status(u16),
    #[error(display = "could not read image {:?}", path)]
    Image {
        path: PathBuf,
        #[error(source)]
        source: io::Error,
    },
}

/// The remote food item resource.
pub trait FoodApi {
    fn fetch(&self, id: &FoodId) -> Result<MenuItem, ApiError>;
    fn create(&self, form: &FoodForm) -> Result<(), ApiError>;
    fn update(&self, id: &FoodId, form: &FoodForm) -> Result<(), ApiError>;
    fn delete(&self, id: &FoodId) -> Result<(), ApiError>;
}

impl<A: FoodApi + ?Sized> FoodApi for std::sync::Arc<A> {
    fn fetch(&self, id: &FoodId) -> Result<MenuItem, ApiError> {
        (**self).fetch(id)
    }
    fn create(&self, form: &FoodForm) -> Result<(), ApiError> {
        (**self).create(form)
    }
    fn update(&self, id: &FoodId, form: &FoodForm) -> Result<(), ApiError> {
        (**self).update(id, form)
    }
    fn delete(&self, id: &FoodId) -> Result<(), ApiError> {
        (**self).delete(id)
    }
}

/// [`FoodApi`] over HTTP, rooted at `{apiUrl}`.
#[derive(Debug, Clone)]
pub struct HttpFoodApi {
    base: Url,
    client: Client,
}

impl HttpFoodApi {
    pub fn new(base: Url) -> Result<Self, ApiError> {
        let client = Client::builder().build().map_err(ApiError::Transport)?;
        Ok(HttpFoodApi { base, client })
    }

    pub fn resource(&self, id: &FoodId) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::BaseUrl(self.base.clone()))?
            .pop_if_empty()
            .push(&id.to_string());
        Ok(url)
    }

    fn multipart(form: &FoodForm) -> Result<multipart::Form, ApiError> {
        let mut parts = multipart::Form::new()
            .text("name", form.name.clone())
            .text("description", form.description.clone())
            .text("price", form.price.to_string())
            .text("category", form.category.clone());
        if let Some(note) = form.note.as_ref() {
            parts = parts.text("note", note.clone());
        }
        if let Some(path) = form.image.as_ref() {
            parts = parts.file("image", path).map_err(|source| ApiError::Image {
                path: path.clone(),
                source,
            })?;
        }
        Ok(parts)
    }

    fn check(resp: Response) -> Result<Response, ApiError> {
        let status = resp.status();
        debug!("{} -> {}", resp.url(), status);
        if status.is_success() {
            Ok(resp)
        } else {
            Err(ApiError::Status(status.as_u16()))
        }
    }
}

impl FoodApi for HttpFoodApi {
    fn fetch(&self, id: &FoodId) -> Result<MenuItem, ApiError> {
        let url = self.resource(id)?;
        let resp = self.client.get(url).send().map_err(ApiError::Transport)?;
        Self::check(resp)?.json().map_err(ApiError::Transport)
    }

    fn create(&self, form: &FoodForm) -> Result<(), ApiError> {
        let parts = Self::multipart(form)?;
        let resp = self
            .client
            .post(self.base.clone())
            .multipart(parts)
            .send()
            .map_err(ApiError::Transport)?;
        Self::check(resp)?;
        Ok(())
    }

    fn update(&self, id: &FoodId, form: &FoodForm) -> Result<(), ApiError> {
        let url = self.resource(id)?;
        let parts = Self::multipart(form)?;
        let resp = self
            .client
            .put(url)
            .multipart(parts)
            .send()
            .map_err(ApiError::Transport)?;
        Self::check(resp)?;
        Ok(())
    }

    fn delete(&self, id: &FoodId) -> Result<(), ApiError> {
        let url = self.resource(id)?;
        let resp = self.client.delete(url).send().map_err(ApiError::Transport)?;
        Self::check(resp)?;
        Ok(())
    }
}
