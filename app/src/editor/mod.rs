//! Admin editing of a single remote food item.
//!
//! Fetching runs on a background thread per request. Every request carries a
//! ticket naming the food id and the editor generation it was issued for;
//! opening another item bumps the generation so that late answers for the
//! previous one are dropped instead of clobbering the buffer.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use anyhow::bail;
use log::*;

use crate::food::FoodId;
use crate::menu::MenuItem;

mod api;

pub use self::api::{ApiError, FoodApi, HttpFoodApi};

/// Local edit buffer. Nothing here reaches the server until it is saved.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FoodForm {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub note: Option<String>,
    /// Replacement image to upload with the next save.
    pub image: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Description,
    Price,
    Category,
    Note,
}

/// A message to put in front of the user. Raising one never changes the
/// editor's buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert(pub String);

#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub id: FoodId,
    pub original: MenuItem,
    pub form: FoodForm,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorState {
    Idle,
    Loading(FoodId),
    Editing(Draft),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Ticket {
    id: FoodId,
    generation: u64,
}

struct Completion {
    ticket: Ticket,
    result: Result<MenuItem, ApiError>,
}

pub struct FoodEditor<A> {
    api: Arc<A>,
    state: EditorState,
    generation: u64,
    in_flight: usize,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
}

impl FoodForm {
    pub fn set(&mut self, field: Field, value: &str) -> Result<(), Alert> {
        match field {
            Field::Name => self.name = value.to_string(),
            Field::Description => self.description = value.to_string(),
            Field::Category => self.category = value.to_string(),
            Field::Note => {
                self.note = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                }
            }
            Field::Price => {
                let price = value
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|p| p.is_finite() && *p >= 0.0)
                    .ok_or_else(|| Alert(format!("{:?} is not a valid price", value)))?;
                self.price = price;
            }
        }
        Ok(())
    }
}

impl From<&MenuItem> for FoodForm {
    fn from(item: &MenuItem) -> Self {
        FoodForm {
            name: item.name.clone(),
            description: item.description.clone(),
            price: item.price,
            category: item.category.clone(),
            note: item.note.clone(),
            image: None,
        }
    }
}

impl FromStr for Field {
    type Err = anyhow::Error;
    fn from_str(src: &str) -> anyhow::Result<Self> {
        let field = match src {
            "name" => Field::Name,
            "description" => Field::Description,
            "price" => Field::Price,
            "category" => Field::Category,
            "note" => Field::Note,
            other => bail!("unknown field {:?}", other),
        };
        Ok(field)
    }
}

impl Alert {
    fn api(what: &str, err: &ApiError) -> Self {
        warn!("{}: {}", what, err);
        Alert(format!("{}: {}", what, err))
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", self.0)
    }
}

impl<A: FoodApi + Send + Sync + 'static> FoodEditor<A> {
    pub fn new(api: A) -> Self {
        let (tx, rx) = channel();
        FoodEditor {
            api: Arc::new(api),
            state: EditorState::Idle,
            generation: 0,
            in_flight: 0,
            tx,
            rx,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn draft(&self) -> Option<&Draft> {
        match &self.state {
            EditorState::Editing(draft) => Some(draft),
            _ => None,
        }
    }

    /// Starts loading `id`, superseding whatever was open before.
    pub fn open(&mut self, id: FoodId) {
        self.generation += 1;
        let ticket = Ticket {
            id: id.clone(),
            generation: self.generation,
        };
        debug!("Fetch {} as generation {}", id, ticket.generation);

        let api = self.api.clone();
        let tx = self.tx.clone();
        let spawned = thread::Builder::new()
            .name(format!("fetch-{}", id))
            .spawn(move || {
                let result = api.fetch(&ticket.id);
                // The editor may be gone by now; nobody is left to tell.
                let _ = tx.send(Completion { ticket, result });
            });

        match spawned {
            Ok(_) => {
                self.in_flight += 1;
                self.state = EditorState::Loading(id);
            }
            Err(e) => {
                error!("Could not start fetch for {}: {}", id, e);
                self.state = EditorState::Failed(format!("Could not load {}: {}", id, e));
            }
        }
    }

    /// Drops the current item; answers still in flight for it are ignored.
    pub fn close(&mut self) {
        self.generation += 1;
        self.state = EditorState::Idle;
    }

    /// Applies any answers that have arrived, without blocking.
    pub fn poll(&mut self) -> &EditorState {
        while let Ok(completion) = self.rx.try_recv() {
            self.complete(completion);
        }
        &self.state
    }

    /// Blocks until the current load, if any, has resolved.
    pub fn wait(&mut self) -> &EditorState {
        while let EditorState::Loading(_) = self.state {
            if !self.recv_one() {
                break;
            }
        }
        &self.state
    }

    /// Blocks until every request issued so far has answered.
    pub fn settle(&mut self) -> &EditorState {
        while self.in_flight > 0 {
            if !self.recv_one() {
                break;
            }
        }
        &self.state
    }

    fn recv_one(&mut self) -> bool {
        match self.rx.recv() {
            Ok(completion) => {
                self.complete(completion);
                true
            }
            Err(_) => false,
        }
    }

    fn complete(&mut self, Completion { ticket, result }: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);
        let current = match &self.state {
            EditorState::Loading(id) => ticket.generation == self.generation && id == &ticket.id,
            _ => false,
        };
        if !current {
            warn!(
                "Discarding stale answer for {} (generation {}, now {})",
                ticket.id, ticket.generation, self.generation
            );
            return;
        }

        self.state = match result {
            Ok(original) => {
                info!("Loaded {} for editing", ticket.id);
                EditorState::Editing(Draft {
                    id: ticket.id,
                    form: FoodForm::from(&original),
                    original,
                })
            }
            Err(e) => {
                warn!("Failed to load {}: {}", ticket.id, e);
                EditorState::Failed(format!("Could not load food item {}: {}", ticket.id, e))
            }
        };
    }

    pub fn edit(&mut self, field: Field, value: &str) -> Result<(), Alert> {
        self.form_mut()?.set(field, value)
    }

    pub fn replace_image(&mut self, path: PathBuf) -> Result<(), Alert> {
        self.form_mut()?.image = Some(path);
        Ok(())
    }

    fn form_mut(&mut self) -> Result<&mut FoodForm, Alert> {
        match &mut self.state {
            EditorState::Editing(draft) => Ok(&mut draft.form),
            _ => Err(Alert("No food item is open for editing".to_string())),
        }
    }

    /// Sends the buffer as an update. On failure the buffer stays as it is.
    pub fn save(&mut self) -> Result<(), Alert> {
        let draft = self
            .draft()
            .ok_or_else(|| Alert("No food item is open for editing".to_string()))?;
        self.api
            .update(&draft.id, &draft.form)
            .map_err(|e| Alert::api("Failed to update food item", &e))?;
        info!("Updated {}", draft.id);
        Ok(())
    }

    /// Deletes the open item and returns to idle. On failure nothing changes.
    pub fn delete(&mut self) -> Result<(), Alert> {
        let draft = self
            .draft()
            .ok_or_else(|| Alert("No food item is open for editing".to_string()))?;
        self.api
            .delete(&draft.id)
            .map_err(|e| Alert::api("Failed to delete food item", &e))?;
        info!("Deleted {}", draft.id);
        self.close();
        Ok(())
    }

    pub fn create(&self, form: &FoodForm) -> Result<(), Alert> {
        self.api
            .create(form)
            .map_err(|e| Alert::api("Failed to create food item", &e))?;
        info!("Created {:?}", form.name);
        Ok(())
    }
}
