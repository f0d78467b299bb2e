use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a food item as handed out by the catalogue. Opaque: either a
/// number or a string, compared as given.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FoodId {
    Number(i64),
    Text(String),
}

/// The descriptor the cart view is navigated to with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub id: FoodId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    pub price: f64,
}

impl fmt::Display for FoodId {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FoodId::Number(n) => write!(fmt, "{}", n),
            FoodId::Text(s) => write!(fmt, "{}", s),
        }
    }
}

impl FromStr for FoodId {
    type Err = std::convert::Infallible;
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        Ok(src
            .parse::<i64>()
            .map(FoodId::Number)
            .unwrap_or_else(|_| FoodId::Text(src.to_string())))
    }
}

impl FoodId {
    /// Resolves a typed-in id against ids already known, so that `"7"` finds
    /// either `7` or `"7"`. Falls back to parsing when nothing matches.
    pub fn resolve<'a, I>(arg: &str, known: I) -> FoodId
    where
        I: IntoIterator<Item = &'a FoodId>,
    {
        let mut known = known.into_iter().filter(|id| id.to_string() == arg);
        let first = known.next();
        match (first, known.next()) {
            (Some(id), None) => id.clone(),
            _ => match arg.parse::<i64>() {
                Ok(n) => FoodId::Number(n),
                Err(_) => FoodId::Text(arg.to_string()),
            },
        }
    }
}

impl From<i64> for FoodId {
    fn from(n: i64) -> Self {
        FoodId::Number(n)
    }
}

impl From<&str> for FoodId {
    fn from(s: &str) -> Self {
        FoodId::Text(s.to_string())
    }
}

impl Food {
    pub fn new<I: Into<FoodId>>(id: I, name: &str, price: f64) -> Self {
        Food {
            id: id.into(),
            name: name.to_string(),
            description: String::new(),
            image: String::new(),
            price,
        }
    }
}
