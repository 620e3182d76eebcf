use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    dao::models::{GameEntity, Platform},
    dto::{format_system_time, validation::validate_release_date},
};

/// Payload used to add a catalog entry.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateGameInput {
    /// Game title; surrounding whitespace is trimmed.
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    /// Target platform.
    pub platform: Platform,
    /// Genre label; surrounding whitespace is trimmed.
    #[validate(length(min = 1, message = "Genre must not be empty"))]
    pub genre: String,
    /// Optional blurb shown on detail pages.
    #[serde(default)]
    pub description: Option<String>,
    /// Optional list price in EUR.
    #[serde(default)]
    pub price: Option<f64>,
    /// Optional release date in `YYYY-MM-DD`.
    #[serde(default)]
    #[validate(custom(function = validate_release_date))]
    pub released_at: Option<String>,
}

/// Partial catalog update.
///
/// Scalar fields follow plain merge semantics: `None` keeps the current
/// value. The optional fields are doubly wrapped so callers can distinguish
/// "leave alone" (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Default, Deserialize)]
pub struct UpdateGameInput {
    /// New title, if supplied.
    #[serde(default)]
    pub title: Option<String>,
    /// New platform, if supplied.
    #[serde(default)]
    pub platform: Option<Platform>,
    /// New genre, if supplied.
    #[serde(default)]
    pub genre: Option<String>,
    /// If omitted, keeps the description; `null` clears it.
    #[serde(default)]
    pub description: Option<Option<String>>,
    /// If omitted, keeps the price; `null` clears it.
    #[serde(default)]
    pub price: Option<Option<f64>>,
    /// If omitted, keeps the release date; `null` clears it.
    #[serde(default)]
    pub released_at: Option<Option<String>>,
}

impl Validate for UpdateGameInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(Some(ref date)) = self.released_at {
            if let Err(e) = validate_release_date(date) {
                errors.add("released_at", e);
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Catalog entry handed back to callers.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GameSummary {
    /// Stable identifier for the record.
    pub id: Uuid,
    /// Game title.
    pub title: String,
    /// Target platform.
    pub platform: Platform,
    /// Genre label.
    pub genre: String,
    /// Optional blurb.
    pub description: Option<String>,
    /// Optional list price in EUR.
    pub price: Option<f64>,
    /// Optional release date in `YYYY-MM-DD`.
    pub released_at: Option<String>,
    /// Creation timestamp, RFC 3339.
    pub created_at: String,
    /// Last-update timestamp, RFC 3339.
    pub updated_at: String,
}

impl From<&GameEntity> for GameSummary {
    fn from(entity: &GameEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title.clone(),
            platform: entity.platform,
            genre: entity.genre.clone(),
            description: entity.description.clone(),
            price: entity.price,
            released_at: entity.released_at.clone(),
            created_at: format_system_time(entity.created_at),
            updated_at: format_system_time(entity.updated_at),
        }
    }
}
