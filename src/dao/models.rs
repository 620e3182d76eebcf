use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use uuid::Uuid;

/// Role attached to an account; drives the privileged checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May manage accounts and the catalog.
    Admin,
    /// Regular catalog consumer; default for self-registration.
    User,
}

/// Account record as persisted, secret included.
///
/// Never leaves the persistence and credential-check paths; callers only see
/// the password-free [`AccountSummary`](crate::dto::account::AccountSummary).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountEntity {
    /// Stable identifier for the account.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Email address, unique across the collection case-insensitively.
    pub email: String,
    /// Role granted to the account.
    pub role: Role,
    /// Mock plaintext secret checked on authentication.
    pub password: String,
}

impl AccountEntity {
    /// Case-normalized email used for uniqueness and credential lookups.
    pub fn normalized_email(&self) -> String {
        self.email.to_lowercase()
    }
}

/// Platforms a catalog entry can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    /// Desktop.
    #[serde(rename = "PC")]
    Pc,
    /// Sony consoles.
    PlayStation,
    /// Microsoft consoles.
    Xbox,
    /// Nintendo Switch.
    Switch,
}

/// Game record as persisted in the catalog blob.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameEntity {
    /// Stable identifier for the record.
    pub id: Uuid,
    /// Game title.
    pub title: String,
    /// Target platform.
    pub platform: Platform,
    /// Free-form genre label.
    pub genre: String,
    /// Optional blurb shown on detail pages.
    pub description: Option<String>,
    /// Optional list price in EUR.
    pub price: Option<f64>,
    /// Release date in `YYYY-MM-DD`, when known.
    pub released_at: Option<String>,
    /// When the record was created.
    pub created_at: SystemTime,
    /// Last time the record was updated.
    pub updated_at: SystemTime,
}
