use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::dao::models::{AccountEntity, Role};

/// Credentials supplied to an authentication attempt.
#[derive(Debug, Deserialize, Validate)]
pub struct Credentials {
    /// Email to look up; matching is case-insensitive.
    #[validate(email)]
    pub email: String,
    /// Secret to compare; matching is exact.
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// Self-service registration payload.
///
/// Accounts created this way always get [`Role::User`].
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    /// Display name for the new account.
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    /// Email address, rejected when already in use.
    #[validate(email)]
    pub email: String,
    /// Initial secret.
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Administrative account creation payload with an explicit role.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAccountInput {
    /// Display name for the new account.
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    /// Email address, rejected when already in use.
    #[validate(email)]
    pub email: String,
    /// Initial secret.
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    /// Role granted to the new account.
    pub role: Role,
}

/// Partial account update; omitted fields keep their current value.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateAccountInput {
    /// New display name.
    #[serde(default)]
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
    /// New email, re-checked against the uniqueness rule.
    #[serde(default)]
    #[validate(email)]
    pub email: Option<String>,
    /// New secret.
    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
    /// New role.
    #[serde(default)]
    pub role: Option<Role>,
}

/// Password-free projection of an account handed back to callers.
///
/// Also the shape persisted for the active session, which is why it is
/// deserializable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountSummary {
    /// Stable identifier for the account.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Role granted to the account.
    pub role: Role,
}

impl From<&AccountEntity> for AccountSummary {
    fn from(entity: &AccountEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name.clone(),
            email: entity.email.clone(),
            role: entity.role,
        }
    }
}
