use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::validation::ValidationErrors;

pub const MIN_CREDENTIAL_LENGTH: usize = 6;
pub const MAX_CREDENTIAL_LENGTH: usize = 128;

/// Account permission level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    #[default]
    Normal,
    Master,
}

impl Permission {
    /// Stored representation (`users.permission` column)
    pub fn as_i16(self) -> i16 {
        match self {
            Permission::Normal => 0,
            Permission::Master => 1,
        }
    }

    pub fn from_i16(value: i16) -> Option<Self> {
        match value {
            0 => Some(Permission::Normal),
            1 => Some(Permission::Master),
            _ => None,
        }
    }
}

/// Account record.
///
/// The credential hash and the bearer token never serialize.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub credential_hash: String,
    #[serde(skip_serializing)]
    pub token: String,
    pub permission: Permission,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_master(&self) -> bool {
        self.permission == Permission::Master
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("permission", &self.permission)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Insert payload for a new account. `email` is normalised by the store.
#[derive(Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub credential_hash: String,
    pub token: String,
    pub permission: Permission,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        validate_identity(Some(&self.name), Some(&self.email)).into_result()
    }
}

/// Partial profile update. `None` leaves a column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub credential_hash: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.credential_hash.is_none()
    }

    /// Checks the fields that are being changed.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            errors.require_present("Name", Some(name));
        }
        if let Some(email) = &self.email {
            check_email(&mut errors, email);
        }
        errors.into_result()
    }
}

fn validate_identity(name: Option<&str>, email: Option<&str>) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.require_present("Name", name);
    match email {
        Some(email) => check_email(&mut errors, email),
        None => errors.add("Email can't be blank"),
    }
    errors
}

fn check_email(errors: &mut ValidationErrors, email: &str) {
    let email = email.trim();
    if email.is_empty() {
        errors.add("Email can't be blank");
    } else if !is_valid_email(email) {
        errors.add("Email is invalid");
    }
}

/// Trims and lower-cases an address; emails compare case-insensitively.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// `local@domain` with no whitespace and exactly one `@`.
pub fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && !domain.is_empty()
                && !email.chars().any(char::is_whitespace)
        }
        _ => false,
    }
}

/// Credential rules applied before hashing.
pub fn validate_credential(
    credential: Option<&str>,
    confirmation: Option<&str>,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    match credential {
        None | Some("") => errors.add("Credential can't be blank"),
        Some(credential) => {
            let len = credential.chars().count();
            if len < MIN_CREDENTIAL_LENGTH {
                errors.add(format!(
                    "Credential is too short (minimum is {} characters)",
                    MIN_CREDENTIAL_LENGTH
                ));
            } else if len > MAX_CREDENTIAL_LENGTH {
                errors.add(format!(
                    "Credential is too long (maximum is {} characters)",
                    MAX_CREDENTIAL_LENGTH
                ));
            }
            if confirmation != Some(credential) {
                errors.add("Credential confirmation doesn't match Credential");
            }
        }
    }
    errors.into_result()
}
