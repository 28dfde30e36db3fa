// ============================================================================
// Logging Configuration
// ============================================================================

use crate::constants::DEV_HASH_SALT;

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// Salt for hashing user identifiers before they reach the logs
    pub hash_salt: String,
}

impl LoggingConfig {
    pub(crate) fn from_env() -> Self {
        let hash_salt = match std::env::var("LOG_HASH_SALT") {
            Ok(salt) if !salt.is_empty() => salt,
            _ => {
                tracing::warn!("LOG_HASH_SALT is not set, using the development salt");
                DEV_HASH_SALT.to_string()
            }
        };
        Self { hash_salt }
    }
}
