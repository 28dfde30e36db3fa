// ============================================================================
// Security Configuration
// ============================================================================

use crate::constants::*;

/// Credential hashing and token issuance policy
#[derive(Clone, Debug)]
pub struct SecurityConfig {
    /// bcrypt work factor for stored credentials
    pub bcrypt_cost: u32,
    /// Random bytes per issued bearer token (before encoding)
    pub token_bytes: usize,
    /// Maximum accepted JSON request body
    pub max_request_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            token_bytes: DEFAULT_TOKEN_BYTES,
            max_request_body_size: MAX_REQUEST_BODY_SIZE,
        }
    }
}

impl SecurityConfig {
    pub(crate) fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bcrypt_cost: std::env::var("BCRYPT_COST")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(clamp_bcrypt_cost)
                .unwrap_or(defaults.bcrypt_cost),
            token_bytes: std::env::var("TOKEN_BYTES")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .map(|n| n.max(MIN_TOKEN_BYTES))
                .unwrap_or(defaults.token_bytes),
            max_request_body_size: std::env::var("MAX_REQUEST_BODY_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_request_body_size),
        }
    }
}

pub(crate) fn clamp_bcrypt_cost(cost: u32) -> u32 {
    cost.clamp(MIN_BCRYPT_COST, MAX_BCRYPT_COST)
}
