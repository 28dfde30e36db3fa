// ============================================================================
// Configuration Constants
// ============================================================================

pub(crate) const DEFAULT_PORT: u16 = 8080;
pub(crate) const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";

pub(crate) const DEFAULT_BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

pub(crate) const DEFAULT_TOKEN_BYTES: usize = 32;
pub const MIN_TOKEN_BYTES: usize = 16;

pub const MAX_REQUEST_BODY_SIZE: usize = 64 * 1024; // 64 KB - JSON API requests

pub(crate) const DEV_HASH_SALT: &str = "missive-dev-log-salt";
