// ============================================================================
// Authentication
// ============================================================================
//
// - AuthProvider: credential hashing (bcrypt) and bearer-token issuance
// - authenticate: the per-request gate that turns an Authorization header
//   value into the acting user
//
// Tokens are opaque: random bytes from the OS RNG, URL-safe base64 encoded.
// The header carries the raw token with no scheme prefix.
//
// ============================================================================

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use missive_config::SecurityConfig;
use missive_db::UserStore;
use missive_error::{AppError, AppResult};
use missive_types::User;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::metrics;

pub struct AuthProvider {
    bcrypt_cost: u32,
    token_bytes: usize,
}

impl AuthProvider {
    pub fn new(security: &SecurityConfig) -> Self {
        Self {
            bcrypt_cost: security.bcrypt_cost,
            token_bytes: security.token_bytes,
        }
    }

    /// Hashes a credential off the async runtime (bcrypt is CPU bound).
    pub async fn hash_credential(&self, credential: &str) -> AppResult<String> {
        let credential = credential.to_owned();
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(credential, cost))
            .await
            .map_err(|e| AppError::internal(format!("hashing task failed: {}", e)))?
            .map_err(|e| AppError::internal(format!("bcrypt failed: {}", e)))
    }

    pub async fn verify_credential(&self, credential: &str, hash: &str) -> AppResult<bool> {
        let credential = credential.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || bcrypt::verify(credential, &hash))
            .await
            .map_err(|e| AppError::internal(format!("verification task failed: {}", e)))?
            .or(Ok(false))
    }

    /// Fresh opaque bearer token
    pub fn issue_token(&self) -> String {
        let mut bytes = vec![0u8; self.token_bytes];
        OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }
}

/// Resolves the acting user from a raw `Authorization` header value.
///
/// - absent or empty header: `MissingCredential`
/// - no user holds exactly this token: `InvalidCredential`
///
/// Read-only; nothing downstream runs when this fails.
pub async fn authenticate<S>(store: &S, header: Option<&str>) -> AppResult<User>
where
    S: UserStore + ?Sized,
{
    let token = match header {
        Some(value) if !value.is_empty() => value,
        _ => return Err(rejected(AppError::MissingCredential)),
    };

    store
        .find_user_by_token(token)
        .await?
        .ok_or_else(|| rejected(AppError::InvalidCredential))
}

/// Rejection for a header value that is not visible ASCII and so cannot
/// equal any issued token.
pub fn unreadable_header() -> AppError {
    rejected(AppError::InvalidCredential)
}

fn rejected(err: AppError) -> AppError {
    metrics::AUTH_FAILURES_TOTAL.inc();
    err
}
