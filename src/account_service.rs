// ============================================================================
// Account Service
// ============================================================================
//
// The authentication-provider surface: registration (credential hashing and
// token issuance) and e-mail/credential login returning the bearer token.
//
// ============================================================================

use missive_db::UserStore;
use missive_error::{AppError, AppResult};
use missive_types::{validate_credential, NewUser, Permission, User, ValidationErrors};
use serde::Deserialize;

use crate::auth::AuthProvider;
use crate::metrics;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Registration {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub credential: Option<String>,
    pub credential_confirmation: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Login {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub credential: String,
}

/// Creates an account with a fresh token.
///
/// Identity and credential problems are reported together.
pub async fn register<S>(
    store: &S,
    auth: &AuthProvider,
    registration: Registration,
    permission: Permission,
) -> AppResult<User>
where
    S: UserStore + ?Sized,
{
    let mut new_user = NewUser {
        name: registration.name.trim().to_string(),
        email: registration.email,
        credential_hash: String::new(),
        token: auth.issue_token(),
        permission,
    };

    let mut errors = ValidationErrors::new();
    if let Err(identity) = new_user.validate() {
        errors.extend(identity);
    }
    if let Err(credential) = validate_credential(
        registration.credential.as_deref(),
        registration.credential_confirmation.as_deref(),
    ) {
        errors.extend(credential);
    }
    errors.into_result()?;

    let credential = registration.credential.unwrap_or_default();
    new_user.credential_hash = auth.hash_credential(&credential).await?;
    store.create_user(new_user).await
}

/// Verifies an e-mail/credential pair. Unknown e-mails and wrong credentials
/// fail the same way.
pub async fn login<S>(store: &S, auth: &AuthProvider, login: Login) -> AppResult<User>
where
    S: UserStore + ?Sized,
{
    let Some(user) = store.find_user_by_email(&login.email).await? else {
        metrics::AUTH_FAILURES_TOTAL.inc();
        return Err(AppError::InvalidLogin);
    };

    if !auth
        .verify_credential(&login.credential, &user.credential_hash)
        .await?
    {
        metrics::AUTH_FAILURES_TOTAL.inc();
        return Err(AppError::InvalidLogin);
    }
    Ok(user)
}
