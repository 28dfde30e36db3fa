// ============================================================================
// Profile Service
// ============================================================================
//
// The caller's own account: profile view with message counts, partial
// updates and token rotation. No operation here can address another account.
//
// ============================================================================

use missive_db::{MessageFilter, Store};
use missive_error::AppResult;
use missive_types::{validate_credential, User, UserChanges};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthProvider;

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub sent_messages: i64,
    pub received_messages: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub credential: Option<String>,
    pub credential_confirmation: Option<String>,
}

/// Sent count excludes archived messages; received count includes every status.
pub async fn show(store: &dyn Store, user: &User) -> AppResult<Profile> {
    let sent_messages = store.count_messages(&MessageFilter::sent_by(user.id)).await?;
    let received_messages = store
        .count_messages(&MessageFilter::all_received_by(user.id))
        .await?;

    Ok(Profile {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        sent_messages,
        received_messages,
    })
}

/// Applies the present fields to the caller's account.
///
/// A credential change needs a matching confirmation; a lone confirmation is
/// ignored.
pub async fn update(
    store: &dyn Store,
    auth: &AuthProvider,
    user: &User,
    update: ProfileUpdate,
) -> AppResult<User> {
    let mut changes = UserChanges {
        name: update.name,
        email: update.email,
        credential_hash: None,
    };

    if let Some(credential) = update.credential.as_deref() {
        validate_credential(Some(credential), update.credential_confirmation.as_deref())?;
        changes.credential_hash = Some(auth.hash_credential(credential).await?);
    }

    if changes.is_empty() {
        return Ok(user.clone());
    }
    store.update_user(user.id, changes).await
}

/// Replaces the caller's bearer token and returns the new one.
pub async fn rotate_token(store: &dyn Store, auth: &AuthProvider, user: &User) -> AppResult<String> {
    let token = auth.issue_token();
    store.replace_token(user.id, &token).await?;
    Ok(token)
}
