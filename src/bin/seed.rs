// ============================================================================
// Seed
// ============================================================================
//
// Creates the demo accounts in the configured store and prints their tokens.
// Accounts whose e-mail already exists are left as they are.
//
// ============================================================================

use anyhow::Result;
use missive_config::Config;
use missive_server::account_service::{self, Registration};
use missive_server::auth::AuthProvider;
use missive_types::Permission;

const DEMO_CREDENTIAL: &str = "123456";

const ACCOUNTS: &[(&str, &str, Permission)] = &[
    ("Admin", "master@email.com", Permission::Master),
    ("Mario", "mario@email.com", Permission::Normal),
    ("Luigi", "luigi@email.com", Permission::Normal),
    ("Peach", "peach@email.com", Permission::Normal),
    ("Toad", "toad@email.com", Permission::Normal),
    ("Wario", "wario@email.com", Permission::Normal),
    ("Bowser", "bowser@email.com", Permission::Normal),
];

#[tokio::main]
async fn main() -> Result<()> {
    missive_server::init_tracing();

    let config = Config::from_env()?;
    let store = missive_server::connect_store(&config).await?;
    let auth = AuthProvider::new(&config.security);

    for (name, email, permission) in ACCOUNTS {
        if let Some(existing) = store.find_user_by_email(email).await? {
            println!("{:<6} {:<18} exists  token={}", name, email, existing.token);
            continue;
        }

        let user = account_service::register(
            store.as_ref(),
            &auth,
            Registration {
                name: name.to_string(),
                email: email.to_string(),
                credential: Some(DEMO_CREDENTIAL.to_string()),
                credential_confirmation: Some(DEMO_CREDENTIAL.to_string()),
            },
            *permission,
        )
        .await?;
        println!("{:<6} {:<18} created token={}", name, email, user.token);
    }

    Ok(())
}
