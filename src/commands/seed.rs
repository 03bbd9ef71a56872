//! Seed command - Creates the fixed development accounts.

use crate::config::Config;
use crate::domain::{NewUser, Password, Role};
use crate::errors::AppResult;
use crate::infra::{Database, UserRepository, UserStore};

/// `(name, email, password, role)` of every development account.
pub const SEED_ACCOUNTS: [(&str, &str, &str, Role); 5] = [
    ("Admin", "admin@example.com", "admin123", Role::Admin),
    ("Manager Kim", "mgr@example.com", "mgr123", Role::Manager),
    ("HR Lee", "hr@example.com", "hr123", Role::Hr),
    ("Finance Park", "fin@example.com", "fin123", Role::Finance),
    ("Leaver Choi", "leaver@example.com", "leaver123", Role::Leaver),
];

/// Execute the seed command
pub async fn execute(config: Config) -> AppResult<()> {
    let db = Database::connect(&config).await?;
    let users = UserStore::new(db.conn());

    let created = seed_accounts(&users).await?;
    tracing::info!(created, skipped = SEED_ACCOUNTS.len() - created, "Seeding finished");

    Ok(())
}

/// Create every missing development account. Returns how many were created.
///
/// The short demo passwords skip the length policy.
pub async fn seed_accounts(users: &dyn UserRepository) -> AppResult<usize> {
    let mut created = 0;

    for (name, email, password, role) in SEED_ACCOUNTS {
        if users.find_by_email(email).await?.is_some() {
            println!("User {} exists. Skipping.", email);
            continue;
        }

        users
            .create(NewUser {
                email: email.to_string(),
                name: name.to_string(),
                password_hash: Password::new_unchecked(password)?.into_string(),
                role,
            })
            .await?;
        println!("Created {} ({})", email, role);
        created += 1;
    }

    Ok(created)
}
