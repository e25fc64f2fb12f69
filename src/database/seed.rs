use crate::abilities::Role;
use crate::auth::{PasswordError, PasswordService};

use super::models::User;
use super::store::{StoreError, UserStore};

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One account per role, `<role>@example.com`, all sharing `password`
pub async fn seed_demo_users(store: &dyn UserStore, password: &str) -> Result<Vec<User>, SeedError> {
    let passwords = PasswordService::new();
    let mut created = Vec::with_capacity(Role::ALL.len());

    for role in Role::ALL {
        let email = format!("{}@example.com", role.as_str());
        if store.find_user_by_email(&email).await?.is_some() {
            continue;
        }

        let hash = passwords.hash_password(password)?;
        let name = format!("Demo {}", role.as_str());
        let user = store.create_user(User::new(name, email, hash, role)).await?;
        tracing::info!("Seeded {} account {}", role, user.email);
        created.push(user);
    }

    Ok(created)
}
