use anyhow::{Context, Result};
use tracing::info;

use crate::core::config::BootstrapConfig;
use crate::models::user::NewUser;
use crate::stores::UserStore;
use crate::utils::auth::hash_password;

/// Create the configured administrator on first boot.
///
/// Does nothing once any user exists, so changing the bootstrap section later
/// never overwrites real accounts. Returns the new uid when one was created.
pub fn bootstrap_admin(store: &dyn UserStore, bootstrap: Option<&BootstrapConfig>) -> Result<Option<i64>> {
    let Some(bootstrap) = bootstrap else {
        return Ok(None);
    };

    let existing = store.count_users().context("Failed to count users")?;
    if existing > 0 {
        info!(users = existing, "Users present, skipping admin bootstrap");
        return Ok(None);
    }

    let uid = store
        .insert_user(&NewUser {
            username: bootstrap.admin_username.clone(),
            password_hash: hash_password(&bootstrap.admin_password),
            admin: true,
            password_editable: true,
            default_cid: 1,
            timezone: None,
            language: None,
        })
        .context("Failed to create bootstrap administrator")?;

    info!(uid = uid, username = %bootstrap.admin_username, "Bootstrap administrator created");

    Ok(Some(uid))
}
