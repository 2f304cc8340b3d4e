//! Bootstrap — first-start checks.
//!
//! gasworkd refuses to start without a root password hash, a JWT secret,
//! and a data directory; an operator-facing service must never come up
//! half-configured.

use crate::config::ServerConfig;

/// The well-known role for the workshop superadmin.
pub const ROOT_ROLE: &str = "workshop:root";

/// Verify server configuration is ready for production use.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.root.password_hash.is_empty() {
        anyhow::bail!(
            "No root password hash found in configuration.\n\
             Set [root].password_hash (argon2id) before starting the server."
        );
    }
    if config.jwt.secret.is_empty() {
        anyhow::bail!("JWT secret is empty in configuration.");
    }
    if config.storage.data_dir.is_empty() {
        anyhow::bail!("Storage data_dir is empty in configuration.");
    }
    Ok(())
}

/// Verify a root login attempt against the stored argon2id hash.
pub fn verify_root_password(password: &str, hash: &str) -> bool {
    use argon2::Argon2;
    use password_hash::PasswordHash;
    use password_hash::PasswordVerifier;

    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(_) => false,
    }
}
