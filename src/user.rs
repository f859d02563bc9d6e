//! Caller identity management.
//!
//! The core never authenticates anyone; it consumes an opaque user id
//! issued elsewhere. Resolution order:
//! 1) CLI --user (explicit)
//! 2) MOMENTUM_USER environment variable
//! 3) Persisted value in `<data-dir>/user`
//! 4) Config default (user.default)
//!
//! No identity from any source is `Unauthorized`, never a silent
//! fallback.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{Error, Result};

const USER_FILENAME: &str = "user";

/// Environment variable carrying the caller identity
pub const USER_ENV: &str = "MOMENTUM_USER";

/// Resolve the current user id using CLI, environment, persisted value,
/// and config, in that order.
pub fn resolve_user(data_dir: &Path, cli_user: Option<&str>, config: &Config) -> Result<String> {
    if let Some(user) = non_empty(cli_user) {
        return Ok(user.to_string());
    }

    if let Ok(env_user) = std::env::var(USER_ENV) {
        if let Some(user) = non_empty(Some(env_user.as_str())) {
            return Ok(user.to_string());
        }
    }

    if let Some(user) = load_persisted_user(data_dir)? {
        return Ok(user);
    }

    if let Some(user) = non_empty(config.user.default.as_deref()) {
        return Ok(user.to_string());
    }

    Err(Error::Unauthorized)
}

/// Persist the user identity in `<data-dir>/user`.
pub fn persist_user(data_dir: &Path, user: &str) -> Result<()> {
    let user = non_empty(Some(user))
        .ok_or_else(|| Error::InvalidInput("user id cannot be empty".to_string()))?;

    std::fs::create_dir_all(data_dir)?;
    let path = user_path(data_dir);
    std::fs::write(path, format!("{user}\n"))?;
    Ok(())
}

/// Load the user identity from `<data-dir>/user`, if present.
pub fn load_persisted_user(data_dir: &Path) -> Result<Option<String>> {
    let path = user_path(data_dir);
    if !path.exists() {
        return Ok(None);
    }

    let raw = std::fs::read_to_string(path)?;
    let user = raw.trim();
    if user.is_empty() {
        return Ok(None);
    }

    Ok(Some(user.to_string()))
}

fn user_path(data_dir: &Path) -> PathBuf {
    data_dir.join(USER_FILENAME)
}

fn non_empty(input: Option<&str>) -> Option<&str> {
    input.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn cli_flag_wins() {
        let temp = TempDir::new().unwrap();
        persist_user(temp.path(), "persisted").unwrap();

        let user = resolve_user(temp.path(), Some("flag"), &Config::default()).unwrap();
        assert_eq!(user, "flag");
    }

    #[test]
    fn persisted_value_round_trips() {
        let temp = TempDir::new().unwrap();
        assert!(load_persisted_user(temp.path()).unwrap().is_none());

        persist_user(temp.path(), "alex").unwrap();
        assert_eq!(
            load_persisted_user(temp.path()).unwrap().as_deref(),
            Some("alex")
        );

        let user = resolve_user(temp.path(), None, &Config::default()).unwrap();
        assert_eq!(user, "alex");
    }

    #[test]
    fn empty_user_cannot_be_persisted() {
        let temp = TempDir::new().unwrap();
        assert!(persist_user(temp.path(), "   ").is_err());
    }

    #[test]
    fn missing_identity_is_unauthorized() {
        let temp = TempDir::new().unwrap();
        let result = resolve_user(temp.path(), None, &Config::default());
        assert!(matches!(result, Err(Error::Unauthorized)));
    }

    #[test]
    fn config_default_is_the_last_resort() {
        let temp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.user.default = Some("from-config".to_string());

        let user = resolve_user(temp.path(), None, &config).unwrap();
        assert_eq!(user, "from-config");
    }
}
