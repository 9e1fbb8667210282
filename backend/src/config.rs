//! Application configuration loaded via OrthoConfig.
//!
//! Values merge from CLI flags, `CIVICEYE_*` environment variables, and an
//! optional configuration file, in that order of precedence.

use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";
const DEFAULT_LEADERBOARD_PAGE_SIZE: u32 = 10;

/// Runtime settings for the backend process.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CIVICEYE")]
pub struct AppSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// Directory holding the JSON snapshot files.
    pub data_dir: Option<PathBuf>,
    /// File holding the session cookie signing key material.
    pub session_key_file: Option<PathBuf>,
    /// Allow an ephemeral, generated session key when the key file is
    /// missing. Always permitted in debug builds.
    #[ortho_config(default = false)]
    pub session_allow_ephemeral: bool,
    /// Set the `Secure` flag on the session cookie.
    #[ortho_config(default = true)]
    pub cookie_secure: bool,
    /// Leaderboard page size used when a request does not specify one.
    pub leaderboard_page_size: Option<u32>,
}

impl AppSettings {
    /// Bind address, falling back to the default.
    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// Snapshot directory, falling back to the default.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }

    /// Session key file, falling back to the default.
    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    /// Leaderboard page size, falling back to the default.
    pub fn leaderboard_page_size(&self) -> u32 {
        self.leaderboard_page_size
            .unwrap_or(DEFAULT_LEADERBOARD_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for configuration parsing.

    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    use super::*;

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("backend")]).expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env([
            ("CIVICEYE_BIND_ADDR", None::<String>),
            ("CIVICEYE_DATA_DIR", None::<String>),
            ("CIVICEYE_SESSION_KEY_FILE", None::<String>),
            ("CIVICEYE_SESSION_ALLOW_EPHEMERAL", None::<String>),
            ("CIVICEYE_COOKIE_SECURE", None::<String>),
            ("CIVICEYE_LEADERBOARD_PAGE_SIZE", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), DEFAULT_BIND_ADDR);
        assert_eq!(settings.data_dir(), PathBuf::from(DEFAULT_DATA_DIR));
        assert!(!settings.session_allow_ephemeral);
        assert!(settings.cookie_secure);
        assert_eq!(settings.leaderboard_page_size(), 10);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("CIVICEYE_BIND_ADDR", Some("127.0.0.1:9999".to_owned())),
            ("CIVICEYE_DATA_DIR", Some("/tmp/civiceye".to_owned())),
            ("CIVICEYE_SESSION_KEY_FILE", None::<String>),
            ("CIVICEYE_SESSION_ALLOW_EPHEMERAL", Some("true".to_owned())),
            ("CIVICEYE_COOKIE_SECURE", Some("false".to_owned())),
            ("CIVICEYE_LEADERBOARD_PAGE_SIZE", Some("25".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), "127.0.0.1:9999");
        assert_eq!(settings.data_dir(), PathBuf::from("/tmp/civiceye"));
        assert!(settings.session_allow_ephemeral);
        assert!(!settings.cookie_secure);
        assert_eq!(settings.leaderboard_page_size(), 25);
    }
}
