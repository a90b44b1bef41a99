//! Layered configuration.
//!
//! Sources, later ones overriding earlier ones:
//!
//! 1. Built-in defaults ([`Config::default`]).
//! 2. A TOML file: the one given explicitly, or `shelf.toml` in the platform
//!    configuration directory if it exists.
//! 3. Environment variables prefixed with `SHELF_`. Nested keys are separated
//!    by a double underscore, e.g. `SHELF_OPENLIBRARY__TIMEOUT_SECS=30`.
//!
//! ```toml
//! database = "/var/lib/shelf/catalog.sqlite3"
//!
//! [openlibrary]
//! origin = "https://openlibrary.org"
//! user_agent = "shelf/0.1 (me@example.com)"
//! timeout_secs = 30
//! ```

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "shelf.toml";
pub const DATABASE_FILE_NAME: &str = "catalog.sqlite3";
pub const ENV_PREFIX: &str = "SHELF_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Location of the SQLite catalog.
    pub database: PathBuf,
    pub openlibrary: OpenLibraryConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenLibraryConfig {
    /// Scheme and host of the lookup service, without a trailing path.
    pub origin: String,
    /// Open Library asks API users to identify themselves.
    pub user_agent: String,
    /// Whole-request timeout. No timeout when unset.
    pub timeout_secs: Option<u64>,
}
impl OpenLibraryConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
impl Default for OpenLibraryConfig {
    fn default() -> Self {
        Self {
            origin: shelf_openlibrary::ORIGIN.to_string(),
            user_agent: shelf_openlibrary::USER_AGENT.to_string(),
            timeout_secs: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let database = project_dirs()
            .map(|dirs| dirs.data_dir().join(DATABASE_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(DATABASE_FILE_NAME));
        Self { database, openlibrary: OpenLibraryConfig::default() }
    }
}

impl Config {
    /// Load the configuration.
    ///
    /// An explicit `file` must exist. Without one, the platform default file
    /// is used if present and silently skipped otherwise.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let file = match file {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => default_config_file().filter(|path| path.is_file()),
        };
        match &file {
            Some(path) => tracing::debug!(path = %path.display(), "Loading configuration file"),
            None => tracing::debug!("No configuration file; using defaults and environment"),
        }
        Self::extract(&Self::figment(file.as_deref()))
    }

    /// The provider stack behind [`load`](Self::load), without any
    /// filesystem checks.
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = file {
            figment = figment.merge(Toml::file_exact(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn extract(figment: &Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.database.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Invalid("database"));
        }
        let origin = &self.openlibrary.origin;
        if !(origin.starts_with("https://") || origin.starts_with("http://")) {
            exn::bail!(ErrorKind::Invalid("openlibrary.origin"));
        }
        if self.openlibrary.user_agent.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("openlibrary.user_agent"));
        }
        if self.openlibrary.timeout_secs == Some(0) {
            exn::bail!(ErrorKind::Invalid("openlibrary.timeout_secs"));
        }
        Ok(())
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "shelf")
}

/// `shelf.toml` in the platform configuration directory, whether or not it
/// exists.
pub fn default_config_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.database.ends_with(DATABASE_FILE_NAME));
        assert_eq!(config.openlibrary.origin, "https://openlibrary.org");
        assert!(config.openlibrary.user_agent.starts_with("shelf/"));
        assert_eq!(config.openlibrary.timeout(), None);
    }

    #[test]
    fn test_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "shelf.toml",
                r#"
                    database = "books.sqlite3"

                    [openlibrary]
                    timeout_secs = 30
                "#,
            )?;
            let config = Config::load(Some(Path::new("shelf.toml"))).unwrap();
            assert_eq!(config.database, PathBuf::from("books.sqlite3"));
            assert_eq!(config.openlibrary.timeout(), Some(Duration::from_secs(30)));
            // Untouched keys keep their defaults.
            assert_eq!(config.openlibrary.origin, shelf_openlibrary::ORIGIN);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("shelf.toml", "database = \"from-file.sqlite3\"")?;
            jail.set_env("SHELF_DATABASE", "from-env.sqlite3");
            jail.set_env("SHELF_OPENLIBRARY__ORIGIN", "http://localhost:8080");
            let config = Config::load(Some(Path::new("shelf.toml"))).unwrap();
            assert_eq!(config.database, PathBuf::from("from-env.sqlite3"));
            assert_eq!(config.openlibrary.origin, "http://localhost:8080");
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let err = Config::load(Some(&path)).unwrap_err();
        assert_eq!(*err, ErrorKind::NotFound(path));
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shelf.toml");
        std::fs::write(&path, "database = [1, 2").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert_eq!(*err, ErrorKind::Load);
    }

    #[rstest]
    #[case("database = \"\"", "database")]
    #[case("[openlibrary]\norigin = \"openlibrary.org\"", "openlibrary.origin")]
    #[case("[openlibrary]\nuser_agent = \"  \"", "openlibrary.user_agent")]
    #[case("[openlibrary]\ntimeout_secs = 0", "openlibrary.timeout_secs")]
    fn test_invalid_values(#[case] toml: &str, #[case] key: &str) {
        let figment = Figment::from(Serialized::defaults(Config::default())).merge(Toml::string(toml));
        let err = Config::extract(&figment).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid(k) if *k == key));
    }
}
