//! Central module for application-wide configuration settings.
//!
//! Sources, lowest precedence first:
//! 1. Built-in defaults
//! 2. Optional TOML file (`--config` / `ISUUMO_CONFIG`)
//! 3. Environment variables (`ISUUMO__SECTION__KEY`)
//! 4. CLI overrides applied by `main`

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{AppError, AppResult};

const ENV_PREFIX: &str = "ISUUMO";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub fixtures: FixtureSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Listen address, `host:port`.
    pub bind: String,
    /// Upper bound for multipart CSV uploads, in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:1323".to_string(),
            max_upload_bytes: 64 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// SQLite file, or `:memory:`.
    pub path: PathBuf,
    /// Directory of `*.sql` seed files executed by `/initialize`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("isuumo.db"),
            data_dir: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureSettings {
    /// Directory holding `chair_condition.json` / `estate_condition.json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Build the layered configuration. A missing `path` is not an error; a
    /// path that does not exist is.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);
        if let Some(path) = path {
            if !path.exists() {
                return Err(AppError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            debug!(path = %path.display(), "loading config file");
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        );

        let cfg: AppConfig = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> AppResult<()> {
        self.bind_addr()?;
        if self.server.max_upload_bytes == 0 {
            return Err(AppError::Config(
                "server.max_upload_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> AppResult<SocketAddr> {
        self.server.bind.parse().map_err(|e| {
            AppError::Config(format!("invalid server.bind '{}': {e}", self.server.bind))
        })
    }

    /// Configuration used by tests: in-memory database, no fixtures.
    pub fn in_memory() -> Self {
        Self {
            database: DatabaseSettings {
                path: PathBuf::from(":memory:"),
                data_dir: None,
            },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::io::Write;

    // load() reads the process environment
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    struct EnvVars(&'static [(&'static str, &'static str)]);

    impl EnvVars {
        fn set(vars: &'static [(&'static str, &'static str)]) -> Self {
            for (key, value) in vars {
                std::env::set_var(key, value);
            }
            Self(vars)
        }
    }

    impl Drop for EnvVars {
        fn drop(&mut self) {
            for (key, _) in self.0 {
                std::env::remove_var(key);
            }
        }
    }

    fn toml_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "{contents}").unwrap();
        file
    }

    #[test]
    fn defaults_are_valid() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.bind_addr().unwrap().port(), 1323);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn file_overrides_defaults() {
        let _lock = ENV_LOCK.lock();
        let file = toml_file(
            "[server]\nbind = \"127.0.0.1:9000\"\n\n[database]\npath = \"/tmp/x.db\"\n\n[logging]\njson = true",
        );

        let cfg = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(cfg.server.bind, "127.0.0.1:9000");
        assert_eq!(cfg.database.path, PathBuf::from("/tmp/x.db"));
        assert!(cfg.logging.json);
        // untouched keys keep their defaults
        assert_eq!(cfg.server.max_upload_bytes, 64 * 1024 * 1024);
    }

    #[test]
    fn environment_overrides_file_and_defaults() {
        let _lock = ENV_LOCK.lock();
        let file = toml_file("[server]\nmax_upload_bytes = 4096\n\n[logging]\njson = false");
        let _vars = EnvVars::set(&[
            ("ISUUMO__SERVER__MAX_UPLOAD_BYTES", "1234"),
            ("ISUUMO__LOGGING__JSON", "true"),
        ]);

        let cfg = AppConfig::load(None).unwrap();
        assert_eq!(cfg.server.max_upload_bytes, 1234);
        assert!(cfg.logging.json);

        let cfg = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(cfg.server.max_upload_bytes, 1234);
        assert!(cfg.logging.json);
        assert_eq!(cfg.server.bind, "0.0.0.0:1323");
    }

    #[test]
    fn missing_file_is_rejected() {
        let err = AppConfig::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn invalid_bind_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.server.bind = "not-an-address".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_upload_limit_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.server.max_upload_bytes = 0;
        assert!(cfg.validate().is_err());
    }
}
