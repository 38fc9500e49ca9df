//! CLI configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! `ferrum-qb.{toml,yaml,json}` file, then `FERRUM_QB_*` environment
//! variables using `__` between section and key (for example
//! `FERRUM_QB_SERVER__BASE_URL`). `.env` is read first.

use ferrum_fhir_client::ClientConfig;
use ferrum_questionnaire::PublishOptions;
use ferrum_session::AutosaveOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub terminology: TerminologyConfig,
    pub publish: PublishConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
    pub bearer_token: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://hapi.fhir.org/baseR4".to_string(),
            bearer_token: None,
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminologyConfig {
    pub base_url: String,
    pub cache_size: usize,
}

impl Default for TerminologyConfig {
    fn default() -> Self {
        Self {
            base_url: "https://tx.fhir.org/r4".to_string(),
            cache_size: 256,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    pub ig_root: String,
    pub profile: String,
    pub meta_source: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        let defaults = PublishOptions::default();
        Self {
            ig_root: defaults.ig_root,
            profile: defaults.profile,
            meta_source: defaults.meta_source,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub state_dir: PathBuf,
    pub debounce_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let state_dir = dirs::data_local_dir()
            .map(|d| d.join("ferrum-qb"))
            .unwrap_or_else(|| PathBuf::from(".ferrum-qb"));
        Self {
            state_dir,
            debounce_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
    pub file_enabled: bool,
    pub file_directory: PathBuf,
    pub file_prefix: String,
    /// `daily`, `hourly`, `minutely` or `never`
    pub file_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
            file_enabled: false,
            file_directory: PathBuf::from("logs"),
            file_prefix: "ferrum-qb".to_string(),
            file_rotation: "daily".to_string(),
        }
    }
}

impl Config {
    /// Load configuration, reading `path` instead of `./ferrum-qb.*` when given
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let _ = dotenvy::dotenv();

        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Config::default())?);
        builder = match path {
            Some(path) => builder.add_source(config::File::from(path)),
            None => builder.add_source(config::File::with_name("ferrum-qb").required(false)),
        };
        builder
            .add_source(
                config::Environment::with_prefix("FERRUM_QB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        check_url("server.base_url", &self.server.base_url)?;
        check_url("terminology.base_url", &self.terminology.base_url)?;
        check_url("publish.ig_root", &self.publish.ig_root)?;
        if self.server.timeout_seconds == 0 {
            return Err("server.timeout_seconds must be greater than 0".to_string());
        }
        if self.terminology.cache_size == 0 {
            return Err("terminology.cache_size must be greater than 0".to_string());
        }
        if !matches!(
            self.logging.file_rotation.as_str(),
            "daily" | "hourly" | "minutely" | "never"
        ) {
            return Err(format!(
                "logging.file_rotation must be daily, hourly, minutely or never (got {:?})",
                self.logging.file_rotation
            ));
        }
        Ok(())
    }

    pub fn server_client(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.server.base_url.clone(),
            bearer_token: self.server.bearer_token.clone(),
            timeout: Duration::from_secs(self.server.timeout_seconds),
        }
    }

    pub fn terminology_client(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.server.timeout_seconds),
            ..ClientConfig::new(self.terminology.base_url.clone())
        }
    }

    pub fn publish_options(&self) -> PublishOptions {
        PublishOptions {
            profile: self.publish.profile.clone(),
            meta_source: self.publish.meta_source.clone(),
            ig_root: self.publish.ig_root.clone(),
        }
    }

    pub fn autosave_options(&self) -> AutosaveOptions {
        AutosaveOptions {
            debounce: Duration::from_millis(self.session.debounce_ms),
        }
    }
}

fn check_url(field: &str, value: &str) -> Result<(), String> {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() && !host.starts_with('/') => Ok(()),
        _ => Err(format!("{} must be an http(s) URL (got {:?})", field, value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.autosave_options(), AutosaveOptions::default());
        assert_eq!(config.publish_options(), PublishOptions::default());
    }

    #[test]
    fn rejects_zero_timeout_and_bad_urls() {
        let mut config = Config::default();
        config.server.timeout_seconds = 0;
        assert!(config.validate().unwrap_err().contains("timeout"));

        let mut config = Config::default();
        config.terminology.base_url = "tx.fhir.org".to_string();
        assert!(config.validate().unwrap_err().contains("terminology.base_url"));

        let mut config = Config::default();
        config.publish.ig_root = "https:///missing-host".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ferrum-qb.toml");
        std::fs::write(
            &path,
            "[server]\nbase_url = \"http://localhost:8080/fhir\"\n\n[session]\ndebounce_ms = 50\n",
        )
        .unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(config.server.base_url, "http://localhost:8080/fhir");
        assert_eq!(config.server.timeout_seconds, 30);
        assert_eq!(config.session.debounce_ms, 50);
        assert_eq!(config.server_client().base_url, "http://localhost:8080/fhir");
    }
}
