// src/core/config_manager.rs
//! Scanner configuration: optional `config.yaml` with per-environment
//! sections, then environment variable overrides.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::contract::ContractVariant;

const DEFAULT_CONFIG_FILE: &str = "config.yaml";
const DEFAULT_ENDPOINT: &str = "http://localhost:5000/analyze";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub endpoint: String,
    pub contract: ContractVariant,
    /// `0` disables the request timeout.
    pub timeout_seconds: u64,
    pub animation: AnimationConfig,
    pub log_file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub status_text: String,
    pub cadence_ms: u64,
    pub hold_ms: u64,
    pub cap_ms: u64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            contract: ContractVariant::default(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            animation: AnimationConfig::default(),
            log_file: PathBuf::from("/tmp/ats-scanner.log"),
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            status_text: "Analyzing your resume...".to_string(),
            cadence_ms: 100,
            hold_ms: 1000,
            cap_ms: 5000,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    local: Option<ScannerConfig>,
    production: Option<ScannerConfig>,
}

impl ScannerConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.timeout_seconds > 0).then(|| Duration::from_secs(self.timeout_seconds))
    }

    /// Parse a config file body and pick the section for `environment`.
    /// A missing section falls back to the defaults.
    pub fn from_yaml_str(content: &str, environment: &str) -> Result<Self> {
        let config_file: ConfigFile =
            serde_yaml::from_str(content).context("Failed to parse scanner configuration")?;

        let section = match environment {
            "production" => config_file.production,
            _ => config_file.local,
        };

        Ok(section.unwrap_or_default())
    }

    /// Apply `SCANNER_*` overrides. `lookup` is `std::env::var` in production.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup("SCANNER_ENDPOINT") {
            self.endpoint = endpoint;
        }
        if let Some(contract) = lookup("SCANNER_CONTRACT") {
            self.contract = contract.parse().context("Invalid SCANNER_CONTRACT")?;
        }
        if let Some(timeout) = lookup("SCANNER_TIMEOUT_SECS") {
            self.timeout_seconds = timeout
                .trim()
                .parse()
                .context("SCANNER_TIMEOUT_SECS must be a whole number of seconds")?;
        }
        if let Some(log_file) = lookup("SCANNER_LOG_FILE") {
            self.log_file = PathBuf::from(log_file);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.endpoint)
            .with_context(|| format!("Invalid scoring endpoint: {}", self.endpoint))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("Scoring endpoint must be http or https: {}", self.endpoint);
        }
        if self.animation.cadence_ms == 0 {
            anyhow::bail!("animation.cadence_ms must be greater than zero");
        }
        Ok(())
    }
}

/// Result of `ConfigManager::load`, kept together with where it came from
/// so it can be logged once tracing is up.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ScannerConfig,
    pub environment: String,
    /// `None` when no file was found and built-in defaults were used.
    pub source: Option<PathBuf>,
}

impl LoadedConfig {
    pub fn log_summary(&self) {
        match &self.source {
            Some(path) => info!(
                "Loaded scanner configuration for environment {} from {}",
                self.environment,
                path.display()
            ),
            None => info!(
                "No {} found for environment {}, using built-in defaults",
                DEFAULT_CONFIG_FILE, self.environment
            ),
        }
        info!(
            "Scoring endpoint: {} (contract: {})",
            self.config.endpoint, self.config.contract
        );
    }
}

pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration for the current environment. `explicit_path` must
    /// exist when given; otherwise `config.yaml` in the working directory is
    /// used if present. Nothing is logged here; call
    /// `LoadedConfig::log_summary` after the subscriber is installed.
    pub fn load(explicit_path: Option<&Path>) -> Result<LoadedConfig> {
        dotenvy::dotenv().ok();

        let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
        let path = match explicit_path {
            Some(path) => Some(path),
            None => default_path.exists().then_some(default_path.as_path()),
        };

        Self::resolve(path, Self::get_environment(), |key| std::env::var(key).ok())
    }

    fn resolve<F>(path: Option<&Path>, environment: String, lookup: F) -> Result<LoadedConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => Self::load_file(path, &environment)?,
            None => ScannerConfig::default(),
        };

        config.apply_overrides(lookup)?;
        config.validate()?;

        Ok(LoadedConfig {
            config,
            environment,
            source: path.map(Path::to_path_buf),
        })
    }

    fn get_environment() -> String {
        std::env::var("SCANNER_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .or_else(|_| std::env::var("ENV"))
            .unwrap_or_else(|_| "local".to_string())
    }

    fn load_file(path: &Path, environment: &str) -> Result<ScannerConfig> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        ScannerConfig::from_yaml_str(&content, environment)
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SAMPLE: &str = r#"
local:
  endpoint: http://localhost:5000/analyze
  contract: keyword_score
  timeout_seconds: 0
production:
  endpoint: https://scanner.example.com/analyze
  animation:
    hold_ms: 500
"#;

    #[test]
    fn test_local_section() {
        let config = ScannerConfig::from_yaml_str(SAMPLE, "local").unwrap();
        assert_eq!(config.contract, ContractVariant::KeywordScore);
        assert_eq!(config.request_timeout(), None);
        assert_eq!(config.animation, AnimationConfig::default());
    }

    #[test]
    fn test_production_section_keeps_unset_defaults() {
        let config = ScannerConfig::from_yaml_str(SAMPLE, "production").unwrap();
        assert_eq!(config.endpoint, "https://scanner.example.com/analyze");
        assert_eq!(config.contract, ContractVariant::JobDescription);
        assert_eq!(config.animation.hold_ms, 500);
        assert_eq!(config.animation.cadence_ms, 100);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_missing_section_uses_defaults() {
        let config = ScannerConfig::from_yaml_str("production: {}\n", "local").unwrap();
        assert_eq!(config, ScannerConfig::default());
    }

    #[test]
    fn test_unknown_contract_rejected() {
        let yaml = "local:\n  contract: bare_score\n";
        assert!(ScannerConfig::from_yaml_str(yaml, "local").is_err());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("SCANNER_ENDPOINT", "https://other.example.com/score"),
            ("SCANNER_CONTRACT", "keyword_breakdown"),
            ("SCANNER_TIMEOUT_SECS", "30"),
        ]
        .into_iter()
        .collect();

        let mut config = ScannerConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.endpoint, "https://other.example.com/score");
        assert_eq!(config.contract, ContractVariant::KeywordBreakdown);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_bad_override_rejected() {
        let mut config = ScannerConfig::default();
        let result = config.apply_overrides(|key| {
            (key == "SCANNER_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_validate() {
        assert!(ScannerConfig::default().validate().is_ok());

        let mut config = ScannerConfig::default();
        config.endpoint = "ftp://localhost/analyze".to_string();
        assert!(config.validate().is_err());

        let mut config = ScannerConfig::default();
        config.endpoint = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = ScannerConfig::default();
        config.animation.cadence_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scanner.yaml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = ConfigManager::load_file(&path, "production").unwrap();
        assert_eq!(config.endpoint, "https://scanner.example.com/analyze");
        assert!(ConfigManager::load_file(&dir.path().join("missing.yaml"), "local").is_err());
    }

    #[test]
    fn test_resolve_records_source_and_environment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scanner.yaml");
        std::fs::write(&path, SAMPLE).unwrap();

        let loaded =
            ConfigManager::resolve(Some(path.as_path()), "production".to_string(), |_| None)
                .unwrap();
        assert_eq!(loaded.environment, "production");
        assert_eq!(loaded.source.as_deref(), Some(path.as_path()));
        assert_eq!(loaded.config.endpoint, "https://scanner.example.com/analyze");
    }

    #[test]
    fn test_resolve_without_file_uses_defaults_and_overrides() {
        let loaded = ConfigManager::resolve(None, "local".to_string(), |key| {
            (key == "SCANNER_LOG_FILE").then(|| "/tmp/scan-test.log".to_string())
        })
        .unwrap();

        assert!(loaded.source.is_none());
        assert_eq!(loaded.config.log_file, PathBuf::from("/tmp/scan-test.log"));
        assert_eq!(loaded.config.endpoint, ScannerConfig::default().endpoint);
    }
}
