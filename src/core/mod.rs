// src/core/mod.rs
//! Configuration and the HTTP side of the scoring service.

pub mod config_manager;
pub mod service_client;

pub use config_manager::{AnimationConfig, ConfigManager, LoadedConfig, ScannerConfig};
pub use service_client::{ScoringBackend, ServiceClient};
