//! Runtime configuration for logging and debug output.
//!
//! Precedence (lowest to highest):
//! 1. Default values
//! 2. JSON config file
//! 3. Environment variables
//!
//! # Environment Variables
//! - `SWARM_DEBUG`: Enable debug printing of streamed deltas
//! - `SWARM_LOG_LEVEL`: Override log level / filter directive
//! - `SWARM_LOG_JSON`: Enable JSON log output

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::Path;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    /// Print every streamed delta through the debug printer.
    pub debug: bool,

    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset (e.g. "info", "swarm_core=debug").
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
        }
    }
}

/// Load configuration from an optional JSON file, then apply env overrides.
///
/// A missing file yields defaults.
pub fn load(path: &Path) -> Result<SwarmConfig> {
    let mut cfg = match std::fs::read_to_string(path) {
        Ok(text) => parse_settings(&text)
            .with_context(|| format!("bad swarm config {}", path.display()))?,
        Err(e) if e.kind() == ErrorKind::NotFound => SwarmConfig::default(),
        Err(e) => {
            return Err(e).with_context(|| format!("cannot read swarm config {}", path.display()));
        }
    };
    apply_overrides(&mut cfg, |name| std::env::var(name).ok());
    Ok(cfg)
}

fn parse_settings(text: &str) -> Result<SwarmConfig> {
    let settings: Map<String, Value> =
        serde_json::from_str(text).context("settings must be a JSON object")?;
    serde_json::from_value(Value::Object(settings)).context("unrecognized setting value")
}

/// Apply `SWARM_*` overrides; blank values are ignored.
fn apply_overrides(cfg: &mut SwarmConfig, lookup: impl Fn(&str) -> Option<String>) {
    let var = |name: &str| {
        lookup(name)
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
    };
    if let Some(v) = var("SWARM_DEBUG") {
        cfg.debug = truthy(&v);
    }
    if let Some(v) = var("SWARM_LOG_LEVEL") {
        cfg.logging.level = v;
    }
    if let Some(v) = var("SWARM_LOG_JSON") {
        cfg.logging.json = truthy(&v);
    }
}

fn truthy(v: &str) -> bool {
    matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    const VARS: [&str; 3] = ["SWARM_DEBUG", "SWARM_LOG_LEVEL", "SWARM_LOG_JSON"];

    fn clear_env() {
        for v in VARS {
            // SAFETY: tests touching the environment are serialized.
            unsafe { std::env::remove_var(v) };
        }
    }

    #[test]
    #[serial]
    fn missing_file_yields_defaults() {
        clear_env();
        let dir = TempDir::new().unwrap();
        let cfg = load(&dir.path().join("swarm.json")).unwrap();
        assert_eq!(cfg, SwarmConfig::default());
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    #[serial]
    fn partial_file_keeps_other_defaults() {
        clear_env();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("swarm.json");
        std::fs::write(&path, r#"{"logging": {"json": true}}"#).unwrap();
        let cfg = load(&path).unwrap();
        assert!(cfg.logging.json);
        assert_eq!(cfg.logging.level, "info");
        assert!(!cfg.debug);
    }

    #[test]
    #[serial]
    fn env_overrides_file() {
        clear_env();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("swarm.json");
        std::fs::write(&path, r#"{"debug": false, "logging": {"level": "warn"}}"#).unwrap();
        // SAFETY: serialized test.
        unsafe {
            std::env::set_var("SWARM_DEBUG", "yes");
            std::env::set_var("SWARM_LOG_LEVEL", " swarm_core=trace ");
        }
        let cfg = load(&path).unwrap();
        clear_env();
        assert!(cfg.debug);
        assert_eq!(cfg.logging.level, "swarm_core=trace");
    }

    #[test]
    #[serial]
    fn non_object_root_is_rejected() {
        clear_env();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("swarm.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        let err = load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("settings must be a JSON object"));
    }

    #[test]
    #[serial]
    fn wrong_value_type_is_rejected() {
        clear_env();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("swarm.json");
        std::fs::write(&path, r#"{"debug": "sometimes"}"#).unwrap();
        let err = load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("unrecognized setting value"));
    }

    #[test]
    fn blank_and_falsy_overrides() {
        let mut cfg = SwarmConfig {
            debug: true,
            ..SwarmConfig::default()
        };
        apply_overrides(&mut cfg, |name| match name {
            "SWARM_DEBUG" => Some("off".into()),
            "SWARM_LOG_LEVEL" => Some("   ".into()),
            "SWARM_LOG_JSON" => Some("TRUE".into()),
            _ => None,
        });
        assert!(!cfg.debug);
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.logging.json);
    }
}
