// Wizard configuration
//
// Layered: built-in defaults < optional TOML file < ONBOARDING_* environment variables.
// Read once at start-up; treated as read-only afterwards.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::wizard::validation::ValidationRules;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WizardConfig {
    pub base_url: String,
    /// Empty means "read it from the landing page's csrf-token meta tag".
    pub csrf_token: String,
    pub landing_path: String,
    pub key_marker: String,
    pub panel_unit: f64,
    pub panel_unit_suffix: String,
    pub initial_offset: f64,
    pub panel_count: usize,
    pub request_timeout_secs: Option<u64>,
    pub seconds_per_member: f64,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            csrf_token: String::new(),
            landing_path: "/".to_string(),
            key_marker: "-us".to_string(),
            panel_unit: 100.0,
            panel_unit_suffix: "vw".to_string(),
            initial_offset: 0.0,
            panel_count: 5,
            request_timeout_secs: None,
            seconds_per_member: 0.24,
        }
    }
}

impl WizardConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = WizardConfig::default();
        let mut builder = config::Config::builder()
            .set_default("base_url", defaults.base_url)?
            .set_default("csrf_token", defaults.csrf_token)?
            .set_default("landing_path", defaults.landing_path)?
            .set_default("key_marker", defaults.key_marker)?
            .set_default("panel_unit", defaults.panel_unit)?
            .set_default("panel_unit_suffix", defaults.panel_unit_suffix)?
            .set_default("initial_offset", defaults.initial_offset)?
            .set_default("panel_count", defaults.panel_count as u64)?
            .set_default("seconds_per_member", defaults.seconds_per_member)?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        builder = builder.add_source(config::Environment::with_prefix("ONBOARDING"));

        let cfg: WizardConfig = builder
            .build()
            .context("Failed to read onboarding configuration")?
            .try_deserialize()
            .context("Invalid onboarding configuration")?;

        if cfg.key_marker.trim().is_empty() {
            return Err(anyhow::anyhow!("key_marker must not be empty"));
        }
        if cfg.panel_count == 0 {
            return Err(anyhow::anyhow!("panel_count must be at least 1"));
        }
        Ok(cfg)
    }

    pub fn rules(&self) -> ValidationRules {
        ValidationRules {
            key_marker: self.key_marker.clone(),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = WizardConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(cfg.key_marker, "-us");
        assert_eq!(cfg.panel_unit, 100.0);
        assert_eq!(cfg.panel_count, 5);
        assert_eq!(cfg.request_timeout(), None);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("onboarding.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            "base_url = \"https://emailbenchmarking.com\"\npanel_unit = 50.0\nrequest_timeout_secs = 30"
        )
        .unwrap();

        let cfg = WizardConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.base_url, "https://emailbenchmarking.com");
        assert_eq!(cfg.panel_unit, 50.0);
        assert_eq!(cfg.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(cfg.panel_unit_suffix, "vw");
    }

    #[test]
    fn empty_marker_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("onboarding.toml");
        std::fs::write(&path, "key_marker = \"\"\n").unwrap();
        assert!(WizardConfig::load(Some(&path)).is_err());
    }
}
