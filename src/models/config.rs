// NetShare - Tool Configuration
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Tool configuration model.
//!
//! Loaded from TOML; every field has a serde default so a minimal file (or
//! none at all) still yields a working configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::{Error, Result};
use super::intent::{PriorityIntent, SharingIntent};
use super::schema::SchemaVersion;
use super::validation;

/// Verification and settle-time settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyConfig {
    /// Subnet the shared link is expected to land in (CIDR), if pinned.
    /// When unset, any non-link-local address verifies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_subnet: Option<String>,

    /// Seconds to let the network stack settle after an adapter bounce.
    #[serde(default = "default_settle_wait")]
    pub settle_wait_secs: u32,

    /// Target to ping for the post-apply connectivity check.
    #[serde(default = "default_ping_target")]
    pub ping_target: String,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            expected_subnet: None,
            settle_wait_secs: default_settle_wait(),
            ping_target: default_ping_target(),
        }
    }
}

/// Background network service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service unit name to require before sharing actions.
    #[serde(default = "default_service_name")]
    pub name: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
        }
    }
}

fn default_settle_wait() -> u32 {
    3
}

fn default_ping_target() -> String {
    "8.8.8.8".to_string()
}

fn default_service_name() -> String {
    "NetworkManager".to_string()
}

/// Full tool configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Configuration schema version.
    #[serde(default)]
    pub schema_version: SchemaVersion,

    /// Which adapter shares to which.
    #[serde(default)]
    pub sharing: SharingIntent,

    /// Desired route metric per adapter.
    #[serde(default)]
    pub priority: PriorityIntent,

    /// Background service settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Verification settings.
    #[serde(default)]
    pub verify: VerifyConfig,

    /// Delete inactive duplicates of connection profile names.
    /// Duplicates are always reported; deletion is opt-in.
    #[serde(default)]
    pub prune_duplicate_connections: bool,
}

impl Config {
    /// Load and validate a configuration file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigReadFailed(format!("{}: {}", path.display(), e)))?;
        let config: Config = toml::from_str(&content)?;

        if !config.schema_version.is_compatible() {
            return Err(Error::SchemaMismatch {
                expected: SchemaVersion::current().to_string(),
                found: config.schema_version.to_string(),
            });
        }

        config.validate()?;
        Ok(config)
    }

    /// Save the configuration to a file.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .map_err(|e| Error::ConfigWriteFailed(format!("{}: {}", path.display(), e)))?;
        Ok(())
    }

    /// Validate field contents beyond what serde enforces.
    pub fn validate(&self) -> Result<()> {
        validation::validate_adapter_name(&self.sharing.public)?;
        validation::validate_adapter_name(&self.sharing.private)?;
        if self.sharing.public == self.sharing.private {
            return Err(Error::ValidationFailed(format!(
                "public and private adapter are both '{}'",
                self.sharing.public
            )));
        }

        for (name, metric) in &self.priority.0 {
            validation::validate_adapter_name(name)?;
            validation::validate_metric(*metric)?;
        }

        if let Some(subnet) = &self.verify.expected_subnet {
            validation::validate_cidr(subnet)?;
        }
        validation::validate_ip(&self.verify.ping_target)?;

        Ok(())
    }

    /// Apply command-line adapter overrides on top of the file contents.
    pub fn with_overrides(mut self, public: Option<String>, private: Option<String>) -> Self {
        if let Some(public) = public {
            self.sharing.public = public;
        }
        if let Some(private) = private {
            self.sharing.private = private;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sharing.public, "wlan0");
        assert_eq!(config.sharing.private, "usb0");
        assert_eq!(config.service.name, "NetworkManager");
    }

    #[test]
    fn test_minimal_toml_round_trip() {
        let toml_src = r#"
            [sharing]
            public = "eth0"
            private = "usb0"

            [priority]
            usb0 = 100
            wlan0 = 600
        "#;
        let config: Config = toml::from_str(toml_src).unwrap();
        assert_eq!(config.sharing.public, "eth0");
        assert_eq!(config.priority.metric_for("usb0"), Some(100));
        assert_eq!(config.verify.settle_wait_secs, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_same_adapter_both_roles_rejected() {
        let config = Config {
            sharing: SharingIntent::new("usb0", "usb0"),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_subnet_rejected() {
        let mut config = Config::default();
        config.verify.expected_subnet = Some("not-a-subnet".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let config = Config::default().with_overrides(Some("eth0".into()), None);
        assert_eq!(config.sharing.public, "eth0");
        assert_eq!(config.sharing.private, "usb0");
    }
}
