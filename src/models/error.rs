// NetShare - Error Types
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Shared error types for the reconciler.

use thiserror::Error;

/// Result type alias for reconciler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for reconciler operations.
#[derive(Debug, Error)]
pub enum Error {
    // ========================================
    // Planning Errors
    // ========================================
    #[error("Adapter not found in inventory: {name}")]
    UnresolvedAdapter { name: String },

    #[error("No usable connection profile for adapter {adapter}")]
    ConnectionResolution { adapter: String },

    // ========================================
    // Apply Errors
    // ========================================
    #[error("Action failed: {action} - {reason}")]
    ActionFailed { action: String, reason: String },

    #[error("Service {service} unavailable: {reason}")]
    ServiceUnavailable { service: String, reason: String },

    #[error("Verification mismatch on {adapter}: {detail}")]
    VerificationMismatch { adapter: String, detail: String },

    // ========================================
    // Inventory Errors
    // ========================================
    #[error("Inventory query failed: {0}")]
    Inventory(String),

    #[error("Command failed: {command} - {reason}")]
    Command { command: String, reason: String },

    #[error("Command not available: {0}")]
    CommandUnavailable(String),

    // ========================================
    // Validation Errors
    // ========================================
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Invalid IP address: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid adapter name: {0}")]
    InvalidAdapterName(String),

    #[error("Invalid route metric: {0}")]
    InvalidMetric(String),

    // ========================================
    // Configuration Errors
    // ========================================
    #[error("Failed to read configuration: {0}")]
    ConfigReadFailed(String),

    #[error("Failed to write configuration: {0}")]
    ConfigWriteFailed(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParseFailed(String),

    #[error("Configuration schema version mismatch: expected {expected}, found {found}")]
    SchemaMismatch { expected: String, found: String },

    // ========================================
    // System Errors
    // ========================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new action failed error.
    pub fn action_failed(action: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ActionFailed {
            action: action.into(),
            reason: reason.into(),
        }
    }

    /// Create a new command failed error.
    pub fn command(command: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Command {
            command: command.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error must abort the run.
    ///
    /// Verification mismatches and individual action failures are recorded
    /// on the apply result and left in place; everything else stops the run
    /// before further mutation.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::VerificationMismatch { .. } | Self::ActionFailed { .. }
        )
    }

    /// Whether this error is a configuration problem (usage exit code).
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigReadFailed(_)
                | Self::ConfigWriteFailed(_)
                | Self::ConfigParseFailed(_)
                | Self::SchemaMismatch { .. }
                | Self::ValidationFailed(_)
                | Self::InvalidIpAddress(_)
                | Self::InvalidAdapterName(_)
                | Self::InvalidMetric(_)
        )
    }
}

// Convert from toml parse errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::ConfigParseFailed(err.to_string())
    }
}

// Convert from toml serialize errors
impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::ConfigWriteFailed(err.to_string())
    }
}

// Convert from serde_json errors
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigParseFailed(err.to_string())
    }
}
