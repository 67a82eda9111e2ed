// NetShare - Shared Models
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! # NetShare Models
//!
//! Shared types and logic for the reconciler:
//!
//! - **Adapter**: Read-only host snapshot types
//! - **Intent**: Declared sharing/priority targets
//! - **Plan**: Idempotent reconciliation actions
//! - **Result**: Apply result types
//! - **Config**: TOML configuration model
//! - **Error**: Shared error types
//!
//! ## Design Principles
//!
//! 1. **Idempotent**: Actions can be applied multiple times safely
//! 2. **Declarative**: Intents describe desired state, not steps
//! 3. **Snapshot-based**: Host state is read once per pass, never mutated
//! 4. **Serializable**: All types serialize for machine-readable output

pub mod adapter;
pub mod config;
pub mod error;
pub mod intent;
pub mod plan;
pub mod result;
pub mod schema;
pub mod validation;

// Re-export main types for convenience
pub use adapter::{AdapterState, AdapterType, ConnectionRef, DuplicateProfile, Inventory, Ipv4Assignment, ServiceState};
pub use config::Config;
pub use error::{Error, Result};
pub use intent::{PriorityIntent, SharingIntent};
pub use plan::{Ipv4Method, PlanAction, ReconciliationPlan};
pub use result::{ActionResult, ApplyResult, SharingPhase, StepStatus};

/// Configuration directory name (under XDG_CONFIG_HOME).
pub const CONFIG_DIR_NAME: &str = "netshare";

/// Configuration file name inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";
