// NetShare - Reconciliation Plan
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Plan actions computed by diffing the inventory against the intents.
//!
//! A plan is an ordered sequence of idempotent actions, consumed once by
//! the applier and then discarded. Applying a plan to a system already in
//! the target state is a no-op because such a system yields an empty plan.

use serde::{Deserialize, Serialize};

/// IPv4 configuration method on a connection profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Ipv4Method {
    /// Obtain address via DHCP.
    #[default]
    Auto,
    /// NAT + DHCP served toward the peer (connection sharing).
    Shared,
    /// Manual/static configuration.
    Manual,
    /// Link-local only.
    LinkLocal,
    /// Disabled.
    Disabled,
}

impl Ipv4Method {
    /// The value the network CLI expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Shared => "shared",
            Self::Manual => "manual",
            Self::LinkLocal => "link-local",
            Self::Disabled => "disabled",
        }
    }

    /// Parse the value reported by the network CLI.
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "auto" => Self::Auto,
            "shared" => Self::Shared,
            "manual" => Self::Manual,
            "link-local" => Self::LinkLocal,
            "disabled" => Self::Disabled,
            _ => Self::Auto,
        }
    }
}

/// One idempotent reconciliation action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlanAction {
    /// Start the background network service if it is not active.
    EnsureServiceRunning {
        /// Service unit name.
        service: String,
    },

    /// Turn sharing off on a profile that should not have it.
    DisableSharing {
        /// Adapter the profile is bound to.
        adapter: String,
        /// Connection profile name.
        connection: String,
    },

    /// Turn sharing on toward the downstream adapter.
    EnableSharing {
        /// Adapter the profile is bound to.
        adapter: String,
        /// Connection profile name.
        connection: String,
    },

    /// Set the IPv4 method on a profile.
    SetIpv4Method {
        /// Adapter the profile is bound to.
        adapter: String,
        /// Connection profile name.
        connection: String,
        /// Target method.
        method: Ipv4Method,
    },

    /// Set the default-route metric on a profile.
    SetRouteMetric {
        /// Adapter the profile is bound to.
        adapter: String,
        /// Connection profile name.
        connection: String,
        /// Target metric (lower = preferred).
        metric: u32,
    },

    /// Deactivate then reactivate a connection to pick up profile changes
    /// or re-run DHCP.
    BounceConnection {
        /// Adapter the profile is bound to.
        adapter: String,
        /// Connection profile name.
        connection: String,
    },

    /// Delete an inactive duplicate of a connection profile name.
    DeleteDuplicateProfile {
        /// The duplicated profile name.
        name: String,
        /// UUID of the inactive copy to delete.
        uuid: String,
    },
}

impl PlanAction {
    /// Get a short name for the action.
    pub fn name(&self) -> String {
        match self {
            Self::EnsureServiceRunning { service } => format!("Start {}", service),
            Self::DisableSharing { adapter, .. } => format!("Disable sharing on {}", adapter),
            Self::EnableSharing { adapter, .. } => format!("Enable sharing on {}", adapter),
            Self::SetIpv4Method { adapter, method, .. } => {
                format!("IPv4 {} on {}", method.as_str(), adapter)
            }
            Self::SetRouteMetric { adapter, metric, .. } => {
                format!("Metric {} on {}", metric, adapter)
            }
            Self::BounceConnection { adapter, .. } => format!("Bounce {}", adapter),
            Self::DeleteDuplicateProfile { name, .. } => format!("Prune duplicate '{}'", name),
        }
    }

    /// Get a human-readable description.
    pub fn description(&self) -> String {
        match self {
            Self::EnsureServiceRunning { service } => {
                format!("Start service {} and wait until active", service)
            }
            Self::DisableSharing { adapter, connection } => {
                format!("Set {} ({}) back to DHCP", connection, adapter)
            }
            Self::EnableSharing { adapter, connection } => {
                format!("Share uplink via {} ({})", connection, adapter)
            }
            Self::SetIpv4Method {
                adapter,
                connection,
                method,
            } => format!("IPv4 method {} on {} ({})", method.as_str(), connection, adapter),
            Self::SetRouteMetric {
                adapter,
                connection,
                metric,
            } => format!("Route metric {} on {} ({})", metric, connection, adapter),
            Self::BounceConnection { adapter, connection } => {
                format!("Deactivate and reactivate {} ({})", connection, adapter)
            }
            Self::DeleteDuplicateProfile { name, uuid } => {
                format!("Delete inactive profile {} ({})", name, uuid)
            }
        }
    }

    /// Whether the action changes connection-sharing state.
    pub fn is_sharing_action(&self) -> bool {
        matches!(self, Self::DisableSharing { .. } | Self::EnableSharing { .. })
    }
}

/// Ordered sequence of actions toward the declared target state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconciliationPlan {
    /// Actions in execution order.
    pub actions: Vec<PlanAction>,
}

impl ReconciliationPlan {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Index of the first sharing action, if any.
    pub fn first_sharing_index(&self) -> Option<usize> {
        self.actions.iter().position(|a| a.is_sharing_action())
    }
}
