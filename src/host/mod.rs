// NetShare - Host Capability Surface
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Narrow interface over the host's network-configuration commands.
//!
//! The reconciler never talks to the OS directly; everything goes through
//! [`NetworkHost`] so tests can substitute a scripted double. The applier is
//! the only caller of the mutating methods.

use std::time::Duration;

use crate::models::{AdapterType, Ipv4Assignment, Ipv4Method, Result};

pub mod nmcli;

#[cfg(test)]
pub mod mock;

pub use nmcli::NmcliHost;

/// One device row as reported by the network service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    /// Interface name.
    pub name: String,
    /// Adapter type after sysfs refinement.
    pub adapter_type: AdapterType,
    /// Whether the link is operationally up.
    pub link_up: bool,
    /// Whether the device is managed by the network service.
    pub managed: bool,
    /// Name of the connection currently active on the device, if any.
    pub connection_name: Option<String>,
}

/// One stored connection profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRecord {
    /// Profile name.
    pub name: String,
    /// Profile UUID.
    pub uuid: String,
    /// Device the profile is bound or activated on, if any.
    pub device: Option<String>,
    /// Whether the profile is currently active.
    pub active: bool,
    /// Configured IPv4 method.
    pub ipv4_method: Ipv4Method,
    /// Configured route metric, if pinned.
    pub route_metric: Option<u32>,
}

/// One default route with its metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRecord {
    /// Egress device.
    pub device: String,
    /// Route metric (lower = preferred).
    pub metric: u32,
}

/// Capability surface over the host's network-configuration commands.
pub trait NetworkHost {
    // ---- queries (no side effects) ----

    /// Enumerate devices and their state.
    fn device_states(&self) -> Result<Vec<DeviceRecord>>;

    /// Enumerate stored connection profiles.
    fn connection_profiles(&self) -> Result<Vec<ProfileRecord>>;

    /// Current IPv4 assignment of a device, if any.
    fn device_ipv4(&self, device: &str) -> Result<Option<Ipv4Assignment>>;

    /// Current default routes with metrics.
    fn default_routes(&self) -> Result<Vec<RouteRecord>>;

    /// Whether a background service reports active.
    fn service_active(&self, service: &str) -> Result<bool>;

    /// Single connectivity probe; true when the target answered.
    fn probe(&self, target: &str) -> bool;

    // ---- mutations (applier only) ----

    /// Set the IPv4 method on a profile.
    fn set_ipv4_method(&self, connection: &str, method: Ipv4Method) -> Result<()>;

    /// Set the route metric on a profile.
    fn set_route_metric(&self, connection: &str, metric: u32) -> Result<()>;

    /// Activate a connection.
    fn connection_up(&self, connection: &str) -> Result<()>;

    /// Deactivate a connection.
    fn connection_down(&self, connection: &str) -> Result<()>;

    /// Delete a stored profile by UUID.
    fn delete_profile(&self, uuid: &str) -> Result<()>;

    /// Start a background service.
    fn start_service(&self, service: &str) -> Result<()>;

    /// Cycle the network service's global networking switch.
    fn restart_networking(&self) -> Result<()>;

    /// Let the network stack settle after a state change.
    fn settle(&self, wait: Duration);
}
