// NetShare - Adapter Snapshot
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Read-only snapshot types for host network adapters.
//!
//! An [`Inventory`] is taken once per reconciliation pass and never mutated
//! in place; a fresh pass re-reads the whole snapshot.

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// Type of network adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterType {
    /// Wired Ethernet adapter.
    Ethernet,
    /// Wireless (WiFi) adapter.
    Wifi,
    /// USB RNDIS/CDC Ethernet gadget link.
    Gadget,
    /// Virtual adapter (bridges, VLANs, etc.).
    Virtual,
    /// Loopback interface.
    Loopback,
    /// Unknown or other type.
    Other,
}

impl AdapterType {
    /// Get human-readable name for this adapter type.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Ethernet => "Ethernet",
            Self::Wifi => "Wi-Fi",
            Self::Gadget => "USB Gadget",
            Self::Virtual => "Virtual",
            Self::Loopback => "Loopback",
            Self::Other => "Network",
        }
    }
}

/// The NetworkManager connection profile bound to a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRef {
    /// Profile name as shown by the connection list.
    pub name: String,
    /// Profile UUID.
    pub uuid: String,
    /// Whether the profile is currently activated on the device.
    pub active: bool,
    /// Route metric configured on the profile (not the live route).
    pub configured_metric: Option<u32>,
}

/// An IPv4 address with its prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipv4Assignment {
    /// Assigned address.
    pub address: Ipv4Addr,
    /// Prefix length (e.g., 24 for /24).
    pub prefix: u8,
}

impl Ipv4Assignment {
    /// Whether the assignment is an APIPA/link-local fallback address,
    /// which indicates DHCP never answered.
    pub fn is_link_local(&self) -> bool {
        self.address.is_link_local()
    }
}

impl std::fmt::Display for Ipv4Assignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix)
    }
}

/// Read-only state of one host adapter at snapshot time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterState {
    /// Interface name (e.g., "usb0", "wlan0", "enp3s0").
    pub name: String,
    /// Type of adapter.
    pub adapter_type: AdapterType,
    /// Whether the link is operationally up.
    pub link_up: bool,
    /// Assigned IPv4 address, if any.
    pub ipv4: Option<Ipv4Assignment>,
    /// Metric of the default route through this adapter, if one exists.
    pub route_metric: Option<u32>,
    /// Whether the device is managed by the network service.
    pub managed: bool,
    /// Connection profile bound to the device, if resolvable.
    pub connection: Option<ConnectionRef>,
    /// Whether IPv4 sharing is enabled on the bound profile.
    pub sharing_enabled: bool,
}

impl AdapterState {
    /// Create a snapshot entry with nothing resolved yet.
    pub fn new(name: impl Into<String>, adapter_type: AdapterType) -> Self {
        Self {
            name: name.into(),
            adapter_type,
            link_up: false,
            ipv4: None,
            route_metric: None,
            managed: true,
            connection: None,
            sharing_enabled: false,
        }
    }

    /// Profile name to address this adapter's configuration by, if bound.
    pub fn connection_name(&self) -> Option<&str> {
        self.connection.as_ref().map(|c| c.name.as_str())
    }

    /// Whether the adapter holds a usable (non-link-local) IPv4 address.
    pub fn has_usable_address(&self) -> bool {
        self.ipv4.map(|a| !a.is_link_local()).unwrap_or(false)
    }
}

/// A connection profile name that resolves to more than one stored profile.
///
/// These are reported, never silently deleted; pruning inactive duplicates
/// is an explicit opt-in (see `prune_duplicate_connections`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateProfile {
    /// The shared profile name.
    pub name: String,
    /// All UUIDs carrying that name.
    pub uuids: Vec<String>,
    /// The UUID that is currently active, if any.
    pub active_uuid: Option<String>,
}

impl DuplicateProfile {
    /// UUIDs that are safe candidates for pruning (never the active one).
    pub fn inactive_uuids(&self) -> impl Iterator<Item = &str> {
        self.uuids
            .iter()
            .filter(move |u| Some(u.as_str()) != self.active_uuid.as_deref())
            .map(|u| u.as_str())
    }
}

/// State of the background network service at snapshot time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceState {
    /// Service unit name (e.g., "NetworkManager").
    pub name: String,
    /// Whether the service reports active.
    pub active: bool,
}

/// Full host snapshot consumed by the planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    /// All detected adapters.
    pub adapters: Vec<AdapterState>,
    /// Connection profile names with more than one stored profile.
    pub duplicates: Vec<DuplicateProfile>,
    /// Background network service state.
    pub service: ServiceState,
}

impl Inventory {
    /// Look up an adapter by name.
    pub fn adapter(&self, name: &str) -> Option<&AdapterState> {
        self.adapters.iter().find(|a| a.name == name)
    }

    /// The adapter whose default route wins (lowest metric).
    pub fn preferred_route(&self) -> Option<&AdapterState> {
        self.adapters
            .iter()
            .filter(|a| a.route_metric.is_some())
            .min_by_key(|a| a.route_metric)
    }
}
