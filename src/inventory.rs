// NetShare - Adapter Inventory Reader
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Host snapshot assembly.
//!
//! Takes one read-only pass over the host's devices, stored connection
//! profiles, default routes and service state, and assembles the
//! [`Inventory`] the planner diffs against. No side effects.

use std::collections::BTreeMap;

use tracing::debug;

use crate::host::NetworkHost;
use crate::models::{
    AdapterState, ConnectionRef, DuplicateProfile, Inventory, Ipv4Method, Result, ServiceState,
};

/// Read a full host snapshot.
pub fn read(host: &dyn NetworkHost, service_name: &str) -> Result<Inventory> {
    let devices = host.device_states()?;
    let profiles = host.connection_profiles()?;
    let routes = host.default_routes()?;
    let service_active = host.service_active(service_name)?;

    let mut adapters = Vec::with_capacity(devices.len());
    for device in devices {
        // Prefer the active profile on the device; fall back to any stored
        // profile bound to it.
        let profile = profiles
            .iter()
            .find(|p| device.connection_name.as_deref() == Some(p.name.as_str()))
            .or_else(|| profiles.iter().find(|p| p.device.as_deref() == Some(device.name.as_str())));

        let connection = profile.map(|p| ConnectionRef {
            name: p.name.clone(),
            uuid: p.uuid.clone(),
            active: p.active,
            configured_metric: p.route_metric,
        });
        let sharing_enabled = profile
            .map(|p| p.ipv4_method == Ipv4Method::Shared)
            .unwrap_or(false);

        let route_metric = routes
            .iter()
            .filter(|r| r.device == device.name)
            .map(|r| r.metric)
            .min();

        let ipv4 = host.device_ipv4(&device.name)?;

        debug!(
            "adapter {}: link_up={} connection={:?} sharing={}",
            device.name,
            device.link_up,
            connection.as_ref().map(|c| c.name.as_str()),
            sharing_enabled
        );

        adapters.push(AdapterState {
            name: device.name,
            adapter_type: device.adapter_type,
            link_up: device.link_up,
            ipv4,
            route_metric,
            managed: device.managed,
            connection,
            sharing_enabled,
        });
    }

    let duplicates = find_duplicates(&profiles);

    Ok(Inventory {
        adapters,
        duplicates,
        service: ServiceState {
            name: service_name.to_string(),
            active: service_active,
        },
    })
}

/// Group stored profiles by name and report names carried by more than one.
fn find_duplicates(profiles: &[crate::host::ProfileRecord]) -> Vec<DuplicateProfile> {
    let mut by_name: BTreeMap<&str, Vec<&crate::host::ProfileRecord>> = BTreeMap::new();
    for profile in profiles {
        by_name.entry(&profile.name).or_default().push(profile);
    }

    by_name
        .into_iter()
        .filter(|(_, group)| group.len() > 1)
        .map(|(name, group)| DuplicateProfile {
            name: name.to_string(),
            uuids: group.iter().map(|p| p.uuid.clone()).collect(),
            active_uuid: group.iter().find(|p| p.active).map(|p| p.uuid.clone()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::mock::MockHost;
    use crate::host::{DeviceRecord, ProfileRecord, RouteRecord};
    use crate::models::{AdapterType, Ipv4Assignment};

    fn device(name: &str, connection: Option<&str>) -> DeviceRecord {
        DeviceRecord {
            name: name.to_string(),
            adapter_type: AdapterType::Ethernet,
            link_up: true,
            managed: true,
            connection_name: connection.map(str::to_string),
        }
    }

    fn profile(name: &str, uuid: &str, device: Option<&str>, active: bool) -> ProfileRecord {
        ProfileRecord {
            name: name.to_string(),
            uuid: uuid.to_string(),
            device: device.map(str::to_string),
            active,
            ipv4_method: Ipv4Method::Auto,
            route_metric: None,
        }
    }

    #[test]
    fn test_snapshot_joins_device_profile_and_route() {
        let mut host = MockHost::new();
        host.devices = vec![device("usb0", Some("usb-share"))];
        let mut p = profile("usb-share", "uuid-1", Some("usb0"), true);
        p.ipv4_method = Ipv4Method::Shared;
        p.route_metric = Some(100);
        host.profiles = vec![p];
        host.routes = vec![RouteRecord {
            device: "usb0".into(),
            metric: 100,
        }];
        host.push_ipv4(
            "usb0",
            Some(Ipv4Assignment {
                address: "192.168.137.1".parse().unwrap(),
                prefix: 24,
            }),
        );

        let inv = read(&host, "NetworkManager").unwrap();
        assert_eq!(inv.adapters.len(), 1);
        let usb0 = &inv.adapters[0];
        assert!(usb0.sharing_enabled);
        assert_eq!(usb0.route_metric, Some(100));
        assert_eq!(usb0.connection_name(), Some("usb-share"));
        assert_eq!(usb0.connection.as_ref().unwrap().configured_metric, Some(100));
        assert!(usb0.has_usable_address());
        assert!(inv.service.active);
    }

    #[test]
    fn test_unbound_device_has_no_connection() {
        let mut host = MockHost::new();
        host.devices = vec![device("eth1", None)];

        let inv = read(&host, "NetworkManager").unwrap();
        assert!(inv.adapters[0].connection.is_none());
        assert!(!inv.adapters[0].sharing_enabled);
        assert!(inv.adapters[0].ipv4.is_none());
    }

    #[test]
    fn test_inactive_bound_profile_still_resolves() {
        let mut host = MockHost::new();
        host.devices = vec![device("usb0", None)];
        host.profiles = vec![profile("usb-share", "uuid-1", Some("usb0"), false)];

        let inv = read(&host, "NetworkManager").unwrap();
        let conn = inv.adapters[0].connection.as_ref().unwrap();
        assert_eq!(conn.name, "usb-share");
        assert!(!conn.active);
    }

    #[test]
    fn test_duplicate_profiles_reported() {
        let mut host = MockHost::new();
        host.devices = vec![device("wlan0", Some("home-wifi"))];
        host.profiles = vec![
            profile("home-wifi", "uuid-a", Some("wlan0"), true),
            profile("home-wifi", "uuid-b", None, false),
            profile("other", "uuid-c", None, false),
        ];

        let inv = read(&host, "NetworkManager").unwrap();
        assert_eq!(inv.duplicates.len(), 1);
        let dup = &inv.duplicates[0];
        assert_eq!(dup.name, "home-wifi");
        assert_eq!(dup.uuids.len(), 2);
        assert_eq!(dup.active_uuid.as_deref(), Some("uuid-a"));
        let inactive: Vec<&str> = dup.inactive_uuids().collect();
        assert_eq!(inactive, vec!["uuid-b"]);
    }

    #[test]
    fn test_lowest_metric_route_wins_per_device() {
        let mut host = MockHost::new();
        host.devices = vec![device("wlan0", None)];
        host.routes = vec![
            RouteRecord {
                device: "wlan0".into(),
                metric: 600,
            },
            RouteRecord {
                device: "wlan0".into(),
                metric: 650,
            },
        ];

        let inv = read(&host, "NetworkManager").unwrap();
        assert_eq!(inv.adapters[0].route_metric, Some(600));
    }
}
