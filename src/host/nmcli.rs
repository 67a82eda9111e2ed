// NetShare - nmcli Host Implementation
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Production [`NetworkHost`] backed by `nmcli`, `ip`, `systemctl` and
//! `ping`, combined with the Linux sysfs interface for adapter typing.

use std::fs;
use std::process::Command;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use super::{DeviceRecord, NetworkHost, ProfileRecord, RouteRecord};
use crate::models::{AdapterType, Error, Ipv4Assignment, Ipv4Method, Result};

/// `ip -4 route show default` line, e.g.
/// `default via 192.168.1.1 dev wlan0 proto dhcp metric 600`.
static ROUTE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^default\s+.*\bdev\s+(\S+)(?:.*\bmetric\s+(\d+))?").unwrap());

/// Real host backed by the system network CLIs.
pub struct NmcliHost {
    sysfs_root: std::path::PathBuf,
}

impl NmcliHost {
    pub fn new() -> Self {
        Self {
            sysfs_root: std::path::PathBuf::from("/sys/class/net"),
        }
    }

    /// Run a command and return stdout, failing on a non-zero exit.
    fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        debug!("exec: {} {}", program, args.join(" "));
        let output = Command::new(program).args(args).output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::CommandUnavailable(program.to_string())
            } else {
                Error::command(program, e.to_string())
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::command(
                format!("{} {}", program, args.join(" ")),
                stderr.trim().to_string(),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Determine the type of network adapter from sysfs.
    fn adapter_type(&self, name: &str) -> AdapterType {
        let path = self.sysfs_root.join(name);

        // Wireless devices expose a wireless directory
        if path.join("wireless").exists() {
            return AdapterType::Wifi;
        }

        // USB Ethernet gadgets show up through their class driver
        if let Ok(driver_link) = fs::read_link(path.join("device/driver")) {
            if let Some(driver) = driver_link.file_name() {
                let driver = driver.to_string_lossy();
                if driver.contains("rndis") || driver.starts_with("cdc_") {
                    return AdapterType::Gadget;
                }
            }
        }

        if name == "lo" {
            return AdapterType::Loopback;
        }
        if is_virtual_interface(name) {
            return AdapterType::Virtual;
        }
        if name.starts_with("usb") {
            return AdapterType::Gadget;
        }
        if name.starts_with("wl") {
            return AdapterType::Wifi;
        }
        if name.starts_with("en") || name.starts_with("eth") {
            return AdapterType::Ethernet;
        }

        AdapterType::Other
    }

    /// Read operational link state from sysfs.
    fn link_up(&self, name: &str) -> bool {
        fs::read_to_string(self.sysfs_root.join(name).join("operstate"))
            .map(|s| s.trim() == "up")
            .unwrap_or(false)
    }

    /// Per-profile IPv4 settings need a second query.
    fn profile_ipv4_settings(&self, name: &str) -> Result<(Ipv4Method, Option<u32>)> {
        let out = self.run(
            "nmcli",
            &["-t", "-f", "ipv4.method,ipv4.route-metric", "connection", "show", name],
        )?;
        Ok(parse_profile_ipv4_settings(&out))
    }
}

impl Default for NmcliHost {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkHost for NmcliHost {
    fn device_states(&self) -> Result<Vec<DeviceRecord>> {
        let out = self.run(
            "nmcli",
            &["-t", "-f", "DEVICE,TYPE,STATE,CONNECTION", "device", "status"],
        )?;

        let mut records = Vec::new();
        for line in out.lines().filter(|l| !l.is_empty()) {
            let fields = split_terse(line);
            if fields.len() < 4 {
                return Err(Error::Inventory(format!(
                    "Unexpected device status line: {}",
                    line
                )));
            }
            let name = fields[0].clone();
            if name == "lo" {
                continue;
            }
            let state = fields[2].as_str();
            let connection_name = if fields[3].is_empty() {
                None
            } else {
                Some(fields[3].clone())
            };

            records.push(DeviceRecord {
                adapter_type: self.adapter_type(&name),
                link_up: self.link_up(&name),
                managed: state != "unmanaged",
                connection_name,
                name,
            });
        }

        // Sort by name for consistent ordering
        records.sort_by(|a, b| natural_sort_key(&a.name).cmp(&natural_sort_key(&b.name)));
        Ok(records)
    }

    fn connection_profiles(&self) -> Result<Vec<ProfileRecord>> {
        let out = self.run(
            "nmcli",
            &["-t", "-f", "NAME,UUID,DEVICE,ACTIVE", "connection", "show"],
        )?;

        let mut records = Vec::new();
        for line in out.lines().filter(|l| !l.is_empty()) {
            let fields = split_terse(line);
            if fields.len() < 4 {
                return Err(Error::Inventory(format!(
                    "Unexpected connection list line: {}",
                    line
                )));
            }
            let (ipv4_method, route_metric) = self.profile_ipv4_settings(&fields[0])?;
            records.push(ProfileRecord {
                name: fields[0].clone(),
                uuid: fields[1].clone(),
                device: if fields[2].is_empty() {
                    None
                } else {
                    Some(fields[2].clone())
                },
                active: fields[3] == "yes",
                ipv4_method,
                route_metric,
            });
        }
        Ok(records)
    }

    fn device_ipv4(&self, device: &str) -> Result<Option<Ipv4Assignment>> {
        let out = self.run(
            "nmcli",
            &["-t", "-f", "IP4.ADDRESS", "device", "show", device],
        )?;
        Ok(parse_device_ipv4(&out))
    }

    fn default_routes(&self) -> Result<Vec<RouteRecord>> {
        let out = self.run("ip", &["-4", "route", "show", "default"])?;
        Ok(parse_default_routes(&out))
    }

    fn service_active(&self, service: &str) -> Result<bool> {
        let status = Command::new("systemctl")
            .args(["is-active", "--quiet", service])
            .status()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::CommandUnavailable("systemctl".to_string())
                } else {
                    Error::command("systemctl", e.to_string())
                }
            })?;
        Ok(status.success())
    }

    fn probe(&self, target: &str) -> bool {
        // Use system ping command with timeout
        let result = Command::new("ping")
            .args(["-c", "1", "-W", "3", target])
            .output();

        match result {
            Ok(output) => output.status.success(),
            Err(e) => {
                debug!("Ping command failed: {}", e);
                false
            }
        }
    }

    fn set_ipv4_method(&self, connection: &str, method: Ipv4Method) -> Result<()> {
        self.run(
            "nmcli",
            &["connection", "modify", connection, "ipv4.method", method.as_str()],
        )?;
        Ok(())
    }

    fn set_route_metric(&self, connection: &str, metric: u32) -> Result<()> {
        self.run(
            "nmcli",
            &["connection", "modify", connection, "ipv4.route-metric", &metric.to_string()],
        )?;
        Ok(())
    }

    fn connection_up(&self, connection: &str) -> Result<()> {
        self.run("nmcli", &["connection", "up", connection])?;
        Ok(())
    }

    fn connection_down(&self, connection: &str) -> Result<()> {
        // Deactivating an already-inactive connection is not an error here
        if let Err(e) = self.run("nmcli", &["connection", "down", connection]) {
            warn!("connection down {}: {}", connection, e);
        }
        Ok(())
    }

    fn delete_profile(&self, uuid: &str) -> Result<()> {
        self.run("nmcli", &["connection", "delete", "uuid", uuid])?;
        Ok(())
    }

    fn start_service(&self, service: &str) -> Result<()> {
        let status = Command::new("systemctl")
            .args(["start", service])
            .status()
            .map_err(|e| Error::ServiceUnavailable {
                service: service.to_string(),
                reason: e.to_string(),
            })?;

        if !status.success() {
            return Err(Error::ServiceUnavailable {
                service: service.to_string(),
                reason: format!("systemctl start exited with {}", status),
            });
        }
        Ok(())
    }

    fn restart_networking(&self) -> Result<()> {
        self.run("nmcli", &["networking", "off"])?;
        std::thread::sleep(Duration::from_secs(2));
        self.run("nmcli", &["networking", "on"])?;
        Ok(())
    }

    fn settle(&self, wait: Duration) {
        std::thread::sleep(wait);
    }
}

/// Split a terse-mode (`-t`) output line on `:`, honoring `\:` escapes.
fn split_terse(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut escaped = false;

    for c in line.chars() {
        match (escaped, c) {
            (true, _) => {
                current.push(c);
                escaped = false;
            }
            (false, '\\') => escaped = true,
            (false, ':') => fields.push(std::mem::take(&mut current)),
            (false, _) => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Parse `IP4.ADDRESS[1]:192.168.137.66/24` style output.
fn parse_device_ipv4(out: &str) -> Option<Ipv4Assignment> {
    for line in out.lines() {
        let Some((_, value)) = line.split_once(':') else {
            continue;
        };
        let Some((addr, prefix)) = value.split_once('/') else {
            continue;
        };
        if let (Ok(address), Ok(prefix)) = (addr.parse(), prefix.trim().parse()) {
            return Some(Ipv4Assignment { address, prefix });
        }
    }
    None
}

/// Parse `ip -4 route show default` output into route records.
fn parse_default_routes(out: &str) -> Vec<RouteRecord> {
    out.lines()
        .filter_map(|line| {
            let caps = ROUTE_RE.captures(line)?;
            let device = caps.get(1)?.as_str().to_string();
            // A route without an explicit metric is metric 0
            let metric = caps
                .get(2)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0);
            Some(RouteRecord { device, metric })
        })
        .collect()
}

/// Parse per-profile `ipv4.method` / `ipv4.route-metric` terse output.
fn parse_profile_ipv4_settings(out: &str) -> (Ipv4Method, Option<u32>) {
    let mut method = Ipv4Method::Auto;
    let mut metric = None;

    for line in out.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        match key {
            "ipv4.method" => method = Ipv4Method::parse(value),
            // -1 means the profile does not pin a metric
            "ipv4.route-metric" => metric = value.trim().parse::<u32>().ok(),
            _ => {}
        }
    }
    (method, metric)
}

/// Check if interface name suggests a virtual/tunnel interface.
fn is_virtual_interface(name: &str) -> bool {
    name.starts_with("veth")
        || name.starts_with("br")
        || name.starts_with("virbr")
        || name.starts_with("docker")
        || name.starts_with("vnet")
        || name.starts_with("tun")
        || name.starts_with("tap")
        || name.starts_with("bond")
        || name.starts_with("team")
        || name.starts_with("vlan")
        || name.contains("podman")
}

/// Generate a sort key that sorts numbers naturally.
fn natural_sort_key(s: &str) -> (String, u32) {
    let mut prefix = String::new();
    let mut num_str = String::new();

    for c in s.chars() {
        if c.is_ascii_digit() {
            num_str.push(c);
        } else if num_str.is_empty() {
            prefix.push(c);
        }
    }

    let num: u32 = num_str.parse().unwrap_or(0);
    (prefix, num)
}
