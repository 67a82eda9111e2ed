// NetShare - Validation Utilities
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Input validation utilities for configuration and intents.

use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use super::error::{Error, Result};

/// Validate an IPv4 address string.
pub fn validate_ipv4(s: &str) -> Result<Ipv4Addr> {
    Ipv4Addr::from_str(s).map_err(|_| Error::InvalidIpAddress(s.to_string()))
}

/// Validate an IP address string (v4 or v6).
pub fn validate_ip(s: &str) -> Result<IpAddr> {
    IpAddr::from_str(s).map_err(|_| Error::InvalidIpAddress(s.to_string()))
}

/// Validate a CIDR notation (e.g., "192.168.137.0/24").
pub fn validate_cidr(s: &str) -> Result<(Ipv4Addr, u8)> {
    let parts: Vec<&str> = s.split('/').collect();
    if parts.len() != 2 {
        return Err(Error::InvalidIpAddress(format!(
            "Invalid CIDR notation: {}",
            s
        )));
    }

    let network = validate_ipv4(parts[0])?;
    let prefix: u8 = parts[1]
        .parse()
        .map_err(|_| Error::InvalidIpAddress(format!("Invalid prefix: {}", parts[1])))?;

    if prefix > 32 {
        return Err(Error::InvalidIpAddress(format!(
            "Prefix {} exceeds maximum 32",
            prefix
        )));
    }

    Ok((network, prefix))
}

/// Check whether an address falls inside a subnet.
pub fn ipv4_in_subnet(address: Ipv4Addr, network: Ipv4Addr, prefix: u8) -> bool {
    if prefix == 0 {
        return true;
    }
    if prefix > 32 {
        return false;
    }
    let mask = u32::MAX << (32 - prefix);
    (u32::from(address) & mask) == (u32::from(network) & mask)
}

/// Validate an adapter/interface name.
///
/// Kernel interface names are at most 15 bytes and never contain
/// whitespace or path separators.
pub fn validate_adapter_name(s: &str) -> Result<()> {
    if s.is_empty() || s.len() > 15 {
        return Err(Error::InvalidAdapterName(format!(
            "Interface name must be 1-15 characters: {}",
            s
        )));
    }

    if !s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(Error::InvalidAdapterName(s.to_string()));
    }

    Ok(())
}

/// Validate a route metric.
///
/// Zero is reserved by the kernel for directly connected routes.
pub fn validate_metric(metric: u32) -> Result<()> {
    if metric == 0 {
        return Err(Error::InvalidMetric(
            "Metric must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ipv4() {
        assert!(validate_ipv4("192.168.137.1").is_ok());
        assert!(validate_ipv4("256.1.1.1").is_err());
        assert!(validate_ipv4("").is_err());
    }

    #[test]
    fn test_validate_cidr() {
        let (net, prefix) = validate_cidr("192.168.137.0/24").unwrap();
        assert_eq!(net, Ipv4Addr::new(192, 168, 137, 0));
        assert_eq!(prefix, 24);

        assert!(validate_cidr("192.168.137.0").is_err());
        assert!(validate_cidr("192.168.137.0/33").is_err());
        assert!(validate_cidr("bogus/24").is_err());
    }

    #[test]
    fn test_ipv4_in_subnet() {
        let net = Ipv4Addr::new(192, 168, 137, 0);
        assert!(ipv4_in_subnet(Ipv4Addr::new(192, 168, 137, 42), net, 24));
        assert!(!ipv4_in_subnet(Ipv4Addr::new(192, 168, 138, 1), net, 24));
        assert!(ipv4_in_subnet(Ipv4Addr::new(10, 0, 0, 1), net, 0));
    }

    #[test]
    fn test_validate_adapter_name() {
        assert!(validate_adapter_name("usb0").is_ok());
        assert!(validate_adapter_name("enp3s0").is_ok());
        assert!(validate_adapter_name("").is_err());
        assert!(validate_adapter_name("way-too-long-interface-name").is_err());
        assert!(validate_adapter_name("bad name").is_err());
        assert!(validate_adapter_name("../etc").is_err());
    }

    #[test]
    fn test_validate_metric() {
        assert!(validate_metric(100).is_ok());
        assert!(validate_metric(0).is_err());
    }
}
