// NetShare - Connectivity Check Service
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Connectivity check with bounded remediation.
//!
//! Probes a target once; on failure, cycles the networking switch a single
//! time and probes again. Never loops.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::host::NetworkHost;

/// Outcome of a connectivity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityOutcome {
    /// Target answered on the first probe.
    Reachable,
    /// Target answered after one networking restart.
    RecoveredAfterReconnect,
    /// Target did not answer, even after the reconnect attempt.
    Unreachable,
}

impl ConnectivityOutcome {
    pub fn is_reachable(&self) -> bool {
        !matches!(self, Self::Unreachable)
    }
}

/// Connectivity check against a configured ping target.
pub struct ConnectivityCheck {
    target: String,
    settle_wait: Duration,
}

impl ConnectivityCheck {
    pub fn new(target: impl Into<String>, settle_wait: Duration) -> Self {
        Self {
            target: target.into(),
            settle_wait,
        }
    }

    /// Single probe, no remediation.
    pub fn check(&self, host: &dyn NetworkHost) -> bool {
        let reachable = host.probe(&self.target);
        debug!("connectivity to {}: {}", self.target, reachable);
        reachable
    }

    /// Probe, and on failure reconnect once and probe again.
    pub fn check_with_remediation(&self, host: &dyn NetworkHost) -> ConnectivityOutcome {
        if self.check(host) {
            return ConnectivityOutcome::Reachable;
        }

        info!("{} unreachable, restarting networking", self.target);
        if let Err(e) = host.restart_networking() {
            warn!("Failed to restart networking: {}", e);
            return ConnectivityOutcome::Unreachable;
        }
        host.settle(self.settle_wait);

        if self.check(host) {
            ConnectivityOutcome::RecoveredAfterReconnect
        } else {
            ConnectivityOutcome::Unreachable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::mock::MockHost;

    fn check() -> ConnectivityCheck {
        ConnectivityCheck::new("8.8.8.8", Duration::from_secs(0))
    }

    #[test]
    fn test_reachable_first_try_does_not_remediate() {
        let host = MockHost::new();
        host.push_probe(true);

        let outcome = check().check_with_remediation(&host);
        assert_eq!(outcome, ConnectivityOutcome::Reachable);
        assert!(!host.call_log().contains(&"restart_networking".to_string()));
    }

    #[test]
    fn test_unreachable_remediates_exactly_once() {
        let host = MockHost::new();
        host.push_probe(false);
        host.push_probe(false);

        let outcome = check().check_with_remediation(&host);
        assert_eq!(outcome, ConnectivityOutcome::Unreachable);
        assert!(!outcome.is_reachable());

        let calls = host.call_log();
        assert_eq!(
            calls
                .iter()
                .filter(|c| c.as_str() == "restart_networking")
                .count(),
            1
        );
        assert_eq!(calls.iter().filter(|c| c.starts_with("probe")).count(), 2);
    }

    #[test]
    fn test_recovery_after_reconnect() {
        let host = MockHost::new();
        host.push_probe(false);
        host.push_probe(true);

        let outcome = check().check_with_remediation(&host);
        assert_eq!(outcome, ConnectivityOutcome::RecoveredAfterReconnect);
        assert!(outcome.is_reachable());
    }
}
