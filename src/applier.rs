// NetShare - Plan Applier
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Plan execution against the live host.
//!
//! The applier is the only component that mutates OS state. Actions run in
//! plan order; a profile whose settings changed is reactivated once so the
//! running connection picks up the new profile. Verification of the shared
//! link gets exactly one bounce-and-requery attempt before the mismatch is
//! reported as a warning.

use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::host::NetworkHost;
use crate::models::validation::ipv4_in_subnet;
use crate::models::{
    ActionResult, ApplyResult, Error, Ipv4Method, PlanAction, ReconciliationPlan, Result,
    SharingPhase,
};

/// Settings the applier needs beyond the plan itself.
#[derive(Debug, Clone)]
pub struct ApplyOptions {
    /// Downstream adapter whose address proves the shared link works.
    pub private_adapter: String,
    /// Connection profile bound to the downstream adapter.
    pub private_connection: Option<String>,
    /// Settle time after adapter state changes.
    pub settle_wait: Duration,
    /// Subnet the shared link must land in, when pinned.
    pub expected_subnet: Option<(Ipv4Addr, u8)>,
}

/// Executes a reconciliation plan through the host capability surface.
pub struct Applier<'a> {
    host: &'a dyn NetworkHost,
    options: ApplyOptions,
}

impl<'a> Applier<'a> {
    pub fn new(host: &'a dyn NetworkHost, options: ApplyOptions) -> Self {
        Self { host, options }
    }

    /// Apply the plan and verify the resulting sharing state.
    ///
    /// Individual action failures are recorded on the result and execution
    /// continues (actions are independently idempotent). A service that
    /// cannot be started aborts before any sharing mutation runs.
    pub fn apply(&self, plan: &ReconciliationPlan) -> Result<ApplyResult> {
        let mut result = ApplyResult::new();
        let mut disable_failed = false;
        let mut enable_failed = false;
        let mut touched: Vec<String> = Vec::new();

        for action in &plan.actions {
            let started = Instant::now();
            match self.execute(action) {
                Ok(()) => {
                    let elapsed = started.elapsed().as_millis() as u64;
                    info!("{}", action.name());
                    if let Some(connection) = touched_connection(action) {
                        if !touched.iter().any(|c| c == connection) {
                            touched.push(connection.to_string());
                        }
                    }
                    result.add_action(ActionResult::success(
                        action.clone(),
                        action.description(),
                        elapsed,
                    ));
                }
                Err(e @ Error::ServiceUnavailable { .. }) => {
                    // Nothing downstream can work without the service.
                    return Err(e);
                }
                Err(e) => {
                    let failure = Error::action_failed(action.name(), e.to_string());
                    warn!("{}", failure);
                    match action {
                        PlanAction::DisableSharing { .. } => disable_failed = true,
                        PlanAction::EnableSharing { .. } => enable_failed = true,
                        _ => {}
                    }
                    result.add_action(ActionResult::error(
                        action.clone(),
                        action.description(),
                        Some(failure.to_string()),
                    ));
                }
            }
        }

        if !disable_failed {
            result.phase = SharingPhase::SharingDisabledEverywhere;
            if !enable_failed {
                result.phase = SharingPhase::SharingBound;
            }
        }

        // Modified profiles keep their old settings on the wire until the
        // connection is reactivated.
        for connection in &touched {
            if let Err(e) = self.host.connection_up(connection) {
                warn!("Reactivating {}: {}", connection, e);
            }
        }
        if !touched.is_empty() {
            self.host.settle(self.options.settle_wait);
        }

        if result.phase == SharingPhase::SharingBound {
            self.verify(&mut result);
        }

        result.finalize();
        Ok(result)
    }

    fn execute(&self, action: &PlanAction) -> Result<()> {
        match action {
            PlanAction::EnsureServiceRunning { service } => {
                self.host.start_service(service)?;
                if !self.host.service_active(service)? {
                    return Err(Error::ServiceUnavailable {
                        service: service.clone(),
                        reason: "service did not report active after start".to_string(),
                    });
                }
                Ok(())
            }
            PlanAction::DisableSharing { connection, .. } => {
                self.host.set_ipv4_method(connection, Ipv4Method::Auto)
            }
            PlanAction::EnableSharing { connection, .. } => {
                self.host.set_ipv4_method(connection, Ipv4Method::Shared)
            }
            PlanAction::SetIpv4Method {
                connection, method, ..
            } => self.host.set_ipv4_method(connection, *method),
            PlanAction::SetRouteMetric {
                connection, metric, ..
            } => self.host.set_route_metric(connection, *metric),
            PlanAction::BounceConnection { connection, .. } => {
                self.host.connection_down(connection)?;
                self.host.settle(self.options.settle_wait);
                self.host.connection_up(connection)
            }
            PlanAction::DeleteDuplicateProfile { uuid, .. } => self.host.delete_profile(uuid),
        }
    }

    /// Check the downstream adapter's address; on mismatch, bounce the
    /// connection once and re-query before recording the warning.
    fn verify(&self, result: &mut ApplyResult) {
        let adapter = &self.options.private_adapter;

        match self.address_ok(adapter) {
            Ok(true) => {
                result.phase = SharingPhase::Verified;
                return;
            }
            Ok(false) => {}
            Err(e) => {
                result.add_warning(format!("Could not verify {}: {}", adapter, e));
                return;
            }
        }

        let Some(connection) = self.options.private_connection.clone() else {
            result.add_warning(format!("{} has no connection profile to bounce", adapter));
            return;
        };

        info!("{} address not usable yet, bouncing {}", adapter, connection);
        let bounce = PlanAction::BounceConnection {
            adapter: adapter.clone(),
            connection,
        };
        let started = Instant::now();
        match self.execute(&bounce) {
            Ok(()) => {
                self.host.settle(self.options.settle_wait);
                let elapsed = started.elapsed().as_millis() as u64;
                match self.address_ok(adapter) {
                    Ok(true) => {
                        result.phase = SharingPhase::Verified;
                        result.add_action(ActionResult::success(
                            bounce,
                            "Recovered after reconnect",
                            elapsed,
                        ));
                    }
                    _ => {
                        result.add_action(ActionResult::warning(
                            bounce,
                            "Address still not usable after reconnect",
                            elapsed,
                        ));
                        result.add_warning(
                            Error::VerificationMismatch {
                                adapter: adapter.clone(),
                                detail: "no usable address after one reconnect attempt"
                                    .to_string(),
                            }
                            .to_string(),
                        );
                    }
                }
            }
            Err(e) => {
                result.add_action(ActionResult::error(
                    bounce,
                    "Reconnect attempt failed",
                    Some(e.to_string()),
                ));
            }
        }
    }

    fn address_ok(&self, adapter: &str) -> Result<bool> {
        let Some(assignment) = self.host.device_ipv4(adapter)? else {
            return Ok(false);
        };
        if assignment.is_link_local() {
            return Ok(false);
        }
        if let Some((network, prefix)) = self.options.expected_subnet {
            return Ok(ipv4_in_subnet(assignment.address, network, prefix));
        }
        Ok(true)
    }
}

/// The connection a successful action modified, if reactivation applies.
fn touched_connection(action: &PlanAction) -> Option<&str> {
    match action {
        PlanAction::DisableSharing { connection, .. }
        | PlanAction::EnableSharing { connection, .. }
        | PlanAction::SetIpv4Method { connection, .. }
        | PlanAction::SetRouteMetric { connection, .. } => Some(connection),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::mock::MockHost;
    use crate::models::{Ipv4Assignment, StepStatus};

    fn options() -> ApplyOptions {
        ApplyOptions {
            private_adapter: "usb0".into(),
            private_connection: Some("usb-share".into()),
            settle_wait: Duration::from_secs(0),
            expected_subnet: Some(("192.168.137.0".parse().unwrap(), 24)),
        }
    }

    fn good_address() -> Option<Ipv4Assignment> {
        Some(Ipv4Assignment {
            address: "192.168.137.42".parse().unwrap(),
            prefix: 24,
        })
    }

    fn link_local() -> Option<Ipv4Assignment> {
        Some(Ipv4Assignment {
            address: "169.254.3.7".parse().unwrap(),
            prefix: 16,
        })
    }

    fn sharing_plan() -> ReconciliationPlan {
        ReconciliationPlan {
            actions: vec![
                PlanAction::EnableSharing {
                    adapter: "usb0".into(),
                    connection: "usb-share".into(),
                },
                PlanAction::SetRouteMetric {
                    adapter: "wlan0".into(),
                    connection: "home-wifi".into(),
                    metric: 600,
                },
            ],
        }
    }

    #[test]
    fn test_empty_plan_is_a_no_op() {
        let host = MockHost::new();
        host.push_ipv4("usb0", good_address());

        let result = Applier::new(&host, options())
            .apply(&ReconciliationPlan::default())
            .unwrap();

        assert_eq!(result.changed_count(), 0);
        assert_eq!(host.mutation_count(), 0);
        assert_eq!(result.status, StepStatus::Success);
        assert_eq!(result.phase, SharingPhase::Verified);
    }

    #[test]
    fn test_sharing_plan_applies_and_verifies() {
        let host = MockHost::new();
        host.push_ipv4("usb0", good_address());

        let result = Applier::new(&host, options()).apply(&sharing_plan()).unwrap();

        assert_eq!(result.changed_count(), 2);
        assert_eq!(result.phase, SharingPhase::Verified);
        assert!(result.warnings.is_empty());

        let calls = host.call_log();
        assert!(calls.contains(&"set_ipv4_method usb-share shared".to_string()));
        assert!(calls.contains(&"set_route_metric home-wifi 600".to_string()));
        // Both modified profiles get reactivated once
        assert_eq!(
            calls.iter().filter(|c| c.starts_with("connection_up")).count(),
            2
        );
    }

    #[test]
    fn test_link_local_address_gets_exactly_one_bounce() {
        let host = MockHost::new();
        host.push_ipv4("usb0", link_local());
        host.push_ipv4("usb0", link_local());

        let result = Applier::new(&host, options()).apply(&sharing_plan()).unwrap();

        let calls = host.call_log();
        assert_eq!(
            calls.iter().filter(|c| c.starts_with("connection_down")).count(),
            1,
            "exactly one bounce cycle: {:?}",
            calls
        );
        assert_eq!(
            calls.iter().filter(|c| c.starts_with("device_ipv4")).count(),
            2,
            "one query per verification attempt"
        );

        assert_eq!(result.phase, SharingPhase::SharingBound);
        assert_eq!(result.status, StepStatus::Warning);
        assert!(result.warnings[0].contains("usb0"));
    }

    #[test]
    fn test_bounce_recovers_on_second_query() {
        let host = MockHost::new();
        host.push_ipv4("usb0", None);
        host.push_ipv4("usb0", good_address());

        let result = Applier::new(&host, options()).apply(&sharing_plan()).unwrap();

        assert_eq!(result.phase, SharingPhase::Verified);
        assert!(result.warnings.is_empty());
        assert_eq!(result.status, StepStatus::Success);
    }

    #[test]
    fn test_address_outside_pinned_subnet_is_a_mismatch() {
        let host = MockHost::new();
        let outside = Some(Ipv4Assignment {
            address: "10.0.0.5".parse().unwrap(),
            prefix: 24,
        });
        host.push_ipv4("usb0", outside);
        host.push_ipv4("usb0", outside);

        let result = Applier::new(&host, options()).apply(&sharing_plan()).unwrap();
        assert_eq!(result.phase, SharingPhase::SharingBound);
        assert_eq!(result.status, StepStatus::Warning);
    }

    #[test]
    fn test_failed_service_start_aborts_before_sharing() {
        let mut host = MockHost::new();
        host.start_service_fails = true;
        host.service_is_active.set(false);

        let plan = ReconciliationPlan {
            actions: vec![
                PlanAction::EnsureServiceRunning {
                    service: "NetworkManager".into(),
                },
                PlanAction::EnableSharing {
                    adapter: "usb0".into(),
                    connection: "usb-share".into(),
                },
            ],
        };

        let err = Applier::new(&host, options()).apply(&plan).unwrap_err();
        assert!(matches!(err, Error::ServiceUnavailable { .. }));
        assert!(
            !host
                .call_log()
                .iter()
                .any(|c| c.starts_with("set_ipv4_method")),
            "no sharing mutation may run after a failed service start"
        );
    }

    #[test]
    fn test_failed_action_is_recorded_and_apply_continues() {
        // A delete on a profile the mock refuses is still just one failed
        // action; the metric action after it must run.
        struct FailingDelete(MockHost);
        impl NetworkHost for FailingDelete {
            fn device_states(&self) -> crate::models::Result<Vec<crate::host::DeviceRecord>> {
                self.0.device_states()
            }
            fn connection_profiles(
                &self,
            ) -> crate::models::Result<Vec<crate::host::ProfileRecord>> {
                self.0.connection_profiles()
            }
            fn device_ipv4(
                &self,
                device: &str,
            ) -> crate::models::Result<Option<Ipv4Assignment>> {
                self.0.device_ipv4(device)
            }
            fn default_routes(&self) -> crate::models::Result<Vec<crate::host::RouteRecord>> {
                self.0.default_routes()
            }
            fn service_active(&self, service: &str) -> crate::models::Result<bool> {
                self.0.service_active(service)
            }
            fn probe(&self, target: &str) -> bool {
                self.0.probe(target)
            }
            fn set_ipv4_method(
                &self,
                connection: &str,
                method: Ipv4Method,
            ) -> crate::models::Result<()> {
                self.0.set_ipv4_method(connection, method)
            }
            fn set_route_metric(&self, connection: &str, metric: u32) -> crate::models::Result<()> {
                self.0.set_route_metric(connection, metric)
            }
            fn connection_up(&self, connection: &str) -> crate::models::Result<()> {
                self.0.connection_up(connection)
            }
            fn connection_down(&self, connection: &str) -> crate::models::Result<()> {
                self.0.connection_down(connection)
            }
            fn delete_profile(&self, uuid: &str) -> crate::models::Result<()> {
                Err(Error::command("nmcli", format!("cannot delete {}", uuid)))
            }
            fn start_service(&self, service: &str) -> crate::models::Result<()> {
                self.0.start_service(service)
            }
            fn restart_networking(&self) -> crate::models::Result<()> {
                self.0.restart_networking()
            }
            fn settle(&self, wait: Duration) {
                self.0.settle(wait)
            }
        }

        let host = FailingDelete(MockHost::new());
        host.0.push_ipv4("usb0", good_address());

        let plan = ReconciliationPlan {
            actions: vec![
                PlanAction::DeleteDuplicateProfile {
                    name: "home-wifi".into(),
                    uuid: "uuid-b".into(),
                },
                PlanAction::SetRouteMetric {
                    adapter: "wlan0".into(),
                    connection: "home-wifi".into(),
                    metric: 600,
                },
            ],
        };

        let result = Applier::new(&host, options()).apply(&plan).unwrap();
        assert_eq!(result.error_count(), 1);
        assert_eq!(result.status, StepStatus::Error);
        assert!(host
            .0
            .call_log()
            .contains(&"set_route_metric home-wifi 600".to_string()));
    }
}
