// NetShare - Scripted Host Double
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Scripted [`NetworkHost`] double for tests.
//!
//! Queries answer from pre-loaded fixtures; mutations are recorded in a
//! call log so tests can assert on exactly what would have hit the OS.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use super::{DeviceRecord, NetworkHost, ProfileRecord, RouteRecord};
use crate::models::{Error, Ipv4Assignment, Ipv4Method, Result};

pub struct MockHost {
    pub devices: Vec<DeviceRecord>,
    pub profiles: Vec<ProfileRecord>,
    pub routes: Vec<RouteRecord>,
    /// Scripted per-device answers to successive `device_ipv4` queries.
    pub ipv4_responses: RefCell<HashMap<String, VecDeque<Option<Ipv4Assignment>>>>,
    pub service_is_active: Cell<bool>,
    pub start_service_fails: bool,
    pub probe_ok: bool,
    /// Scripted answers to successive probes; falls back to `probe_ok`.
    pub probe_results: RefCell<VecDeque<bool>>,
    pub calls: RefCell<Vec<String>>,
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            devices: Vec::new(),
            profiles: Vec::new(),
            routes: Vec::new(),
            ipv4_responses: RefCell::new(HashMap::new()),
            service_is_active: Cell::new(true),
            start_service_fails: false,
            probe_ok: true,
            probe_results: RefCell::new(VecDeque::new()),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Queue an answer for the next probe.
    pub fn push_probe(&self, answer: bool) {
        self.probe_results.borrow_mut().push_back(answer);
    }

    /// Queue an answer for the next `device_ipv4` query on a device.
    pub fn push_ipv4(&self, device: &str, answer: Option<Ipv4Assignment>) {
        self.ipv4_responses
            .borrow_mut()
            .entry(device.to_string())
            .or_default()
            .push_back(answer);
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }

    /// Calls recorded so far, for assertions.
    pub fn call_log(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Count of mutating calls recorded.
    pub fn mutation_count(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| {
                c.starts_with("set_")
                    || c.starts_with("connection_")
                    || c.starts_with("delete_")
                    || c.starts_with("start_service")
                    || c.starts_with("restart_networking")
            })
            .count()
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkHost for MockHost {
    fn device_states(&self) -> Result<Vec<DeviceRecord>> {
        Ok(self.devices.clone())
    }

    fn connection_profiles(&self) -> Result<Vec<ProfileRecord>> {
        Ok(self.profiles.clone())
    }

    fn device_ipv4(&self, device: &str) -> Result<Option<Ipv4Assignment>> {
        self.record(format!("device_ipv4 {}", device));
        Ok(self
            .ipv4_responses
            .borrow_mut()
            .get_mut(device)
            .and_then(|queue| queue.pop_front())
            .flatten())
    }

    fn default_routes(&self) -> Result<Vec<RouteRecord>> {
        Ok(self.routes.clone())
    }

    fn service_active(&self, _service: &str) -> Result<bool> {
        Ok(self.service_is_active.get())
    }

    fn probe(&self, target: &str) -> bool {
        self.record(format!("probe {}", target));
        self.probe_results
            .borrow_mut()
            .pop_front()
            .unwrap_or(self.probe_ok)
    }

    fn set_ipv4_method(&self, connection: &str, method: Ipv4Method) -> Result<()> {
        self.record(format!("set_ipv4_method {} {}", connection, method.as_str()));
        Ok(())
    }

    fn set_route_metric(&self, connection: &str, metric: u32) -> Result<()> {
        self.record(format!("set_route_metric {} {}", connection, metric));
        Ok(())
    }

    fn connection_up(&self, connection: &str) -> Result<()> {
        self.record(format!("connection_up {}", connection));
        Ok(())
    }

    fn connection_down(&self, connection: &str) -> Result<()> {
        self.record(format!("connection_down {}", connection));
        Ok(())
    }

    fn delete_profile(&self, uuid: &str) -> Result<()> {
        self.record(format!("delete_profile {}", uuid));
        Ok(())
    }

    fn start_service(&self, service: &str) -> Result<()> {
        self.record(format!("start_service {}", service));
        if self.start_service_fails {
            return Err(Error::ServiceUnavailable {
                service: service.to_string(),
                reason: "scripted failure".to_string(),
            });
        }
        self.service_is_active.set(true);
        Ok(())
    }

    fn restart_networking(&self) -> Result<()> {
        self.record("restart_networking".to_string());
        Ok(())
    }

    fn settle(&self, _wait: Duration) {
        self.record("settle".to_string());
    }
}
