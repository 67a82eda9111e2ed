// NetShare - Declared Intents
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Declarative targets the reconciler converges toward.
//!
//! Intents come from the configuration file (optionally overridden on the
//! command line) and are immutable for the duration of a run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which adapter shares its uplink to which.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharingIntent {
    /// Upstream adapter holding the real Internet route.
    pub public: String,
    /// Downstream adapter that receives the NAT-shared uplink.
    pub private: String,
}

impl SharingIntent {
    pub fn new(public: impl Into<String>, private: impl Into<String>) -> Self {
        Self {
            public: public.into(),
            private: private.into(),
        }
    }
}

impl Default for SharingIntent {
    fn default() -> Self {
        // The usual gadget topology: wireless uplink shared down the USB link.
        Self::new("wlan0", "usb0")
    }
}

/// Desired default-route metric per adapter (lower = preferred).
///
/// Stored as a sorted map so plans derived from it are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriorityIntent(pub BTreeMap<String, u32>);

impl PriorityIntent {
    /// Desired metric for an adapter, if one is declared.
    pub fn metric_for(&self, adapter: &str) -> Option<u32> {
        self.0.get(adapter).copied()
    }

    /// Adapter names in deterministic order.
    pub fn adapters(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, u32)> for PriorityIntent {
    fn from_iter<T: IntoIterator<Item = (String, u32)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
