// NetShare - Auxiliary Services
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Auxiliary services around the reconcile pass:
//! - Connectivity: bounded post-apply reachability check

pub mod connectivity;

pub use connectivity::{ConnectivityCheck, ConnectivityOutcome};
