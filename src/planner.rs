// NetShare - Desired-State Planner
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Plan computation.
//!
//! Pure diffing of a host snapshot against the declared intents. The
//! planner performs no I/O and emits only the actions whose target state
//! does not already hold, so a converged host yields an empty plan.

use tracing::debug;

use crate::models::{
    AdapterState, Error, Inventory, PlanAction, PriorityIntent, ReconciliationPlan, Result,
    SharingIntent,
};

/// Compute the minimal action sequence from snapshot to intents.
///
/// Ordering: service start first, then sharing removal everywhere it does
/// not belong, then sharing on the downstream adapter, then route metrics,
/// then optional duplicate pruning.
pub fn plan(
    inventory: &Inventory,
    sharing: &SharingIntent,
    priority: &PriorityIntent,
    prune_duplicates: bool,
) -> Result<ReconciliationPlan> {
    let _public = resolve(inventory, &sharing.public)?;
    let private = resolve(inventory, &sharing.private)?;
    for name in priority.adapters() {
        resolve(inventory, name)?;
    }

    let mut actions = Vec::new();

    if !inventory.service.active {
        actions.push(PlanAction::EnsureServiceRunning {
            service: inventory.service.name.clone(),
        });
    }

    // Sharing must come off every other adapter before it goes on the
    // intended one; two adapters serving the same DHCP range fight each
    // other.
    for adapter in &inventory.adapters {
        if adapter.sharing_enabled && adapter.name != sharing.private {
            let connection = adapter
                .connection_name()
                .ok_or_else(|| Error::ConnectionResolution {
                    adapter: adapter.name.clone(),
                })?;
            actions.push(PlanAction::DisableSharing {
                adapter: adapter.name.clone(),
                connection: connection.to_string(),
            });
        }
    }

    if !private.sharing_enabled {
        let connection = connection_of(private)?;
        actions.push(PlanAction::EnableSharing {
            adapter: private.name.clone(),
            connection,
        });
    }

    for (name, desired) in &priority.0 {
        let adapter = resolve(inventory, name)?;
        let connection = connection_of(adapter)?;
        let current = adapter.connection.as_ref().and_then(|c| c.configured_metric);
        if current == Some(*desired) {
            debug!("{} already at metric {}, skipping", name, desired);
            continue;
        }
        actions.push(PlanAction::SetRouteMetric {
            adapter: adapter.name.clone(),
            connection,
            metric: *desired,
        });
    }

    if prune_duplicates {
        for dup in &inventory.duplicates {
            for uuid in dup.inactive_uuids() {
                actions.push(PlanAction::DeleteDuplicateProfile {
                    name: dup.name.clone(),
                    uuid: uuid.to_string(),
                });
            }
        }
    }

    Ok(ReconciliationPlan { actions })
}

fn resolve<'a>(inventory: &'a Inventory, name: &str) -> Result<&'a AdapterState> {
    inventory.adapter(name).ok_or_else(|| Error::UnresolvedAdapter {
        name: name.to_string(),
    })
}

fn connection_of(adapter: &AdapterState) -> Result<String> {
    adapter
        .connection_name()
        .map(str::to_string)
        .ok_or_else(|| Error::ConnectionResolution {
            adapter: adapter.name.clone(),
        })
}
