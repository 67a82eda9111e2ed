// NetShare - Apply Results
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Result types for plan application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::plan::PlanAction;

/// Status of a single apply step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Step is pending.
    Pending,
    /// Step is currently running.
    Running,
    /// Step completed successfully.
    Success,
    /// Step completed with warnings.
    Warning,
    /// Step failed.
    Error,
    /// Step was skipped (target state already held).
    Skipped,
}

impl StepStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success | Self::Warning)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Skipped => "skipped",
        }
    }
}

/// Progress of the sharing setup across a reconciliation pass.
///
/// `Verified` is the terminal success state; a pass that ends at
/// `SharingBound` carries a verification warning but is not fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharingPhase {
    /// No sharing state established yet.
    Unconfigured,
    /// Sharing removed from every adapter that should not carry it.
    SharingDisabledEverywhere,
    /// Sharing enabled on the intended downstream adapter.
    SharingBound,
    /// Downstream adapter holds an address in the expected range.
    Verified,
}

impl SharingPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unconfigured => "unconfigured",
            Self::SharingDisabledEverywhere => "sharing_disabled_everywhere",
            Self::SharingBound => "sharing_bound",
            Self::Verified => "verified",
        }
    }
}

/// Result of a single action execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    /// The action that was executed.
    pub action: PlanAction,
    /// Execution status.
    pub status: StepStatus,
    /// Human-readable message.
    pub message: String,
    /// Detailed error message (if error).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    /// Execution duration in milliseconds.
    pub duration_ms: u64,
    /// Timestamp when execution started.
    pub started_at: DateTime<Utc>,
}

impl ActionResult {
    /// Create a success result.
    pub fn success(action: PlanAction, message: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            action,
            status: StepStatus::Success,
            message: message.into(),
            error_detail: None,
            duration_ms,
            started_at: Utc::now(),
        }
    }

    /// Create an error result.
    pub fn error(action: PlanAction, message: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            action,
            status: StepStatus::Error,
            message: message.into(),
            error_detail: detail,
            duration_ms: 0,
            started_at: Utc::now(),
        }
    }

    /// Create a warning result.
    pub fn warning(action: PlanAction, message: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            action,
            status: StepStatus::Warning,
            message: message.into(),
            error_detail: None,
            duration_ms,
            started_at: Utc::now(),
        }
    }
}

/// Overall result of applying a reconciliation plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResult {
    /// Overall status.
    pub status: StepStatus,
    /// Summary message.
    pub message: String,
    /// Where the sharing state machine ended up.
    pub phase: SharingPhase,
    /// Individual action results.
    pub actions: Vec<ActionResult>,
    /// Warnings collected during verification.
    pub warnings: Vec<String>,
    /// Total execution duration in milliseconds.
    pub total_duration_ms: u64,
    /// Execution start timestamp.
    pub started_at: DateTime<Utc>,
    /// Execution end timestamp.
    pub completed_at: DateTime<Utc>,
}

impl ApplyResult {
    /// Create a new, empty apply result.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            status: StepStatus::Pending,
            message: String::new(),
            phase: SharingPhase::Unconfigured,
            actions: Vec::new(),
            warnings: Vec::new(),
            total_duration_ms: 0,
            started_at: now,
            completed_at: now,
        }
    }

    /// Add an action result.
    pub fn add_action(&mut self, result: ActionResult) {
        self.actions.push(result);
    }

    /// Record a verification warning.
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Finalize the result, calculating overall status.
    pub fn finalize(&mut self) {
        self.completed_at = Utc::now();
        self.total_duration_ms = (self.completed_at - self.started_at).num_milliseconds() as u64;

        let has_errors = self.actions.iter().any(|a| a.status.is_error());
        let has_warnings =
            !self.warnings.is_empty() || self.actions.iter().any(|a| a.status == StepStatus::Warning);

        if has_errors {
            self.status = StepStatus::Error;
            let error_count = self.actions.iter().filter(|a| a.status.is_error()).count();
            self.message = format!("{} action(s) failed", error_count);
        } else if has_warnings {
            self.status = StepStatus::Warning;
            self.message = "Completed with warnings".to_string();
        } else if self.changed_count() == 0 {
            self.status = StepStatus::Success;
            self.message = "Already converged, nothing to do".to_string();
        } else {
            self.status = StepStatus::Success;
            self.message = format!("{} action(s) completed successfully", self.changed_count());
        }
    }

    /// Count actions that actually changed host state.
    pub fn changed_count(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| a.status == StepStatus::Success || a.status == StepStatus::Warning)
            .count()
    }

    /// Count failed actions.
    pub fn error_count(&self) -> usize {
        self.actions.iter().filter(|a| a.status.is_error()).count()
    }

    /// Check if the apply was successful overall.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

impl Default for ApplyResult {
    fn default() -> Self {
        Self::new()
    }
}
