// SPDX-License-Identifier: MIT

//! Activity log for presenting a run
//!
//! The log is built by the caller from `RunEvent`s; the orchestrator never
//! owns or mutates it.

use chrono::Local;
use std::fmt;

use crate::approval::workflow::graph::RunEvent;
use crate::approval::workflow::state::StateUpdate;
use crate::approval::workflow::steps::StepId;

/// One line of the activity log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEntry {
    /// Wall-clock time, `HH:MM:SS`
    pub timestamp: String,
    pub persona: &'static str,
    pub message: String,
}

impl fmt::Display for ActivityEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}: {}", self.timestamp, self.persona, self.message)
    }
}

/// Per-run activity log and stage counter
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    project_id: String,
    entries: Vec<ActivityEntry>,
    stage: u8,
    failure: Option<String>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the log
    pub fn record(&mut self, event: &RunEvent) {
        match event {
            RunEvent::RunStarted { project_id, .. } => {
                self.project_id = project_id.clone();
            }
            RunEvent::StepStarted { .. } | RunEvent::RunCompleted { .. } => {}
            RunEvent::StepCompleted { step, update, .. } => {
                self.stage = self.stage.max(step.persona().stage);
                for message in self.describe(*step, update) {
                    self.push(*step, message);
                }
            }
            RunEvent::StepFailed { step, error, .. } => {
                self.push(*step, format!("Failed: {}", error));
            }
            RunEvent::RunFailed { error, .. } => {
                self.failure = Some(error.clone());
            }
        }
    }

    pub fn entries(&self) -> &[ActivityEntry] {
        &self.entries
    }

    /// Highest presentation stage completed so far
    pub fn stage(&self) -> u8 {
        self.stage
    }

    /// Error of a failed run
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    fn push(&mut self, step: StepId, message: String) {
        self.entries.push(ActivityEntry {
            timestamp: Local::now().format("%H:%M:%S").to_string(),
            persona: step.persona().name,
            message,
        });
    }

    fn describe(&self, step: StepId, update: &StateUpdate) -> Vec<String> {
        match step {
            StepId::Intake => vec![format!(
                "Processing user input for project {}",
                update.project_id.as_deref().unwrap_or(&self.project_id)
            )],
            StepId::DataRetrieval => vec![
                format!("Retrieved data for project {}", self.project_id),
                format!(
                    "PO Amount: {}, Budget: {}, Supplier: {}",
                    format_currency(update.po_amount.unwrap_or_default()),
                    format_currency(update.budget_remaining.unwrap_or_default()),
                    update.supplier.as_deref().unwrap_or("unknown")
                ),
            ],
            StepId::BudgetCheck => {
                vec![format!("Budget check: {}", pass_fail(update.budget_ok))]
            }
            StepId::ComplianceCheck => {
                vec![format!("Compliance check: {}", pass_fail(update.compliance_ok))]
            }
            StepId::Decision => vec![match (update.approved, update.reason.as_deref()) {
                (Some(true), _) => "Decision: APPROVED".to_string(),
                (_, Some(reason)) => format!("Decision: REJECTED - {}", reason),
                _ => "Decision: REJECTED".to_string(),
            }],
            StepId::VarianceAnalysis => vec![format!(
                "Variance analysis: {:.2}%",
                update.variance.unwrap_or_default() * 100.0
            )],
            StepId::Summary => vec![format!(
                "Final summary: {}",
                update.summary.as_deref().unwrap_or_default()
            )],
        }
    }
}

fn pass_fail(ok: Option<bool>) -> &'static str {
    if ok == Some(true) {
        "PASSED"
    } else {
        "FAILED"
    }
}

/// Format an amount as dollars with thousands separators, e.g. `$15,000.00`
pub fn format_currency(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}
