// SPDX-License-Identifier: MIT

//! Static topology of the approval graph
//!
//! ```text
//! intake -> data_retrieval -> { budget_check, compliance_check } -> decision
//!        -> variance_analysis -> summary
//! ```
//!
//! The topology never changes at runtime; only the data flowing through it
//! does. Every step waits for all of its dependencies.

use serde::{Deserialize, Serialize};

use crate::approval::workflow::steps::StepId;

/// Steps that must complete before `step` may run
pub fn depends_on(step: StepId) -> &'static [StepId] {
    match step {
        StepId::Intake => &[],
        StepId::DataRetrieval => &[StepId::Intake],
        StepId::BudgetCheck => &[StepId::DataRetrieval],
        StepId::ComplianceCheck => &[StepId::DataRetrieval],
        StepId::Decision => &[StepId::BudgetCheck, StepId::ComplianceCheck],
        StepId::VarianceAnalysis => &[StepId::Decision],
        StepId::Summary => &[StepId::VarianceAnalysis],
    }
}

/// Steps unblocked (at least in part) by `step`
pub fn successors(step: StepId) -> Vec<StepId> {
    StepId::ALL
        .into_iter()
        .filter(|s| depends_on(*s).contains(&step))
        .collect()
}

/// Whether `step` joins several upstream branches
pub fn is_join_point(step: StepId) -> bool {
    depends_on(step).len() > 1
}

/// The terminal step; reaching it completes the run
pub fn is_terminal(step: StepId) -> bool {
    successors(step).is_empty()
}

/// How sibling steps of a fan-out are scheduled
///
/// Every mode yields the same final state; the checks only read fields set
/// by data retrieval and write disjoint fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FanOutMode {
    /// Run siblings as independent tasks and join them
    #[default]
    Parallel,
    /// Run siblings one at a time, budget check first
    BudgetFirst,
    /// Run siblings one at a time, compliance check first
    ComplianceFirst,
}

impl FanOutMode {
    pub fn is_parallel(&self) -> bool {
        matches!(self, FanOutMode::Parallel)
    }

    /// Arrange a ready batch into execution order
    pub fn order(&self, batch: &mut [StepId]) {
        batch.sort();
        if matches!(self, FanOutMode::ComplianceFirst) {
            batch.reverse();
        }
    }
}
