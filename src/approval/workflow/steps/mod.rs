// SPDX-License-Identifier: MIT

//! Workflow steps
//!
//! Each step reads the accumulated `WorkflowState` and returns a
//! `StateUpdate` holding only the fields it owns:
//! - `IntakeStep` - records the requested project id
//! - `RetrievalStep` - looks up the purchase order
//! - `BudgetCheckStep` / `ComplianceCheckStep` - the two independent checks
//! - `DecisionStep` - combines the checks into a verdict
//! - `VarianceStep` - reports the recorded variance
//! - `SummaryStep` - renders the final disposition

mod budget;
mod compliance;
mod decision;
mod intake;
mod retrieval;
mod summary;
mod variance;

pub use budget::BudgetCheckStep;
pub use compliance::ComplianceCheckStep;
pub use decision::{decide, DecisionStep, BUDGET_EXCEEDED, COMPLIANCE_ISSUE};
pub use intake::IntakeStep;
pub use retrieval::RetrievalStep;
pub use summary::{SummaryStep, APPROVED_SUMMARY};
pub use variance::VarianceStep;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::approval::workflow::state::{StateUpdate, WorkflowState};
use crate::approval::workflow::types::ApprovalRequest;
use crate::error::{ApprovalError, Result};

/// Identifies a step in the approval graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    Intake,
    DataRetrieval,
    BudgetCheck,
    ComplianceCheck,
    Decision,
    VarianceAnalysis,
    Summary,
}

impl StepId {
    /// Every step, in topological order
    pub const ALL: [StepId; 7] = [
        StepId::Intake,
        StepId::DataRetrieval,
        StepId::BudgetCheck,
        StepId::ComplianceCheck,
        StepId::Decision,
        StepId::VarianceAnalysis,
        StepId::Summary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StepId::Intake => "intake",
            StepId::DataRetrieval => "data_retrieval",
            StepId::BudgetCheck => "budget_check",
            StepId::ComplianceCheck => "compliance_check",
            StepId::Decision => "decision",
            StepId::VarianceAnalysis => "variance_analysis",
            StepId::Summary => "summary",
        }
    }

    /// Display metadata for the persona that performs this step
    pub fn persona(&self) -> Persona {
        match self {
            StepId::Intake => Persona {
                name: "Alex",
                role: "User Interface",
                description: "Handles user input and project selection",
                stage: 1,
            },
            StepId::DataRetrieval => Persona {
                name: "Sam",
                role: "Data Retriever",
                description: "Retrieves project data from database",
                stage: 2,
            },
            StepId::BudgetCheck => Persona {
                name: "Mira",
                role: "Budget Analyst",
                description: "Checks if PO amount is within budget",
                stage: 3,
            },
            StepId::ComplianceCheck => Persona {
                name: "Jordan",
                role: "Compliance Officer",
                description: "Verifies supplier compliance",
                stage: 3,
            },
            StepId::Decision => Persona {
                name: "Sam Decision",
                role: "Approval Manager",
                description: "Makes final approval decision",
                stage: 4,
            },
            StepId::VarianceAnalysis => Persona {
                name: "Taylor",
                role: "Financial Analyst",
                description: "Analyzes variance data",
                stage: 5,
            },
            StepId::Summary => Persona {
                name: "Alex Summary",
                role: "Report Generator",
                description: "Generates final summary",
                stage: 6,
            },
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who performs a step, for presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Persona {
    pub name: &'static str,
    pub role: &'static str,
    pub description: &'static str,
    /// Presentation stage; steps that run side by side share a stage
    pub stage: u8,
}

/// A single computation stage of the approval workflow
#[async_trait]
pub trait Step: Send + Sync {
    /// Which node of the graph this step implements
    fn id(&self) -> StepId;

    /// Compute this step's fields from the request and the state so far
    async fn run(&self, request: &ApprovalRequest, state: &WorkflowState) -> Result<StateUpdate>;
}

/// Unwrap an upstream field or report which one is missing
pub(crate) fn require<T>(value: Option<T>, step: StepId, field: &'static str) -> Result<T> {
    value.ok_or_else(|| ApprovalError::precondition(step, field))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_names() {
        let names: Vec<String> = StepId::ALL.iter().map(|s| s.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "intake",
                "data_retrieval",
                "budget_check",
                "compliance_check",
                "decision",
                "variance_analysis",
                "summary"
            ]
        );
    }

    #[test]
    fn test_step_id_serde_matches_display() {
        for step in StepId::ALL {
            let json = serde_json::to_value(step).unwrap();
            assert_eq!(json, serde_json::Value::String(step.to_string()));
        }
    }

    #[test]
    fn test_checks_share_a_stage() {
        assert_eq!(
            StepId::BudgetCheck.persona().stage,
            StepId::ComplianceCheck.persona().stage
        );
        assert_eq!(StepId::Intake.persona().stage, 1);
        assert_eq!(StepId::Summary.persona().stage, 6);
    }

    #[test]
    fn test_require() {
        assert_eq!(require(Some(3), StepId::Decision, "x").unwrap(), 3);
        let err = require::<bool>(None, StepId::Decision, "budget_ok").unwrap_err();
        assert!(matches!(
            err,
            ApprovalError::PreconditionViolation {
                step: StepId::Decision,
                field: "budget_ok"
            }
        ));
    }
}
