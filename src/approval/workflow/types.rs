// SPDX-License-Identifier: MIT

//! Request and response types at the workflow boundary

use serde::{Deserialize, Serialize};

use crate::approval::workflow::state::WorkflowState;
use crate::error::WorkflowError;

/// An incoming approval request
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApprovalRequest {
    pub project_id: String,
}

impl ApprovalRequest {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
        }
    }
}

/// Result of a completed run
///
/// `reason` is present only when `approved` is false.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApprovalResponse {
    pub project_id: String,
    pub approved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub po_amount: Option<f64>,
    pub cost_center: Option<String>,
    pub supplier: Option<String>,
    pub budget_remaining: Option<f64>,
    pub variance: Option<f64>,
    pub summary: String,
}

impl TryFrom<WorkflowState> for ApprovalResponse {
    type Error = WorkflowError;

    fn try_from(state: WorkflowState) -> Result<Self, Self::Error> {
        let fields = state.into_fields();
        Ok(Self {
            project_id: fields
                .project_id
                .ok_or(WorkflowError::MissingOutput { field: "project_id" })?,
            approved: fields
                .approved
                .ok_or(WorkflowError::MissingOutput { field: "approved" })?,
            reason: fields.reason,
            po_amount: fields.po_amount,
            cost_center: fields.cost_center,
            supplier: fields.supplier,
            budget_remaining: fields.budget_remaining,
            variance: fields.variance,
            summary: fields
                .summary
                .ok_or(WorkflowError::MissingOutput { field: "summary" })?,
        })
    }
}
