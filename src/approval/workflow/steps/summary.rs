// SPDX-License-Identifier: MIT

//! Summary - the final human-readable disposition

use async_trait::async_trait;

use super::{require, Step, StepId};
use crate::approval::workflow::state::{StateUpdate, WorkflowState};
use crate::approval::workflow::types::ApprovalRequest;
use crate::error::Result;

pub const APPROVED_SUMMARY: &str = "PO validated, budget and compliance passed, variance analyzed.";

pub struct SummaryStep;

#[async_trait]
impl Step for SummaryStep {
    fn id(&self) -> StepId {
        StepId::Summary
    }

    async fn run(&self, _request: &ApprovalRequest, state: &WorkflowState) -> Result<StateUpdate> {
        let approved = require(state.approved(), self.id(), "approved")?;
        require(state.variance(), self.id(), "variance")?;

        let summary = if approved {
            APPROVED_SUMMARY.to_string()
        } else {
            let reason = require(state.reason(), self.id(), "reason")?;
            format!("PO rejected: {}", reason)
        };

        Ok(StateUpdate {
            summary: Some(summary),
            ..Default::default()
        })
    }
}
