// SPDX-License-Identifier: MIT

//! Decision - combines the two checks into a verdict

use async_trait::async_trait;

use super::{require, Step, StepId};
use crate::approval::workflow::state::{StateUpdate, WorkflowState};
use crate::approval::workflow::types::ApprovalRequest;
use crate::error::Result;

pub const BUDGET_EXCEEDED: &str = "Budget exceeded";
pub const COMPLIANCE_ISSUE: &str = "Compliance issue";

/// Rejection reason for a pair of check outcomes, or `None` to approve
///
/// A budget failure is reported ahead of a compliance failure; when both
/// fail only the budget reason is given.
pub fn decide(budget_ok: bool, compliance_ok: bool) -> Option<&'static str> {
    if !budget_ok {
        Some(BUDGET_EXCEEDED)
    } else if !compliance_ok {
        Some(COMPLIANCE_ISSUE)
    } else {
        None
    }
}

pub struct DecisionStep;

#[async_trait]
impl Step for DecisionStep {
    fn id(&self) -> StepId {
        StepId::Decision
    }

    async fn run(&self, _request: &ApprovalRequest, state: &WorkflowState) -> Result<StateUpdate> {
        let budget_ok = require(state.budget_ok(), self.id(), "budget_ok")?;
        let compliance_ok = require(state.compliance_ok(), self.id(), "compliance_ok")?;

        let reason = decide(budget_ok, compliance_ok);
        Ok(StateUpdate {
            approved: Some(reason.is_none()),
            reason: reason.map(str::to_string),
            ..Default::default()
        })
    }
}
