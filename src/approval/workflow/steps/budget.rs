// SPDX-License-Identifier: MIT

//! Budget check - is the PO amount within the remaining budget

use async_trait::async_trait;

use super::{require, Step, StepId};
use crate::approval::workflow::state::{StateUpdate, WorkflowState};
use crate::approval::workflow::types::ApprovalRequest;
use crate::error::Result;

pub struct BudgetCheckStep;

#[async_trait]
impl Step for BudgetCheckStep {
    fn id(&self) -> StepId {
        StepId::BudgetCheck
    }

    async fn run(&self, _request: &ApprovalRequest, state: &WorkflowState) -> Result<StateUpdate> {
        let po_amount = require(state.po_amount(), self.id(), "po_amount")?;
        let budget_remaining = require(state.budget_remaining(), self.id(), "budget_remaining")?;

        Ok(StateUpdate {
            budget_ok: Some(po_amount <= budget_remaining),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApprovalError;

    async fn check(po_amount: f64, budget_remaining: f64) -> Option<bool> {
        let mut state = WorkflowState::empty();
        state
            .apply(StateUpdate {
                po_amount: Some(po_amount),
                budget_remaining: Some(budget_remaining),
                ..Default::default()
            })
            .unwrap();
        BudgetCheckStep
            .run(&ApprovalRequest::new("P"), &state)
            .await
            .unwrap()
            .budget_ok
    }

    #[tokio::test]
    async fn test_within_budget() {
        assert_eq!(check(5000.0, 10000.0).await, Some(true));
    }

    #[tokio::test]
    async fn test_exactly_at_budget_passes() {
        assert_eq!(check(10000.0, 10000.0).await, Some(true));
    }

    #[tokio::test]
    async fn test_over_budget() {
        assert_eq!(check(15000.0, 5000.0).await, Some(false));
        assert_eq!(check(10000.01, 10000.0).await, Some(false));
    }

    #[tokio::test]
    async fn test_requires_retrieval_fields() {
        let err = BudgetCheckStep
            .run(&ApprovalRequest::new("P"), &WorkflowState::empty())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApprovalError::PreconditionViolation {
                step: StepId::BudgetCheck,
                field: "po_amount"
            }
        ));
    }
}
