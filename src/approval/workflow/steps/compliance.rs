// SPDX-License-Identifier: MIT

//! Compliance check - is the supplier outside the disallowed set

use async_trait::async_trait;

use super::{require, Step, StepId};
use crate::approval::config::CompliancePolicy;
use crate::approval::workflow::state::{StateUpdate, WorkflowState};
use crate::approval::workflow::types::ApprovalRequest;
use crate::error::Result;

pub struct ComplianceCheckStep {
    policy: CompliancePolicy,
}

impl ComplianceCheckStep {
    pub fn new(policy: CompliancePolicy) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl Step for ComplianceCheckStep {
    fn id(&self) -> StepId {
        StepId::ComplianceCheck
    }

    async fn run(&self, _request: &ApprovalRequest, state: &WorkflowState) -> Result<StateUpdate> {
        let supplier = require(state.supplier(), self.id(), "supplier")?;

        Ok(StateUpdate {
            compliance_ok: Some(!self.policy.is_disallowed(supplier)),
            ..Default::default()
        })
    }
}
