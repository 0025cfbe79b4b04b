// SPDX-License-Identifier: MIT

//! Intake - records which project the request is about

use async_trait::async_trait;

use super::{Step, StepId};
use crate::approval::workflow::state::{StateUpdate, WorkflowState};
use crate::approval::workflow::types::ApprovalRequest;
use crate::error::Result;

pub struct IntakeStep;

#[async_trait]
impl Step for IntakeStep {
    fn id(&self) -> StepId {
        StepId::Intake
    }

    async fn run(&self, request: &ApprovalRequest, _state: &WorkflowState) -> Result<StateUpdate> {
        Ok(StateUpdate {
            project_id: Some(request.project_id.clone()),
            ..Default::default()
        })
    }
}
