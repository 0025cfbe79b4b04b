// SPDX-License-Identifier: MIT

//! Variance analysis - reports the recorded budget variance
//!
//! Runs after the decision whatever its outcome. The record is resolved
//! again from the store rather than carried through the state.

use async_trait::async_trait;
use std::sync::Arc;

use super::retrieval::numeric_column;
use super::{require, Step, StepId};
use crate::approval::records::RecordStore;
use crate::approval::workflow::state::{StateUpdate, WorkflowState};
use crate::approval::workflow::types::ApprovalRequest;
use crate::error::Result;

pub struct VarianceStep {
    store: Arc<dyn RecordStore>,
}

impl VarianceStep {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Step for VarianceStep {
    fn id(&self) -> StepId {
        StepId::VarianceAnalysis
    }

    async fn run(&self, _request: &ApprovalRequest, state: &WorkflowState) -> Result<StateUpdate> {
        let project_id = require(state.project_id(), self.id(), "project_id")?;
        let record = self.store.lookup(project_id).await?;

        Ok(StateUpdate {
            variance: Some(numeric_column(project_id, "variance", &record.variance)?),
            ..Default::default()
        })
    }
}
