// SPDX-License-Identifier: MIT

//! Data retrieval - copies the purchase order into the state

use async_trait::async_trait;
use std::sync::Arc;

use super::{require, Step, StepId};
use crate::approval::records::{FieldValue, RecordStore};
use crate::approval::workflow::state::{StateUpdate, WorkflowState};
use crate::approval::workflow::types::ApprovalRequest;
use crate::error::{ApprovalError, Result};

pub struct RetrievalStep {
    store: Arc<dyn RecordStore>,
}

impl RetrievalStep {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

/// Coerce a numeric column or report which one is malformed
pub(super) fn numeric_column(
    project_id: &str,
    field: &'static str,
    value: &FieldValue,
) -> Result<f64> {
    value
        .to_number()
        .ok_or_else(|| ApprovalError::invalid_field(project_id, field, value.to_string()))
}

#[async_trait]
impl Step for RetrievalStep {
    fn id(&self) -> StepId {
        StepId::DataRetrieval
    }

    async fn run(&self, _request: &ApprovalRequest, state: &WorkflowState) -> Result<StateUpdate> {
        let project_id = require(state.project_id(), self.id(), "project_id")?;
        let record = self.store.lookup(project_id).await?;

        Ok(StateUpdate {
            po_amount: Some(numeric_column(
                project_id,
                "po_requested",
                &record.po_requested,
            )?),
            cost_center: Some(record.cost_center),
            supplier: Some(record.supplier),
            budget_remaining: Some(numeric_column(
                project_id,
                "budget_remaining",
                &record.budget_remaining,
            )?),
            ..Default::default()
        })
    }
}
