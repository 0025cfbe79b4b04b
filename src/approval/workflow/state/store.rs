// SPDX-License-Identifier: MIT

//! Runtime state storage for an approval run

use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;

/// A partial set of workflow fields produced by one step
///
/// Every field is optional; a step fills in only what it owns.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct StateUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub po_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_center: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_remaining: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_ok: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance_ok: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl StateUpdate {
    /// Names of the fields this update sets
    pub fn field_names(&self) -> Vec<&'static str> {
        let present = [
            ("project_id", self.project_id.is_some()),
            ("po_amount", self.po_amount.is_some()),
            ("cost_center", self.cost_center.is_some()),
            ("supplier", self.supplier.is_some()),
            ("budget_remaining", self.budget_remaining.is_some()),
            ("budget_ok", self.budget_ok.is_some()),
            ("compliance_ok", self.compliance_ok.is_some()),
            ("approved", self.approved.is_some()),
            ("reason", self.reason.is_some()),
            ("variance", self.variance.is_some()),
            ("summary", self.summary.is_some()),
        ];
        present
            .into_iter()
            .filter(|(_, set)| *set)
            .map(|(name, _)| name)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.field_names().is_empty()
    }
}

/// Accumulated state threaded through one run
///
/// Fields are write-once: `apply` refuses any update that touches a field
/// an earlier step already set, and leaves the state untouched when it does.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct WorkflowState {
    fields: StateUpdate,
}

impl WorkflowState {
    /// Create an empty state for a new run
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge a step's update into the state
    pub fn apply(&mut self, update: StateUpdate) -> Result<(), WorkflowError> {
        let current = self.fields.field_names();
        if let Some(field) = update
            .field_names()
            .into_iter()
            .find(|name| current.contains(name))
        {
            return Err(WorkflowError::FieldAlreadySet { field });
        }

        let f = &mut self.fields;
        f.project_id = f.project_id.take().or(update.project_id);
        f.po_amount = f.po_amount.or(update.po_amount);
        f.cost_center = f.cost_center.take().or(update.cost_center);
        f.supplier = f.supplier.take().or(update.supplier);
        f.budget_remaining = f.budget_remaining.or(update.budget_remaining);
        f.budget_ok = f.budget_ok.or(update.budget_ok);
        f.compliance_ok = f.compliance_ok.or(update.compliance_ok);
        f.approved = f.approved.or(update.approved);
        f.reason = f.reason.take().or(update.reason);
        f.variance = f.variance.or(update.variance);
        f.summary = f.summary.take().or(update.summary);
        Ok(())
    }

    pub fn project_id(&self) -> Option<&str> {
        self.fields.project_id.as_deref()
    }

    pub fn po_amount(&self) -> Option<f64> {
        self.fields.po_amount
    }

    pub fn cost_center(&self) -> Option<&str> {
        self.fields.cost_center.as_deref()
    }

    pub fn supplier(&self) -> Option<&str> {
        self.fields.supplier.as_deref()
    }

    pub fn budget_remaining(&self) -> Option<f64> {
        self.fields.budget_remaining
    }

    pub fn budget_ok(&self) -> Option<bool> {
        self.fields.budget_ok
    }

    pub fn compliance_ok(&self) -> Option<bool> {
        self.fields.compliance_ok
    }

    pub fn approved(&self) -> Option<bool> {
        self.fields.approved
    }

    pub fn reason(&self) -> Option<&str> {
        self.fields.reason.as_deref()
    }

    pub fn variance(&self) -> Option<f64> {
        self.fields.variance
    }

    pub fn summary(&self) -> Option<&str> {
        self.fields.summary.as_deref()
    }

    /// Convert state to a JSON object holding only the populated fields
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.fields).unwrap_or_default()
    }

    /// Consume the state, returning its fields
    pub fn into_fields(self) -> StateUpdate {
        self.fields
    }
}
