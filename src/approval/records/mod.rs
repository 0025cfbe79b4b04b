// SPDX-License-Identifier: MIT

//! Purchase-order records and the store they are looked up from
//!
//! This module provides:
//! - `RecordStore` - the lookup interface the workflow reads from
//! - `PurchaseOrderRecord` - one row of the dataset
//! - `InMemoryRecordStore` - an ordered, read-only table
//! - `DatasetLoader` - YAML/JSON dataset files

mod loader;
mod memory;

pub use loader::DatasetLoader;
pub use memory::{InMemoryRecordStore, SAMPLE_RECORDS};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// Read-only keyed table of purchase-order records
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Return the record for `project_id`, or `NotFound`
    async fn lookup(&self, project_id: &str) -> Result<PurchaseOrderRecord>;

    /// All project ids in table order
    async fn project_ids(&self) -> Vec<String>;
}

/// A raw column value as it appears in the dataset
///
/// Numeric columns may arrive as numbers or as numeric text; coercion is
/// left to the steps that read them.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Coerce to a finite number, accepting `$` prefixes and `,` separators
    pub fn to_number(&self) -> Option<f64> {
        let n = match self {
            FieldValue::Number(n) => *n,
            FieldValue::Text(s) => {
                let cleaned: String = s
                    .trim()
                    .trim_start_matches('$')
                    .chars()
                    .filter(|c| *c != ',')
                    .collect();
                cleaned.parse::<f64>().ok()?
            }
        };
        n.is_finite().then_some(n)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

/// One purchase-order row
///
/// Accepts both snake_case keys and the column headers of the original
/// spreadsheet export (`Project_ID`, `PO_Requested`, ...).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PurchaseOrderRecord {
    #[serde(alias = "Project_ID")]
    pub project_id: String,
    #[serde(alias = "PO_Requested", alias = "po_amount")]
    pub po_requested: FieldValue,
    #[serde(alias = "Cost_Center")]
    pub cost_center: String,
    #[serde(alias = "Supplier")]
    pub supplier: String,
    #[serde(alias = "Budget_Remaining")]
    pub budget_remaining: FieldValue,
    #[serde(alias = "Variance")]
    pub variance: FieldValue,
}

impl PurchaseOrderRecord {
    pub fn new(
        project_id: impl Into<String>,
        po_requested: f64,
        cost_center: impl Into<String>,
        supplier: impl Into<String>,
        budget_remaining: f64,
        variance: f64,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            po_requested: po_requested.into(),
            cost_center: cost_center.into(),
            supplier: supplier.into(),
            budget_remaining: budget_remaining.into(),
            variance: variance.into(),
        }
    }
}
