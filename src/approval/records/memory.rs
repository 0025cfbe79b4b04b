// SPDX-License-Identifier: MIT

//! In-memory record store

use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::collections::HashSet;

use super::{PurchaseOrderRecord, RecordStore};
use crate::error::{ApprovalError, Result};

/// Dataset used when no data file is configured
pub static SAMPLE_RECORDS: Lazy<Vec<PurchaseOrderRecord>> = Lazy::new(|| {
    vec![
        PurchaseOrderRecord::new("P0001", 5000.0, "IT-001", "VendorX", 10000.0, 0.05),
        PurchaseOrderRecord::new("P0002", 15000.0, "HR-002", "VendorY", 5000.0, 0.15),
        PurchaseOrderRecord::new("P0003", 8000.0, "FIN-003", "VendorY", 20000.0, 0.02),
    ]
});

/// Ordered, read-only table of records
///
/// Lookups scan in table order, so the first row wins when an id repeats.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    records: Vec<PurchaseOrderRecord>,
}

impl InMemoryRecordStore {
    pub fn new(records: Vec<PurchaseOrderRecord>) -> Self {
        for id in duplicate_ids(&records) {
            log::warn!(
                "Project id '{}' appears more than once; the first row will be used",
                id
            );
        }
        Self { records }
    }

    /// Store backed by the built-in sample dataset
    pub fn sample() -> Self {
        Self::new(SAMPLE_RECORDS.clone())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn duplicate_ids(records: &[PurchaseOrderRecord]) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    records
        .iter()
        .map(|r| r.project_id.as_str())
        .filter(|id| !seen.insert(*id) && reported.insert(*id))
        .collect()
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn lookup(&self, project_id: &str) -> Result<PurchaseOrderRecord> {
        self.records
            .iter()
            .find(|r| r.project_id == project_id)
            .cloned()
            .ok_or_else(|| ApprovalError::not_found(project_id))
    }

    async fn project_ids(&self) -> Vec<String> {
        self.records.iter().map(|r| r.project_id.clone()).collect()
    }
}
