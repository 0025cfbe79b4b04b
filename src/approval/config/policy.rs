// SPDX-License-Identifier: MIT

//! Supplier compliance policy

use std::collections::BTreeSet;

use crate::error::{ApprovalError, Result};

/// The disallowed-supplier set
///
/// Matching is exact and case-sensitive. An empty policy disallows nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompliancePolicy {
    disallowed: BTreeSet<String>,
}

impl CompliancePolicy {
    /// Build a policy, rejecting blank supplier names
    pub fn new<I, S>(suppliers: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut disallowed = BTreeSet::new();
        for (i, supplier) in suppliers.into_iter().enumerate() {
            let name = supplier.as_ref().trim();
            if name.is_empty() {
                return Err(ApprovalError::config(format!(
                    "disallowed_suppliers entry {} is blank",
                    i
                )));
            }
            disallowed.insert(name.to_string());
        }
        Ok(Self { disallowed })
    }

    pub fn is_disallowed(&self, supplier: &str) -> bool {
        self.disallowed.contains(supplier)
    }

    /// Disallowed suppliers in sorted order
    pub fn suppliers(&self) -> impl Iterator<Item = &str> {
        self.disallowed.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.disallowed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.disallowed.is_empty()
    }
}
