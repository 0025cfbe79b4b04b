// SPDX-License-Identifier: MIT

//! Application configuration
//!
//! Configuration is read from a YAML file and then overridden from the
//! environment:
//! - `FINOPS_CONFIG` - config file path (default `finops.yaml`)
//! - `FINOPS_DISALLOWED_SUPPLIERS` - comma-separated supplier list
//! - `FINOPS_DATA` - dataset path
//!
//! A missing or malformed policy is a start-up error, never a per-request one.

mod policy;

pub use policy::CompliancePolicy;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::approval::records::{DatasetLoader, InMemoryRecordStore};
use crate::approval::workflow::graph::FanOutMode;
use crate::error::{ApprovalError, Result};

pub const DEFAULT_CONFIG_FILE: &str = "finops.yaml";
pub const CONFIG_ENV: &str = "FINOPS_CONFIG";
pub const SUPPLIERS_ENV: &str = "FINOPS_DISALLOWED_SUPPLIERS";
pub const DATA_ENV: &str = "FINOPS_DATA";

/// Top-level configuration file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Compliance policy; required, either here or via the environment
    pub policy: Option<PolicyConfig>,
    /// Dataset file; the built-in sample is used when absent
    pub data: Option<PathBuf>,
    /// How the budget and compliance checks are scheduled
    #[serde(default)]
    pub fan_out: FanOutMode,
}

/// Policy section of the config file
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    pub disallowed_suppliers: Vec<String>,
}

impl AppConfig {
    /// Load a config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ApprovalError::config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::parse_yaml(&content)
            .map_err(|e| ApprovalError::config(format!("Invalid {}: {}", path.display(), e)))
    }

    /// Parse a config from a YAML string
    pub fn parse_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Resolve configuration for the binary
    ///
    /// An explicit path (argument or `FINOPS_CONFIG`) must exist; the default
    /// file is optional. Environment overrides are applied last.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let explicit = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::load(DEFAULT_CONFIG_FILE)?,
            None => {
                log::info!("No {} found, using environment only", DEFAULT_CONFIG_FILE);
                Self::default()
            }
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a key lookup (normally the process environment)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(list) = lookup(SUPPLIERS_ENV) {
            let disallowed_suppliers = if list.trim().is_empty() {
                Vec::new()
            } else {
                list.split(',').map(|s| s.to_string()).collect()
            };
            self.policy = Some(PolicyConfig {
                disallowed_suppliers,
            });
        }
        if let Some(data) = lookup(DATA_ENV) {
            self.data = Some(PathBuf::from(data));
        }
    }

    /// Validate and build the compliance policy
    pub fn compliance_policy(&self) -> Result<CompliancePolicy> {
        let policy = self.policy.as_ref().ok_or_else(|| {
            ApprovalError::config(format!(
                "disallowed-supplier policy is not configured (set policy.disallowed_suppliers or {})",
                SUPPLIERS_ENV
            ))
        })?;
        CompliancePolicy::new(&policy.disallowed_suppliers)
    }

    /// Load the configured dataset, falling back to the sample records
    pub fn record_store(&self) -> Result<InMemoryRecordStore> {
        match &self.data {
            Some(path) => {
                let records = DatasetLoader::load(path)?;
                log::info!("Loaded {} records from {}", records.len(), path.display());
                Ok(InMemoryRecordStore::new(records))
            }
            None => {
                log::warn!("No dataset configured, using built-in sample records");
                Ok(InMemoryRecordStore::sample())
            }
        }
    }
}
