// SPDX-License-Identifier: MIT

//! Dataset loader - YAML/JSON record files

use std::fs;
use std::path::Path;

use super::PurchaseOrderRecord;
use crate::error::{ApprovalError, Result};

/// Loads purchase-order tables from disk
pub struct DatasetLoader;

impl DatasetLoader {
    /// Load a dataset, choosing the format from the file extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<PurchaseOrderRecord>> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::parse_json(&content),
            Some("yaml") | Some("yml") => Self::parse_yaml(&content),
            _ => Err(ApprovalError::config(format!(
                "Unsupported dataset format: {}",
                path.display()
            ))),
        }
    }

    pub fn parse_yaml(content: &str) -> Result<Vec<PurchaseOrderRecord>> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn parse_json(content: &str) -> Result<Vec<PurchaseOrderRecord>> {
        Ok(serde_json::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approval::records::FieldValue;
    use std::io::Write;

    #[test]
    fn test_parse_yaml_dataset() {
        let yaml = r#"
- project_id: P0001
  po_requested: 5000
  cost_center: IT-001
  supplier: VendorX
  budget_remaining: 10000
  variance: 0.05
- Project_ID: P0002
  PO_Requested: "15,000"
  Cost_Center: HR-002
  Supplier: VendorY
  Budget_Remaining: 5000
  Variance: 0.15
"#;
        let records = DatasetLoader::parse_yaml(yaml).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].project_id, "P0001");
        assert_eq!(records[1].po_requested, FieldValue::from("15,000"));
    }

    #[test]
    fn test_parse_json_dataset() {
        let json = r#"[{"project_id": "P0003", "po_requested": 8000, "cost_center": "FIN-003",
                        "supplier": "VendorY", "budget_remaining": 20000, "variance": 0.02}]"#;
        let records = DatasetLoader::parse_json(json).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].variance, FieldValue::Number(0.02));
    }

    #[test]
    fn test_missing_column_is_error() {
        let yaml = r#"
- project_id: P0001
  po_requested: 5000
"#;
        assert!(matches!(
            DatasetLoader::parse_yaml(yaml),
            Err(ApprovalError::Yaml(_))
        ));
    }

    #[test]
    fn test_load_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"project_id": "P0001", "po_requested": 1, "cost_center": "c",
                 "supplier": "s", "budget_remaining": 2, "variance": 0}}]"#
        )
        .unwrap();

        let records = DatasetLoader::load(file.path()).unwrap();
        assert_eq!(records[0].project_id, "P0001");
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        assert!(matches!(
            DatasetLoader::load(file.path()),
            Err(ApprovalError::Config(_))
        ));
    }
}
