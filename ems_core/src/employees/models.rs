//! Employee data models.

use crate::forms::FormTemplateId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Employee ID type
pub type EmployeeId = i64;

/// One filled-in value, keyed by the template field's label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeData {
    pub field_label: String,
    pub field_value: String,
}

impl EmployeeData {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field_label: label.into(),
            field_value: value.into(),
        }
    }
}

/// Employee record as listed by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub form_template: FormTemplateId,
    #[serde(default)]
    pub form_template_name: Option<String>,
    #[serde(default)]
    pub data: Vec<EmployeeData>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Employee {
    /// Value stored under `label`, if any.
    pub fn value(&self, label: &str) -> Option<&str> {
        self.data
            .iter()
            .find(|d| d.field_label == label)
            .map(|d| d.field_value.as_str())
    }

    /// Whether any value contains `needle`, case-insensitively.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.data
            .iter()
            .any(|d| d.field_value.to_lowercase().contains(&needle))
    }
}

/// `POST /employees/` and `PUT /employees/{id}/` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeRequest {
    pub form_template: FormTemplateId,
    pub data: Vec<EmployeeData>,
}
