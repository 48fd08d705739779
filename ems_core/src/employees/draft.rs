//! Create/edit draft of an employee record.

use super::models::{Employee, EmployeeData, EmployeeId, EmployeeRequest};
use crate::{
    forms::{FieldType, FormField, FormTemplate},
    validation::{ValidationError, looks_like_email, require},
};
use chrono::NaiveDate;

/// Values being entered for one employee against a template.
///
/// Values are kept aligned with the template's fields in display order.
/// In edit mode the template is fixed.
#[derive(Debug, Clone, Default)]
pub struct EmployeeDraft {
    employee_id: Option<EmployeeId>,
    template: Option<FormTemplate>,
    values: Vec<String>,
}

impl EmployeeDraft {
    /// Empty draft for a new employee.
    pub fn new() -> Self {
        Self::default()
    }

    /// Draft editing `employee`, whose data was entered against `template`.
    ///
    /// Stored values are matched to template fields by label; fields with
    /// no stored value start blank.
    pub fn for_employee(employee: &Employee, template: FormTemplate) -> Self {
        let values = template
            .ordered_fields()
            .iter()
            .map(|f| employee.value(&f.label).unwrap_or_default().to_string())
            .collect();

        Self {
            employee_id: Some(employee.id),
            template: Some(template),
            values,
        }
    }

    pub fn is_edit_mode(&self) -> bool {
        self.employee_id.is_some()
    }

    pub fn employee_id(&self) -> Option<EmployeeId> {
        self.employee_id
    }

    pub fn template(&self) -> Option<&FormTemplate> {
        self.template.as_ref()
    }

    /// Pick the template for a new employee, seeding one blank value per field.
    ///
    /// # Errors
    ///
    /// * `ValidationError::InvalidValue` - The draft is editing an existing
    ///   employee; its template cannot change
    pub fn select_template(&mut self, template: FormTemplate) -> Result<(), ValidationError> {
        if self.is_edit_mode() {
            return Err(ValidationError::InvalidValue {
                field: "Form template".to_string(),
                reason: "cannot be changed in edit mode".to_string(),
            });
        }

        self.values = vec![String::new(); template.fields.len()];
        self.template = Some(template);
        Ok(())
    }

    /// Template fields in display order.
    pub fn fields(&self) -> Vec<&FormField> {
        self.template
            .as_ref()
            .map(FormTemplate::ordered_fields)
            .unwrap_or_default()
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn value(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    /// Set the value of the field at `index`. Returns false if out of range.
    pub fn set_value(&mut self, index: usize, value: impl Into<String>) -> bool {
        match self.values.get_mut(index) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    /// Check required fields and per-type value formats.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.template.is_none() {
            return Err(ValidationError::NoTemplate);
        }

        for (field, value) in self.fields().into_iter().zip(&self.values) {
            validate_value(field, value.trim())?;
        }
        Ok(())
    }

    /// Build the create/update request body.
    pub fn to_request(&self) -> Result<EmployeeRequest, ValidationError> {
        self.validate()?;
        let template = self.template.as_ref().ok_or(ValidationError::NoTemplate)?;

        Ok(EmployeeRequest {
            form_template: template.id,
            data: self
                .fields()
                .into_iter()
                .zip(&self.values)
                .map(|(field, value)| EmployeeData::new(field.label.clone(), value.trim()))
                .collect(),
        })
    }
}

fn validate_value(field: &FormField, value: &str) -> Result<(), ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidValue {
        field: field.label.clone(),
        reason: reason.to_string(),
    };

    if field.field_type == FieldType::Checkbox {
        return match value {
            "true" => Ok(()),
            "" | "false" if field.required => Err(ValidationError::Required(field.label.clone())),
            "" | "false" => Ok(()),
            _ => Err(invalid("must be true or false")),
        };
    }

    if value.is_empty() {
        return if field.required {
            require(&field.label, value)
        } else {
            Ok(())
        };
    }

    match field.field_type {
        FieldType::Number if !value.parse::<f64>().is_ok_and(f64::is_finite) => {
            Err(invalid("must be a number"))
        }
        FieldType::Email if !looks_like_email(value) => {
            Err(invalid("not a valid email address"))
        }
        FieldType::Date if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() => {
            Err(invalid("must be a date (YYYY-MM-DD)"))
        }
        FieldType::Select | FieldType::Radio => {
            let options = field.options.as_deref().unwrap_or_default();
            if options.iter().any(|o| o == value) {
                Ok(())
            } else {
                Err(invalid(&format!("must be one of: {}", options.join(", "))))
            }
        }
        _ => Ok(()),
    }
}
