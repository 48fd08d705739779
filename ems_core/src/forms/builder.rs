//! Form builder state.
//!
//! An ordered list of draft fields. Every operation that changes the
//! sequence renumbers `order` from position, so orders are always `0..n`
//! with no gaps regardless of what the caller passed in.

use super::models::{
    CreateTemplateRequest, FieldId, FieldOrder, FieldType, FormTemplate, FormTemplateId, NewField,
};
use crate::validation::{ValidationError, require};
use std::collections::HashSet;
use uuid::Uuid;

/// Name a fresh builder starts with.
pub const DEFAULT_FORM_NAME: &str = "New Employee Form";

/// Label given to newly added fields.
pub const DEFAULT_FIELD_LABEL: &str = "New Field";

/// A field being edited in the builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftField {
    /// Client-side identity, stable across edits and moves
    pub id: Uuid,
    /// Backend id once the field has been saved
    pub server_id: Option<FieldId>,
    pub label: String,
    pub field_type: FieldType,
    pub required: bool,
    pub options: Vec<String>,
    pub order: i32,
}

impl DraftField {
    fn new(order: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            server_id: None,
            label: DEFAULT_FIELD_LABEL.to_string(),
            field_type: FieldType::Text,
            required: false,
            options: Vec::new(),
            order,
        }
    }
}

/// Partial update applied by [`FormBuilder::update_field`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPatch {
    pub label: Option<String>,
    pub field_type: Option<FieldType>,
    pub required: Option<bool>,
    pub options: Option<Vec<String>>,
}

impl FieldPatch {
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    pub fn field_type(field_type: FieldType) -> Self {
        Self {
            field_type: Some(field_type),
            ..Self::default()
        }
    }

    pub fn required(required: bool) -> Self {
        Self {
            required: Some(required),
            ..Self::default()
        }
    }

    pub fn options(options: Vec<String>) -> Self {
        Self {
            options: Some(options),
            ..Self::default()
        }
    }
}

/// Form builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormBuilder {
    name: String,
    fields: Vec<DraftField>,
    /// Set when editing the order of an already-saved template
    template_id: Option<FormTemplateId>,
}

impl Default for FormBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FormBuilder {
    pub fn new() -> Self {
        Self {
            name: DEFAULT_FORM_NAME.to_string(),
            fields: Vec::new(),
            template_id: None,
        }
    }

    /// Start from a saved template, in its stored order.
    pub fn from_template(template: &FormTemplate) -> Self {
        let mut builder = Self {
            name: template.name.clone(),
            fields: template
                .ordered_fields()
                .into_iter()
                .map(|f| DraftField {
                    id: Uuid::new_v4(),
                    server_id: Some(f.id),
                    label: f.label.clone(),
                    field_type: f.field_type,
                    required: f.required,
                    options: f.options.clone().unwrap_or_default(),
                    order: f.order,
                })
                .collect(),
            template_id: Some(template.id),
        };
        builder.renumber();
        builder
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn fields(&self) -> &[DraftField] {
        &self.fields
    }

    pub fn field(&self, id: Uuid) -> Option<&DraftField> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Id of the field at `index`, if any.
    pub fn id_at(&self, index: usize) -> Option<Uuid> {
        self.fields.get(index).map(|f| f.id)
    }

    pub fn template_id(&self) -> Option<FormTemplateId> {
        self.template_id
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Append a default text field and return its id.
    pub fn add_field(&mut self) -> Uuid {
        let field = DraftField::new(self.fields.len() as i32);
        let id = field.id;
        self.fields.push(field);
        id
    }

    /// Apply `patch` to the field with `id`. Returns false if no such field.
    pub fn update_field(&mut self, id: Uuid, patch: FieldPatch) -> bool {
        let Some(field) = self.fields.iter_mut().find(|f| f.id == id) else {
            return false;
        };

        if let Some(label) = patch.label {
            field.label = label;
        }
        if let Some(field_type) = patch.field_type {
            field.field_type = field_type;
        }
        if let Some(required) = patch.required {
            field.required = required;
        }
        if let Some(options) = patch.options {
            field.options = options;
        }
        true
    }

    /// Remove the field with `id`. Returns false if no such field.
    pub fn remove_field(&mut self, id: Uuid) -> bool {
        let before = self.fields.len();
        self.fields.retain(|f| f.id != id);
        let removed = self.fields.len() != before;
        if removed {
            self.renumber();
        }
        removed
    }

    /// Replace the whole sequence (e.g. after a drag), renumbering from position.
    pub fn reorder_fields(&mut self, fields: Vec<DraftField>) {
        self.fields = fields;
        self.renumber();
    }

    /// Move the field at `from` to `to`, shifting the others.
    ///
    /// Returns false (and changes nothing) if either index is out of range.
    pub fn move_field(&mut self, from: usize, to: usize) -> bool {
        if from >= self.fields.len() || to >= self.fields.len() {
            return false;
        }

        let mut fields = self.fields.clone();
        let moved = fields.remove(from);
        fields.insert(to, moved);
        self.reorder_fields(fields);
        true
    }

    /// Back to an empty, unsaved form.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Check the draft can be saved as a new template.
    ///
    /// # Errors
    ///
    /// * `ValidationError::Required` - Blank form name or field label
    /// * `ValidationError::DuplicateLabel` - Labels key employee data, so
    ///   they must be unique
    /// * `ValidationError::InvalidValue` - No fields, or a select/radio
    ///   field without options
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("Form name", &self.name)?;
        if self.fields.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "Form".to_string(),
                reason: "add at least one field".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            require("Field label", &field.label)?;
            if !seen.insert(field.label.trim().to_lowercase()) {
                return Err(ValidationError::DuplicateLabel(field.label.clone()));
            }
            if field.field_type.has_options() && field.options.is_empty() {
                return Err(ValidationError::InvalidValue {
                    field: field.label.clone(),
                    reason: format!("a {} field needs options", field.field_type),
                });
            }
        }
        Ok(())
    }

    /// Build the create request for this draft.
    pub fn to_create_request(&self) -> Result<CreateTemplateRequest, ValidationError> {
        self.validate()?;

        Ok(CreateTemplateRequest {
            name: self.name.trim().to_string(),
            fields: self
                .fields
                .iter()
                .map(|f| NewField {
                    label: f.label.trim().to_string(),
                    field_type: f.field_type,
                    required: f.required,
                    options: f.field_type.has_options().then(|| f.options.clone()),
                    order: f.order,
                })
                .collect(),
        })
    }

    /// `{id, order}` pairs for every field that exists on the backend.
    pub fn field_orders(&self) -> Vec<FieldOrder> {
        self.fields
            .iter()
            .filter_map(|f| {
                f.server_id.map(|id| FieldOrder {
                    id,
                    order: f.order,
                })
            })
            .collect()
    }

    fn renumber(&mut self) {
        for (index, field) in self.fields.iter_mut().enumerate() {
            field.order = index as i32;
        }
    }
}
