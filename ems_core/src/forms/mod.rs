//! Dynamic form templates.
//!
//! A [`FormTemplate`] is an admin-defined schema of fields; employee records
//! are filled in against one. [`FormBuilder`] is the editable, ordered
//! draft behind the form builder screen.

pub mod builder;
pub mod models;

pub use builder::{DraftField, FieldPatch, FormBuilder, DEFAULT_FIELD_LABEL, DEFAULT_FORM_NAME};
pub use models::{
    CreateTemplateRequest, FieldId, FieldOrder, FieldType, FormField, FormTemplate,
    FormTemplateId, NewField, ParseFieldTypeError,
};
