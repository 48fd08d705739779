//! Employee records.
//!
//! An employee is a bag of `{field_label, field_value}` pairs filled in
//! against a form template. This module has the wire models, the
//! create/edit draft, and the debounced, searchable list.

pub mod debounce;
pub mod draft;
pub mod list;
pub mod models;

pub use debounce::Debouncer;
pub use draft::EmployeeDraft;
pub use list::{DELETE_SUCCESS_MESSAGE, EmployeeDirectory, EmployeeList, ListEvent};
pub use models::{Employee, EmployeeData, EmployeeId, EmployeeRequest};
