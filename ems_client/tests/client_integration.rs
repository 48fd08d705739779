//! Integration tests for ems_client building blocks.
//!
//! Tests form builder command scripts against the core builder, and
//! file logging setup.

use ems_client::{
    commands::{BuilderCommand, ParseError, parse_command},
    logging,
};
use ems_core::forms::{FieldPatch, FieldType, FormBuilder};

/// Apply a parsed command the way the builder screen does for new forms.
fn apply(builder: &mut FormBuilder, command: BuilderCommand) {
    match command {
        BuilderCommand::Add => {
            builder.add_field();
        }
        BuilderCommand::Remove(index) => {
            let id = builder.id_at(index).unwrap();
            builder.remove_field(id);
        }
        BuilderCommand::Move { from, to } => assert!(builder.move_field(from, to)),
        BuilderCommand::Label { index, label } => {
            let id = builder.id_at(index).unwrap();
            builder.update_field(id, FieldPatch::label(label));
        }
        BuilderCommand::Type { index, field_type } => {
            let id = builder.id_at(index).unwrap();
            builder.update_field(id, FieldPatch::field_type(field_type));
        }
        BuilderCommand::ToggleRequired(index) => {
            let id = builder.id_at(index).unwrap();
            let required = builder.field(id).unwrap().required;
            builder.update_field(id, FieldPatch::required(!required));
        }
        BuilderCommand::Options { index, options } => {
            let id = builder.id_at(index).unwrap();
            builder.update_field(id, FieldPatch::options(options));
        }
        BuilderCommand::Name(name) => builder.set_name(name),
        BuilderCommand::Reset => builder.reset(),
        other => panic!("not a local edit: {other:?}"),
    }
}

fn run_script(script: &[&str]) -> FormBuilder {
    let mut builder = FormBuilder::new();
    for line in script {
        apply(&mut builder, parse_command(line).unwrap());
    }
    builder
}

// ============================================================================
// Command Script Tests
// ============================================================================

#[test]
fn test_script_builds_savable_form() {
    let builder = run_script(&[
        "name Standard Employee",
        "add",
        "label 1 Full Name",
        "req 1",
        "add",
        "label 2 Email",
        "type 2 email",
        "add",
        "label 3 Department",
        "type 3 select",
        "opts 3 Sales, Engineering ,Ops",
    ]);

    let request = builder.to_create_request().unwrap();
    assert_eq!(request.name, "Standard Employee");
    assert_eq!(request.fields.len(), 3);
    assert!(request.fields[0].required);
    assert_eq!(request.fields[1].field_type, FieldType::Email);
    assert_eq!(
        request.fields[2].options.as_deref(),
        Some(&["Sales".to_string(), "Engineering".to_string(), "Ops".to_string()][..])
    );
}

#[test]
fn test_script_moves_keep_orders_contiguous() {
    let builder = run_script(&[
        "add",
        "label 1 A",
        "add",
        "label 2 B",
        "add",
        "label 3 C",
        "mv 3 1",
        "rm 2",
    ]);

    let labels: Vec<_> = builder.fields().iter().map(|f| f.label.as_str()).collect();
    let orders: Vec<_> = builder.fields().iter().map(|f| f.order).collect();
    assert_eq!(labels, vec!["C", "B"]);
    assert_eq!(orders, vec![0, 1]);
}

#[test]
fn test_script_duplicate_labels_rejected() {
    let builder = run_script(&["add", "label 1 Name", "add", "label 2 name"]);

    assert!(builder.validate().is_err());
}

#[test]
fn test_reset_discards_script() {
    let builder = run_script(&["name Temp", "add", "add", "reset"]);

    assert!(builder.is_empty());
    assert_eq!(builder.name(), ems_core::forms::DEFAULT_FORM_NAME);
}

#[test]
fn test_parse_errors_are_readable() {
    let err = parse_command("type 1 colour").unwrap_err();
    assert_eq!(err, ParseError::InvalidFieldType("colour".to_string()));
    assert!(err.to_string().contains("checkbox"));

    let err = parse_command("rm 0").unwrap_err();
    assert!(err.to_string().contains("'rm 2'"));
}

// ============================================================================
// Logging Tests
// ============================================================================

#[test]
fn test_logging_writes_to_file() {
    let dir = std::env::temp_dir().join(format!("ems_client_log_{}", std::process::id()));
    let log_file = dir.join("nested").join("client.log");

    logging::init(&log_file).unwrap();
    tracing::warn!("written from the integration test");

    let contents = std::fs::read_to_string(&log_file).unwrap();
    assert!(contents.contains("written from the integration test"));

    // A second subscriber cannot be installed
    assert!(logging::init(&log_file).is_err());

    let _ = std::fs::remove_dir_all(dir);
}
