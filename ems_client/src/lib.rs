//! Internal modules for the employee management client.
//!
//! This library provides configuration, logging setup, form builder command
//! parsing and the terminal UI used by the ems_client binary.

pub mod commands;
pub mod config;
pub mod logging;
pub mod tui_app;
