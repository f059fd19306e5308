//! Command-line support for the typesub binary.

pub mod args;
pub mod commands;
pub mod config;
pub mod tracing_config;

#[cfg(test)]
#[path = "../tests/args_tests.rs"]
mod args_tests;
#[cfg(test)]
#[path = "../tests/commands_tests.rs"]
mod commands_tests;
#[cfg(test)]
#[path = "../tests/config_tests.rs"]
mod config_tests;
