//! # irss-types
//!
//! Shared type definitions for the IR Server Suite macro engine.
//! This crate holds plain data used by irss-core and the `irss` binary:
//! commands, macros, the variable store and the editing seam.

pub mod command;
pub mod edit;
mod sequence;
mod variables;

pub use command::{Category, Command, CommandError, CommandKind, Comparison, WINDOW_TARGETS};
pub use edit::{EditOutcome, ParameterEditor};
pub use sequence::Macro;
pub use variables::{canonical_name, VariableList, VARIABLE_PREFIX};
