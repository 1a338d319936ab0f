//! # irss-core
//!
//! Macro engine for IR Server Suite: variable substitution, command
//! execution, the macro processor, XML persistence and a wrapper for legacy
//! Girder plugins.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use irss_core::config::Config;
//! use irss_core::host::SystemHost;
//! use irss_core::library::MacroLibrary;
//! use irss_core::processor::Processor;
//! use irss_types::VariableList;
//!
//! let config = Config::load();
//! let library = MacroLibrary::new(config.macro_folder());
//! let processor = Processor::from_config(&config);
//!
//! let mut vars = VariableList::new();
//! let summary = library.run("Power On", &mut vars, &mut SystemHost::new(), &processor)?;
//! ```
//!
//! ## Module Overview
//!
//! - [`substitute`]: `var_NAME` and `%NAME%` resolution against a `VariableList`
//! - [`execute`]: single-command execution producing jumps and deferred side effects
//! - [`host`]: `SideEffect`, the `Host` trait, `SystemHost` and `DryRunHost`
//! - [`processor`]: runs a `Macro` with label resolution and a step ceiling
//! - [`persistence`]: macro XML files
//! - [`library`]: a folder of `.Macro` files
//! - [`mappings`]: multi-mapping set names
//! - [`girder`]: native Girder 3.x plugin wrapper
//! - [`config`]: TOML configuration with user overrides
//! - [`paths`]: platform directories

pub mod config;
pub mod error;
pub mod execute;
pub mod girder;
pub mod host;
pub mod library;
pub mod mappings;
pub mod paths;
pub mod persistence;
pub mod processor;
pub mod substitute;

pub use error::{ExecuteError, GirderError, HostError, LibraryError, MacroError, PersistError};
pub use execute::{execute_command, Flow};
pub use host::{DryRunHost, Host, SideEffect, SystemHost};
pub use library::MacroLibrary;
pub use processor::{Processor, RunSummary};
