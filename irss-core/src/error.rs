use std::io;
use std::path::PathBuf;

use irss_types::CommandKind;

use crate::girder::PluginState;

/// Failure of a single command's own semantics.
#[derive(Debug, thiserror::Error)]
pub enum ExecuteError {
    #[error("{kind}: division by zero")]
    DivideByZero { kind: CommandKind },

    #[error("unknown comparison \"{0}\"")]
    UnknownComparison(String),
}

/// Failure while a host carries out a side effect.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("{0} is not supported by this host")]
    Unsupported(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Failure of a macro run.
#[derive(Debug, thiserror::Error)]
pub enum MacroError {
    #[error("step {index}: label \"{label}\" not found")]
    LabelNotFound { label: String, index: usize },

    #[error("macro exceeded {0} steps")]
    StepLimit(usize),

    #[error("step {index}: {source}")]
    Execute {
        index: usize,
        #[source]
        source: ExecuteError,
    },

    #[error("step {index}: {source}")]
    Host {
        index: usize,
        #[source]
        source: HostError,
    },
}

/// Errors reading or writing XML documents.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("expected <{expected}> root element, found <{found}>")]
    UnexpectedRoot { expected: &'static str, found: String },

    #[error("document has no root element")]
    MissingRoot,

    #[error("<{element}> is missing the \"{attribute}\" attribute")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error(transparent)]
    Command(#[from] irss_types::CommandError),

    #[error("step {index} ({kind}): parameter {param} contains the '|' separator")]
    SeparatorInParameter {
        index: usize,
        kind: CommandKind,
        param: usize,
    },
}

/// Errors from the macro folder.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("invalid macro name \"{0}\"")]
    InvalidName(String),

    #[error("macro \"{0}\" not found")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Run(#[from] MacroError),
}

/// Errors from loading or driving a native Girder plugin.
#[derive(Debug, thiserror::Error)]
pub enum GirderError {
    #[error("empty plugin file name")]
    EmptyPath,

    #[error("failed to load girder plugin ({path}): {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("girder plugin is missing the {0} export")]
    MissingExport(&'static str),

    #[error("plugin requires newer API version ({requested}, host supports {supported})")]
    ApiTooNew { requested: i32, supported: i32 },

    #[error("cannot {operation} a plugin that is {state}")]
    InvalidState {
        operation: &'static str,
        state: PluginState,
    },

    #[error("another girder plugin is already open")]
    HostBusy,

    #[error("string contains a NUL byte: {0}")]
    Nul(#[from] std::ffi::NulError),

    #[error(transparent)]
    Persist(#[from] PersistError),
}
