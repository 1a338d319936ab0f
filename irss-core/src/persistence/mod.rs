//! Macro files on disk.
//!
//! A macro is stored as a small XML document:
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8" standalone="yes"?>
//! <macro>
//! 	<action command="MATHS_ADD" cmdproperty="5|3|result" />
//! </macro>
//! ```
//!
//! Parameters are joined with `|`. Reading splits into exactly `arity` fields,
//! so only the final parameter may contain the separator.

pub mod xml;

use std::fs;
use std::path::Path;

use irss_types::{Command, CommandKind, Macro};

use crate::error::PersistError;

pub use xml::{parse_document, parse_root, DocumentWriter, Element};

pub const PARAMETER_SEPARATOR: char = '|';

const ROOT: &str = "macro";
const ACTION: &str = "action";
const ATTR_COMMAND: &str = "command";
const ATTR_PROPERTY: &str = "cmdproperty";

/// Join a command's parameters into a `cmdproperty` value.
pub fn encode_parameters(index: usize, cmd: &Command) -> Result<String, PersistError> {
    let params = cmd.parameters();
    let last = params.len().saturating_sub(1);
    for (i, param) in params.iter().enumerate() {
        if i < last && param.contains(PARAMETER_SEPARATOR) {
            return Err(PersistError::SeparatorInParameter {
                index,
                kind: cmd.kind(),
                param: i,
            });
        }
    }
    Ok(params.join("|"))
}

/// Split a `cmdproperty` value into exactly `kind.arity()` parameters.
pub fn decode_parameters(kind: CommandKind, property: &str) -> Vec<String> {
    let arity = kind.arity();
    if arity == 0 {
        return Vec::new();
    }
    let mut params: Vec<String> = property
        .splitn(arity, PARAMETER_SEPARATOR)
        .map(str::to_string)
        .collect();
    params.resize(arity, String::new());
    params
}

pub fn to_xml_string(mac: &Macro) -> Result<String, PersistError> {
    let mut doc = DocumentWriter::new(ROOT, &[])?;
    for (index, cmd) in mac.iter().enumerate() {
        let property = encode_parameters(index, cmd)?;
        doc.empty(
            ACTION,
            &[(ATTR_COMMAND, cmd.kind().xml_tag()), (ATTR_PROPERTY, property.as_str())],
        )?;
    }
    doc.finish()
}

/// Parse a macro document. `name` becomes the macro's name.
pub fn from_xml_str(name: &str, xml: &str) -> Result<Macro, PersistError> {
    let root = parse_root(xml, ROOT)?;
    let mut mac = Macro::new(name);

    for element in &root.children {
        if element.name != ACTION {
            log::debug!(target: "persistence", "ignoring <{}> in macro \"{}\"", element.name, name);
            continue;
        }
        let tag = element.attribute(ATTR_COMMAND).ok_or(PersistError::MissingAttribute {
            element: ACTION,
            attribute: ATTR_COMMAND,
        })?;
        let property = element.attribute(ATTR_PROPERTY).ok_or(PersistError::MissingAttribute {
            element: ACTION,
            attribute: ATTR_PROPERTY,
        })?;
        let Some(kind) = CommandKind::from_xml_tag(tag) else {
            log::warn!(target: "persistence", "macro \"{}\": unknown command \"{}\" skipped", name, tag);
            continue;
        };
        mac.push(Command::with_parameters(kind, decode_parameters(kind, property))?);
    }

    Ok(mac)
}

/// Write `mac` to `path`, replacing any existing file only once the new
/// content is fully written.
pub fn write_macro(path: &Path, mac: &Macro) -> Result<(), PersistError> {
    let xml = to_xml_string(mac)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, xml)?;
    fs::rename(&tmp_path, path)?;
    log::debug!(target: "persistence", "wrote {} commands to {}", mac.len(), path.display());
    Ok(())
}

/// Read a macro file; the macro is named after the file stem.
pub fn read_macro(path: &Path) -> Result<Macro, PersistError> {
    let xml = fs::read_to_string(path)?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    from_xml_str(&name, &xml)
}
