use std::ffi::{c_int, CString};

use serde::{Deserialize, Serialize};

use super::ffi::{read_c_str, GirBool, RawGirCommand, CRITICAL_SECTION_SIZE};
use crate::error::{GirderError, PersistError};
use crate::persistence::{parse_document, DocumentWriter, Element};

const ELEMENT: &str = "Command";
const COMMENT: &str = "IR Server Suite - Girder plugin command";

/// A Girder action: type ids plus three slots each of string, bool, int and
/// long values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GirderCommand {
    pub name: String,
    pub action_type: i32,
    pub action_subtype: i32,
    pub svalue: [String; 3],
    pub bvalue: [bool; 3],
    pub ivalue: [i32; 3],
    pub lvalue: [i32; 3],
    #[serde(default)]
    pub binary: Vec<u8>,
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Attribute first, then a child element of the same name.
fn field<'a>(element: &'a Element, name: &str) -> Option<&'a str> {
    element
        .attribute(name)
        .or_else(|| element.child(name).map(|c| c.text.as_str()))
}

impl GirderCommand {
    /// Read the first `<Command>` element of `xml`.
    ///
    /// Only malformed XML is an error; every field that is missing or does
    /// not parse keeps its default.
    pub fn from_xml(xml: &str) -> Result<Self, PersistError> {
        let root = parse_document(xml)?;
        let mut cmd = Self::default();
        let Some(element) = root.find(ELEMENT) else {
            log::warn!(target: "girder", "no <{}> element in girder command XML", ELEMENT);
            return Ok(cmd);
        };

        let int = |name: &str| field(element, name).and_then(|v| v.trim().parse::<i32>().ok());
        let boolean = |name: &str| field(element, name).and_then(parse_bool);

        if let Some(name) = element.attribute("Name") {
            cmd.name = name.to_string();
        }
        if let Some(v) = int("ActionType") {
            cmd.action_type = v;
        }
        if let Some(v) = int("ActionSubType") {
            cmd.action_subtype = v;
        }
        for i in 0..3 {
            let n = i + 1;
            if let Some(v) = field(element, &format!("sValue{}", n)) {
                cmd.svalue[i] = v.to_string();
            }
            if let Some(v) = boolean(&format!("bValue{}", n)) {
                cmd.bvalue[i] = v;
            }
            if let Some(v) = int(&format!("iValue{}", n)) {
                cmd.ivalue[i] = v;
            }
            if let Some(v) = int(&format!("lValue{}", n)) {
                cmd.lvalue[i] = v;
            }
        }
        Ok(cmd)
    }

    pub fn to_xml(&self) -> Result<String, PersistError> {
        let mut doc = DocumentWriter::new(
            ELEMENT,
            &[("Name", self.name.as_str()), ("Identifier", "3"), ("Enabled", "TRUE")],
        )?;
        doc.text_element("Comments", COMMENT)?;
        doc.text_element("ActionType", &self.action_type.to_string())?;
        doc.text_element("ActionSubType", &self.action_subtype.to_string())?;
        doc.finish()
    }

    /// Copy a plugin-owned command record. Null yields `None`.
    ///
    /// # Safety
    /// `raw` must be null or point to a valid record whose string pointers
    /// are null or NUL-terminated and whose `binary` holds `size` bytes.
    pub unsafe fn from_raw(raw: *const RawGirCommand) -> Option<Self> {
        let raw = raw.as_ref()?;
        let binary = if raw.binary.is_null() || raw.size <= 0 {
            Vec::new()
        } else {
            std::slice::from_raw_parts(raw.binary, raw.size as usize).to_vec()
        };
        Some(Self {
            name: read_c_str(raw.name),
            action_type: raw.actiontype,
            action_subtype: raw.actionsubtype,
            svalue: [read_c_str(raw.svalue1), read_c_str(raw.svalue2), read_c_str(raw.svalue3)],
            bvalue: [raw.bvalue1 != 0, raw.bvalue2 != 0, raw.bvalue3 != 0],
            ivalue: [raw.ivalue1, raw.ivalue2, raw.ivalue3],
            lvalue: [raw.lvalue1, raw.lvalue2, raw.lvalue3],
            binary,
        })
    }

    /// Build a record a plugin can read for the lifetime of the result.
    pub(crate) fn to_raw(&self) -> Result<OwnedRawCommand, GirderError> {
        let name = CString::new(self.name.as_str())?;
        let svalue = [
            CString::new(self.svalue[0].as_str())?,
            CString::new(self.svalue[1].as_str())?,
            CString::new(self.svalue[2].as_str())?,
        ];
        let mut binary = self.binary.clone();
        let b = |v: bool| v as GirBool;

        let raw = RawGirCommand {
            critical_section: [0; CRITICAL_SECTION_SIZE],
            name: name.as_ptr().cast_mut(),
            actiontype: self.action_type,
            actionsubtype: self.action_subtype,
            svalue1: svalue[0].as_ptr().cast_mut(),
            svalue2: svalue[1].as_ptr().cast_mut(),
            svalue3: svalue[2].as_ptr().cast_mut(),
            bvalue1: b(self.bvalue[0]),
            bvalue2: b(self.bvalue[1]),
            bvalue3: b(self.bvalue[2]),
            ivalue1: self.ivalue[0],
            ivalue2: self.ivalue[1],
            ivalue3: self.ivalue[2],
            lvalue1: self.lvalue[0],
            lvalue2: self.lvalue[1],
            lvalue3: self.lvalue[2],
            binary: if binary.is_empty() {
                std::ptr::null_mut()
            } else {
                binary.as_mut_ptr()
            },
            size: binary.len() as c_int,
        };
        Ok(OwnedRawCommand {
            raw,
            _name: name,
            _svalue: svalue,
            _binary: binary,
        })
    }
}

/// A [`RawGirCommand`] together with the buffers its pointers refer to.
pub(crate) struct OwnedRawCommand {
    pub raw: RawGirCommand,
    _name: CString,
    _svalue: [CString; 3],
    _binary: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_attributes_leniently() {
        let xml = r#"<Girder>
            <Command Name="Volume Up" ActionType="18" ActionSubType="x"
                     sValue1="abc" bValue2="True" bValue3="maybe" iValue1="7" lValue3="-2" />
        </Girder>"#;
        let cmd = GirderCommand::from_xml(xml).unwrap();
        assert_eq!(cmd.name, "Volume Up");
        assert_eq!(cmd.action_type, 18);
        assert_eq!(cmd.action_subtype, 0);
        assert_eq!(cmd.svalue[0], "abc");
        assert_eq!(cmd.bvalue, [false, true, false]);
        assert_eq!(cmd.ivalue, [7, 0, 0]);
        assert_eq!(cmd.lvalue, [0, 0, -2]);
    }

    #[test]
    fn missing_command_element_gives_defaults() {
        assert_eq!(GirderCommand::from_xml("<Girder />").unwrap(), GirderCommand::default());
        assert!(GirderCommand::from_xml("<Girder><Command>").is_err());
    }

    #[test]
    fn written_form_reads_back() {
        let cmd = GirderCommand {
            name: "Mute & Pause".into(),
            action_type: 4,
            action_subtype: 12,
            ..Default::default()
        };
        let xml = cmd.to_xml().unwrap();
        assert!(xml.contains(r#"Identifier="3""#));
        assert!(xml.contains(r#"Enabled="TRUE""#));
        assert!(xml.contains("<Comments>IR Server Suite - Girder plugin command</Comments>"));

        let back = GirderCommand::from_xml(&xml).unwrap();
        assert_eq!(back.name, "Mute & Pause");
        assert_eq!(back.action_type, 4);
        assert_eq!(back.action_subtype, 12);
    }

    #[test]
    fn raw_record_round_trip() {
        let cmd = GirderCommand {
            name: "n".into(),
            action_type: 1,
            action_subtype: 2,
            svalue: ["a".into(), "".into(), "c".into()],
            bvalue: [true, false, true],
            ivalue: [1, 2, 3],
            lvalue: [4, 5, 6],
            binary: vec![9, 8, 7],
        };
        let owned = cmd.to_raw().unwrap();
        let back = unsafe { GirderCommand::from_raw(&owned.raw) }.unwrap();
        assert_eq!(back, cmd);
        assert!(unsafe { GirderCommand::from_raw(std::ptr::null()) }.is_none());
    }

    #[test]
    fn nul_in_string_is_rejected() {
        let cmd = GirderCommand {
            name: "a\0b".into(),
            ..Default::default()
        };
        assert!(matches!(cmd.to_raw(), Err(GirderError::Nul(_))));
    }
}
