//! Multi-mapping sets: the ordered list of button-mapping set names a remote
//! can cycle through.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PersistError;
use crate::persistence::{parse_root, DocumentWriter};

pub const MAPPINGS_VERSION: u32 = 4;

const ROOT: &str = "MultiMappings";
const ENTRY: &str = "string";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiMappings {
    pub names: Vec<String>,
}

impl MultiMappings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(&self) -> u32 {
        MAPPINGS_VERSION
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.names.iter()
    }

    pub fn push(&mut self, name: impl Into<String>) {
        self.names.push(name.into());
    }

    /// Load from `path`. A missing or unreadable file yields an empty list.
    pub fn load(path: &Path) -> Self {
        let xml = match fs::read_to_string(path) {
            Ok(xml) => xml,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::warn!(
                    target: "mappings",
                    "No multi mapping file found ({}), creating new MultiMappings",
                    path.display()
                );
                return Self::new();
            }
            Err(e) => {
                log::error!(target: "mappings", "{}: {}", path.display(), e);
                log::warn!(
                    target: "mappings",
                    "Failed to load multi mapping file ({}), creating new MultiMappings",
                    path.display()
                );
                return Self::new();
            }
        };
        match Self::from_xml_str(&xml) {
            Ok(mappings) => mappings,
            Err(e) => {
                log::error!(target: "mappings", "{}: {}", path.display(), e);
                log::warn!(
                    target: "mappings",
                    "Failed to load multi mapping file ({}), creating new MultiMappings",
                    path.display()
                );
                Self::new()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), PersistError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_xml_string()?)?;
        Ok(())
    }

    pub fn from_xml_str(xml: &str) -> Result<Self, PersistError> {
        let root = parse_root(xml, ROOT)?;
        if let Some(version) = root.attribute("Version") {
            if version.trim() != MAPPINGS_VERSION.to_string() {
                log::warn!(target: "mappings", "multi mapping file version {} read as {}", version, MAPPINGS_VERSION);
            }
        }
        let names = root
            .children
            .iter()
            .filter(|c| c.name == ENTRY)
            .map(|c| c.text.clone())
            .collect();
        Ok(Self { names })
    }

    pub fn to_xml_string(&self) -> Result<String, PersistError> {
        let version = MAPPINGS_VERSION.to_string();
        let mut doc = DocumentWriter::new(ROOT, &[("Version", version.as_str())])?;
        for name in &self.names {
            doc.text_element(ENTRY, name)?;
        }
        doc.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mappings = MultiMappings::load(&dir.path().join("MultiMapping.xml"));
        assert!(mappings.is_empty());
        assert_eq!(mappings.version(), 4);
    }

    #[test]
    fn malformed_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("MultiMapping.xml");
        std::fs::write(&path, "<MultiMappings><string>half").unwrap();
        assert!(MultiMappings::load(&path).is_empty());

        std::fs::write(&path, "<macro />").unwrap();
        assert!(MultiMappings::load(&path).is_empty());
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg").join("MultiMapping.xml");
        let mut mappings = MultiMappings::new();
        mappings.push("TV & Radio");
        mappings.push(" Music ");
        mappings.save(&path).unwrap();

        let xml = std::fs::read_to_string(&path).unwrap();
        assert!(xml.contains(r#"<MultiMappings Version="4">"#));
        assert!(xml.contains("<string>TV &amp; Radio</string>"));
        assert!(xml.contains("<string> Music </string>"));

        assert_eq!(MultiMappings::load(&path), mappings);
    }

    #[test]
    fn reads_serializer_output() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<MultiMappings xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:xsd="http://www.w3.org/2001/XMLSchema" Version="4">
  <string>Default</string>
  <string>DVD</string>
</MultiMappings>"#;
        let mappings = MultiMappings::from_xml_str(xml).unwrap();
        assert_eq!(mappings.names, vec!["Default", "DVD"]);
    }
}
