//! Minimal element tree over quick-xml, shared by every XML document we read
//! or write.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::PersistError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, PersistError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            ..Self::default()
        })
    }

    /// Attribute lookup by exact name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Depth-first search including `self`.
    pub fn find(&self, name: &str) -> Option<&Element> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }
}

/// Parse `xml` and return its root element.
pub fn parse_document(xml: &str) -> Result<Element, PersistError> {
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<Element> = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) => stack.push(Element::from_start(&e)?),
            Event::Empty(e) => {
                let element = Element::from_start(&e)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => return Ok(element),
                }
            }
            Event::Text(t) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&t.unescape()?);
                }
            }
            Event::CData(t) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Event::End(_) => {
                let Some(mut done) = stack.pop() else {
                    return Err(PersistError::MissingRoot);
                };
                // Indentation between child elements.
                if !done.children.is_empty() && done.text.trim().is_empty() {
                    done.text.clear();
                }
                match stack.last_mut() {
                    Some(parent) => parent.children.push(done),
                    None => return Ok(done),
                }
            }
            Event::Eof => return Err(PersistError::MissingRoot),
            _ => {}
        }
    }
}

/// Parse `xml` and check the root element's name.
pub fn parse_root(xml: &str, expected: &'static str) -> Result<Element, PersistError> {
    let root = parse_document(xml)?;
    if root.name != expected {
        return Err(PersistError::UnexpectedRoot {
            expected,
            found: root.name,
        });
    }
    Ok(root)
}

/// Tab-indented UTF-8 document writer with a standalone declaration.
pub struct DocumentWriter {
    writer: Writer<Vec<u8>>,
    root: &'static str,
}

impl DocumentWriter {
    pub fn new(root: &'static str, attributes: &[(&str, &str)]) -> Result<Self, PersistError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b'\t', 1);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), Some("yes"))))?;
        let start = BytesStart::new(root).with_attributes(attributes.iter().copied());
        writer.write_event(Event::Start(start))?;
        Ok(Self { writer, root })
    }

    /// `<name a="..." />`
    pub fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), PersistError> {
        let element = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.writer.write_event(Event::Empty(element))?;
        Ok(())
    }

    /// `<name>text</name>`
    pub fn text_element(&mut self, name: &str, text: &str) -> Result<(), PersistError> {
        self.writer.write_event(Event::Start(BytesStart::new(name)))?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<String, PersistError> {
        self.writer.write_event(Event::End(BytesEnd::new(self.root)))?;
        let bytes = self.writer.into_inner();
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
