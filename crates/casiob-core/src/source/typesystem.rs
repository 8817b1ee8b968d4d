//! UIMA type system descriptions (`TypeSystem.xml`).
//!
//! Only the inheritance hierarchy is read: it lets the XMI reader pick up
//! project-specific subtypes of the DKPro sentence, token and named-entity
//! types.

use std::collections::HashMap;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

use crate::error::Result;

/// Type name → supertype name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeSystem {
    supertypes: HashMap<String, String>,
}

impl TypeSystem {
    /// Read a type system description from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let xml = std::fs::read_to_string(path.as_ref())?;
        let ts = Self::parse(&xml)?;
        debug!(path = %path.as_ref().display(), types = ts.len(), "loaded type system");
        Ok(ts)
    }

    /// Parse a `typeSystemDescription` document.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut supertypes = HashMap::new();
        let mut path: Vec<String> = Vec::new();
        let mut name = None;
        let mut supertype = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    path.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                }
                Event::End(_) => {
                    if path.last().is_some_and(|p| p == "typeDescription") {
                        if let (Some(n), Some(s)) = (name.take(), supertype.take()) {
                            supertypes.insert(n, s);
                        }
                        name = None;
                        supertype = None;
                    }
                    path.pop();
                }
                Event::Text(t) => {
                    let text = t.unescape()?.trim().to_string();
                    match path.as_slice() {
                        [.., parent, field] if parent == "typeDescription" => match field.as_str() {
                            "name" => name = Some(text),
                            "supertypeName" => supertype = Some(text),
                            _ => {}
                        },
                        _ => {}
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(Self { supertypes })
    }

    pub fn len(&self) -> usize {
        self.supertypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.supertypes.is_empty()
    }

    pub fn supertype(&self, type_name: &str) -> Option<&str> {
        self.supertypes.get(type_name).map(String::as_str)
    }

    /// `true` if `type_name` is `ancestor` or inherits from it.
    pub fn is_subtype_of(&self, type_name: &str, ancestor: &str) -> bool {
        let mut current = type_name;
        // Bounded walk; a cyclic description must not hang the reader.
        for _ in 0..=self.supertypes.len() {
            if current == ancestor {
                return true;
            }
            match self.supertype(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
        false
    }
}
