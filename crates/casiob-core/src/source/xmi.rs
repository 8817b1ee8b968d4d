//! # UIMA CAS XMI Reader
//!
//! Reads the XMI serialization of a UIMA CAS, as exported by INCEpTION and
//! WebAnno, and selects DKPro sentences, tokens and named entities.
//!
//! Element types are resolved through their XML namespace: an element
//! `NamedEntity` bound to `http:///de/tudarmstadt/ukp/dkpro/core/api/ner/type.ecore`
//! is the UIMA type `de.tudarmstadt.ukp.dkpro.core.api.ner.type.NamedEntity`.

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use tracing::debug;

use crate::error::{CasiobError, Result};
use crate::types::{Document, Entity, Span, Token};

use super::text::{OffsetUnit, SofaText};
use super::typesystem::TypeSystem;
use super::AnnotationSource;

pub const SOFA_TYPE: &str = "uima.cas.Sofa";
pub const SENTENCE_TYPE: &str = "de.tudarmstadt.ukp.dkpro.core.api.segmentation.type.Sentence";
pub const TOKEN_TYPE: &str = "de.tudarmstadt.ukp.dkpro.core.api.segmentation.type.Token";
pub const NAMED_ENTITY_TYPE: &str = "de.tudarmstadt.ukp.dkpro.core.api.ner.type.NamedEntity";

/// Name of the default CAS view.
const INITIAL_VIEW: &str = "_InitialView";

/// An XMI element reduced to its UIMA type name and attributes.
#[derive(Debug)]
struct RawElement {
    type_name: String,
    attrs: HashMap<String, String>,
}

impl RawElement {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    fn offset(&self, name: &'static str) -> Result<usize> {
        let value = self.attr(name).ok_or_else(|| CasiobError::MissingAttribute {
            element: self.type_name.clone(),
            attribute: name,
        })?;
        value.parse().map_err(|_| CasiobError::InvalidOffset {
            element: self.type_name.clone(),
            value: value.to_string(),
        })
    }

    fn span(&self) -> Result<Span> {
        Span::new(self.offset("begin")?, self.offset("end")?)
    }
}

/// Annotation source for UIMA CAS XMI files.
#[derive(Debug, Clone, Default)]
pub struct XmiSource {
    typesystem: TypeSystem,
}

impl XmiSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also select custom subtypes declared in `typesystem`.
    pub fn with_typesystem(mut self, typesystem: TypeSystem) -> Self {
        self.typesystem = typesystem;
        self
    }

    fn is_a(&self, type_name: &str, target: &str) -> bool {
        type_name == target || self.typesystem.is_subtype_of(type_name, target)
    }

    fn read_elements(xml: &str) -> Result<Vec<RawElement>> {
        let mut reader = NsReader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut elements = Vec::new();
        loop {
            let (ns, event) = reader.read_resolved_event()?;
            let package = match ns {
                ResolveResult::Bound(ns) => ecore_package(&String::from_utf8_lossy(ns.as_ref())),
                _ => None,
            };
            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    if let Some(package) = package {
                        elements.push(raw_element(&package, e)?);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(elements)
    }
}

impl AnnotationSource for XmiSource {
    fn name(&self) -> &'static str {
        "xmi"
    }

    fn parse(&self, id: &str, content: &str) -> Result<Document> {
        let elements = Self::read_elements(content)?;

        let sofa = elements
            .iter()
            .filter(|e| e.type_name == SOFA_TYPE)
            .max_by_key(|e| e.attr("sofaID") == Some(INITIAL_VIEW))
            .ok_or(CasiobError::MissingSofa)?;
        let sofa_id = sofa.attr("xmi:id");
        let text = SofaText::new(
            sofa.attr("sofaString").ok_or(CasiobError::MissingSofa)?,
            OffsetUnit::Utf16,
        );

        let in_view = |e: &&RawElement| match (e.attr("sofa"), sofa_id) {
            (Some(view), Some(id)) => view == id,
            _ => true,
        };

        let mut sentences = Vec::new();
        let mut tokens = Vec::new();
        let mut entities = Vec::new();

        for element in elements.iter().filter(in_view) {
            let ty = element.type_name.as_str();
            if self.is_a(ty, SENTENCE_TYPE) {
                sentences.push(element.span()?);
            } else if self.is_a(ty, TOKEN_TYPE) {
                let span = element.span()?;
                let covered = text.covered(span.begin, span.end).ok_or_else(|| {
                    CasiobError::InvalidOffset {
                        element: element.type_name.clone(),
                        value: span.to_string(),
                    }
                })?;
                tokens.push(Token::new(span, covered));
            } else if self.is_a(ty, NAMED_ENTITY_TYPE) {
                let mut entity = Entity::new(element.span()?, element.attr("value").unwrap_or(""));
                if let Some(uri) = element.attr("identifier") {
                    entity = entity.with_linking_uri(uri);
                }
                entities.push(entity);
            }
        }

        debug!(
            document = id,
            sentences = sentences.len(),
            tokens = tokens.len(),
            entities = entities.len(),
            "read XMI document"
        );
        Ok(Document::new(id, sentences, tokens, entities))
    }
}

/// `http:///de/tudarmstadt/ukp/dkpro/core/api/ner/type.ecore` →
/// `de.tudarmstadt.ukp.dkpro.core.api.ner.type`.
fn ecore_package(namespace: &str) -> Option<String> {
    let path = namespace
        .strip_prefix("http:///")?
        .strip_suffix(".ecore")?;
    Some(path.replace('/', "."))
}

fn raw_element(package: &str, e: &BytesStart<'_>) -> Result<RawElement> {
    let local = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
    let mut attrs = HashMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attrs.insert(key, value);
    }
    Ok(RawElement {
        type_name: format!("{package}.{local}"),
        attrs,
    })
}
