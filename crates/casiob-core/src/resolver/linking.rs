//! Linking identifier extraction from entity URIs.

/// Default knowledge-base prefix stripped from linking URIs.
pub const WIKIDATA_ENTITY_PREFIX: &str = "http://www.wikidata.org/entity/";

/// Outcome of extracting an identifier from a linking URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkId {
    /// No URI, or an empty one.
    Absent,
    /// The identifier following the prefix, e.g. `Q64`.
    Id(String),
    /// The URI does not contain the prefix, or nothing follows it.
    Malformed,
}

impl LinkId {
    /// The identifier, if one was found.
    pub fn into_id(self) -> Option<String> {
        match self {
            LinkId::Id(id) => Some(id),
            LinkId::Absent | LinkId::Malformed => None,
        }
    }
}

/// Extracts knowledge-base identifiers by splitting URIs on a fixed prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkResolver {
    prefix: String,
}

impl Default for LinkResolver {
    fn default() -> Self {
        Self::new(WIKIDATA_ENTITY_PREFIX)
    }
}

impl LinkResolver {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the segment between the first occurrence of the prefix and
    /// the next one (or the end of the URI).
    ///
    /// # Examples
    /// ```
    /// use casiob_core::resolver::linking::{LinkId, LinkResolver};
    ///
    /// let links = LinkResolver::default();
    /// assert_eq!(
    ///     links.extract(Some("http://www.wikidata.org/entity/Q64")),
    ///     LinkId::Id("Q64".into())
    /// );
    /// assert_eq!(links.extract(None), LinkId::Absent);
    /// ```
    pub fn extract(&self, uri: Option<&str>) -> LinkId {
        let Some(uri) = uri.filter(|u| !u.is_empty()) else {
            return LinkId::Absent;
        };
        if self.prefix.is_empty() {
            return LinkId::Id(uri.to_string());
        }
        match uri.split(self.prefix.as_str()).nth(1) {
            Some(id) if !id.is_empty() => LinkId::Id(id.to_string()),
            _ => LinkId::Malformed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_wikidata_qid() {
        let links = LinkResolver::default();
        assert_eq!(
            links.extract(Some("http://www.wikidata.org/entity/Q1726")),
            LinkId::Id("Q1726".into())
        );
    }

    #[test]
    fn empty_and_missing_uris_are_absent() {
        let links = LinkResolver::default();
        assert_eq!(links.extract(None), LinkId::Absent);
        assert_eq!(links.extract(Some("")), LinkId::Absent);
        assert_eq!(LinkId::Absent.into_id(), None);
    }

    #[test]
    fn uri_without_prefix_is_malformed() {
        let links = LinkResolver::default();
        assert_eq!(
            links.extract(Some("https://d-nb.info/gnd/118540238")),
            LinkId::Malformed
        );
        assert_eq!(
            links.extract(Some("http://www.wikidata.org/entity/")),
            LinkId::Malformed
        );
    }

    #[test]
    fn repeated_prefix_keeps_first_segment() {
        let links = LinkResolver::default();
        let uri = "http://www.wikidata.org/entity/Q1http://www.wikidata.org/entity/Q2";
        assert_eq!(links.extract(Some(uri)), LinkId::Id("Q1".into()));
    }

    #[test]
    fn custom_prefix() {
        let links = LinkResolver::new("https://d-nb.info/gnd/");
        assert_eq!(
            links.extract(Some("https://d-nb.info/gnd/118540238")),
            LinkId::Id("118540238".into())
        );
    }
}
