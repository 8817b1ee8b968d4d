//! # Tag Resolution
//!
//! Turns the possibly overlapping entity annotations of a sentence into one
//! row of tags per token.
//!
//! For each token the covering entities are collected and their outer extent
//! (smallest begin, largest end) is computed. Every covering entity then gets
//! a role:
//!
//! - labels starting with `COMP` are components, whatever their span;
//! - an entity spanning exactly the outer extent is the primary entity and
//!   yields the coarse and fine tags plus the linking id;
//! - anything else is nested.
//!
//! The roles are folded into a single [`ResolvedTag`]. Tokens whose covering
//! entities cannot be resolved cleanly are still emitted and reported as
//! [`Anomaly`] values.

use tracing::{debug, trace};

use crate::error::{CasiobError, Result};
use crate::resolver::bio_tags::BioTag;
use crate::resolver::linking::{LinkId, LinkResolver};
use crate::types::anomaly::push_deduplicated;
use crate::types::{
    Anomaly, AnomalyKind, Document, DocumentTags, Entity, ResolvedTag, SentenceTags, Span, Token,
};

/// How a covering entity relates to one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    /// Spans the outer extent of the token's covering entities.
    Primary,
    /// Strictly inside the outer extent.
    Nested,
    /// A `COMP` entity.
    Component,
}

/// Token-independent facts about an entity, computed once per sentence.
#[derive(Debug)]
struct Candidate<'a> {
    entity: &'a Entity,
    link: LinkId,
}

impl Candidate<'_> {
    fn span(&self) -> Span {
        self.entity.span
    }

    fn role(&self, extent: Span) -> Role {
        if self.entity.is_component() {
            Role::Component
        } else if self.entity.span == extent {
            Role::Primary
        } else {
            Role::Nested
        }
    }
}

/// Role assignments of one token, built by folding over its covering entities.
#[derive(Debug, Default)]
struct Roles<'c, 'a> {
    primaries: Vec<&'c Candidate<'a>>,
    nested: Option<&'c Candidate<'a>>,
    component: Option<&'c Candidate<'a>>,
}

impl<'c, 'a> Roles<'c, 'a> {
    fn assign(mut self, role: Role, candidate: &'c Candidate<'a>) -> Self {
        match role {
            Role::Primary => self.primaries.push(candidate),
            // The widest nested entity is the level directly below the primary.
            Role::Nested => {
                if self
                    .nested
                    .is_none_or(|n| candidate.span().len() > n.span().len())
                {
                    self.nested = Some(candidate);
                }
            }
            Role::Component => {
                if self
                    .component
                    .is_none_or(|c| candidate.span().len() < c.span().len())
                {
                    self.component = Some(candidate);
                }
            }
        }
        self
    }

    /// Longest label wins; equal lengths keep document order.
    fn primary(&self) -> Option<&'c Candidate<'a>> {
        self.primaries.iter().copied().fold(None, |best, c| match best {
            Some(b) if b.entity.label.len() >= c.entity.label.len() => Some(b),
            _ => Some(c),
        })
    }
}

/// Resolves sentences into per-token tag rows.
#[derive(Debug, Clone, Default)]
pub struct TagResolver {
    links: LinkResolver,
}

impl TagResolver {
    /// Create a resolver using the given linking-URI prefix handling.
    pub fn new(links: LinkResolver) -> Self {
        Self { links }
    }

    /// Resolve every sentence of `document`, in sentence order.
    ///
    /// # Errors
    ///
    /// Fails on structural violations: tokens outside every sentence or
    /// reversed spans.
    pub fn resolve_document(&self, document: &Document) -> Result<DocumentTags> {
        let groups = document.sentence_groups()?;
        let mut sentences = Vec::with_capacity(groups.len());
        for group in &groups {
            sentences.push(self.resolve(
                &document.id,
                group.span,
                &group.tokens,
                &group.entities,
            )?);
        }
        Ok(DocumentTags {
            document_id: document.id.clone(),
            sentences,
        })
    }

    /// Resolve the tokens of one sentence against the entities touching it.
    ///
    /// # Arguments
    /// * `document_id` - Identifier recorded in anomalies
    /// * `sentence` - Span of the sentence
    /// * `tokens` - Tokens inside the sentence, in order
    /// * `entities` - Entities intersecting the sentence
    ///
    /// # Errors
    ///
    /// Returns `CasiobError::TokenOutsideSentence` or
    /// `CasiobError::InvalidSpan` on malformed input; anomalies never fail.
    pub fn resolve(
        &self,
        document_id: &str,
        sentence: Span,
        tokens: &[&Token],
        entities: &[&Entity],
    ) -> Result<SentenceTags> {
        check_span(sentence)?;
        for entity in entities {
            check_span(entity.span)?;
        }

        let candidates: Vec<Candidate<'_>> = entities
            .iter()
            .map(|&entity| Candidate {
                entity,
                link: self.links.extract(entity.linking_uri.as_deref()),
            })
            .collect();

        let mut out = SentenceTags {
            tags: Vec::with_capacity(tokens.len()),
            anomalies: Vec::new(),
        };

        for token in tokens {
            check_span(token.span)?;
            if !sentence.contains(&token.span) {
                return Err(CasiobError::TokenOutsideSentence {
                    token_begin: token.span.begin,
                    token_end: token.span.end,
                    sentence_begin: sentence.begin,
                    sentence_end: sentence.end,
                });
            }
            let tag = resolve_token(document_id, token, &candidates, &mut out.anomalies);
            trace!(token = %token.text, row = %tag, "resolved token");
            out.tags.push(tag);
        }

        debug!(
            document = document_id,
            sentence = %sentence,
            tokens = out.tags.len(),
            anomalies = out.anomalies.len(),
            "resolved sentence"
        );
        Ok(out)
    }
}

fn check_span(span: Span) -> Result<()> {
    if span.end < span.begin {
        return Err(CasiobError::InvalidSpan {
            begin: span.begin,
            end: span.end,
        });
    }
    Ok(())
}

fn resolve_token(
    document_id: &str,
    token: &Token,
    candidates: &[Candidate<'_>],
    anomalies: &mut Vec<Anomaly>,
) -> ResolvedTag {
    let mut report = |kind: AnomalyKind| {
        debug!(document = document_id, token = %token.text, span = %token.span, %kind, "anomaly");
        push_deduplicated(
            anomalies,
            Anomaly::new(document_id, token.text.as_str(), token.span, kind),
        );
    };

    let mut covering = Vec::new();
    for candidate in candidates.iter().filter(|c| c.span().contains(&token.span)) {
        if candidate.entity.label.is_empty() {
            report(AnomalyKind::UntypedEntity);
        } else {
            covering.push(candidate);
        }
    }

    let Some(extent) = outer_extent(&covering) else {
        return ResolvedTag::outside(token.text.as_str());
    };

    let roles = covering
        .iter()
        .copied()
        .fold(Roles::default(), |roles, c| roles.assign(c.role(extent), c));

    let primary = roles.primary();
    match roles.primaries.len() {
        0 => report(AnomalyKind::MissingPrimary),
        1 => {}
        _ => report(AnomalyKind::AmbiguousPrimary),
    }
    if primary.is_some_and(|p| p.link == LinkId::Malformed) {
        report(AnomalyKind::MalformedLink);
    }

    let begin = token.span.begin;
    ResolvedTag {
        token_text: token.text.clone(),
        coarse: primary.map_or(BioTag::Outside, |p| {
            BioTag::at(begin, p.span().begin, p.entity.coarse_label())
        }),
        fine: primary.map_or(BioTag::Outside, |p| {
            BioTag::at(begin, p.span().begin, p.entity.label.as_str())
        }),
        component: roles.component.map(|c| c.entity.label.clone()),
        nested: roles.nested.map_or(BioTag::Outside, |n| {
            BioTag::at(begin, n.span().begin, n.entity.label.as_str())
        }),
        linking_id: primary.and_then(|p| p.link.clone().into_id()),
    }
}

fn outer_extent(covering: &[&Candidate<'_>]) -> Option<Span> {
    let begin = covering.iter().map(|c| c.span().begin).min()?;
    let end = covering.iter().map(|c| c.span().end).max()?;
    Some(Span { begin, end })
}
