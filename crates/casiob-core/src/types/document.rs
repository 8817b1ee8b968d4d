use serde::{Deserialize, Serialize};

use crate::error::{CasiobError, Result};

use super::span::{Entity, Span, Token};

/// One annotated document as delivered by an annotation source.
///
/// All three collections are kept in annotation-index order (begin
/// ascending, wider span first).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Identifier used in anomaly records, usually the file name.
    pub id: String,
    pub sentences: Vec<Span>,
    pub tokens: Vec<Token>,
    pub entities: Vec<Entity>,
}

/// A sentence together with the tokens inside it and the entities touching it.
#[derive(Debug, Clone)]
pub struct SentenceGroup<'a> {
    pub span: Span,
    pub tokens: Vec<&'a Token>,
    pub entities: Vec<&'a Entity>,
}

impl Document {
    /// Creates a document, sorting every collection into index order.
    pub fn new(
        id: impl Into<String>,
        mut sentences: Vec<Span>,
        mut tokens: Vec<Token>,
        mut entities: Vec<Entity>,
    ) -> Self {
        sentences.sort_by(Span::index_order);
        tokens.sort_by(|a, b| a.span.index_order(&b.span));
        entities.sort_by(|a, b| a.span.index_order(&b.span));
        Self {
            id: id.into(),
            sentences,
            tokens,
            entities,
        }
    }

    /// Partitions tokens and entities by sentence, in sentence order.
    ///
    /// The fields are public, so the collections are re-ordered here rather
    /// than trusted to be in index order.
    ///
    /// # Errors
    ///
    /// Returns `CasiobError::OrphanToken` for the first token that is not
    /// contained in any sentence.
    pub fn sentence_groups(&self) -> Result<Vec<SentenceGroup<'_>>> {
        let mut sentences: Vec<&Span> = self.sentences.iter().collect();
        sentences.sort_by(|a, b| a.index_order(b));
        let mut token_order: Vec<usize> = (0..self.tokens.len()).collect();
        token_order.sort_by(|&a, &b| self.tokens[a].span.index_order(&self.tokens[b].span));
        let mut entities: Vec<&Entity> = self.entities.iter().collect();
        entities.sort_by(|a, b| a.span.index_order(&b.span));

        let mut placed = vec![false; self.tokens.len()];
        let mut groups = Vec::with_capacity(sentences.len());

        for sentence in sentences {
            let first = token_order.partition_point(|&i| self.tokens[i].span.begin < sentence.begin);
            let mut tokens = Vec::new();
            for &index in &token_order[first..] {
                let token = &self.tokens[index];
                if token.span.begin > sentence.end {
                    break;
                }
                if sentence.contains(&token.span) {
                    placed[index] = true;
                    tokens.push(token);
                }
            }

            let last = entities.partition_point(|e| e.span.begin <= sentence.end);
            let members = entities[..last]
                .iter()
                .copied()
                .filter(|e| sentence.intersects(&e.span) || e.span.intersects(sentence))
                .collect();

            groups.push(SentenceGroup {
                span: *sentence,
                tokens,
                entities: members,
            });
        }

        if let Some(index) = placed.iter().position(|p| !p) {
            let token = &self.tokens[index];
            return Err(CasiobError::OrphanToken {
                text: token.text.clone(),
                begin: token.span.begin,
                end: token.span.end,
            });
        }

        Ok(groups)
    }
}
