//! Document text with offset conversion.
//!
//! Annotation offsets are not byte offsets: UIMA CAS offsets count UTF-16
//! code units (Java strings), while the JSON format counts Unicode scalar
//! values. [`SofaText`] pre-computes a table from offset units to byte
//! positions so covered text can be sliced in O(1).

use serde::{Deserialize, Serialize};

/// Unit in which annotation offsets are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetUnit {
    /// UTF-16 code units, as used by UIMA/Java.
    #[default]
    Utf16,
    /// Unicode scalar values.
    Char,
}

/// The subject-of-analysis text of a document.
#[derive(Debug, Clone)]
pub struct SofaText {
    text: String,
    /// `to_byte[i]` is the byte position of offset `i`, or `None` inside a
    /// surrogate pair. Empty for ASCII text, where offsets are bytes.
    to_byte: Vec<Option<usize>>,
}

impl SofaText {
    pub fn new(text: impl Into<String>, unit: OffsetUnit) -> Self {
        let text = text.into();
        let to_byte = if text.is_ascii() {
            Vec::new()
        } else {
            build_offset_to_byte_map(&text, unit)
        };
        Self { text, to_byte }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of offset units in the text.
    #[must_use]
    pub fn len(&self) -> usize {
        if self.to_byte.is_empty() {
            self.text.len()
        } else {
            self.to_byte.len() - 1
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn byte(&self, offset: usize) -> Option<usize> {
        if self.to_byte.is_empty() {
            (offset <= self.text.len()).then_some(offset)
        } else {
            self.to_byte.get(offset).copied().flatten()
        }
    }

    /// Text covered by `[begin, end)`, or `None` if either bound is out of
    /// range or splits a character.
    #[must_use]
    pub fn covered(&self, begin: usize, end: usize) -> Option<&str> {
        if end < begin {
            return None;
        }
        let start = self.byte(begin)?;
        let stop = self.byte(end)?;
        self.text.get(start..stop)
    }
}

fn build_offset_to_byte_map(text: &str, unit: OffsetUnit) -> Vec<Option<usize>> {
    let mut map = Vec::with_capacity(text.len() + 1);
    for (byte_idx, ch) in text.char_indices() {
        map.push(Some(byte_idx));
        if unit == OffsetUnit::Utf16 && ch.len_utf16() == 2 {
            map.push(None);
        }
    }
    map.push(Some(text.len()));
    map
}
