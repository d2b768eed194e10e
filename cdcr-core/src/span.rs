//! Character-offset mention spans and their `text;start;end` encoding.
//!
//! Annotation records carry each mention as a single string such as
//! `"the new vaccine;120;135"`. This module is the only place that string is
//! decoded: everything downstream works with a validated [`MentionSpan`].
//!
//! ```rust
//! use cdcr_core::MentionSpan;
//!
//! let span: MentionSpan = "the new vaccine;120;135".parse().unwrap();
//! assert_eq!(span.start, 120);
//! assert_eq!(span.end, 135);
//! assert_eq!(span.to_string(), "the new vaccine;120;135");
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separator between the fields of an encoded span.
pub const SPAN_SEPARATOR: char = ';';

/// A half-open character span `[start, end)` with its surface text.
///
/// # Invariants
///
/// - `start < end` (enforced by every constructor)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MentionSpan {
    /// Surface form of the mention.
    pub text: String,
    /// Start character offset (inclusive).
    pub start: usize,
    /// End character offset (exclusive).
    pub end: usize,
}

impl MentionSpan {
    /// Create a span, rejecting empty or inverted offsets.
    pub fn new(text: impl Into<String>, start: usize, end: usize) -> Result<Self> {
        if end <= start {
            return Err(Error::invalid_span(format!(
                "end offset {} must be greater than start offset {}",
                end, start
            )));
        }
        Ok(Self {
            text: text.into(),
            start,
            end,
        })
    }

    /// Span length in characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Always false: spans are non-empty by construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// True if `other` lies entirely inside this span (equal spans included).
    #[must_use]
    pub fn contains(&self, other: &MentionSpan) -> bool {
        self.start <= other.start && self.end >= other.end
    }

    /// True if the spans share at least one character.
    #[must_use]
    pub fn overlaps(&self, other: &MentionSpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Offsets as a tuple.
    #[must_use]
    pub fn offsets(&self) -> (usize, usize) {
        (self.start, self.end)
    }
}

impl fmt::Display for MentionSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}",
            self.text,
            self.start,
            self.end,
            sep = SPAN_SEPARATOR
        )
    }
}

impl FromStr for MentionSpan {
    type Err = Error;

    /// Parse `text;start;end`.
    ///
    /// The two offsets are taken from the right, so the surface text may
    /// itself contain semicolons.
    fn from_str(s: &str) -> Result<Self> {
        let mut fields = s.rsplitn(3, SPAN_SEPARATOR);
        let end = fields.next();
        let start = fields.next();
        let text = fields.next();

        let (text, start, end) = match (text, start, end) {
            (Some(text), Some(start), Some(end)) => (text, start, end),
            _ => {
                return Err(Error::invalid_span(format!(
                    "expected 'text;start;end', got {:?}",
                    s
                )))
            }
        };

        let start: usize = start.trim().parse().map_err(|_| {
            Error::invalid_span(format!("start offset {:?} is not an integer in {:?}", start, s))
        })?;
        let end: usize = end.trim().parse().map_err(|_| {
            Error::invalid_span(format!("end offset {:?} is not an integer in {:?}", end, s))
        })?;

        MentionSpan::new(text, start, end)
    }
}

/// Outcome of decoding one span at the input boundary.
///
/// Malformed spans are not errors for a batch: the record carrying them is
/// filtered out before chain building and the reason is logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanParse {
    /// The encoding was well formed.
    Valid(MentionSpan),
    /// The encoding was rejected, with a human-readable reason.
    Invalid(String),
}

impl SpanParse {
    /// Decode an encoded span.
    #[must_use]
    pub fn parse(encoded: &str) -> Self {
        match encoded.parse::<MentionSpan>() {
            Ok(span) => SpanParse::Valid(span),
            Err(e) => SpanParse::Invalid(e.to_string()),
        }
    }

    /// The span, if valid.
    #[must_use]
    pub fn valid(self) -> Option<MentionSpan> {
        match self {
            SpanParse::Valid(span) => Some(span),
            SpanParse::Invalid(_) => None,
        }
    }

    /// True if the encoding was accepted.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, SpanParse::Valid(_))
    }
}

impl From<Result<MentionSpan>> for SpanParse {
    fn from(result: Result<MentionSpan>) -> Self {
        match result {
            Ok(span) => SpanParse::Valid(span),
            Err(e) => SpanParse::Invalid(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_format_round_trip() {
        let span: MentionSpan = "gene networks;40;53".parse().unwrap();
        assert_eq!(span.text, "gene networks");
        assert_eq!(span.offsets(), (40, 53));
        assert_eq!(span.len(), 13);
        assert_eq!(span.to_string(), "gene networks;40;53");
    }

    #[test]
    fn text_may_contain_separator() {
        let span: MentionSpan = "a;b;3;7".parse().unwrap();
        assert_eq!(span.text, "a;b");
        assert_eq!(span.offsets(), (3, 7));
    }

    #[test]
    fn rejects_missing_fields() {
        assert!("no offsets".parse::<MentionSpan>().is_err());
        assert!("text;12".parse::<MentionSpan>().is_err());
    }

    #[test]
    fn rejects_non_numeric_offsets() {
        let err = "x;one;5".parse::<MentionSpan>().unwrap_err();
        assert!(matches!(err, Error::InvalidSpan(_)));
    }

    #[test]
    fn rejects_inverted_and_empty_spans() {
        assert!("x;5;5".parse::<MentionSpan>().is_err());
        assert!("x;9;5".parse::<MentionSpan>().is_err());
        assert!(MentionSpan::new("x", 3, 2).is_err());
    }

    #[test]
    fn containment_includes_equal_spans() {
        let outer = MentionSpan::new("outer", 0, 10).unwrap();
        let inner = MentionSpan::new("in", 2, 5).unwrap();
        let partial = MentionSpan::new("part", 8, 14).unwrap();

        assert!(outer.contains(&inner));
        assert!(outer.contains(&outer.clone()));
        assert!(!inner.contains(&outer));
        assert!(!outer.contains(&partial));
        assert!(outer.overlaps(&partial));
    }

    #[test]
    fn span_parse_variants() {
        assert!(SpanParse::parse("ok;1;2").is_valid());
        match SpanParse::parse("bad;2;1") {
            SpanParse::Invalid(reason) => assert!(reason.contains("greater")),
            SpanParse::Valid(_) => panic!("inverted span accepted"),
        }
        assert!(SpanParse::parse("bad").valid().is_none());
    }
}
