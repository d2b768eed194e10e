//! Annotation records, judgments and document identifiers.
//!
//! An [`AnnotationRecord`] pairs one news mention with one science mention
//! and carries the yes/no judgments annotators gave for that pair. Several
//! annotators may judge the same pair (IAA sampling); [`AnnotationRecord::effective_label`]
//! resolves them by strict majority.

use crate::error::{Error, Result};
use crate::span::SpanParse;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Document identity
// =============================================================================

/// Which side of a news/science document pair a mention belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    /// News article summary.
    News,
    /// Scientific paper abstract.
    Science,
}

impl DocType {
    /// Label used in document keys.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DocType::News => "news",
            DocType::Science => "science",
        }
    }

    /// Both document types in export order.
    #[must_use]
    pub fn both() -> [DocType; 2] {
        [DocType::News, DocType::Science]
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "news" => Ok(DocType::News),
            "science" => Ok(DocType::Science),
            other => Err(Error::parse(format!("unknown document type {:?}", other))),
        }
    }
}

/// Synthetic document key `{topic}_{type}_{id}`, e.g. `66_science_113`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocKey {
    /// Topic group index within one export.
    pub topic: usize,
    /// News or science.
    pub doc_type: DocType,
    /// Upstream document identifier.
    pub doc_id: u64,
}

impl DocKey {
    /// Create a key.
    #[must_use]
    pub fn new(topic: usize, doc_type: DocType, doc_id: u64) -> Self {
        Self {
            topic,
            doc_type,
            doc_id,
        }
    }

    /// Subtopic column value (`{topic}_0`).
    #[must_use]
    pub fn subtopic(&self) -> String {
        format!("{}_0", self.topic)
    }
}

impl fmt::Display for DocKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.topic, self.doc_type, self.doc_id)
    }
}

impl FromStr for DocKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('_').collect();
        if parts.len() != 3 {
            return Err(Error::parse(format!(
                "document key {:?} is not of the form topic_type_id",
                s
            )));
        }
        let topic = parts[0]
            .parse()
            .map_err(|_| Error::parse(format!("bad topic in document key {:?}", s)))?;
        let doc_type = parts[1].parse()?;
        let doc_id = parts[2]
            .parse()
            .map_err(|_| Error::parse(format!("bad document id in document key {:?}", s)))?;
        Ok(DocKey::new(topic, doc_type, doc_id))
    }
}

// =============================================================================
// Judgments
// =============================================================================

/// An annotator's answer for one mention pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    /// The two mentions corefer.
    Yes,
    /// The two mentions do not corefer.
    No,
    /// The pair itself is broken (bad extraction, unreadable text).
    Invalid,
}

impl Label {
    /// Lowercase label string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Label::Yes => "yes",
            Label::No => "no",
            Label::Invalid => "invalid",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" => Ok(Label::Yes),
            "no" => Ok(Label::No),
            "invalid" | "bad" => Ok(Label::Invalid),
            other => Err(Error::parse(format!("unknown label {:?}", other))),
        }
    }
}

/// One annotator's judgment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Judgment {
    /// Annotator username.
    pub annotator: String,
    /// The answer given.
    pub label: Label,
}

impl Judgment {
    /// Create a judgment.
    #[must_use]
    pub fn new(annotator: impl Into<String>, label: Label) -> Self {
        Self {
            annotator: annotator.into(),
            label,
        }
    }
}

/// Vote tally for one mention pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoteCount {
    /// Number of `yes` votes.
    pub yes: usize,
    /// Number of `no` votes.
    pub no: usize,
    /// Number of `invalid` votes.
    pub invalid: usize,
}

impl VoteCount {
    /// Tally a set of judgments.
    #[must_use]
    pub fn tally<'a>(judgments: impl IntoIterator<Item = &'a Judgment>) -> Self {
        let mut count = VoteCount::default();
        for j in judgments {
            match j.label {
                Label::Yes => count.yes += 1,
                Label::No => count.no += 1,
                Label::Invalid => count.invalid += 1,
            }
        }
        count
    }

    /// Strict majority of `yes` over `no`. Ties resolve to `no`.
    ///
    /// Returns `Invalid` only when nobody answered yes or no but at least one
    /// annotator flagged the pair as invalid.
    #[must_use]
    pub fn majority(&self) -> Label {
        if self.yes == 0 && self.no == 0 && self.invalid > 0 {
            Label::Invalid
        } else if self.yes > self.no {
            Label::Yes
        } else {
            Label::No
        }
    }
}

// =============================================================================
// Annotation record
// =============================================================================

/// One annotation task as exported from the annotation store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    /// Record identifier, unique within one export.
    pub id: u64,
    /// Upstream news article id.
    pub news_document_id: u64,
    /// Upstream science paper id.
    pub science_document_id: u64,
    /// Full news summary text.
    pub news_text: String,
    /// Full science abstract text.
    pub science_text: String,
    /// Encoded news mention (`text;start;end`).
    pub news_mention: String,
    /// Encoded science mention (`text;start;end`).
    pub science_mention: String,
    /// Annotator judgments for this pair.
    #[serde(default)]
    pub judgments: Vec<Judgment>,
    /// Candidate-generation similarity score, when the pair came from the model.
    #[serde(default)]
    pub similarity: Option<f64>,
    /// Marked as broken by an annotator.
    #[serde(default)]
    pub is_bad: bool,
}

impl AnnotationRecord {
    /// Vote tally over this record's judgments.
    #[must_use]
    pub fn votes(&self) -> VoteCount {
        VoteCount::tally(&self.judgments)
    }

    /// Majority-vote label used for chain building.
    #[must_use]
    pub fn effective_label(&self) -> Label {
        self.votes().majority()
    }

    /// Decode the news mention.
    #[must_use]
    pub fn news_span(&self) -> SpanParse {
        SpanParse::parse(&self.news_mention)
    }

    /// Decode the science mention.
    #[must_use]
    pub fn science_span(&self) -> SpanParse {
        SpanParse::parse(&self.science_mention)
    }

    /// `(news_document_id, science_document_id)`.
    #[must_use]
    pub fn document_pair(&self) -> (u64, u64) {
        (self.news_document_id, self.science_document_id)
    }

    /// The label the given annotator gave, if any.
    #[must_use]
    pub fn judgment_by(&self, annotator: &str) -> Option<Label> {
        self.judgments
            .iter()
            .find(|j| j.annotator == annotator)
            .map(|j| j.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn votes(labels: &[Label]) -> VoteCount {
        let judgments: Vec<Judgment> = labels
            .iter()
            .enumerate()
            .map(|(i, l)| Judgment::new(format!("user{}", i), *l))
            .collect();
        VoteCount::tally(&judgments)
    }

    #[test]
    fn majority_yes_wins_strictly() {
        assert_eq!(votes(&[Label::Yes, Label::Yes, Label::No]).majority(), Label::Yes);
        assert_eq!(votes(&[Label::Yes]).majority(), Label::Yes);
    }

    #[test]
    fn tie_resolves_to_no() {
        // Ties deliberately favour non-coreference.
        assert_eq!(votes(&[Label::Yes, Label::No]).majority(), Label::No);
        assert_eq!(
            votes(&[Label::Yes, Label::Yes, Label::No, Label::No]).majority(),
            Label::No
        );
    }

    #[test]
    fn invalid_votes_do_not_count_towards_majority() {
        assert_eq!(
            votes(&[Label::Yes, Label::Invalid, Label::Invalid]).majority(),
            Label::Yes
        );
        assert_eq!(votes(&[Label::Invalid]).majority(), Label::Invalid);
    }

    #[test]
    fn no_votes_at_all_is_no() {
        assert_eq!(votes(&[]).majority(), Label::No);
    }

    #[test]
    fn doc_key_round_trip() {
        let key = DocKey::new(66, DocType::Science, 113);
        assert_eq!(key.to_string(), "66_science_113");
        assert_eq!(key.subtopic(), "66_0");
        assert_eq!("66_science_113".parse::<DocKey>().unwrap(), key);
        assert!("66_blog_113".parse::<DocKey>().is_err());
        assert!("66_news".parse::<DocKey>().is_err());
    }

    #[test]
    fn label_parsing_is_case_insensitive() {
        assert_eq!("YES".parse::<Label>().unwrap(), Label::Yes);
        assert_eq!(" no ".parse::<Label>().unwrap(), Label::No);
        assert!("maybe".parse::<Label>().is_err());
    }

    #[test]
    fn record_deserializes_with_defaults() {
        let json = r#"{
            "id": 7,
            "news_document_id": 1,
            "science_document_id": 2,
            "news_text": "Vaccines work.",
            "science_text": "The vaccine was effective.",
            "news_mention": "Vaccines;0;8",
            "science_mention": "The vaccine;0;11"
        }"#;
        let record: AnnotationRecord = serde_json::from_str(json).unwrap();
        assert!(record.judgments.is_empty());
        assert!(!record.is_bad);
        assert_eq!(record.effective_label(), Label::No);
        assert!(record.news_span().is_valid());
        assert_eq!(record.document_pair(), (1, 2));
    }
}
