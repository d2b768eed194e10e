//! Record screening, topic grouping and the train/test split.
//!
//! Screening always decides by annotator majority. Threshold prediction
//! reuses the same groups (and split) through [`TopicGroup::with_threshold`],
//! so predicted and gold files share document keys.
//!
//! A topic group is every usable record sharing one (news, science) document
//! pair. Groups are ordered by science document id, then news document id,
//! and a group's topic index is its position in that order.

use cdcr_core::{AnnotationRecord, Label, MentionSpan, SpanParse};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::fmt;

/// Why a record was left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Flagged as broken.
    MarkedBad,
    /// Every judgment was `invalid`.
    AllInvalid,
    /// A mention encoding did not parse.
    BadSpan(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MarkedBad => f.write_str("marked bad"),
            SkipReason::AllInvalid => f.write_str("all judgments invalid"),
            SkipReason::BadSpan(reason) => write!(f, "bad mention span: {}", reason),
        }
    }
}

/// A record that passed screening, with decoded spans and its decision.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenedRecord {
    /// Record id.
    pub id: u64,
    /// News mention.
    pub news: MentionSpan,
    /// Science mention.
    pub science: MentionSpan,
    /// Coreference decision (annotator majority; ties are `no`).
    pub is_coref: bool,
    /// Model similarity, if the record carries one.
    pub similarity: Option<f64>,
}

/// Screen one record.
pub fn screen(record: &AnnotationRecord) -> Result<ScreenedRecord, SkipReason> {
    if record.is_bad {
        return Err(SkipReason::MarkedBad);
    }
    let votes = record.votes();
    if votes.majority() == Label::Invalid {
        return Err(SkipReason::AllInvalid);
    }
    let news = match record.news_span() {
        SpanParse::Valid(span) => span,
        SpanParse::Invalid(reason) => return Err(SkipReason::BadSpan(reason)),
    };
    let science = match record.science_span() {
        SpanParse::Valid(span) => span,
        SpanParse::Invalid(reason) => return Err(SkipReason::BadSpan(reason)),
    };
    Ok(ScreenedRecord {
        id: record.id,
        news,
        science,
        is_coref: votes.majority() == Label::Yes,
        similarity: record.similarity,
    })
}

/// Records sharing one document pair.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicGroup {
    /// News document id.
    pub news_id: u64,
    /// Science document id.
    pub science_id: u64,
    /// News text (taken from the first record).
    pub news_text: String,
    /// Science text (taken from the first record).
    pub science_text: String,
    /// Records in input order.
    pub records: Vec<ScreenedRecord>,
}

impl TopicGroup {
    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if the group holds no record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Same group with every decision replaced by `similarity > threshold`.
    ///
    /// Records without a similarity are dropped. The group itself stays, even
    /// if emptied, so topic indices line up with the gold export.
    #[must_use]
    pub fn with_threshold(&self, threshold: f64) -> TopicGroup {
        let mut records = Vec::with_capacity(self.records.len());
        for record in &self.records {
            match record.similarity {
                Some(similarity) => records.push(ScreenedRecord {
                    is_coref: similarity > threshold,
                    ..record.clone()
                }),
                None => warn!("skipping record {}: no similarity score", record.id),
            }
        }
        TopicGroup {
            records,
            ..self.clone()
        }
    }
}

/// Screened and grouped input.
#[derive(Debug, Clone, Default)]
pub struct Grouping {
    /// Groups in topic order.
    pub groups: Vec<TopicGroup>,
    /// `(record id, reason)` for every record left out.
    pub skipped: Vec<(u64, SkipReason)>,
}

/// Screen records and group them by document pair.
#[must_use]
pub fn group_records(records: &[AnnotationRecord]) -> Grouping {
    let mut skipped = Vec::new();
    // Keyed (science, news) so iteration is already in topic order.
    let mut by_pair: BTreeMap<(u64, u64), TopicGroup> = BTreeMap::new();

    for record in records {
        let screened = match screen(record) {
            Ok(s) => s,
            Err(reason) => {
                warn!("skipping record {}: {}", record.id, reason);
                skipped.push((record.id, reason));
                continue;
            }
        };
        by_pair
            .entry((record.science_document_id, record.news_document_id))
            .or_insert_with(|| TopicGroup {
                news_id: record.news_document_id,
                science_id: record.science_document_id,
                news_text: record.news_text.clone(),
                science_text: record.science_text.clone(),
                records: Vec::new(),
            })
            .records
            .push(screened);
    }

    Grouping {
        groups: by_pair.into_values().collect(),
        skipped,
    }
}

/// Seeded train/test split over whole groups.
///
/// Groups are shuffled, then assigned to train until the train side holds at
/// least `floor(total_records * fraction)` records; the rest go to test. Each
/// side keeps the shuffled order.
#[must_use]
pub fn split_groups(mut groups: Vec<TopicGroup>, fraction: f64, seed: u64) -> (Vec<TopicGroup>, Vec<TopicGroup>) {
    let total: usize = groups.iter().map(TopicGroup::len).sum();
    let target = (total as f64 * fraction.clamp(0.0, 1.0)).floor() as usize;
    info!(
        "splitting {} groups ({} records) into ~{} train / ~{} test records",
        groups.len(),
        total,
        target,
        total - target
    );

    let mut rng = StdRng::seed_from_u64(seed);
    groups.shuffle(&mut rng);

    let mut train = Vec::new();
    let mut test = Vec::new();
    let mut train_records = 0;
    for group in groups {
        if train_records < target {
            train_records += group.len();
            train.push(group);
        } else {
            test.push(group);
        }
    }
    (train, test)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdcr_core::Judgment;

    fn record(id: u64, news: u64, sci: u64, labels: &[Label]) -> AnnotationRecord {
        AnnotationRecord {
            id,
            news_document_id: news,
            science_document_id: sci,
            news_text: "Vaccines work.".into(),
            science_text: "The vaccine was effective.".into(),
            news_mention: "Vaccines;0;8".into(),
            science_mention: "The vaccine;0;11".into(),
            judgments: labels
                .iter()
                .enumerate()
                .map(|(i, l)| Judgment::new(format!("u{}", i), *l))
                .collect(),
            similarity: None,
            is_bad: false,
        }
    }

    #[test]
    fn screening_reasons() {
        let mut bad = record(1, 1, 1, &[Label::Yes]);
        bad.is_bad = true;
        assert_eq!(screen(&bad), Err(SkipReason::MarkedBad));

        let invalid = record(2, 1, 1, &[Label::Invalid, Label::Invalid]);
        assert_eq!(screen(&invalid), Err(SkipReason::AllInvalid));

        let mut span = record(3, 1, 1, &[Label::Yes]);
        span.news_mention = "Vaccines;8;0".into();
        assert!(matches!(screen(&span), Err(SkipReason::BadSpan(_))));

        let unjudged = record(4, 1, 1, &[]);
        assert!(!screen(&unjudged).unwrap().is_coref);
    }

    #[test]
    fn decisions_from_votes_and_similarity() {
        let tie = record(1, 1, 1, &[Label::Yes, Label::No]);
        assert!(!screen(&tie).unwrap().is_coref);

        let mut at = record(2, 1, 1, &[Label::Yes]);
        at.similarity = Some(0.6);
        let mut above = record(3, 1, 1, &[Label::No]);
        above.similarity = Some(0.61);
        let unscored = record(4, 1, 1, &[Label::Yes]);

        let group = &group_records(&[at, above, unscored]).groups[0];
        let predicted = group.with_threshold(0.6);
        let decisions: Vec<(u64, bool)> = predicted.records.iter().map(|r| (r.id, r.is_coref)).collect();
        assert_eq!(decisions, vec![(2, false), (3, true)]);
        assert_eq!(predicted.news_id, group.news_id);
    }

    #[test]
    fn groups_are_ordered_by_science_then_news() {
        let records = vec![
            record(1, 5, 2, &[Label::Yes]),
            record(2, 3, 9, &[Label::Yes]),
            record(3, 4, 2, &[Label::Yes]),
            record(4, 5, 2, &[Label::No]),
        ];
        let grouping = group_records(&records);
        let pairs: Vec<(u64, u64)> = grouping.groups.iter().map(|g| (g.news_id, g.science_id)).collect();
        assert_eq!(pairs, vec![(4, 2), (5, 2), (3, 9)]);
        assert_eq!(grouping.groups[1].records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 4]);
    }

    #[test]
    fn split_is_seeded_and_complete() {
        let records: Vec<AnnotationRecord> = (0..20).map(|i| record(i, i, 100, &[Label::Yes])).collect();
        let groups = group_records(&records).groups;

        let (train_a, test_a) = split_groups(groups.clone(), 0.8, 42);
        let (train_b, test_b) = split_groups(groups, 0.8, 42);

        assert_eq!(train_a, train_b);
        assert_eq!(test_a, test_b);
        assert_eq!(train_a.len(), 16);
        assert_eq!(test_a.len(), 4);
    }
}
