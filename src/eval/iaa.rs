//! Inter-annotator agreement over repeated judgments.

use cdcr_core::{AnnotationRecord, Label};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cohen's kappa between two annotators, with the sample it was computed on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Agreement {
    /// Records both annotators judged.
    pub shared: usize,
    /// Fraction of shared records with identical labels.
    pub observed: f64,
    /// Agreement expected by chance from each annotator's label rates.
    pub expected: f64,
    /// `(observed - expected) / (1 - expected)`.
    pub kappa: f64,
}

/// Cohen's kappa over paired labels.
///
/// Returns `None` for an empty sample. When chance agreement is already
/// certain (both annotators used one and the same label throughout) kappa is
/// 1.0 if they also agreed everywhere and 0.0 otherwise.
#[must_use]
pub fn cohen_kappa(pairs: &[(Label, Label)]) -> Option<Agreement> {
    if pairs.is_empty() {
        return None;
    }
    let n = pairs.len() as f64;

    let mut first: BTreeMap<Label, usize> = BTreeMap::new();
    let mut second: BTreeMap<Label, usize> = BTreeMap::new();
    let mut agree = 0usize;
    for &(a, b) in pairs {
        *first.entry(a).or_default() += 1;
        *second.entry(b).or_default() += 1;
        if a == b {
            agree += 1;
        }
    }

    let observed = agree as f64 / n;
    let expected: f64 = first
        .iter()
        .map(|(label, &count)| {
            let other = second.get(label).copied().unwrap_or(0);
            (count as f64 / n) * (other as f64 / n)
        })
        .sum();

    let kappa = if (1.0 - expected).abs() < f64::EPSILON {
        if (observed - 1.0).abs() < f64::EPSILON {
            1.0
        } else {
            0.0
        }
    } else {
        (observed - expected) / (1.0 - expected)
    };

    Some(Agreement {
        shared: pairs.len(),
        observed,
        expected,
        kappa,
    })
}

/// Pair up the labels two annotators gave to the same records, by record id.
#[must_use]
pub fn paired_labels(records: &[AnnotationRecord], first: &str, second: &str) -> Vec<(Label, Label)> {
    let mut by_id: Vec<(u64, Label, Label)> = records
        .iter()
        .filter_map(|r| Some((r.id, r.judgment_by(first)?, r.judgment_by(second)?)))
        .collect();
    by_id.sort_by_key(|(id, _, _)| *id);
    by_id.into_iter().map(|(_, a, b)| (a, b)).collect()
}

/// Judgment counts per annotator, sorted by name.
#[must_use]
pub fn judgment_counts(records: &[AnnotationRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        for judgment in &record.judgments {
            *counts.entry(judgment.annotator.clone()).or_default() += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdcr_core::Judgment;
    use cdcr_core::Label::{No, Yes};

    fn record(id: u64, judgments: &[(&str, Label)]) -> AnnotationRecord {
        AnnotationRecord {
            id,
            news_document_id: 1,
            science_document_id: 2,
            news_text: String::new(),
            science_text: String::new(),
            news_mention: "a;0;1".into(),
            science_mention: "b;0;1".into(),
            judgments: judgments.iter().map(|(u, l)| Judgment::new(*u, *l)).collect(),
            similarity: None,
            is_bad: false,
        }
    }

    #[test]
    fn textbook_kappa() {
        // 20 yes/yes, 5 yes/no, 10 no/yes, 15 no/no: po = 0.7, pe = 0.5
        let mut pairs = Vec::new();
        pairs.extend(std::iter::repeat((Yes, Yes)).take(20));
        pairs.extend(std::iter::repeat((Yes, No)).take(5));
        pairs.extend(std::iter::repeat((No, Yes)).take(10));
        pairs.extend(std::iter::repeat((No, No)).take(15));

        let agreement = cohen_kappa(&pairs).unwrap();
        assert!((agreement.observed - 0.7).abs() < 1e-9);
        assert!((agreement.expected - 0.5).abs() < 1e-9);
        assert!((agreement.kappa - 0.4).abs() < 1e-9);
    }

    #[test]
    fn certain_chance_agreement_is_defined() {
        assert_eq!(cohen_kappa(&[(Yes, Yes), (Yes, Yes)]).unwrap().kappa, 1.0);
        assert!(cohen_kappa(&[]).is_none());
    }

    #[test]
    fn pairs_only_shared_records() {
        let records = vec![
            record(3, &[("ann", Yes), ("bob", No)]),
            record(1, &[("ann", No), ("bob", No)]),
            record(2, &[("ann", Yes)]),
        ];
        assert_eq!(paired_labels(&records, "ann", "bob"), vec![(No, No), (Yes, No)]);

        let counts = judgment_counts(&records);
        assert_eq!(counts["ann"], 3);
        assert_eq!(counts["bob"], 2);
    }
}
