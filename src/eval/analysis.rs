//! Mention- and chain-level comparison of a response against a key.
//!
//! MUC alone hides whether errors come from mention detection or from
//! linking. [`ComparisonReport`] separates the two: mention counts and
//! detection precision/recall first, then how many correctly detected
//! mentions also landed in exactly the right chain, split by whether the gold
//! chain stays inside one document.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::coref::{ClusterSet, MentionSignature};
use super::coref_metrics::{muc_score_sets, CorefScores};

/// Correct-chain tally for one class of gold chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainTally {
    /// Correctly detected mentions whose gold chain is in this class.
    pub total: usize,
    /// Of those, mentions whose predicted chain equals the gold chain.
    pub correct: usize,
}

impl ChainTally {
    /// correct / total, 0 when empty.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        ratio(self.correct, self.total)
    }
}

/// Full comparison of a predicted file against a gold file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Distinct gold mentions.
    pub gold_mentions: usize,
    /// Distinct predicted mentions.
    pub predicted_mentions: usize,
    /// Gold clusters.
    pub gold_clusters: usize,
    /// Predicted clusters.
    pub predicted_clusters: usize,
    /// Mentions present in both (exact signature match).
    pub correct_mentions: usize,
    /// Predicted mentions absent from gold.
    pub false_positive_mentions: usize,
    /// Gold mentions absent from the prediction.
    pub false_negative_mentions: usize,
    /// correct / predicted.
    pub mention_precision: f64,
    /// correct / gold.
    pub mention_recall: f64,
    /// Correct mentions whose gold chain stays in one document.
    pub intra_document: ChainTally,
    /// Correct mentions whose gold chain spans documents.
    pub cross_document: ChainTally,
    /// MUC link scores.
    pub muc: CorefScores,
}

impl ComparisonReport {
    /// Compare `predicted` against `gold`.
    #[must_use]
    pub fn compute(gold: &ClusterSet, predicted: &ClusterSet) -> Self {
        let gold_mentions = gold.mentions();
        let pred_mentions = predicted.mentions();
        let correct: HashSet<&MentionSignature> =
            gold_mentions.intersection(&pred_mentions).copied().collect();

        let gold_index = gold.mention_index();
        let pred_index = predicted.mention_index();

        let mut intra_document = ChainTally::default();
        let mut cross_document = ChainTally::default();

        for mention in &correct {
            // A mention listed under several clusters is judged by its first.
            let (Some(&g), Some(&p)) = (
                gold_index.get(*mention).and_then(|v| v.first()),
                pred_index.get(*mention).and_then(|v| v.first()),
            ) else {
                continue;
            };
            let gold_chain = &gold.clusters()[g];
            let pred_chain = &predicted.clusters()[p];

            let tally = if gold_chain.is_cross_document() {
                &mut cross_document
            } else {
                &mut intra_document
            };
            tally.total += 1;
            if gold_chain.mentions == pred_chain.mentions {
                tally.correct += 1;
            }
        }

        Self {
            gold_mentions: gold_mentions.len(),
            predicted_mentions: pred_mentions.len(),
            gold_clusters: gold.len(),
            predicted_clusters: predicted.len(),
            correct_mentions: correct.len(),
            false_positive_mentions: pred_mentions.difference(&gold_mentions).count(),
            false_negative_mentions: gold_mentions.difference(&pred_mentions).count(),
            mention_precision: ratio(correct.len(), pred_mentions.len()),
            mention_recall: ratio(correct.len(), gold_mentions.len()),
            intra_document,
            cross_document,
            muc: muc_score_sets(gold, predicted),
        }
    }

    /// Correct mentions in a fully correct chain, either class.
    #[must_use]
    pub fn correct_chains(&self) -> usize {
        self.intra_document.correct + self.cross_document.correct
    }
}

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mentions:")?;
        writeln!(f, "  gold: {}  predicted: {}", self.gold_mentions, self.predicted_mentions)?;
        writeln!(f, "  strictly correct: {}", self.correct_mentions)?;
        writeln!(
            f,
            "  false positives: {}  false negatives: {}",
            self.false_positive_mentions, self.false_negative_mentions
        )?;
        writeln!(
            f,
            "  detection: P={:.1}%  R={:.1}%",
            self.mention_precision * 100.0,
            self.mention_recall * 100.0
        )?;
        writeln!(f, "Clusters:")?;
        writeln!(f, "  gold: {}  predicted: {}", self.gold_clusters, self.predicted_clusters)?;
        writeln!(
            f,
            "  correct chains: {}/{} ({:.1}%)",
            self.correct_chains(),
            self.correct_mentions,
            ratio(self.correct_chains(), self.correct_mentions) * 100.0
        )?;
        writeln!(
            f,
            "  intra-document: {}/{} ({:.1}%)",
            self.intra_document.correct,
            self.intra_document.total,
            self.intra_document.ratio() * 100.0
        )?;
        writeln!(
            f,
            "  cross-document: {}/{} ({:.1}%)",
            self.cross_document.correct,
            self.cross_document.total,
            self.cross_document.ratio() * 100.0
        )?;
        writeln!(f, "MUC: {}", self.muc)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(doc: &str, start: usize) -> MentionSignature {
        MentionSignature::new(doc, start, start)
    }

    #[test]
    fn counts_and_chain_classes() {
        let mut gold = ClusterSet::new();
        gold.insert("1", sig("n", 0));
        gold.insert("1", sig("s", 0));
        gold.insert("2", sig("n", 5));
        gold.insert("2", sig("n", 7));

        let mut pred = ClusterSet::new();
        pred.insert("a", sig("n", 0));
        pred.insert("a", sig("s", 0));
        pred.insert("b", sig("n", 5));
        pred.insert("c", sig("n", 7));
        pred.insert("c", sig("n", 9));

        let report = ComparisonReport::compute(&gold, &pred);

        assert_eq!(report.gold_mentions, 4);
        assert_eq!(report.predicted_mentions, 5);
        assert_eq!(report.correct_mentions, 4);
        assert_eq!(report.false_positive_mentions, 1);
        assert_eq!(report.false_negative_mentions, 0);
        assert!((report.mention_precision - 0.8).abs() < 1e-9);
        assert!((report.mention_recall - 1.0).abs() < 1e-9);
        assert_eq!(report.cross_document, ChainTally { total: 2, correct: 2 });
        assert_eq!(report.intra_document, ChainTally { total: 2, correct: 0 });
        assert_eq!(report.correct_chains(), 2);
    }

    #[test]
    fn empty_inputs_are_all_zero() {
        let report = ComparisonReport::compute(&ClusterSet::new(), &ClusterSet::new());
        assert_eq!(report.mention_precision, 0.0);
        assert_eq!(report.mention_recall, 0.0);
        assert_eq!(report.intra_document.ratio(), 0.0);
        assert!(report.to_string().contains("correct chains: 0/0"));
    }
}
