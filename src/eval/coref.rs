//! Coreference clusters as sets of mention signatures.
//!
//! Scoring compares mentions by position only: a mention is its document and
//! the first and last token it covers. Text never takes part in identity.
//!
//! ```rust
//! use cdcr::eval::coref::{ClusterSet, MentionSignature};
//!
//! let mut set = ClusterSet::new();
//! set.insert("1", MentionSignature::new("0_news_4", 3, 5));
//! set.insert("1", MentionSignature::new("0_science_9", 0, 1));
//!
//! assert_eq!(set.len(), 1);
//! assert!(set.clusters()[0].is_cross_document());
//! ```

use super::conll::{MentionClusters, ParsedMention};
use log::error;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Position-only identity of a mention: `(document, first token, last token)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MentionSignature {
    /// Document key.
    pub doc_id: String,
    /// First token index (inclusive).
    pub start: usize,
    /// Last token index (inclusive).
    pub end: usize,
}

impl MentionSignature {
    /// Create a signature.
    #[must_use]
    pub fn new(doc_id: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            doc_id: doc_id.into(),
            start,
            end,
        }
    }
}

impl From<&ParsedMention> for MentionSignature {
    fn from(mention: &ParsedMention) -> Self {
        Self::new(mention.doc_id(), mention.first_token(), mention.last_token())
    }
}

impl fmt::Display for MentionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.doc_id, self.start, self.end)
    }
}

/// One cluster: an id and its distinct mentions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    /// Cluster id as written in the file.
    pub id: String,
    /// Distinct mentions.
    pub mentions: HashSet<MentionSignature>,
}

impl Cluster {
    /// Number of distinct mentions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mentions.len()
    }

    /// True if the cluster has no mention.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mentions.is_empty()
    }

    /// True for a one-mention cluster.
    #[must_use]
    pub fn is_singleton(&self) -> bool {
        self.mentions.len() == 1
    }

    /// True if the mentions span more than one document.
    #[must_use]
    pub fn is_cross_document(&self) -> bool {
        let mut docs = self.mentions.iter().map(|m| m.doc_id.as_str());
        match docs.next() {
            Some(first) => docs.any(|d| d != first),
            None => false,
        }
    }
}

/// Clusters keyed by id, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ClusterSet {
    clusters: Vec<Cluster>,
    index: HashMap<String, usize>,
}

impl ClusterSet {
    /// Empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mention to a cluster, creating the cluster on first use.
    pub fn insert(&mut self, cluster_id: &str, mention: MentionSignature) {
        let slot = match self.index.get(cluster_id) {
            Some(&slot) => slot,
            None => {
                self.clusters.push(Cluster {
                    id: cluster_id.to_string(),
                    mentions: HashSet::new(),
                });
                self.index.insert(cluster_id.to_string(), self.clusters.len() - 1);
                self.clusters.len() - 1
            }
        };
        self.clusters[slot].mentions.insert(mention);
    }

    /// Build from parsed CONLL clusters.
    ///
    /// With `skip_corrupt`, clusters touched by a structural issue are left
    /// out entirely (logged). Without it they are kept with whatever mentions
    /// did complete.
    #[must_use]
    pub fn from_parsed(parsed: &MentionClusters, skip_corrupt: bool) -> Self {
        let corrupt = parsed.corrupt_clusters();
        let mut set = ClusterSet::new();
        for (id, mentions) in parsed.clusters() {
            if skip_corrupt && corrupt.contains(id) {
                error!("excluding corrupt cluster {} ({} mentions)", id, mentions.len());
                continue;
            }
            for mention in mentions {
                set.insert(id, MentionSignature::from(mention));
            }
        }
        set
    }

    /// Clusters in insertion order.
    #[must_use]
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// Cluster by id.
    #[must_use]
    pub fn get(&self, cluster_id: &str) -> Option<&Cluster> {
        self.index.get(cluster_id).map(|&slot| &self.clusters[slot])
    }

    /// Number of clusters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    /// True if there are no clusters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Every distinct mention across all clusters.
    #[must_use]
    pub fn mentions(&self) -> HashSet<&MentionSignature> {
        self.clusters.iter().flat_map(|c| c.mentions.iter()).collect()
    }

    /// Mention -> clusters containing it, in cluster order.
    #[must_use]
    pub fn mention_index(&self) -> HashMap<&MentionSignature, Vec<usize>> {
        let mut index: HashMap<&MentionSignature, Vec<usize>> = HashMap::new();
        for (slot, cluster) in self.clusters.iter().enumerate() {
            for mention in &cluster.mentions {
                index.entry(mention).or_default().push(slot);
            }
        }
        index
    }

    /// Plain mention sets, for the metrics.
    #[must_use]
    pub fn mention_sets(&self) -> Vec<HashSet<MentionSignature>> {
        self.clusters.iter().map(|c| c.mentions.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::conll::parse_conll;

    #[test]
    fn duplicate_mentions_collapse() {
        let mut set = ClusterSet::new();
        set.insert("a", MentionSignature::new("d", 0, 1));
        set.insert("a", MentionSignature::new("d", 0, 1));
        set.insert("b", MentionSignature::new("d", 4, 4));

        assert_eq!(set.len(), 2);
        assert_eq!(set.get("a").map(Cluster::len), Some(1));
        assert!(set.get("b").is_some_and(Cluster::is_singleton));
        assert_eq!(set.mentions().len(), 2);
    }

    #[test]
    fn cross_document_detection() {
        let mut set = ClusterSet::new();
        set.insert("x", MentionSignature::new("0_news_1", 0, 0));
        set.insert("x", MentionSignature::new("0_news_1", 5, 6));
        set.insert("y", MentionSignature::new("0_news_1", 2, 2));
        set.insert("y", MentionSignature::new("0_science_2", 2, 2));

        assert!(!set.clusters()[0].is_cross_document());
        assert!(set.clusters()[1].is_cross_document());
    }

    #[test]
    fn corrupt_clusters_can_be_skipped() {
        let text = "0\t0_0\td\t0\t0\ta\tTrue\t(1)\n\
                    0\t0_0\td\t0\t1\tb\tTrue\t(2)\n\
                    0\t0_0\td\t0\t2\tc\tTrue\t(2\n\
                    0\t0_0\td\t0\t3\te\tTrue\t-\n";
        let parsed = parse_conll(text).mention_clusters();

        assert_eq!(ClusterSet::from_parsed(&parsed, true).len(), 1);
        assert_eq!(ClusterSet::from_parsed(&parsed, false).len(), 2);
    }

    #[test]
    fn signature_from_parsed_mention() {
        let text = "0\t0_0\td\t0\t3\tthe\tTrue\t(7\n0\t0_0\td\t0\t4\tcat\tTrue\t7)\n";
        let parsed = parse_conll(text).mention_clusters();
        let mention = &parsed.cluster("7").unwrap()[0];

        assert_eq!(MentionSignature::from(mention), MentionSignature::new("d", 3, 4));
        assert_eq!(MentionSignature::from(mention).to_string(), "d_3_4");
    }
}
