//! Projection of character-span mentions onto tokens.
//!
//! Given a segmented document and its surviving mention spans, each with a
//! cluster id, every token gets a [`ClusterMarker`] and every sentence a flag
//! saying whether any mention starts or ends inside it.
//!
//! A token is inside a span when its *start* falls in `[start, end)`. The
//! first inside token opens the mention and the last closes it, so spans
//! that cut through a token still produce a balanced mention.

use cdcr_core::DocKey;
use log::{debug, warn};

use super::tokenize::DocumentTokens;
use crate::eval::conll::{ClusterMarker, ConllRow, MarkerPart};

/// A surviving span with the cluster it was assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterBound {
    /// Start character offset (inclusive).
    pub start: usize,
    /// End character offset (exclusive).
    pub end: usize,
    /// File-wide cluster id.
    pub cluster_id: u64,
}

impl ClusterBound {
    /// Create a bound.
    #[must_use]
    pub fn new(start: usize, end: usize, cluster_id: u64) -> Self {
        Self {
            start,
            end,
            cluster_id,
        }
    }
}

/// Lookup of the bounds covering a character offset.
///
/// Kept behind one type so the scan can become an interval tree without
/// touching the aligner.
#[derive(Debug, Clone, Default)]
pub struct BoundIndex {
    // Sorted by start; ties by longer span first.
    bounds: Vec<ClusterBound>,
}

impl BoundIndex {
    /// Index a document's bounds.
    #[must_use]
    pub fn new(bounds: &[ClusterBound]) -> Self {
        let mut bounds = bounds.to_vec();
        bounds.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
        Self { bounds }
    }

    /// Bounds in index order.
    #[must_use]
    pub fn bounds(&self) -> &[ClusterBound] {
        &self.bounds
    }

    /// Positions (into [`Self::bounds`]) of bounds with `start <= offset < end`.
    pub fn covering(&self, offset: usize) -> impl Iterator<Item = usize> + '_ {
        self.bounds
            .iter()
            .enumerate()
            .take_while(move |(_, b)| b.start <= offset)
            .filter(move |(_, b)| offset < b.end)
            .map(|(i, _)| i)
    }
}

/// One token after alignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedToken {
    /// Sentence index.
    pub sentence: usize,
    /// Token index within the document (whitespace tokens excluded).
    pub token_id: usize,
    /// Token text.
    pub text: String,
    /// Marker column.
    pub marker: ClusterMarker,
}

/// One mention after alignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedMention {
    /// Cluster id.
    pub cluster_id: u64,
    /// Sentence of the first token.
    pub sentence: usize,
    /// Token ids covered, in order.
    pub token_ids: Vec<usize>,
    /// Token texts covered, in order.
    pub tokens: Vec<String>,
}

/// A document with markers and mentions attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedDocument {
    /// Synthetic document key.
    pub key: DocKey,
    /// Tokens in order.
    pub tokens: Vec<AlignedToken>,
    /// Per sentence: holds at least one mention boundary.
    pub sentence_flags: Vec<bool>,
    /// Mentions in bound order.
    pub mentions: Vec<AlignedMention>,
}

impl AlignedDocument {
    /// Whether a sentence holds a mention boundary.
    #[must_use]
    pub fn sentence_flag(&self, sentence: usize) -> bool {
        self.sentence_flags.get(sentence).copied().unwrap_or(false)
    }

    /// CONLL rows for this document.
    #[must_use]
    pub fn conll_rows(&self) -> Vec<ConllRow> {
        let topic = self.key.topic.to_string();
        let subtopic = self.key.subtopic();
        let doc_id = self.key.to_string();
        self.tokens
            .iter()
            .map(|t| ConllRow {
                topic: topic.clone(),
                subtopic: subtopic.clone(),
                doc_id: doc_id.clone(),
                sentence_id: t.sentence,
                token_id: t.token_id,
                token: t.text.clone(),
                sentence_flag: self.sentence_flag(t.sentence),
                marker: t.marker.clone(),
                line: 0,
            })
            .collect()
    }
}

/// Attach the markers for one mention (given as token positions) to `tokens`.
pub(crate) fn mark_mention(tokens: &mut [AlignedToken], positions: &[usize], cluster_id: u64) {
    let id = cluster_id.to_string();
    match positions {
        [] => {}
        [only] => tokens[*only].marker.push(MarkerPart::Single(id)),
        [first, .., last] => {
            tokens[*first].marker.push(MarkerPart::Start(id.clone()));
            tokens[*last].marker.push(MarkerPart::End(id));
        }
    }
}

/// Align `bounds` onto `doc`.
///
/// Whitespace-only tokens are dropped and do not consume a token id. Bounds
/// that cover no token are logged and produce no mention.
#[must_use]
pub fn align(key: DocKey, doc: &DocumentTokens, bounds: &[ClusterBound]) -> AlignedDocument {
    let index = BoundIndex::new(bounds);
    // positions[b] = aligned-token positions inside bound b
    let mut positions: Vec<Vec<usize>> = vec![Vec::new(); index.bounds().len()];
    let mut tokens: Vec<AlignedToken> = Vec::with_capacity(doc.tokens.len());

    for token in doc.tokens.iter().filter(|t| !t.is_empty() && !t.is_space()) {
        let pos = tokens.len();
        for b in index.covering(token.start) {
            positions[b].push(pos);
        }
        tokens.push(AlignedToken {
            sentence: token.sentence,
            token_id: pos,
            text: token.text.clone(),
            marker: ClusterMarker::none(),
        });
    }

    let mut mentions = Vec::new();
    for (bound, inside) in index.bounds().iter().zip(&positions) {
        if inside.is_empty() {
            warn!(
                "{}: mention {}..{} (cluster {}) covers no token",
                key, bound.start, bound.end, bound.cluster_id
            );
            continue;
        }
        mark_mention(&mut tokens, inside, bound.cluster_id);
        debug!(
            "{}: cluster {} on tokens {}..={}",
            key,
            bound.cluster_id,
            inside[0],
            inside[inside.len() - 1]
        );
        mentions.push(AlignedMention {
            cluster_id: bound.cluster_id,
            sentence: tokens[inside[0]].sentence,
            token_ids: inside.clone(),
            tokens: inside.iter().map(|&p| tokens[p].text.clone()).collect(),
        });
    }

    let mut sentence_flags = vec![false; doc.sentences.len()];
    for token in &tokens {
        if token.marker.has_boundary() {
            if token.sentence >= sentence_flags.len() {
                sentence_flags.resize(token.sentence + 1, false);
            }
            sentence_flags[token.sentence] = true;
        }
    }

    AlignedDocument {
        key,
        tokens,
        sentence_flags,
        mentions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tokenize::{RuleTokenizer, Tokenizer};
    use cdcr_core::DocType;

    fn key() -> DocKey {
        DocKey::new(0, DocType::News, 12)
    }

    fn markers(doc: &AlignedDocument) -> Vec<String> {
        doc.tokens.iter().map(|t| t.marker.to_string()).collect()
    }

    #[test]
    fn start_end_and_single_markers() {
        let text = "The new vaccine works. Trials continue.";
        let tokens = RuleTokenizer.tokenize(text);
        let bounds = [ClusterBound::new(0, 15, 4), ClusterBound::new(16, 21, 9)];
        let doc = align(key(), &tokens, &bounds);

        assert_eq!(markers(&doc), vec!["(4", "-", "4)", "(9)", "-", "-", "-", "-"]);
        assert_eq!(doc.sentence_flags, vec![true, false]);
        assert_eq!(doc.mentions.len(), 2);
        assert_eq!(doc.mentions[0].tokens, vec!["The", "new", "vaccine"]);
    }

    #[test]
    fn nested_markers_are_joined() {
        let tokens = RuleTokenizer.tokenize("gene regulatory networks");
        let bounds = [ClusterBound::new(5, 24, 2), ClusterBound::new(0, 24, 1)];
        let doc = align(key(), &tokens, &bounds);

        assert_eq!(markers(&doc), vec!["(1", "(2", "1)|2)"]);
    }

    #[test]
    fn span_cutting_a_token_still_closes() {
        let tokens = RuleTokenizer.tokenize("antibodies neutralise");
        // ends mid-way through "neutralise"
        let doc = align(key(), &tokens, &[ClusterBound::new(0, 14, 3)]);
        assert_eq!(markers(&doc), vec!["(3", "3)"]);
    }

    #[test]
    fn bound_in_whitespace_produces_nothing() {
        let tokens = RuleTokenizer.tokenize("a    b");
        let doc = align(key(), &tokens, &[ClusterBound::new(2, 4, 1)]);
        assert!(doc.mentions.is_empty());
        assert_eq!(markers(&doc), vec!["-", "-"]);
    }

    #[test]
    fn token_ids_run_across_sentences() {
        let tokens = RuleTokenizer.tokenize("One. Two.");
        let doc = align(key(), &tokens, &[]);
        let ids: Vec<(usize, usize)> = doc.tokens.iter().map(|t| (t.sentence, t.token_id)).collect();
        assert_eq!(ids, vec![(0, 0), (0, 1), (1, 2), (1, 3)]);

        let rows = doc.conll_rows();
        assert_eq!(rows[2].doc_id, "0_news_12");
        assert_eq!(rows[2].subtopic, "0_0");
        assert!(!rows[2].sentence_flag);
    }
}
