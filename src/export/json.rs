//! JSON interchange: the document map and the entity list.
//!
//! The document map is an object keyed by document key, each value an array
//! of `[sentence_id, token_id, token, sentence_flag]` rows. Key order is the
//! export order and is preserved on both read and write.
//!
//! The entity list is an array of
//! `{doc_id, sentence_id, tokens_ids, cluster_id, tokens, lemmas, tags, singleton}`
//! objects, one per aligned mention.

use log::warn;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

use super::align::{mark_mention, AlignedDocument, AlignedToken};
use crate::error::{Error, Result};
use crate::eval::conll::{ClusterMarker, ConllRow};

/// `[sentence_id, token_id, token, sentence_flag]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRow(pub usize, pub usize, pub String, pub bool);

/// Documents in export order, each as token rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentMap {
    documents: Vec<(String, Vec<TokenRow>)>,
}

impl DocumentMap {
    /// Empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a document. A repeated key replaces the earlier rows in place.
    pub fn insert(&mut self, key: impl Into<String>, rows: Vec<TokenRow>) {
        let key = key.into();
        match self.documents.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = rows,
            None => self.documents.push((key, rows)),
        }
    }

    /// Rows of one document.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[TokenRow]> {
        self.documents
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, rows)| rows.as_slice())
    }

    /// Documents in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[TokenRow])> {
        self.documents.iter().map(|(k, r)| (k.as_str(), r.as_slice()))
    }

    /// Number of documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// True if there are no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Build from aligned documents.
    #[must_use]
    pub fn from_aligned(docs: &[AlignedDocument]) -> Self {
        let mut map = Self::new();
        for doc in docs {
            let rows = doc
                .tokens
                .iter()
                .map(|t| TokenRow(t.sentence, t.token_id, t.text.clone(), doc.sentence_flag(t.sentence)))
                .collect();
            map.insert(doc.key.to_string(), rows);
        }
        map
    }

    /// Read from a JSON file.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl Serialize for DocumentMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.documents.len()))?;
        for (key, rows) in &self.documents {
            map.serialize_entry(key, rows)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DocumentMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = DocumentMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of document key to token rows")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
                let mut map = DocumentMap::new();
                while let Some((key, rows)) = access.next_entry::<String, Vec<TokenRow>>()? {
                    map.insert(key, rows);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

/// One mention in the entity list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Document key.
    pub doc_id: String,
    /// Sentence of the first token.
    pub sentence_id: usize,
    /// Token ids covered.
    pub tokens_ids: Vec<usize>,
    /// Cluster id.
    pub cluster_id: u64,
    /// Space-joined token texts.
    pub tokens: String,
    /// Space-joined lowercased tokens.
    pub lemmas: String,
    /// Space-joined coarse tags.
    pub tags: String,
    /// True if the mention is alone in its cluster.
    pub singleton: bool,
}

/// Coarse tag for a token: punctuation, number, or anything else.
fn coarse_tag(token: &str) -> &'static str {
    if token.chars().all(|c| !c.is_alphanumeric()) {
        "PUNCT"
    } else if token.chars().all(|c| c.is_numeric() || c == '.' || c == ',') {
        "NUM"
    } else {
        "X"
    }
}

/// Entity list for aligned documents, in document then mention order.
#[must_use]
pub fn entities_from_aligned(docs: &[AlignedDocument]) -> Vec<EntityRecord> {
    let mut sizes: HashMap<u64, usize> = HashMap::new();
    for mention in docs.iter().flat_map(|d| &d.mentions) {
        *sizes.entry(mention.cluster_id).or_default() += 1;
    }

    docs.iter()
        .flat_map(|doc| {
            let doc_id = doc.key.to_string();
            let sizes = &sizes;
            doc.mentions.iter().map(move |m| EntityRecord {
                doc_id: doc_id.clone(),
                sentence_id: m.sentence,
                tokens_ids: m.token_ids.clone(),
                cluster_id: m.cluster_id,
                tokens: m.tokens.join(" "),
                lemmas: m
                    .tokens
                    .iter()
                    .map(|t| t.to_lowercase())
                    .collect::<Vec<_>>()
                    .join(" "),
                tags: m
                    .tokens
                    .iter()
                    .map(|t| coarse_tag(t))
                    .collect::<Vec<_>>()
                    .join(" "),
                singleton: sizes.get(&m.cluster_id).copied().unwrap_or(0) == 1,
            })
        })
        .collect()
}

/// Read an entity list.
pub fn read_entities(path: impl AsRef<Path>) -> Result<Vec<EntityRecord>> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Write any serializable value as pretty JSON.
pub fn write_json<T: Serialize + ?Sized>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    std::fs::write(path, text + "\n")?;
    Ok(())
}

/// CONLL rows from a document map and its entity list.
///
/// Entities name their tokens by id; markers from several entities on the
/// same token are `|`-joined in entity order. Entities pointing at unknown
/// documents or tokens are skipped with a warning.
pub fn conll_rows(docs: &DocumentMap, entities: &[EntityRecord]) -> Result<Vec<ConllRow>> {
    let mut by_doc: HashMap<&str, Vec<&EntityRecord>> = HashMap::new();
    for entity in entities {
        by_doc.entry(entity.doc_id.as_str()).or_default().push(entity);
    }
    let known: HashSet<&str> = docs.iter().map(|(k, _)| k).collect();
    for doc_id in by_doc.keys().filter(|d| !known.contains(*d)) {
        warn!("entities reference unknown document {}", doc_id);
    }

    let mut out = Vec::new();
    for (doc_id, rows) in docs.iter() {
        let topic = doc_id
            .split('_')
            .next()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::invalid_input(format!("document key {:?} has no topic", doc_id)))?;
        let subtopic = format!("{}_0", topic);

        let mut tokens: Vec<AlignedToken> = rows
            .iter()
            .map(|TokenRow(sentence, token_id, text, _)| AlignedToken {
                sentence: *sentence,
                token_id: *token_id,
                text: text.clone(),
                marker: ClusterMarker::none(),
            })
            .collect();
        let position: HashMap<usize, usize> =
            tokens.iter().enumerate().map(|(i, t)| (t.token_id, i)).collect();

        for entity in by_doc.get(doc_id).into_iter().flatten() {
            let positions: Option<Vec<usize>> =
                entity.tokens_ids.iter().map(|id| position.get(id).copied()).collect();
            match positions {
                Some(p) if !p.is_empty() => mark_mention(&mut tokens, &p, entity.cluster_id),
                _ => warn!(
                    "{}: entity of cluster {} names missing tokens {:?}",
                    doc_id, entity.cluster_id, entity.tokens_ids
                ),
            }
        }

        out.extend(tokens.into_iter().zip(rows).map(|(t, row)| ConllRow {
            topic: topic.to_string(),
            subtopic: subtopic.clone(),
            doc_id: doc_id.to_string(),
            sentence_id: t.sentence,
            token_id: t.token_id,
            token: t.text,
            sentence_flag: row.3,
            marker: t.marker,
            line: 0,
        }));
    }
    Ok(out)
}
