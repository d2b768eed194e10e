//! CONLL-style coreference interchange format.
//!
//! One tab-separated row per token:
//!
//! ```text
//! #begin document test_entities
//! 0	0_0	0_news_12	0	0	Vaccines	True	(3)
//! 0	0_0	0_news_12	0	1	reduce	True	-
//! 0	0_0	0_news_12	0	2	severe	True	(5
//! 0	0_0	0_news_12	0	3	illness	True	5)
//! #end document
//! ```
//!
//! Columns: topic, subtopic, document key, sentence id, token id, token text,
//! sentence-has-mention flag, cluster marker. The marker is `-`, `(id)` for a
//! one-token mention, `(id` / `id)` for a mention start / end, or several of
//! these joined with `|`.
//!
//! Reading happens in two passes:
//!
//! 1. [`parse_conll`] turns text into [`ConllRow`]s. It never fails: short
//!    rows (usually a token broken by a stray newline) are glued to the next
//!    physical line, and anything still unusable becomes a [`RowWarning`].
//! 2. [`ConllDocument::mention_clusters`] replays the markers, collecting
//!    mentions per cluster. Close markers with nothing open and opens never
//!    closed are [`StructuralIssue`]s: the file is corrupt for those clusters.

use crate::error::{Error, Result};
use log::{error, warn};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;

/// Number of columns in a well-formed row.
pub const COLUMN_COUNT: usize = 8;

/// Document name used when none is given.
pub const DEFAULT_DOCUMENT_NAME: &str = "test_entities";

const BEGIN_PREFIX: &str = "#begin document";
const END_LINE: &str = "#end document";

// =============================================================================
// Markers
// =============================================================================

/// One piece of a cluster marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MarkerPart {
    /// `(id`: a mention of cluster `id` starts on this token.
    Start(String),
    /// `id)`: a mention of cluster `id` ends on this token.
    End(String),
    /// `(id)`: a one-token mention of cluster `id`.
    Single(String),
}

impl MarkerPart {
    /// Cluster this piece refers to.
    #[must_use]
    pub fn cluster_id(&self) -> &str {
        match self {
            MarkerPart::Start(id) | MarkerPart::End(id) | MarkerPart::Single(id) => id,
        }
    }

    /// True if a mention starts here.
    #[must_use]
    pub fn opens(&self) -> bool {
        matches!(self, MarkerPart::Start(_) | MarkerPart::Single(_))
    }

    /// True if a mention ends here.
    #[must_use]
    pub fn closes(&self) -> bool {
        matches!(self, MarkerPart::End(_) | MarkerPart::Single(_))
    }
}

impl fmt::Display for MarkerPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerPart::Start(id) => write!(f, "({}", id),
            MarkerPart::End(id) => write!(f, "{})", id),
            MarkerPart::Single(id) => write!(f, "({})", id),
        }
    }
}

impl FromStr for MarkerPart {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (opens, rest) = match s.strip_prefix('(') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (closes, id) = match rest.strip_suffix(')') {
            Some(id) => (true, id),
            None => (false, rest),
        };
        if id.is_empty() || id.contains(&['(', ')', '|'][..]) {
            return Err(Error::parse(format!("bad cluster marker {:?}", s)));
        }
        match (opens, closes) {
            (true, true) => Ok(MarkerPart::Single(id.to_string())),
            (true, false) => Ok(MarkerPart::Start(id.to_string())),
            (false, true) => Ok(MarkerPart::End(id.to_string())),
            (false, false) => Err(Error::parse(format!("bad cluster marker {:?}", s))),
        }
    }
}

/// The full marker column of one token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterMarker(Vec<MarkerPart>);

impl ClusterMarker {
    /// Empty marker (`-`).
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Append a piece.
    pub fn push(&mut self, part: MarkerPart) {
        self.0.push(part);
    }

    /// Pieces in column order.
    #[must_use]
    pub fn parts(&self) -> &[MarkerPart] {
        &self.0
    }

    /// True for `-`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if any mention starts or ends here.
    #[must_use]
    pub fn has_boundary(&self) -> bool {
        !self.0.is_empty()
    }
}

impl fmt::Display for ClusterMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("-");
        }
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            write!(f, "{}", part)?;
        }
        Ok(())
    }
}

impl FromStr for ClusterMarker {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut marker = ClusterMarker::none();
        for piece in s.split('|') {
            let piece = piece.trim();
            if piece == "-" || piece.is_empty() {
                continue;
            }
            marker.push(piece.parse()?);
        }
        Ok(marker)
    }
}

// =============================================================================
// Rows
// =============================================================================

/// One token row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConllRow {
    /// Topic column.
    pub topic: String,
    /// Subtopic column (`{topic}_0`).
    pub subtopic: String,
    /// Document key (`{topic}_{type}_{id}`).
    pub doc_id: String,
    /// Sentence index within the document.
    pub sentence_id: usize,
    /// Token index within the document.
    pub token_id: usize,
    /// Token text.
    pub token: String,
    /// Whether the token's sentence holds a mention boundary.
    pub sentence_flag: bool,
    /// Cluster marker column.
    pub marker: ClusterMarker,
    /// 1-based line number the row was read from (0 for generated rows).
    pub line: usize,
}

impl fmt::Display for ConllRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.topic,
            self.subtopic,
            self.doc_id,
            self.sentence_id,
            self.token_id,
            self.token,
            if self.sentence_flag { "True" } else { "False" },
            self.marker
        )
    }
}

impl ConllRow {
    fn from_fields(fields: &[&str], line: usize) -> Result<Self> {
        if fields.len() < COLUMN_COUNT {
            return Err(Error::parse(format!(
                "expected {} columns, found {}",
                COLUMN_COUNT,
                fields.len()
            )));
        }
        // Extra columns come from tabs inside the token text.
        let last = fields.len() - 1;
        let token = fields[5..last - 1].join("\t");

        let sentence_id = fields[3]
            .trim()
            .parse()
            .map_err(|_| Error::parse(format!("bad sentence id {:?}", fields[3])))?;
        let token_id = fields[4]
            .trim()
            .parse()
            .map_err(|_| Error::parse(format!("bad token id {:?}", fields[4])))?;
        let sentence_flag = match fields[last - 1].trim() {
            "True" | "true" | "1" => true,
            "False" | "false" | "0" => false,
            other => return Err(Error::parse(format!("bad sentence flag {:?}", other))),
        };
        let marker = fields[last].trim_end_matches(&['\r', '\n'][..]).parse()?;

        Ok(Self {
            topic: fields[0].to_string(),
            subtopic: fields[1].to_string(),
            doc_id: fields[2].to_string(),
            sentence_id,
            token_id,
            token,
            sentence_flag,
            marker,
            line,
        })
    }
}

// =============================================================================
// Writing
// =============================================================================

/// Write rows wrapped in `#begin document` / `#end document`.
pub fn write_conll<'a, W, I>(mut out: W, name: &str, rows: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a ConllRow>,
{
    writeln!(out, "{} {}", BEGIN_PREFIX, name)?;
    for row in rows {
        writeln!(out, "{}", row)?;
    }
    writeln!(out, "{}", END_LINE)?;
    out.flush()
}

/// Render rows to a string.
#[must_use]
pub fn conll_to_string<'a, I>(name: &str, rows: I) -> String
where
    I: IntoIterator<Item = &'a ConllRow>,
{
    let mut out = format!("{} {}\n", BEGIN_PREFIX, name);
    for row in rows {
        out.push_str(&row.to_string());
        out.push('\n');
    }
    out.push_str(END_LINE);
    out.push('\n');
    out
}

// =============================================================================
// Reading: rows
// =============================================================================

/// A row that could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowWarning {
    /// 1-based line number.
    pub line: usize,
    /// What went wrong.
    pub message: String,
}

impl fmt::Display for RowWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Rows of one CONLL file.
#[derive(Debug, Clone, Default)]
pub struct ConllDocument {
    /// Name from the `#begin document` line, if present.
    pub name: Option<String>,
    /// Usable rows in file order.
    pub rows: Vec<ConllRow>,
    /// Rows dropped or repaired during reading.
    pub warnings: Vec<RowWarning>,
}

/// Parse CONLL text. Never fails; see [`ConllDocument::warnings`].
#[must_use]
pub fn parse_conll(input: &str) -> ConllDocument {
    let mut doc = ConllDocument::default();
    // (first line number, accumulated text) of a short row awaiting its tail
    let mut pending: Option<(usize, String)> = None;

    for (idx, raw) in input.lines().enumerate() {
        let lno = idx + 1;
        if raw.starts_with('#') {
            if let Some(name) = raw.strip_prefix(BEGIN_PREFIX) {
                let name = name.trim();
                if !name.is_empty() && doc.name.is_none() {
                    doc.name = Some(name.to_string());
                }
            }
            continue;
        }
        if raw.trim().is_empty() && pending.is_none() {
            continue;
        }

        let line_columns = raw.split('\t').count();
        let (start_line, text) = match pending.take() {
            Some((first, fragment)) if line_columns < COLUMN_COUNT => {
                warn!("line {}: joining broken row with line {}", first, lno);
                doc.warnings.push(RowWarning {
                    line: first,
                    message: format!("row broken across lines {}-{}, rejoined", first, lno),
                });
                (first, fragment + raw)
            }
            Some((first, fragment)) => {
                warn!("line {}: dropping truncated row {:?}", first, fragment);
                doc.warnings.push(RowWarning {
                    line: first,
                    message: format!("truncated row dropped: {:?}", fragment),
                });
                (lno, raw.to_string())
            }
            None => (lno, raw.to_string()),
        };

        let fields: Vec<&str> = text.split('\t').collect();
        if fields.len() < COLUMN_COUNT {
            pending = Some((start_line, text));
            continue;
        }

        match ConllRow::from_fields(&fields, start_line) {
            Ok(row) => doc.rows.push(row),
            Err(e) => {
                warn!("line {}: skipping row: {}", start_line, e);
                doc.warnings.push(RowWarning {
                    line: start_line,
                    message: e.to_string(),
                });
            }
        }
    }

    if let Some((first, fragment)) = pending {
        warn!("line {}: truncated row at end of file", first);
        doc.warnings.push(RowWarning {
            line: first,
            message: format!("truncated row at end of file: {:?}", fragment),
        });
    }

    doc
}

/// Read and parse a CONLL file.
pub fn read_conll(path: impl AsRef<Path>) -> Result<ConllDocument> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_conll(&text))
}

// =============================================================================
// Reading: mentions and clusters
// =============================================================================

/// One token of a parsed mention.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MentionToken {
    /// Document key.
    pub doc_id: String,
    /// Token index within the document.
    pub token_id: usize,
    /// Token text.
    pub text: String,
}

/// A mention read back from markers: its tokens from start to end inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMention {
    /// Tokens in order.
    pub tokens: Vec<MentionToken>,
    /// Line of the start marker.
    pub start_line: usize,
    /// Line of the end marker.
    pub end_line: usize,
}

impl ParsedMention {
    /// Document of the first token.
    #[must_use]
    pub fn doc_id(&self) -> &str {
        self.tokens.first().map_or("", |t| t.doc_id.as_str())
    }

    /// First token index.
    #[must_use]
    pub fn first_token(&self) -> usize {
        self.tokens.first().map_or(0, |t| t.token_id)
    }

    /// Last token index.
    #[must_use]
    pub fn last_token(&self) -> usize {
        self.tokens.last().map_or(0, |t| t.token_id)
    }

    /// Token texts joined by spaces.
    #[must_use]
    pub fn text(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A structural defect in the marker column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralIssue {
    /// `id)` with no open `(id`.
    UnmatchedClose {
        /// Cluster id.
        cluster_id: String,
        /// 1-based line number.
        line: usize,
    },
    /// `(id` still open at end of file.
    Unterminated {
        /// Cluster id.
        cluster_id: String,
        /// Line of the start marker.
        line: usize,
    },
}

impl StructuralIssue {
    /// Cluster the issue affects.
    #[must_use]
    pub fn cluster_id(&self) -> &str {
        match self {
            StructuralIssue::UnmatchedClose { cluster_id, .. }
            | StructuralIssue::Unterminated { cluster_id, .. } => cluster_id,
        }
    }

    /// Line the issue was found on.
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            StructuralIssue::UnmatchedClose { line, .. }
            | StructuralIssue::Unterminated { line, .. } => *line,
        }
    }
}

impl fmt::Display for StructuralIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructuralIssue::UnmatchedClose { cluster_id, line } => {
                write!(f, "line {}: close marker {}) has no open mention", line, cluster_id)
            }
            StructuralIssue::Unterminated { cluster_id, line } => {
                write!(f, "line {}: mention ({} is never closed", line, cluster_id)
            }
        }
    }
}

/// Clusters and documents recovered from one file.
#[derive(Debug, Clone, Default)]
pub struct MentionClusters {
    clusters: Vec<(String, Vec<ParsedMention>)>,
    cluster_index: HashMap<String, usize>,
    documents: Vec<(String, Vec<String>)>,
    document_index: HashMap<String, usize>,
    /// Structural defects in file order.
    pub issues: Vec<StructuralIssue>,
}

impl MentionClusters {
    fn file_mention(&mut self, cluster_id: &str, mention: ParsedMention) {
        let slot = match self.cluster_index.get(cluster_id) {
            Some(&slot) => slot,
            None => {
                self.clusters.push((cluster_id.to_string(), Vec::new()));
                self.cluster_index
                    .insert(cluster_id.to_string(), self.clusters.len() - 1);
                self.clusters.len() - 1
            }
        };
        self.clusters[slot].1.push(mention);
    }

    fn push_token(&mut self, doc_id: &str, token: &str) {
        let slot = match self.document_index.get(doc_id) {
            Some(&slot) => slot,
            None => {
                self.documents.push((doc_id.to_string(), Vec::new()));
                self.document_index
                    .insert(doc_id.to_string(), self.documents.len() - 1);
                self.documents.len() - 1
            }
        };
        self.documents[slot].1.push(token.to_string());
    }

    /// Clusters in order of first completed mention.
    pub fn clusters(&self) -> impl Iterator<Item = (&str, &[ParsedMention])> {
        self.clusters.iter().map(|(id, m)| (id.as_str(), m.as_slice()))
    }

    /// Mentions of one cluster.
    #[must_use]
    pub fn cluster(&self, cluster_id: &str) -> Option<&[ParsedMention]> {
        self.cluster_index
            .get(cluster_id)
            .map(|&slot| self.clusters[slot].1.as_slice())
    }

    /// Number of clusters with at least one complete mention.
    #[must_use]
    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    /// Documents in file order with their token texts.
    pub fn documents(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.documents.iter().map(|(id, t)| (id.as_str(), t.as_slice()))
    }

    /// Cluster ids touched by a structural issue.
    #[must_use]
    pub fn corrupt_clusters(&self) -> HashSet<&str> {
        self.issues.iter().map(StructuralIssue::cluster_id).collect()
    }

    /// True if no structural issue was found.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.issues.is_empty()
    }
}

#[derive(Debug)]
struct OpenMention {
    tokens: Vec<MentionToken>,
    start_line: usize,
}

impl ConllDocument {
    /// Replay the markers into clusters of mentions.
    ///
    /// Each token is first appended to every open mention, then the marker
    /// parts are applied in column order, so `1)|(1` ends one mention and
    /// starts the next. A close ends the earliest open mention of its
    /// cluster: exported spans never contain each other, so overlapping
    /// mentions of one cluster close in the order they opened. Defects are
    /// logged and collected in [`MentionClusters::issues`]; other clusters
    /// remain usable.
    #[must_use]
    pub fn mention_clusters(&self) -> MentionClusters {
        let mut out = MentionClusters::default();
        let mut open: HashMap<String, VecDeque<OpenMention>> = HashMap::new();
        // Open order, for deterministic unterminated reports.
        let mut open_order: Vec<String> = Vec::new();

        for row in &self.rows {
            out.push_token(&row.doc_id, &row.token);

            let token = MentionToken {
                doc_id: row.doc_id.clone(),
                token_id: row.token_id,
                text: row.token.clone(),
            };
            for queue in open.values_mut() {
                for mention in queue.iter_mut() {
                    mention.tokens.push(token.clone());
                }
            }

            for part in row.marker.parts() {
                let id = part.cluster_id();
                match part {
                    MarkerPart::Single(_) => out.file_mention(
                        id,
                        ParsedMention {
                            tokens: vec![token.clone()],
                            start_line: row.line,
                            end_line: row.line,
                        },
                    ),
                    MarkerPart::Start(_) => {
                        if !open_order.iter().any(|o| o == id) {
                            open_order.push(id.to_string());
                        }
                        open.entry(id.to_string()).or_default().push_back(OpenMention {
                            tokens: vec![token.clone()],
                            start_line: row.line,
                        });
                    }
                    MarkerPart::End(_) => match open.get_mut(id).and_then(VecDeque::pop_front) {
                        Some(mention) => out.file_mention(
                            id,
                            ParsedMention {
                                tokens: mention.tokens,
                                start_line: mention.start_line,
                                end_line: row.line,
                            },
                        ),
                        None => {
                            let issue = StructuralIssue::UnmatchedClose {
                                cluster_id: id.to_string(),
                                line: row.line,
                            };
                            error!("{}", issue);
                            out.issues.push(issue);
                        }
                    },
                }
            }
        }

        for id in open_order {
            if let Some(queue) = open.remove(&id) {
                for mention in queue {
                    let issue = StructuralIssue::Unterminated {
                        cluster_id: id.clone(),
                        line: mention.start_line,
                    };
                    error!("{}", issue);
                    out.issues.push(issue);
                }
            }
        }

        out
    }
}
