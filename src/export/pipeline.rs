//! Batch export: topic groups in, aligned documents out.
//!
//! Runs in two phases so groups can be processed in parallel while cluster
//! ids stay unique and stable across the file:
//!
//! 1. Per group (parallel with the `parallel` feature): resolve boundaries on
//!    both documents, build chains, tokenize. Produces [`GroupChains`] with
//!    no ids yet.
//! 2. Sequentially, in topic order: hand each group's chains fresh ids from
//!    one [`ClusterIdAllocator`] and align the surviving spans.
//!
//! The output is identical whether phase 1 ran in parallel or not.
//!
//! A group that fails (a mention beyond the end of its document) is logged
//! and skipped; the rest of the batch still exports.

use cdcr_core::{DocKey, DocType, MentionSpan};
use log::{debug, info, warn};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use super::align::{align, AlignedDocument, ClusterBound};
use super::boundary::{resolve_boundaries, Bound, Resolution};
use super::chains::{build_chains, ChainTask, ClusterIdAllocator, MentionKey};
use super::json::{entities_from_aligned, write_json, DocumentMap, EntityRecord};
use super::tokenize::{DocumentTokens, RuleTokenizer, Tokenizer};
use super::topic::TopicGroup;
use crate::error::{Error, Result};
use crate::eval::conll::{conll_to_string, write_conll, ConllRow};
use crate::offset::SpanConverter;

/// Export switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// Build groups on the rayon pool (needs the `parallel` feature).
    pub parallel: bool,
    /// First cluster id handed out.
    pub first_cluster_id: u64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            first_cluster_id: 0,
        }
    }
}

/// One document side of a group after phase 1.
#[derive(Debug, Clone)]
pub struct SideChains {
    /// Synthetic key.
    pub key: DocKey,
    /// Segmented text.
    pub tokens: DocumentTokens,
    /// Spans left after boundary resolution.
    pub survivors: Vec<Bound>,
    /// Spans folded into a container.
    pub merged: usize,
}

/// Phase-1 result for one topic group.
#[derive(Debug, Clone)]
pub struct GroupChains {
    /// Topic index.
    pub topic: usize,
    /// News side.
    pub news: SideChains,
    /// Science side.
    pub science: SideChains,
    /// Chains in chain-set order.
    pub chains: Vec<Vec<MentionKey>>,
    /// Records that fed the chains.
    pub records: usize,
}

impl GroupChains {
    /// Chains with a single mention.
    #[must_use]
    pub fn singletons(&self) -> usize {
        self.chains.iter().filter(|c| c.len() == 1).count()
    }
}

/// Progress notification, one per group, sent as phase 1 finishes it.
#[derive(Debug, Clone)]
pub struct GroupReport {
    /// Topic index.
    pub topic: usize,
    /// News document id.
    pub news_id: u64,
    /// Science document id.
    pub science_id: u64,
    /// Failure message, if the group was skipped.
    pub error: Option<String>,
}

fn check_spans(side: DocType, text: &str, spans: &[(u64, &MentionSpan)]) -> Result<()> {
    let conv = SpanConverter::new(text);
    for (owner, span) in spans {
        if span.end > conv.char_len() {
            return Err(Error::invalid_input(format!(
                "record {}: {} mention {}..{} runs past the end of the document ({} chars)",
                owner,
                side,
                span.start,
                span.end,
                conv.char_len()
            )));
        }
        if conv.slice_chars(text, span.start, span.end) != Some(span.text.as_str()) {
            debug!(
                "record {}: {} mention text {:?} differs from document text at {}..{}",
                owner, side, span.text, span.start, span.end
            );
        }
    }
    Ok(())
}

fn build_side(
    topic: usize,
    doc_type: DocType,
    doc_id: u64,
    text: &str,
    spans: &[(u64, &MentionSpan)],
    tokenizer: &dyn Tokenizer,
) -> Result<(SideChains, Resolution)> {
    check_spans(doc_type, text, spans)?;
    let bounds: Vec<Bound> = spans
        .iter()
        .map(|(owner, span)| Bound::new(span.start, span.end, *owner))
        .collect();
    let resolution = resolve_boundaries(&bounds);
    let side = SideChains {
        key: DocKey::new(topic, doc_type, doc_id),
        tokens: tokenizer.tokenize(text),
        survivors: resolution.survivors().to_vec(),
        merged: resolution.merge_count(),
    };
    Ok((side, resolution))
}

/// Phase 1 for one group.
pub fn build_group(topic: usize, group: &TopicGroup, tokenizer: &dyn Tokenizer) -> Result<GroupChains> {
    let news_spans: Vec<(u64, &MentionSpan)> = group.records.iter().map(|r| (r.id, &r.news)).collect();
    let science_spans: Vec<(u64, &MentionSpan)> =
        group.records.iter().map(|r| (r.id, &r.science)).collect();

    let (news, news_res) = build_side(
        topic,
        DocType::News,
        group.news_id,
        &group.news_text,
        &news_spans,
        tokenizer,
    )?;
    let (science, science_res) = build_side(
        topic,
        DocType::Science,
        group.science_id,
        &group.science_text,
        &science_spans,
        tokenizer,
    )?;

    let tasks = group.records.iter().map(|r| {
        ChainTask::new(
            MentionKey::new(DocType::News, news_res.resolve(r.id)),
            MentionKey::new(DocType::Science, science_res.resolve(r.id)),
            r.is_coref,
        )
    });
    let chains = build_chains(tasks).into_chains();

    Ok(GroupChains {
        topic,
        news,
        science,
        chains,
        records: group.records.len(),
    })
}

/// Counts for the final summary line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    /// Groups offered.
    pub groups: usize,
    /// Groups skipped, as `(topic, reason)`.
    pub skipped_groups: Vec<(usize, String)>,
    /// Documents written.
    pub documents: usize,
    /// Records that fed chains.
    pub records: usize,
    /// Mentions aligned.
    pub mentions: usize,
    /// Chains built.
    pub chains: usize,
    /// Of those, singletons.
    pub singletons: usize,
    /// Spans folded into a container.
    pub merged_spans: usize,
}

/// Aligned documents plus summary.
#[derive(Debug, Clone, Default)]
pub struct ExportOutput {
    /// Documents in topic order, news before science.
    pub documents: Vec<AlignedDocument>,
    /// Counts.
    pub summary: ExportSummary,
}

/// Files written by [`ExportOutput::write`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    /// Document map JSON.
    pub documents: PathBuf,
    /// Entity list JSON.
    pub entities: PathBuf,
    /// Gold CONLL.
    pub conll: PathBuf,
}

impl ExportPaths {
    /// `<stem><ext>`, `<stem>_entities<ext>`, `<stem>.conll` next to `path`.
    #[must_use]
    pub fn for_output(path: &Path) -> Self {
        Self {
            documents: path.to_path_buf(),
            entities: with_suffix(path, "_entities"),
            conll: path.with_extension("conll"),
        }
    }
}

/// `dir/stem.ext` -> `dir/stem{suffix}.ext`.
#[must_use]
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}{}", stem, suffix),
    };
    path.with_file_name(name)
}

impl ExportOutput {
    /// Document map JSON value.
    #[must_use]
    pub fn document_map(&self) -> DocumentMap {
        DocumentMap::from_aligned(&self.documents)
    }

    /// Entity list.
    #[must_use]
    pub fn entities(&self) -> Vec<EntityRecord> {
        entities_from_aligned(&self.documents)
    }

    /// All CONLL rows in document order.
    #[must_use]
    pub fn conll_rows(&self) -> Vec<ConllRow> {
        self.documents.iter().flat_map(AlignedDocument::conll_rows).collect()
    }

    /// CONLL text.
    #[must_use]
    pub fn conll(&self, name: &str) -> String {
        conll_to_string(name, &self.conll_rows())
    }

    /// Write the document map, entity list and CONLL file.
    pub fn write(&self, path: &Path, name: &str) -> Result<ExportPaths> {
        let paths = ExportPaths::for_output(path);
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        write_json(&paths.documents, &self.document_map())?;
        write_json(&paths.entities, &self.entities())?;
        self.write_conll(&paths.conll, name)?;
        Ok(paths)
    }

    /// Write only the CONLL file.
    pub fn write_conll(&self, path: &Path, name: &str) -> Result<()> {
        let file = File::create(path)?;
        write_conll(BufWriter::new(file), name, &self.conll_rows())?;
        Ok(())
    }
}

/// Runs the two-phase export with a given tokenizer.
#[derive(Debug, Clone, Default)]
pub struct Exporter<T: Tokenizer = RuleTokenizer> {
    tokenizer: T,
    options: ExportOptions,
}

impl Exporter<RuleTokenizer> {
    /// Exporter with the rule tokenizer.
    #[must_use]
    pub fn new(options: ExportOptions) -> Self {
        Self {
            tokenizer: RuleTokenizer,
            options,
        }
    }
}

impl<T: Tokenizer> Exporter<T> {
    /// Exporter with a custom tokenizer.
    #[must_use]
    pub fn with_tokenizer(tokenizer: T, options: ExportOptions) -> Self {
        Self { tokenizer, options }
    }

    /// Export groups; topic indices are positions in `groups`.
    #[must_use]
    pub fn export(&self, groups: &[TopicGroup]) -> ExportOutput {
        self.export_with(groups, |_| {})
    }

    /// Export, calling `on_group` as each group finishes phase 1.
    pub fn export_with<F>(&self, groups: &[TopicGroup], on_group: F) -> ExportOutput
    where
        F: Fn(&GroupReport) + Sync,
    {
        let built = self.build_all(groups, &on_group);

        let mut alloc = ClusterIdAllocator::starting_at(self.options.first_cluster_id);
        let mut output = ExportOutput::default();
        output.summary.groups = groups.len();

        for (topic, result) in built.into_iter().enumerate() {
            let group = match result {
                Ok(group) => group,
                Err(e) => {
                    warn!("topic {}: skipped: {}", topic, e);
                    output.summary.skipped_groups.push((topic, e.to_string()));
                    continue;
                }
            };

            let ids = alloc.assign(&group.chains);
            let mut mentions = 0;
            for side in [&group.news, &group.science] {
                let bounds: Vec<ClusterBound> = side
                    .survivors
                    .iter()
                    .filter_map(|b| {
                        let key = MentionKey::new(side.key.doc_type, b.owner);
                        match ids.get(&key) {
                            Some(&id) => Some(ClusterBound::new(b.start, b.end, id)),
                            None => {
                                warn!("{}: mention {} has no chain", side.key, key);
                                None
                            }
                        }
                    })
                    .collect();
                let doc = align(side.key, &side.tokens, &bounds);
                mentions += doc.mentions.len();
                output.documents.push(doc);
            }

            info!(
                "topic {}: news {} / science {}: {} records, {} chains ({} singletons), {} spans merged",
                topic,
                group.news.key.doc_id,
                group.science.key.doc_id,
                group.records,
                group.chains.len(),
                group.singletons(),
                group.news.merged + group.science.merged
            );

            let s = &mut output.summary;
            s.documents += 2;
            s.records += group.records;
            s.mentions += mentions;
            s.chains += group.chains.len();
            s.singletons += group.singletons();
            s.merged_spans += group.news.merged + group.science.merged;
        }

        output
    }

    fn build_all<F>(&self, groups: &[TopicGroup], on_group: &F) -> Vec<Result<GroupChains>>
    where
        F: Fn(&GroupReport) + Sync,
    {
        let run = |topic: usize, group: &TopicGroup| {
            let result = build_group(topic, group, &self.tokenizer);
            on_group(&GroupReport {
                topic,
                news_id: group.news_id,
                science_id: group.science_id,
                error: result.as_ref().err().map(ToString::to_string),
            });
            result
        };

        #[cfg(feature = "parallel")]
        {
            if self.options.parallel {
                use rayon::prelude::*;
                return groups
                    .par_iter()
                    .enumerate()
                    .map(|(topic, group)| run(topic, group))
                    .collect();
            }
        }

        groups
            .iter()
            .enumerate()
            .map(|(topic, group)| run(topic, group))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::topic::ScreenedRecord;

    fn screened(id: u64, news: (&str, usize, usize), sci: (&str, usize, usize), yes: bool) -> ScreenedRecord {
        ScreenedRecord {
            id,
            news: MentionSpan::new(news.0, news.1, news.2).unwrap(),
            science: MentionSpan::new(sci.0, sci.1, sci.2).unwrap(),
            is_coref: yes,
            similarity: None,
        }
    }

    fn group(records: Vec<ScreenedRecord>) -> TopicGroup {
        TopicGroup {
            news_id: 12,
            science_id: 34,
            news_text: "New vaccine works. It is safe.".into(),
            science_text: "The mRNA vaccine showed efficacy.".into(),
            records,
        }
    }

    #[test]
    fn nested_news_spans_share_one_mention() {
        let g = group(vec![
            screened(1, ("New vaccine", 0, 11), ("The mRNA vaccine", 0, 16), true),
            screened(2, ("vaccine", 4, 11), ("efficacy", 24, 32), false),
        ]);
        let built = build_group(0, &g, &RuleTokenizer).unwrap();

        assert_eq!(built.news.survivors.len(), 1);
        assert_eq!(built.news.merged, 1);
        // News 2 resolves to news 1, which already sits in a chain: the "no"
        // only adds the science singleton.
        assert_eq!(built.chains.len(), 2);
    }

    #[test]
    fn ids_are_sequential_across_groups() {
        let groups = vec![
            group(vec![screened(1, ("New vaccine", 0, 11), ("The mRNA vaccine", 0, 16), true)]),
            group(vec![screened(2, ("It", 19, 21), ("efficacy", 24, 32), false)]),
        ];
        let out = Exporter::new(ExportOptions {
            parallel: false,
            first_cluster_id: 0,
        })
        .export(&groups);

        let ids: Vec<u64> = out
            .documents
            .iter()
            .flat_map(|d| d.mentions.iter().map(|m| m.cluster_id))
            .collect();
        assert_eq!(ids, vec![0, 0, 1, 2]);
        assert_eq!(out.documents[2].key.to_string(), "1_news_12");
        assert_eq!(out.summary.chains, 3);
        assert_eq!(out.summary.singletons, 2);
    }

    #[test]
    fn out_of_range_group_is_skipped() {
        let groups = vec![
            group(vec![screened(1, ("x", 0, 500), ("The", 0, 3), true)]),
            group(vec![screened(2, ("It", 19, 21), ("efficacy", 24, 32), true)]),
        ];
        let out = Exporter::new(ExportOptions::default()).export(&groups);

        assert_eq!(out.summary.skipped_groups.len(), 1);
        assert_eq!(out.summary.skipped_groups[0].0, 0);
        assert_eq!(out.documents.len(), 2);
        assert_eq!(out.documents[0].key.topic, 1);
    }

    #[test]
    fn output_paths() {
        let paths = ExportPaths::for_output(Path::new("out/data.json"));
        assert_eq!(paths.entities, PathBuf::from("out/data_entities.json"));
        assert_eq!(paths.conll, PathBuf::from("out/data.conll"));
        assert_eq!(with_suffix(Path::new("a/b.json"), "_train"), PathBuf::from("a/b_train.json"));
    }
}
