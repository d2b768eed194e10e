use cdcr::eval::{muc_score, parse_conll, ClusterSet};
use cdcr::export::{build_chains, group_records, ChainTask, ExportOptions, Exporter};
use cdcr::{AnnotationRecord, Judgment, Label};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::collections::HashSet;

const NEWS: &str = "Researchers report that a common gene variant slows ageing. \
    The variant was found in centenarians. Experts say the gene could guide new drugs.";
const SCIENCE: &str = "We identify FOXO3 as a longevity gene in a cohort of centenarians. \
    FOXO3 variants associate with extended lifespan and reduced age-related disease.";

/// `groups` topic groups of `per_group` records over the same pair of texts.
fn synthetic_records(groups: u64, per_group: u64) -> Vec<AnnotationRecord> {
    let news_spans = [(0, 11), (24, 45), (60, 71), (85, 97), (111, 119)];
    let science_spans = [(12, 17), (21, 37), (53, 65), (67, 81), (97, 114)];
    let mut records = Vec::new();
    for g in 0..groups {
        for i in 0..per_group {
            let (ns, ne) = news_spans[(i % 5) as usize];
            let (ss, se) = science_spans[((i * 3 + g) % 5) as usize];
            let news: String = NEWS.chars().skip(ns).take(ne - ns).collect();
            let science: String = SCIENCE.chars().skip(ss).take(se - ss).collect();
            let label = if (i + g) % 3 == 0 { Label::Yes } else { Label::No };
            records.push(AnnotationRecord {
                id: g * per_group + i,
                news_document_id: g,
                science_document_id: 1000 + g,
                news_text: NEWS.to_string(),
                science_text: SCIENCE.to_string(),
                news_mention: format!("{};{};{}", news, ns, ne),
                science_mention: format!("{};{};{}", science, ss, se),
                judgments: vec![Judgment::new("a", label), Judgment::new("b", label)],
                similarity: Some(((i * 7 + g) % 10) as f64 / 10.0),
                is_bad: false,
            });
        }
    }
    records
}

fn bench_chains(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_chains");
    for size in [100u32, 1_000, 10_000] {
        let tasks: Vec<ChainTask<(u8, u32)>> = (0..size)
            .map(|i| ChainTask::new((0, i % (size / 4)), (1, (i * 7) % (size / 4)), i % 3 == 0))
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), &tasks, |b, tasks| {
            b.iter(|| black_box(build_chains(tasks.iter().cloned()).len()))
        });
    }
    group.finish();
}

fn bench_export(c: &mut Criterion) {
    let records = synthetic_records(200, 10);
    let groups = group_records(&records).groups;

    let mut group = c.benchmark_group("export");
    group.sample_size(20);
    for parallel in [false, true] {
        let exporter = Exporter::new(ExportOptions {
            parallel,
            first_cluster_id: 0,
        });
        let name = if parallel { "parallel" } else { "sequential" };
        group.bench_function(name, |b| b.iter(|| black_box(exporter.export(&groups).summary.mentions)));
    }
    group.finish();
}

fn bench_muc(c: &mut Criterion) {
    let records = synthetic_records(200, 10);
    let groups = group_records(&records).groups;
    let exporter = Exporter::new(ExportOptions::default());
    let gold_text = exporter.export(&groups).conll("bench");
    let predicted: Vec<_> = groups.iter().map(|g| g.with_threshold(0.5)).collect();
    let pred_text = exporter.export(&predicted).conll("bench");

    let gold = ClusterSet::from_parsed(&parse_conll(&gold_text).mention_clusters(), true);
    let pred = ClusterSet::from_parsed(&parse_conll(&pred_text).mention_clusters(), true);
    let (gold_sets, pred_sets): (Vec<HashSet<_>>, Vec<HashSet<_>>) = (gold.mention_sets(), pred.mention_sets());

    c.bench_function("parse_conll", |b| b.iter(|| black_box(parse_conll(&gold_text).rows.len())));
    c.bench_function("muc_score", |b| b.iter(|| black_box(muc_score(&gold_sets, &pred_sets).f1)));
}

criterion_group!(benches, bench_chains, bench_export, bench_muc);
criterion_main!(benches);
