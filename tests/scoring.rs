//! MUC and the comparison report on small hand-checked cluster sets.

use cdcr::eval::{muc_links, muc_score, muc_score_sets, parse_conll, ClusterSet, ComparisonReport, MentionSignature};
use std::collections::HashSet;

fn sets(clusters: &[&[&'static str]]) -> Vec<HashSet<&'static str>> {
    clusters.iter().map(|c| c.iter().copied().collect()).collect()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn textbook_muc_example() {
    let key = sets(&[&["a", "b", "c"], &["d", "e", "f", "g"]]);
    let response = sets(&[&["a", "b"], &["c", "d"], &["f", "g", "h", "i"]]);

    let recall = muc_links(&key, &response);
    assert_eq!((recall.numerator, recall.denominator), (2, 5));
    let precision = muc_links(&response, &key);
    assert_eq!((precision.numerator, precision.denominator), (2, 5));

    let scores = muc_score(&key, &response);
    assert!(close(scores.recall, 0.4));
    assert!(close(scores.precision, 0.4));
    assert!(close(scores.f1, 0.4));
}

#[test]
fn all_singletons_score_zero_without_dividing_by_zero() {
    let key = sets(&[&["a"], &["b"]]);
    let scores = muc_score(&key, &key);
    assert_eq!(scores.as_tuple(), (0.0, 0.0, 0.0));
}

#[test]
fn merging_everything_keeps_recall_and_costs_precision() {
    let key = sets(&[&["a", "b"], &["c", "d"]]);
    let response = sets(&[&["a", "b", "c", "d"]]);
    let scores = muc_score(&key, &response);
    assert!(close(scores.recall, 1.0));
    assert!(close(scores.precision, 2.0 / 3.0));
}

#[test]
fn token_in_two_predicted_clusters_is_penalised() {
    let load = |markers: &[&str]| {
        let rows: Vec<String> = markers
            .iter()
            .enumerate()
            .map(|(i, m)| format!("0\t0_0\t0_news_1\t0\t{}\ttok{}\tTrue\t{}", i, i, m))
            .collect();
        let text = format!("#begin document t\n{}\n#end document\n", rows.join("\n"));
        ClusterSet::from_parsed(&parse_conll(&text).mention_clusters(), true)
    };
    // gold {t0, t1}, {t2, t3}; predicted puts t0 in clusters 1 and 2
    let gold = load(&["(1)", "(1)", "(2)", "(2)"]);
    let predicted = load(&["(1)|(2)", "(3)", "(4)", "(4)"]);
    assert_eq!(predicted.get("1").unwrap().len(), 1);
    assert_eq!(predicted.get("2").unwrap().len(), 1);

    let key = gold.mention_sets();
    let response = predicted.mention_sets();
    let recall = muc_links(&key, &response);
    assert_eq!((recall.numerator, recall.denominator), (0, 2));

    let scores = muc_score_sets(&gold, &predicted);
    assert!(close(scores.recall, 0.0));
    assert!(close(scores.precision, 1.0));
}

fn cluster_set(clusters: &[(&str, &[(&str, usize, usize)])]) -> ClusterSet {
    let mut set = ClusterSet::new();
    for (id, mentions) in clusters {
        for (doc, start, end) in mentions.iter() {
            set.insert(id, MentionSignature::new(*doc, *start, *end));
        }
    }
    set
}

#[test]
fn report_counts_mentions_and_chains() {
    let gold = cluster_set(&[
        ("1", &[("0_news_1", 0, 1), ("0_science_2", 4, 4)]),
        ("2", &[("0_news_1", 6, 7), ("0_news_1", 9, 9)]),
        ("3", &[("0_science_2", 11, 11)]),
    ]);
    let predicted = cluster_set(&[
        ("10", &[("0_news_1", 0, 1), ("0_science_2", 4, 4)]),
        ("11", &[("0_news_1", 6, 7)]),
        ("12", &[("0_news_1", 9, 9)]),
        ("13", &[("0_science_2", 20, 21)]),
    ]);

    let report = ComparisonReport::compute(&gold, &predicted);
    assert_eq!(report.gold_mentions, 5);
    assert_eq!(report.predicted_mentions, 5);
    assert_eq!(report.gold_clusters, 3);
    assert_eq!(report.predicted_clusters, 4);
    assert_eq!(report.correct_mentions, 4);
    assert_eq!(report.false_positive_mentions, 1);
    assert_eq!(report.false_negative_mentions, 1);
    assert!(close(report.mention_precision, 0.8));
    assert!(close(report.mention_recall, 0.8));

    // the cross-document chain is recovered whole; the intra-document one is split
    assert_eq!((report.cross_document.correct, report.cross_document.total), (2, 2));
    assert_eq!((report.intra_document.correct, report.intra_document.total), (0, 2));

    let text = report.to_string();
    assert!(text.contains("strictly correct: 4"));
    assert!(text.contains("MUC: R="));
}

#[test]
fn empty_report_is_all_zero() {
    let report = ComparisonReport::compute(&ClusterSet::new(), &ClusterSet::new());
    assert_eq!(report.mention_precision, 0.0);
    assert_eq!(report.mention_recall, 0.0);
    assert_eq!(report.muc.f1, 0.0);
}
