//! CONLL reading and writing, including the recovery rules for damaged files.

use cdcr::eval::{conll_to_string, parse_conll, ClusterMarker, ClusterSet, ConllRow, StructuralIssue};

fn row(doc: &str, token_id: usize, token: &str, marker: &str) -> ConllRow {
    ConllRow {
        topic: "0".into(),
        subtopic: "0_0".into(),
        doc_id: doc.into(),
        sentence_id: 0,
        token_id,
        token: token.into(),
        sentence_flag: marker != "-",
        marker: marker.parse().unwrap(),
        line: 0,
    }
}

fn strip_lines(rows: &[ConllRow]) -> Vec<ConllRow> {
    rows.iter().cloned().map(|r| ConllRow { line: 0, ..r }).collect()
}

#[test]
fn written_rows_read_back_unchanged() {
    let rows = vec![
        row("0_news_1", 0, "Vaccines", "(3)"),
        row("0_news_1", 1, "reduce", "-"),
        row("0_news_1", 2, "severe", "(5"),
        row("0_news_1", 3, "illness", "5)|(7)"),
    ];
    let text = conll_to_string("test_entities", &rows);
    let parsed = parse_conll(&text);

    assert_eq!(parsed.name.as_deref(), Some("test_entities"));
    assert!(parsed.warnings.is_empty());
    assert_eq!(strip_lines(&parsed.rows), rows);
    assert_eq!(parsed.rows[2].line, 4);
}

#[test]
fn row_split_by_a_stray_newline_is_rejoined() {
    let text = "#begin document test_entities\n\
                0\t0_0\t0_news_1\t0\t0\tgene\n\
                -X\tTrue\t(1)\n\
                0\t0_0\t0_news_1\t0\t1\tworks\tTrue\t-\n\
                #end document\n";
    let parsed = parse_conll(text);

    assert_eq!(parsed.rows.len(), 2);
    assert_eq!(parsed.rows[0].token, "gene-X");
    assert_eq!(parsed.rows[0].marker.to_string(), "(1)");
    assert_eq!(parsed.rows[0].line, 2);
    assert_eq!(parsed.warnings.len(), 1);
}

#[test]
fn truncated_row_before_a_full_row_is_dropped() {
    let text = "0\t0_0\t0_news_1\t0\n\
                0\t0_0\t0_news_1\t0\t1\tworks\tTrue\t(2)\n";
    let parsed = parse_conll(text);

    assert_eq!(parsed.rows.len(), 1);
    assert_eq!(parsed.rows[0].token, "works");
    assert_eq!(parsed.warnings[0].line, 1);
}

#[test]
fn bad_numeric_columns_become_warnings() {
    let text = "0\t0_0\t0_news_1\tx\t0\tword\tTrue\t-\n\
                0\t0_0\t0_news_1\t0\t1\tword\tmaybe\t-\n\
                0\t0_0\t0_news_1\t0\t2\tword\tTrue\t(1)\n";
    let parsed = parse_conll(text);

    assert_eq!(parsed.rows.len(), 1);
    assert_eq!(parsed.warnings.len(), 2);
}

#[test]
fn unbalanced_markers_are_reported_and_isolated() {
    let text = "0\t0_0\t0_news_1\t0\t0\ta\tTrue\t(1)\n\
                0\t0_0\t0_news_1\t0\t1\tb\tTrue\t2)\n\
                0\t0_0\t0_news_1\t0\t2\tc\tTrue\t(3\n\
                0\t0_0\t0_news_1\t0\t3\td\tTrue\t(4)\n";
    let mentions = parse_conll(text).mention_clusters();

    assert!(!mentions.is_well_formed());
    assert_eq!(
        mentions.issues,
        vec![
            StructuralIssue::UnmatchedClose {
                cluster_id: "2".into(),
                line: 2
            },
            StructuralIssue::Unterminated {
                cluster_id: "3".into(),
                line: 3
            },
        ]
    );

    let clusters = ClusterSet::from_parsed(&mentions, true);
    let mut ids: Vec<&str> = clusters.clusters().iter().map(|c| c.id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["1", "4"]);
}

#[test]
fn mentions_of_one_cluster_closing_on_the_same_token() {
    let text = "0\t0_0\t0_news_1\t0\t0\tthe\tTrue\t(1\n\
                0\t0_0\t0_news_1\t0\t1\tgene\tTrue\t(1\n\
                0\t0_0\t0_news_1\t0\t2\tX\tTrue\t1)|1)\n";
    let mentions = parse_conll(text).mention_clusters();
    assert!(mentions.is_well_formed());

    let parsed = mentions.cluster("1").unwrap();
    let mut spans: Vec<(usize, usize)> = parsed.iter().map(|m| (m.first_token(), m.last_token())).collect();
    spans.sort_unstable();
    assert_eq!(spans, vec![(0, 2), (1, 2)]);
}

#[test]
fn marker_text_round_trips() {
    for text in ["-", "(12)", "(3", "3)", "(1|2)", "1)|(2)|(3"] {
        let marker: ClusterMarker = text.parse().unwrap();
        assert_eq!(marker.to_string(), text);
    }
}
