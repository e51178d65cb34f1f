use std::collections::BTreeSet;
use std::path::Path;

use ctc_kws::spotting::ctc::decode;
use ctc_kws::spotting::dedup::OccurrenceSet;
use ctc_kws::spotting::match_query;
use ctc_kws::{
    ConfidenceMatrix, Document, KeywordSpotterBuilder, Line, Location, MatchOutcome, SkipReason,
    SpotterConfig, SymbolTable,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const BLANK: usize = 0;
const SPACE: usize = 1;

fn alphabet_table(letters: &str) -> SymbolTable {
    let mut text = String::from("<ctc>\t0\n<space>\t1\n");
    for (idx, c) in letters.chars().enumerate() {
        text.push_str(&format!("{c}\t{}\n", idx + 2));
    }
    SymbolTable::parse(&text).expect("valid symbols")
}

fn one_hot(codes: &[usize], width: usize) -> Vec<Vec<f32>> {
    codes
        .iter()
        .map(|&code| {
            let mut row = vec![0.001; width];
            row[code] = 0.99;
            row
        })
        .collect()
}

fn config(word_confidence: f32) -> SpotterConfig {
    SpotterConfig {
        word_confidence,
        ..SpotterConfig::default()
    }
}

fn hits(rows: &[Vec<f32>], word: &str, table: &SymbolTable, config: &SpotterConfig) -> OccurrenceSet {
    let mut set = OccurrenceSet::new();
    match_query(
        rows,
        &Location::new("p.l", 1),
        &table.resolve_query(word),
        table,
        config,
        &mut set,
    )
    .expect("matching succeeds");
    set
}

fn hit_texts(set: &OccurrenceSet) -> BTreeSet<String> {
    set.iter().map(|o| o.text.clone()).collect()
}

#[test]
fn in_order_word_is_found_reversed_is_not() {
    let table = alphabet_table("ab");
    let rows = one_hot(&[2, BLANK, 3, BLANK], 4);

    let found = hits(&rows, "ab", &table, &config(0.9)).into_vec();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].text, "ab");
    assert!((found[0].confidence - 0.99).abs() < 1e-6);

    assert!(hits(&rows, "ba", &table, &config(0.9)).is_empty());
}

#[test]
fn short_hit_inside_long_word_is_deflated_away() {
    let table = alphabet_table("abcdefghij");
    let codes: Vec<usize> = (2..12).chain([BLANK]).collect();
    let line = Line {
        id: "p1.l1".to_string(),
        matrix: ConfidenceMatrix::new(one_hot(&codes, 12)).expect("valid matrix"),
    };
    let document = Document::new("doc", table, vec![line]);

    let adjusted = KeywordSpotterBuilder::new(config(0.9)).build().expect("config");
    let report = adjusted.spot(&document, "abc").expect("spot");
    assert!(report.records.is_empty());

    let unadjusted = KeywordSpotterBuilder::new(SpotterConfig {
        adjust_by_word_length: false,
        ..config(0.9)
    })
    .build()
    .expect("config");
    let report = unadjusted.spot(&document, "abc").expect("spot");
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].occurrence.text, "abc");
    assert_eq!(report.records[0].best.text, "abcdefghij");
}

#[test]
fn limit_guard_reports_count_without_enumerating() {
    let table = alphabet_table("ab");
    let rows = one_hot(&[2, 2, 2, 2, 3, 3, 3, 3, BLANK], 4);
    let limited = SpotterConfig {
        combination_limit: 10,
        ..config(0.9)
    };
    let mut set = OccurrenceSet::new();
    let outcome = match_query(
        &rows,
        &Location::new("p.l", 1),
        &table.resolve_query("ab"),
        &table,
        &limited,
        &mut set,
    )
    .expect("skip policy never errors");
    assert_eq!(
        outcome,
        MatchOutcome::Skipped(SkipReason::CombinationLimit { count: 16 })
    );
    assert!(set.is_empty());

    let unlimited = hits(&rows, "ab", &table, &config(0.9));
    assert!(!unlimited.is_empty());
}

#[test]
fn batch_reads_document_directory_and_writes_cache() {
    let dir = tempfile::tempdir().expect("tempdir");
    let doc_dir = dir.path().join("doc_1");
    std::fs::create_dir(&doc_dir).expect("doc dir");
    write_raw_document(&doc_dir);

    let spotter = KeywordSpotterBuilder::new(SpotterConfig::default())
        .build()
        .expect("config");
    let batch = spotter
        .spot_batch(&[doc_dir.clone(), dir.path().join("missing")], "ab")
        .expect("batch");
    assert_eq!(batch.reports.len(), 1);
    assert_eq!(batch.failures.len(), 1);

    let report = &batch.reports[0];
    assert_eq!(report.document, "doc_1");
    assert_eq!(report.records.len(), 1);
    let record = &report.records[0];
    assert_eq!(record.occurrence.text, "ab");
    assert_eq!(record.occurrence.location.to_string(), "r1.l1.1");
    assert!(record.occurrence.confidence > 0.95);

    let cached = std::fs::read_dir(&doc_dir)
        .expect("list doc dir")
        .filter_map(Result::ok)
        .any(|entry| entry.file_name().to_string_lossy().starts_with("confmats_"));
    assert!(cached);
}

fn write_raw_document(dir: &Path) {
    std::fs::write(dir.join("symbols.txt"), "<ctc>\t0\n<space>\t1\na\t2\nb\t3\nx\t4\n")
        .expect("write symbols");
    let hot = |code: usize| {
        let row: Vec<String> = (0..5)
            .map(|c| if c == code { "-0.01" } else { "-40.0" }.to_string())
            .collect();
        format!("[{}]", row.join(","))
    };
    let rows = [2, BLANK, 3, BLANK, SPACE, 4, BLANK]
        .iter()
        .map(|&code| hot(code))
        .collect::<Vec<_>>()
        .join(",");
    std::fs::write(
        dir.join("confmats.json"),
        format!(r#"[{{"id": "r1.l1", "rows": [{rows}]}}]"#),
    )
    .expect("write confmats");
}

fn random_rows(rng: &mut StdRng, len: usize, width: usize) -> Vec<Vec<f32>> {
    (0..len)
        .map(|_| (0..width).map(|_| rng.gen_range(0.0f32..1.0)).collect())
        .collect()
}

#[test]
fn pruning_switches_only_remove_hits() {
    let table = alphabet_table("ab");
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let len = rng.gen_range(2..9);
        let rows = random_rows(&mut rng, len, 4);
        let base = SpotterConfig {
            remove_ctc_columns: false,
            collapse_ctc_runs: false,
            ..config(0.6)
        };
        let everything = hit_texts(&hits(&rows, "ab", &table, &base));

        let ctc_removed = SpotterConfig {
            remove_ctc_columns: true,
            ..base.clone()
        };
        let collapsed = SpotterConfig {
            collapse_ctc_runs: true,
            ..base.clone()
        };
        for variant in [ctc_removed, collapsed] {
            let subset = hit_texts(&hits(&rows, "ab", &table, &variant));
            assert!(subset.is_subset(&everything));
        }
    }
}

#[test]
fn every_hit_clears_the_thresholds() {
    let table = alphabet_table("ab");
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..200 {
        let len = rng.gen_range(1..10);
        let rows = random_rows(&mut rng, len, 4);
        let wc = rng.gen_range(0.3f32..0.9);
        let cfg = SpotterConfig {
            collapse_ctc_runs: rng.gen_bool(0.5),
            remove_ctc_columns: rng.gen_bool(0.5),
            ..config(wc)
        };
        let query = table.resolve_query("aba");
        let threshold = cfg.char_threshold(query.len());
        for hit in hits(&rows, "aba", &table, &cfg).iter() {
            assert!(hit.confidence > wc);
            assert!(!hit.text.is_empty());
            assert!(hit.rows.windows(2).all(|w| w[0] < w[1]));
            for (&row, &code) in hit.rows.iter().zip(&query.codes) {
                assert!(rows[row][code] > threshold);
            }
        }
    }
}

proptest! {
    #[test]
    fn expanded_frames_decode_to_the_word(
        word in "[ab-]{1,8}",
        expansion in prop::collection::vec((1usize..4, 0usize..3), 9),
    ) {
        let table = alphabet_table("ab-");
        let mut frames = vec![BLANK; expansion[8].1];
        let mut previous = None;
        for (c, &(repeats, gap)) in word.chars().zip(&expansion) {
            let code = table.code_of(c).expect("known letter");
            // Equal neighbours need a blank between them to stay two letters.
            let blanks = if previous == Some(code) { gap.max(1) } else { gap };
            frames.extend(std::iter::repeat(BLANK).take(blanks));
            frames.extend(std::iter::repeat(code).take(repeats));
            previous = Some(code);
        }
        frames.extend(std::iter::repeat(BLANK).take(expansion[8].0 - 1));
        prop_assert_eq!(decode(&frames, &table, true), word);
    }

    #[test]
    fn raising_word_confidence_never_adds_hits(
        seed in any::<u64>(),
        low in 0.2f32..0.6,
        delta in 0.0f32..0.3,
    ) {
        let table = alphabet_table("ab");
        let mut rng = StdRng::seed_from_u64(seed);
        let len = rng.gen_range(2..8);
        let rows = random_rows(&mut rng, len, 4);
        let loose = hit_texts(&hits(&rows, "ab", &table, &config(low)));
        let strict = hit_texts(&hits(&rows, "ab", &table, &config(low + delta)));
        prop_assert!(strict.is_subset(&loose));
    }
}
