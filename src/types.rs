use std::fmt;

use serde::Serialize;

/// Identifies one word candidate: a sub-line of a text line.
///
/// `line_id` has the form `<page>.<line>`; `word` is the 1-based ordinal of
/// the sub-line within that line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Location {
    pub line_id: String,
    pub word: usize,
}

impl Location {
    pub fn new(line_id: impl Into<String>, word: usize) -> Self {
        Self {
            line_id: line_id.into(),
            word,
        }
    }

    pub fn page_id(&self) -> &str {
        page_of(&self.line_id)
    }

    /// Line part of the id, empty when the id carries no page prefix.
    pub fn line_part(&self) -> &str {
        self.line_id
            .split_once('.')
            .map(|(_, line)| line)
            .unwrap_or("")
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.line_id, self.word)
    }
}

pub(crate) fn page_of(line_id: &str) -> &str {
    line_id
        .split_once('.')
        .map(|(page, _)| page)
        .unwrap_or(line_id)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Occurrence {
    pub location: Location,
    /// CTC-decoded text of the alignment.
    pub text: String,
    /// Query string the alignment was found for.
    pub query: String,
    /// Matrix rows chosen for each query position, strictly increasing.
    pub rows: Vec<usize>,
    pub confidence: f32,
    pub min_confidence: f32,
    pub max_confidence: f32,
    /// 1-based order in which this distinct text was first accepted in its sub-line.
    pub hit_ordinal: usize,
}

/// Row-wise argmax decoding of a sub-line, independent of any query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestDecoding {
    pub text: String,
    /// Mean confidence over the non-blank argmax frames.
    pub confidence: f32,
    pub min_confidence: f32,
    pub max_confidence: f32,
    /// Every frame's argmax is the blank symbol. The decoding itself is then
    /// empty, though queries are still matched against the sub-line.
    pub all_blank: bool,
}

impl BestDecoding {
    pub(crate) fn blank() -> Self {
        Self {
            text: String::new(),
            confidence: 1.0,
            min_confidence: 1.0,
            max_confidence: 1.0,
            all_blank: true,
        }
    }

    /// Character length used for length adjustment; zero for all-blank sub-lines.
    pub fn len(&self) -> usize {
        if self.all_blank {
            0
        } else {
            self.text.chars().count()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct WordCounts {
    pub overall: u64,
    pub document: u64,
    pub page: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccurrenceRecord {
    pub document: String,
    pub occurrence: Occurrence,
    pub best: BestDecoding,
    /// Counter values right after the occurrence's sub-line was counted.
    pub counts: WordCounts,
}

/// Per-document bookkeeping of what the matcher did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SpotSummary {
    pub lines: u64,
    pub sublines: u64,
    pub pairs_matched: u64,
    pub pairs_pruned: u64,
    pub pairs_too_short: u64,
    pub pairs_over_limit: u64,
    pub combinations_scored: u64,
}

impl SpotSummary {
    pub(crate) fn merge(&mut self, other: &SpotSummary) {
        self.lines += other.lines;
        self.sublines += other.sublines;
        self.pairs_matched += other.pairs_matched;
        self.pairs_pruned += other.pairs_pruned;
        self.pairs_too_short += other.pairs_too_short;
        self.pairs_over_limit += other.pairs_over_limit;
        self.combinations_scored += other.combinations_scored;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentReport {
    pub document: String,
    pub records: Vec<OccurrenceRecord>,
    /// Counter snapshot after the document's last line.
    pub counts: WordCounts,
    pub summary: SpotSummary,
}
