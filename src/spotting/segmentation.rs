use super::ctc;
use super::matrix::argmax_path;
use super::symbols::SymbolTable;
use crate::types::BestDecoding;

/// A run of rows between space frames of one line.
#[derive(Debug, Clone, Copy)]
pub struct Subline<'a> {
    /// 1-based position within the line, empty sub-lines included.
    pub ordinal: usize,
    pub rows: &'a [Vec<f32>],
}

impl Subline<'_> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Splits a line at every row whose argmax is the space symbol. Space rows
/// belong to no sub-line; empty sub-lines keep their ordinal.
pub fn split_at_spaces(rows: &[Vec<f32>], space: Option<usize>) -> Vec<Subline<'_>> {
    let Some(space) = space else {
        return vec![Subline { ordinal: 1, rows }];
    };
    let mut sublines = Vec::new();
    let mut start = 0usize;
    for (idx, code) in argmax_path(rows).into_iter().enumerate() {
        if code == space {
            sublines.push(Subline {
                ordinal: sublines.len() + 1,
                rows: &rows[start..idx],
            });
            start = idx + 1;
        }
    }
    sublines.push(Subline {
        ordinal: sublines.len() + 1,
        rows: &rows[start..],
    });
    sublines
}

/// Argmax decoding of a sub-line with mean/min/max confidence over its
/// non-blank frames.
pub fn best_decoding(rows: &[Vec<f32>], table: &SymbolTable, remove_control: bool) -> BestDecoding {
    let path = argmax_path(rows);
    let blank = table.blank();
    let emitted: Vec<f32> = path
        .iter()
        .zip(rows)
        .filter(|(&code, _)| code != blank)
        .map(|(&code, row)| row[code])
        .collect();
    if emitted.is_empty() {
        return BestDecoding::blank();
    }
    let sum: f64 = emitted.iter().map(|&v| v as f64).sum();
    BestDecoding {
        text: ctc::decode(&path, table, remove_control),
        confidence: (sum / emitted.len() as f64) as f32,
        min_confidence: emitted.iter().copied().fold(f32::INFINITY, f32::min),
        max_confidence: emitted.iter().copied().fold(f32::NEG_INFINITY, f32::max),
        all_blank: false,
    }
}
