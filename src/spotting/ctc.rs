//! CTC best-path collapsing.
//!
//! Decoding runs in two passes over typed symbol codes: repeated codes are
//! merged first (runs of blanks included), then blanks are dropped. The blank
//! is its own code, so a recognizer's literal `-` character can never be
//! mistaken for it, and a blank between two equal characters keeps both.

use super::symbols::{Symbol, SymbolTable};

/// First pass: merge runs of identical codes.
pub fn merge_repeats(codes: &[usize]) -> Vec<usize> {
    let mut merged = Vec::with_capacity(codes.len());
    for &code in codes {
        if merged.last() != Some(&code) {
            merged.push(code);
        }
    }
    merged
}

/// Both passes: merged codes without blanks.
pub fn collapse(codes: &[usize], blank: usize) -> Vec<usize> {
    merge_repeats(codes)
        .into_iter()
        .filter(|&code| code != blank)
        .collect()
}

/// Emitted text of a raw per-frame code sequence.
pub fn decode(codes: &[usize], table: &SymbolTable, remove_control: bool) -> String {
    let mut text = String::new();
    for code in collapse(codes, table.blank()) {
        match table.symbol(code) {
            Some(Symbol::Char(c)) => text.push(*c),
            Some(Symbol::Space) => text.push(' '),
            Some(Symbol::Control(token)) if !remove_control => text.push_str(token),
            Some(Symbol::Control(_)) | Some(Symbol::Blank) | None => {}
        }
    }
    text
}

/// Frame sequence implied by an alignment: frame `rows[i]` emits `codes[i]`,
/// every other frame between the first and last chosen row is blank.
pub fn alignment_frames(rows: &[usize], codes: &[usize], blank: usize) -> Vec<usize> {
    let (Some(&first), Some(&last)) = (rows.first(), rows.last()) else {
        return Vec::new();
    };
    let mut frames = vec![blank; last + 1 - first];
    for (&row, &code) in rows.iter().zip(codes) {
        frames[row - first] = code;
    }
    frames
}
