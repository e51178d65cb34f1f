use super::symbols::Query;

/// Rows plausible for one query position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSet {
    pub position: usize,
    pub code: usize,
    /// Ascending matrix rows.
    pub rows: Vec<usize>,
}

impl CandidateSet {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Rows whose confidence for `code` is strictly above `threshold`.
pub fn extract(rows: &[Vec<f32>], code: usize, threshold: f32) -> Vec<usize> {
    rows.iter()
        .enumerate()
        .filter(|(_, row)| row.get(code).is_some_and(|&value| value > threshold))
        .map(|(idx, _)| idx)
        .collect()
}

/// One candidate set per query position; positions sharing a symbol get
/// independent sets.
pub fn extract_all(rows: &[Vec<f32>], query: &Query, threshold: f32) -> Vec<CandidateSet> {
    query
        .codes
        .iter()
        .enumerate()
        .map(|(position, &code)| CandidateSet {
            position,
            code,
            rows: extract(rows, code, threshold),
        })
        .collect()
}
