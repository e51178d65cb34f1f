use crate::error::SpottingError;

const MATRIX_CONTEXT: &str = "confidence matrix";

/// Normalized confidences of one text line: rows are time steps, columns are
/// symbol codes. Values are non-negative; matching code only ever borrows
/// row slices of it.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceMatrix {
    rows: Vec<Vec<f32>>,
    width: usize,
}

impl ConfidenceMatrix {
    pub fn new(mut rows: Vec<Vec<f32>>) -> Result<Self, SpottingError> {
        let width = rows.first().map_or(0, Vec::len);
        for (idx, row) in rows.iter_mut().enumerate() {
            if row.len() != width {
                return Err(SpottingError::malformed(
                    MATRIX_CONTEXT,
                    format!("row {idx} has {} columns, expected {width}", row.len()),
                ));
            }
            for value in row.iter_mut() {
                *value = value.abs();
            }
        }
        Ok(Self { rows, width })
    }

    pub fn rows(&self) -> &[Vec<f32>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Index of the first maximum in `row` (NaN never wins).
pub fn row_argmax(row: &[f32]) -> usize {
    let mut best = 0usize;
    let mut best_value = f32::NEG_INFINITY;
    for (idx, &value) in row.iter().enumerate() {
        if value > best_value {
            best = idx;
            best_value = value;
        }
    }
    best
}

pub fn argmax_path(rows: &[Vec<f32>]) -> Vec<usize> {
    rows.iter().map(|row| row_argmax(row)).collect()
}
