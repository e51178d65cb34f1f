use super::candidates::CandidateSet;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub mean: f32,
    pub min: f32,
    pub max: f32,
}

impl Score {
    /// Strictly above the word-confidence threshold.
    pub fn passes(&self, word_confidence: f32) -> bool {
        self.mean > word_confidence
    }
}

/// Mean, min and max of `rows[combination[i]][sets[i].code]` over all positions.
pub fn score(rows: &[Vec<f32>], sets: &[CandidateSet], combination: &[usize]) -> Score {
    let mut sum = 0.0f64;
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for (set, &row) in sets.iter().zip(combination) {
        let value = rows[row][set.code];
        sum += value as f64;
        min = min.min(value);
        max = max.max(value);
    }
    if combination.is_empty() {
        return Score {
            mean: 0.0,
            min: 0.0,
            max: 0.0,
        };
    }
    Score {
        mean: (sum / combination.len() as f64) as f32,
        min,
        max,
    }
}
