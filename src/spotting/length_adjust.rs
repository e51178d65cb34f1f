use crate::types::{BestDecoding, Occurrence};

/// Length difference tolerated before confidence is deflated.
pub const MAX_LENGTH_DIFFERENCE: usize = 2;

/// `(min + 1) / max` of the two lengths when they differ by more than
/// [`MAX_LENGTH_DIFFERENCE`], otherwise `None`.
pub fn deflation_factor(best_len: usize, hit_len: usize) -> Option<f32> {
    if best_len.abs_diff(hit_len) <= MAX_LENGTH_DIFFERENCE {
        return None;
    }
    let shorter = best_len.min(hit_len);
    let longer = best_len.max(hit_len);
    Some((shorter + 1) as f32 / longer as f32)
}

/// Deflates occurrences whose text length strays from the sub-line's best
/// decoding and drops those no longer strictly above `word_confidence`.
pub fn adjust(
    occurrences: Vec<Occurrence>,
    best: &BestDecoding,
    word_confidence: f32,
) -> Vec<Occurrence> {
    let best_len = best.len();
    occurrences
        .into_iter()
        .filter_map(|mut occurrence| {
            let hit_len = occurrence.text.chars().count();
            let Some(factor) = deflation_factor(best_len, hit_len) else {
                return Some(occurrence);
            };
            occurrence.confidence *= factor;
            occurrence.min_confidence *= factor;
            occurrence.max_confidence *= factor;
            if occurrence.confidence <= word_confidence {
                tracing::debug!(
                    location = %occurrence.location,
                    text = occurrence.text.as_str(),
                    best = best.text.as_str(),
                    factor,
                    "length adjustment: dropped occurrence"
                );
                return None;
            }
            Some(occurrence)
        })
        .collect()
}
