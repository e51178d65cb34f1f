use crate::config::NormalizationConfig;

/// Maps raw recognizer scores (log-domain, `<= 0`, higher is better) to
/// `[0, 1]` confidences: `(1 - max(raw, cap) / divisor) ^ power`.
///
/// `divisor` is the configured cap when `use_cap` is set, otherwise the
/// smallest raw score of the matrix. A zero divisor maps every cell to 1.
pub fn normalize(rows: &[Vec<f32>], config: &NormalizationConfig) -> Vec<Vec<f32>> {
    let divisor = if config.use_cap {
        config.cap
    } else {
        rows.iter()
            .flatten()
            .copied()
            .fold(f32::INFINITY, f32::min)
    };
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|&raw| normalize_cell(raw, config.cap, divisor, config.power))
                .collect()
        })
        .collect()
}

fn normalize_cell(raw: f32, cap: f32, divisor: f32, power: i32) -> f32 {
    if divisor == 0.0 || !divisor.is_finite() {
        return 1.0;
    }
    let base = (1.0 - raw.max(cap) / divisor).clamp(0.0, 1.0);
    base.powi(power)
}
