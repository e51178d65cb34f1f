use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SpottingError;

/// What to do when a (sub-line, query) pair would enumerate more
/// combinations than `combination_limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitPolicy {
    /// Drop the pair and keep going.
    #[default]
    Skip,
    /// Stop the whole run with [`SpottingError::CombinationLimitExceeded`].
    Abort,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    /// Raw recognizer scores are clamped to `>= cap` before normalizing.
    pub cap: f32,
    pub power: i32,
    /// Divide by `cap` instead of the matrix minimum.
    pub use_cap: bool,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            cap: -65.0,
            power: 2,
            use_cap: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub use_cache: bool,
    pub create_cache: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            use_cache: true,
            create_cache: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotterConfig {
    /// Mean confidence an alignment must strictly exceed to count as a hit.
    pub word_confidence: f32,
    pub combination_limit: u64,
    pub limit_policy: LimitPolicy,
    pub remove_ctc_columns: bool,
    pub collapse_ctc_runs: bool,
    pub adjust_by_word_length: bool,
    /// Drop multi-character control tokens (e.g. `<$>`) from decoded text.
    pub remove_control_symbols: bool,
    /// Reduce the symbol table and matrices to the query characters.
    pub project_symbols: bool,
    pub normalization: NormalizationConfig,
    pub cache: CacheConfig,
}

impl SpotterConfig {
    pub const DEFAULT_WORD_CONFIDENCE: f32 = 0.95;
    pub const DEFAULT_COMBINATION_LIMIT: u64 = 4_000_000_000;

    pub fn load(path: &Path) -> Result<Self, SpottingError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| SpottingError::io("read spotter config", e))?;
        let config: Self = serde_json::from_str(&data)
            .map_err(|e| SpottingError::json("parse spotter config", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SpottingError> {
        if !(0.0..=1.0).contains(&self.word_confidence) {
            return Err(SpottingError::invalid_config(format!(
                "word_confidence must be within [0, 1], got {}",
                self.word_confidence
            )));
        }
        if self.combination_limit == 0 {
            return Err(SpottingError::invalid_config(
                "combination_limit must be positive",
            ));
        }
        if self.normalization.power < 1 {
            return Err(SpottingError::invalid_config(format!(
                "normalization power must be at least 1, got {}",
                self.normalization.power
            )));
        }
        Ok(())
    }

    /// Lowest per-character confidence that can still reach
    /// `word_confidence` on average over `query_len` characters.
    pub fn char_threshold(&self, query_len: usize) -> f32 {
        let l = query_len as f32;
        (self.word_confidence * l - (l - 1.0)).max(0.0)
    }
}

impl Default for SpotterConfig {
    fn default() -> Self {
        Self {
            word_confidence: Self::DEFAULT_WORD_CONFIDENCE,
            combination_limit: Self::DEFAULT_COMBINATION_LIMIT,
            limit_policy: LimitPolicy::Skip,
            remove_ctc_columns: true,
            collapse_ctc_runs: false,
            adjust_by_word_length: true,
            remove_control_symbols: true,
            project_symbols: true,
            normalization: NormalizationConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}
