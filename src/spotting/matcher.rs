use serde::Serialize;

use super::candidates::extract_all;
use super::combinations::{combination_count, Combinations};
use super::ctc;
use super::dedup::{OccurrenceSet, Upsert};
use super::pruning::{prune, PruneStage};
use super::scoring::score;
use super::symbols::{Query, SymbolTable};
use crate::config::{LimitPolicy, SpotterConfig};
use crate::error::SpottingError;
use crate::types::{Location, Occurrence};

/// Why a (sub-line, query) pair produced nothing without being enumerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// More query characters than sub-line rows.
    QueryTooLong,
    /// Some query character has no row above the per-character threshold.
    NoCandidates,
    Pruned(PruneStage),
    CombinationLimit { count: u128 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Skipped(SkipReason),
    Enumerated {
        /// Tuples produced by the enumerator.
        combinations: u64,
        /// Tuples above the word-confidence threshold.
        accepted: u64,
    },
}

/// Matches one query against one sub-line and merges accepted alignments
/// into `occurrences`.
pub fn match_query(
    rows: &[Vec<f32>],
    location: &Location,
    query: &Query,
    table: &SymbolTable,
    config: &SpotterConfig,
    occurrences: &mut OccurrenceSet,
) -> Result<MatchOutcome, SpottingError> {
    let len = query.len();
    if len == 0 || len > rows.len() {
        return Ok(MatchOutcome::Skipped(SkipReason::QueryTooLong));
    }

    let threshold = config.char_threshold(len);
    let sets = extract_all(rows, query, threshold);
    if sets.iter().any(|set| set.is_empty()) {
        return Ok(MatchOutcome::Skipped(SkipReason::NoCandidates));
    }

    let sets = match prune(sets, rows, table.blank(), config) {
        Ok(sets) => sets,
        Err(stage) => return Ok(MatchOutcome::Skipped(SkipReason::Pruned(stage))),
    };

    let count = combination_count(&sets);
    if count > config.combination_limit as u128 {
        match config.limit_policy {
            LimitPolicy::Skip => {
                tracing::warn!(
                    location = %location,
                    query = query.text.as_str(),
                    count = %count,
                    limit = config.combination_limit,
                    "matcher: combination limit exceeded, skipping"
                );
                return Ok(MatchOutcome::Skipped(SkipReason::CombinationLimit { count }));
            }
            LimitPolicy::Abort => {
                return Err(SpottingError::CombinationLimitExceeded {
                    location: location.to_string(),
                    query: query.text.clone(),
                    count,
                    limit: config.combination_limit,
                });
            }
        }
    }

    tracing::debug!(
        location = %location,
        query = query.text.as_str(),
        threshold = format!("{:.4}", threshold),
        count = %count,
        "matcher: enumerating combinations"
    );

    let codes: Vec<usize> = sets.iter().map(|set| set.code).collect();
    let mut combinations = 0u64;
    let mut accepted = 0u64;
    for combination in Combinations::new(&sets) {
        combinations += 1;
        let s = score(rows, &sets, &combination);
        if !s.passes(config.word_confidence) {
            continue;
        }
        let frames = ctc::alignment_frames(&combination, &codes, table.blank());
        let text = ctc::decode(&frames, table, config.remove_control_symbols);
        if text.is_empty() {
            continue;
        }
        accepted += 1;
        let upsert = occurrences.upsert(Occurrence {
            location: location.clone(),
            text,
            query: query.text.clone(),
            rows: combination,
            confidence: s.mean,
            min_confidence: s.min,
            max_confidence: s.max,
            hit_ordinal: 0,
        });
        if upsert == Upsert::Inserted {
            tracing::debug!(
                location = %location,
                query = query.text.as_str(),
                confidence = format!("{:.4}", s.mean),
                "matcher: new occurrence"
            );
        }
    }

    Ok(MatchOutcome::Enumerated {
        combinations,
        accepted,
    })
}
