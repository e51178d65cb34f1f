use crate::config::SpotterConfig;
use crate::error::SpottingError;
use crate::pipeline::traits::{OccurrenceCorrector, QueryMatcher};
use crate::spotting::dedup::OccurrenceSet;
use crate::spotting::length_adjust::adjust;
use crate::spotting::{match_query, MatchOutcome, Query, SymbolTable};
use crate::types::{BestDecoding, Location, Occurrence};

/// Threshold, prune, enumerate and score.
pub struct CombinatorialMatcher;

impl QueryMatcher for CombinatorialMatcher {
    fn match_query(
        &self,
        rows: &[Vec<f32>],
        location: &Location,
        query: &Query,
        table: &SymbolTable,
        config: &SpotterConfig,
        occurrences: &mut OccurrenceSet,
    ) -> Result<MatchOutcome, SpottingError> {
        match_query(rows, location, query, table, config, occurrences)
    }
}

pub struct LengthAdjustmentCorrector;

impl OccurrenceCorrector for LengthAdjustmentCorrector {
    fn correct(
        &self,
        occurrences: Vec<Occurrence>,
        best: &BestDecoding,
        config: &SpotterConfig,
    ) -> Vec<Occurrence> {
        if !config.adjust_by_word_length {
            return occurrences;
        }
        adjust(occurrences, best, config.word_confidence)
    }
}
