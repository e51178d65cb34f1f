use crate::config::SpotterConfig;
use crate::error::SpottingError;
use crate::spotting::dedup::OccurrenceSet;
use crate::spotting::{MatchOutcome, Query, SymbolTable};
use crate::types::{BestDecoding, Location, Occurrence};

pub trait QueryMatcher: Send + Sync {
    fn match_query(
        &self,
        rows: &[Vec<f32>],
        location: &Location,
        query: &Query,
        table: &SymbolTable,
        config: &SpotterConfig,
        occurrences: &mut OccurrenceSet,
    ) -> Result<MatchOutcome, SpottingError>;
}

/// Post-processes the occurrences of one sub-line once every query ran.
pub trait OccurrenceCorrector: Send + Sync {
    fn correct(
        &self,
        occurrences: Vec<Occurrence>,
        best: &BestDecoding,
        config: &SpotterConfig,
    ) -> Vec<Occurrence>;
}
