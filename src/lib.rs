pub mod config;
pub mod document;
pub mod error;
pub mod pipeline;
pub mod spotting;
pub mod types;

pub use config::{CacheConfig, LimitPolicy, NormalizationConfig, SpotterConfig};
pub use document::{Document, Line};
pub use error::SpottingError;
pub use pipeline::builder::KeywordSpotterBuilder;
pub use pipeline::runtime::{BatchReport, CancelHandle, KeywordSpotter};
pub use pipeline::stats::WordStats;
pub use pipeline::traits::{OccurrenceCorrector, QueryMatcher};
pub use spotting::{ConfidenceMatrix, MatchOutcome, Query, SkipReason, Symbol, SymbolTable};
pub use types::{
    BestDecoding, DocumentReport, Location, Occurrence, OccurrenceRecord, SpotSummary, WordCounts,
};
