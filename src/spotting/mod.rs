pub mod candidates;
pub mod combinations;
pub mod ctc;
pub mod dedup;
pub mod length_adjust;
pub mod matcher;
pub mod matrix;
pub mod normalization;
pub mod pruning;
pub mod scoring;
pub mod segmentation;
pub mod symbols;

pub use matcher::{match_query, MatchOutcome, SkipReason};
pub use matrix::ConfidenceMatrix;
pub use symbols::{Query, Symbol, SymbolTable};
