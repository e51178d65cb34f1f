use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use crate::config::SpotterConfig;
use crate::document::{Document, Line};
use crate::error::SpottingError;
use crate::pipeline::stats::WordStats;
use crate::pipeline::traits::{OccurrenceCorrector, QueryMatcher};
use crate::spotting::dedup::OccurrenceSet;
use crate::spotting::segmentation::{best_decoding, split_at_spaces};
use crate::spotting::{MatchOutcome, Query, SkipReason};
use crate::types::{
    page_of, BestDecoding, DocumentReport, Location, Occurrence, OccurrenceRecord, SpotSummary,
};

/// Stops a running spotter at the next (sub-line, query) boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Outcome of [`KeywordSpotter::spot_batch`]: reports of the documents that
/// went through and the errors of those that did not.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub reports: Vec<DocumentReport>,
    pub failures: Vec<(PathBuf, SpottingError)>,
}

pub struct KeywordSpotter {
    config: SpotterConfig,
    matcher: Box<dyn QueryMatcher>,
    corrector: Box<dyn OccurrenceCorrector>,
    stats: WordStats,
    cancel: CancelHandle,
}

pub(crate) struct KeywordSpotterParts {
    pub config: SpotterConfig,
    pub matcher: Box<dyn QueryMatcher>,
    pub corrector: Box<dyn OccurrenceCorrector>,
}

struct SublineResult {
    hits: Vec<(Occurrence, BestDecoding)>,
}

struct LineResult {
    line_id: String,
    /// Non-empty sub-lines only, in line order.
    sublines: Vec<SublineResult>,
    summary: SpotSummary,
}

impl KeywordSpotter {
    pub(crate) fn from_parts(parts: KeywordSpotterParts) -> Self {
        Self {
            config: parts.config,
            matcher: parts.matcher,
            corrector: parts.corrector,
            stats: WordStats::new(),
            cancel: CancelHandle::default(),
        }
    }

    pub fn config(&self) -> &SpotterConfig {
        &self.config
    }

    pub fn stats(&self) -> &WordStats {
        &self.stats
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Spots the comma-separated words of `raw_query` in `document`.
    pub fn spot(&self, document: &Document, raw_query: &str) -> Result<DocumentReport, SpottingError> {
        let queries = Query::parse_list(raw_query, &document.symbols);
        if queries.is_empty() {
            tracing::warn!(
                document = document.name.as_str(),
                query = raw_query,
                "spotter: query resolves to no searchable word"
            );
        }
        self.spot_document(document, &queries)
    }

    pub fn spot_document(
        &self,
        document: &Document,
        queries: &[Query],
    ) -> Result<DocumentReport, SpottingError> {
        document.validate()?;
        tracing::debug!(
            document = document.name.as_str(),
            lines = document.lines.len(),
            queries = queries.len(),
            "spotter: document start"
        );

        let line_results = document
            .lines
            .par_iter()
            .map(|line| self.spot_line(document, line, queries))
            .collect::<Result<Vec<_>, SpottingError>>()?;

        self.stats.reset_document();
        let mut records = Vec::new();
        let mut summary = SpotSummary::default();
        let mut current_page: Option<&str> = None;
        for result in &line_results {
            let page = page_of(&result.line_id);
            if current_page != Some(page) {
                self.stats.reset_page();
                current_page = Some(page);
            }
            summary.merge(&result.summary);
            for subline in &result.sublines {
                let counts = self.stats.increment();
                records.extend(subline.hits.iter().map(|(occurrence, best)| OccurrenceRecord {
                    document: document.name.clone(),
                    occurrence: occurrence.clone(),
                    best: best.clone(),
                    counts,
                }));
            }
        }

        let counts = self.stats.snapshot();
        tracing::debug!(
            document = document.name.as_str(),
            records = records.len(),
            sublines = summary.sublines,
            combinations = summary.combinations_scored,
            "spotter: document done"
        );
        Ok(DocumentReport {
            document: document.name.clone(),
            records,
            counts,
            summary,
        })
    }

    /// Loads and spots every document directory. Document-scoped failures
    /// are logged and collected; cancellation and aborts end the batch.
    pub fn spot_batch(&self, dirs: &[PathBuf], raw_query: &str) -> Result<BatchReport, SpottingError> {
        self.spot_batch_with(dirs, raw_query, |_| {})
    }

    /// Like [`Self::spot_batch`], calling `on_document` after each directory.
    pub fn spot_batch_with(
        &self,
        dirs: &[PathBuf],
        raw_query: &str,
        mut on_document: impl FnMut(&Path),
    ) -> Result<BatchReport, SpottingError> {
        let mut batch = BatchReport::default();
        for dir in dirs {
            let result = Document::load(dir, raw_query, &self.config)
                .and_then(|document| self.spot(&document, raw_query));
            match result {
                Ok(report) => batch.reports.push(report),
                Err(err) if err.is_document_scoped() => {
                    tracing::error!(
                        document = %dir.display(),
                        error = %err,
                        "spotter: skipping document"
                    );
                    batch.failures.push((dir.clone(), err));
                }
                Err(err) => return Err(err),
            }
            on_document(dir);
        }
        Ok(batch)
    }

    fn spot_line(
        &self,
        document: &Document,
        line: &Line,
        queries: &[Query],
    ) -> Result<LineResult, SpottingError> {
        let table = &document.symbols;
        let mut summary = SpotSummary {
            lines: 1,
            ..SpotSummary::default()
        };
        let mut sublines = Vec::new();

        for subline in split_at_spaces(line.matrix.rows(), table.space()) {
            if subline.is_empty() {
                continue;
            }
            summary.sublines += 1;
            let best = best_decoding(subline.rows, table, self.config.remove_control_symbols);
            let location = Location::new(line.id.as_str(), subline.ordinal);
            let mut occurrences = OccurrenceSet::new();
            for query in queries {
                if self.cancel.is_cancelled() {
                    return Err(SpottingError::Cancelled);
                }
                let outcome = self.matcher.match_query(
                    subline.rows,
                    &location,
                    query,
                    table,
                    &self.config,
                    &mut occurrences,
                )?;
                record_outcome(&mut summary, outcome);
            }

            let corrected = self
                .corrector
                .correct(occurrences.into_vec(), &best, &self.config);
            sublines.push(SublineResult {
                hits: corrected
                    .into_iter()
                    .map(|occurrence| (occurrence, best.clone()))
                    .collect(),
            });
        }

        Ok(LineResult {
            line_id: line.id.clone(),
            sublines,
            summary,
        })
    }
}

fn record_outcome(summary: &mut SpotSummary, outcome: MatchOutcome) {
    match outcome {
        MatchOutcome::Enumerated { combinations, .. } => {
            summary.pairs_matched += 1;
            summary.combinations_scored += combinations;
        }
        MatchOutcome::Skipped(SkipReason::QueryTooLong) => summary.pairs_too_short += 1,
        MatchOutcome::Skipped(SkipReason::NoCandidates | SkipReason::Pruned(_)) => {
            summary.pairs_pruned += 1
        }
        MatchOutcome::Skipped(SkipReason::CombinationLimit { .. }) => {
            summary.pairs_over_limit += 1
        }
    }
}
