use serde::Serialize;

use super::candidates::CandidateSet;
use super::matrix::argmax_path;
use crate::config::SpotterConfig;

/// Candidate-set transformations applied, in `ALL` order, before enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PruneStage {
    /// Position i keeps only rows after the earliest row of position i-1.
    LowerBound,
    /// Position i keeps only rows that leave room for the remaining positions.
    UpperBound,
    /// Drops rows whose argmax is the blank symbol.
    CtcColumns,
    /// Thins runs of consecutive rows down to their boundaries and best interior row.
    CtcRuns,
}

impl PruneStage {
    pub const ALL: [PruneStage; 4] = [
        PruneStage::LowerBound,
        PruneStage::UpperBound,
        PruneStage::CtcColumns,
        PruneStage::CtcRuns,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PruneStage::LowerBound => "lower_bound",
            PruneStage::UpperBound => "upper_bound",
            PruneStage::CtcColumns => "ctc_columns",
            PruneStage::CtcRuns => "ctc_runs",
        }
    }

    pub fn enabled(self, config: &SpotterConfig) -> bool {
        match self {
            PruneStage::LowerBound | PruneStage::UpperBound => true,
            PruneStage::CtcColumns => config.remove_ctc_columns,
            PruneStage::CtcRuns => config.collapse_ctc_runs,
        }
    }

    /// Returns `false` when a set was emptied.
    fn apply(self, sets: &mut [CandidateSet], rows: &[Vec<f32>], blank: usize) -> bool {
        match self {
            PruneStage::LowerBound => prune_lower_bound(sets),
            PruneStage::UpperBound => prune_upper_bound(sets, rows.len()),
            PruneStage::CtcColumns => remove_ctc_columns(sets, rows, blank),
            PruneStage::CtcRuns => collapse_ctc_runs(sets, rows),
        }
    }
}

/// Runs every enabled stage. `Err` carries the stage that emptied a set;
/// the (sub-line, query) pair then has no occurrences.
pub fn prune(
    mut sets: Vec<CandidateSet>,
    rows: &[Vec<f32>],
    blank: usize,
    config: &SpotterConfig,
) -> Result<Vec<CandidateSet>, PruneStage> {
    for stage in PruneStage::ALL {
        if !stage.enabled(config) {
            continue;
        }
        if !stage.apply(&mut sets, rows, blank) {
            tracing::debug!(stage = stage.as_str(), "pruning: candidate set emptied");
            return Err(stage);
        }
    }
    Ok(sets)
}

fn all_non_empty(sets: &[CandidateSet]) -> bool {
    sets.iter().all(|set| !set.is_empty())
}

fn prune_lower_bound(sets: &mut [CandidateSet]) -> bool {
    for i in 1..sets.len() {
        // Rows are ascending, so the first one is the minimum.
        let Some(&floor) = sets[i - 1].rows.first() else {
            return false;
        };
        sets[i].rows.retain(|&row| row > floor);
    }
    all_non_empty(sets)
}

fn prune_upper_bound(sets: &mut [CandidateSet], row_count: usize) -> bool {
    let len = sets.len();
    for (i, set) in sets.iter_mut().enumerate() {
        let bound = row_count.saturating_sub(len - i);
        set.rows.retain(|&row| row < bound);
    }
    all_non_empty(sets)
}

fn remove_ctc_columns(sets: &mut [CandidateSet], rows: &[Vec<f32>], blank: usize) -> bool {
    let path = argmax_path(rows);
    for set in sets.iter_mut() {
        set.rows.retain(|&row| path.get(row).is_some_and(|&code| code != blank));
    }
    all_non_empty(sets)
}

fn collapse_ctc_runs(sets: &mut [CandidateSet], rows: &[Vec<f32>]) -> bool {
    for i in 1..sets.len() {
        if sets[i - 1].is_empty() {
            return false;
        }
        let code = sets[i].code;
        let collapsed = collapse_runs(&sets[i].rows, |row| rows[row][code]);
        sets[i].rows = collapsed;
    }
    all_non_empty(sets)
}

/// Reduces each maximal run of consecutive rows to its first row, its last
/// row and the interior row whose confidence beats every earlier row of the
/// run. Runs of one or two rows are kept as they are.
pub(crate) fn collapse_runs(candidates: &[usize], confidence: impl Fn(usize) -> f32) -> Vec<usize> {
    let mut out = Vec::with_capacity(candidates.len());
    let mut start = 0usize;
    while start < candidates.len() {
        let mut end = start;
        while end + 1 < candidates.len() && candidates[end + 1] == candidates[end] + 1 {
            end += 1;
        }
        let run = &candidates[start..=end];
        if run.len() <= 2 {
            out.extend_from_slice(run);
        } else {
            out.push(run[0]);
            let mut best_confidence = confidence(run[0]);
            let mut best_interior = None;
            for &row in &run[1..run.len() - 1] {
                let value = confidence(row);
                if value > best_confidence {
                    best_confidence = value;
                    best_interior = Some(row);
                }
            }
            out.extend(best_interior);
            out.push(run[run.len() - 1]);
        }
        start = end + 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(position: usize, code: usize, rows: &[usize]) -> CandidateSet {
        CandidateSet {
            position,
            code,
            rows: rows.to_vec(),
        }
    }

    fn flat_rows(n: usize, width: usize) -> Vec<Vec<f32>> {
        vec![vec![0.5; width]; n]
    }

    fn lower_and_upper_only() -> SpotterConfig {
        SpotterConfig {
            remove_ctc_columns: false,
            collapse_ctc_runs: false,
            ..SpotterConfig::default()
        }
    }

    #[test]
    fn lower_bound_drops_rows_not_after_previous_minimum() {
        let mut sets = vec![set(0, 1, &[3, 5]), set(1, 2, &[1, 3, 4, 9])];
        assert!(prune_lower_bound(&mut sets));
        assert_eq!(sets[1].rows, vec![4, 9]);
    }

    #[test]
    fn lower_bound_chains_through_pruned_sets() {
        let mut sets = vec![set(0, 1, &[2]), set(1, 1, &[1, 4]), set(2, 1, &[3, 5])];
        assert!(prune_lower_bound(&mut sets));
        assert_eq!(sets[1].rows, vec![4]);
        assert_eq!(sets[2].rows, vec![5]);
    }

    #[test]
    fn lower_bound_reports_empty() {
        let mut sets = vec![set(0, 1, &[5]), set(1, 2, &[1, 2])];
        assert!(!prune_lower_bound(&mut sets));
    }

    #[test]
    fn upper_bound_leaves_room_for_remaining_positions() {
        // 6 rows, 3 positions: bounds are 3, 4, 5.
        let mut sets = vec![
            set(0, 1, &[0, 2, 3]),
            set(1, 1, &[3, 4]),
            set(2, 1, &[4, 5]),
        ];
        assert!(prune_upper_bound(&mut sets, 6));
        assert_eq!(sets[0].rows, vec![0, 2]);
        assert_eq!(sets[1].rows, vec![3]);
        assert_eq!(sets[2].rows, vec![4]);
    }

    #[test]
    fn upper_bound_with_too_few_rows_empties() {
        let mut sets = vec![set(0, 1, &[0]), set(1, 1, &[1])];
        assert!(!prune_upper_bound(&mut sets, 1));
    }

    #[test]
    fn ctc_columns_removes_blank_dominated_rows() {
        let rows = vec![
            vec![0.9, 0.5],
            vec![0.1, 0.8],
            vec![0.7, 0.6],
        ];
        let mut sets = vec![set(0, 1, &[0, 1, 2])];
        assert!(remove_ctc_columns(&mut sets, &rows, 0));
        assert_eq!(sets[0].rows, vec![1]);
    }

    #[test]
    fn collapse_runs_keeps_boundaries_and_best_interior() {
        let conf = [0.1, 0.2, 0.9, 0.3, 0.4, 0.0, 0.0, 0.5];
        let collapsed = collapse_runs(&[0, 1, 2, 3, 4, 7], |row| conf[row]);
        assert_eq!(collapsed, vec![0, 2, 4, 7]);
    }

    #[test]
    fn collapse_runs_tie_keeps_leftmost_interior() {
        let conf = [0.1, 0.6, 0.6, 0.2];
        assert_eq!(collapse_runs(&[0, 1, 2, 3], |row| conf[row]), vec![0, 1, 3]);
    }

    #[test]
    fn collapse_runs_drops_interior_not_beating_start() {
        let conf = [0.9, 0.5, 0.5, 0.1];
        assert_eq!(collapse_runs(&[0, 1, 2, 3], |row| conf[row]), vec![0, 3]);
        assert_eq!(collapse_runs(&[4, 5], |_| 0.0), vec![4, 5]);
    }

    #[test]
    fn ctc_runs_leaves_first_position_untouched() {
        let rows = flat_rows(6, 2);
        let mut sets = vec![set(0, 1, &[0, 1, 2, 3]), set(1, 1, &[2, 3, 4, 5])];
        assert!(collapse_ctc_runs(&mut sets, &rows));
        assert_eq!(sets[0].rows, vec![0, 1, 2, 3]);
        assert_eq!(sets[1].rows, vec![2, 5]);
    }

    #[test]
    fn prune_reports_emptying_stage() {
        let rows = flat_rows(4, 3);
        let sets = vec![set(0, 1, &[3]), set(1, 2, &[1])];
        assert_eq!(
            prune(sets, &rows, 0, &lower_and_upper_only()),
            Err(PruneStage::LowerBound)
        );
    }

    #[test]
    fn prune_skips_disabled_stages() {
        let rows = vec![vec![0.9, 0.5]; 4];
        let sets = vec![set(0, 1, &[0]), set(1, 1, &[1, 2])];
        let pruned = prune(sets, &rows, 0, &lower_and_upper_only()).expect("not emptied");
        assert_eq!(pruned[1].rows, vec![1, 2]);

        let sets = vec![set(0, 1, &[0]), set(1, 1, &[1, 2])];
        assert_eq!(
            prune(sets, &rows, 0, &SpotterConfig::default()),
            Err(PruneStage::CtcColumns)
        );
    }
}
