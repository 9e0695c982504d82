use std::ops::Range;

use rayon::prelude::*;

use super::direction::{SplitDirection, is_whitespace};
use crate::column::ColumnView;
use crate::error::{Result, try_vec};

/// The candidate positions owned by one row, found by its leader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRun {
    pub row: usize,
    pub candidates: Range<usize>,
}

/// Leader runs plus a per-row lookup so row-parallel stages can find the
/// run (if any) for the row they own.
#[derive(Debug, Default)]
pub struct RowRuns {
    runs: Vec<RowRun>,
    by_row: Vec<Option<usize>>,
}

impl RowRuns {
    #[inline]
    pub fn for_row(&self, row: usize) -> Option<&RowRun> {
        self.by_row[row].map(|i| &self.runs[i])
    }

    pub fn runs(&self) -> &[RowRun] {
        &self.runs
    }
}

/// Leader election over the 1-based row indexes of the candidates: entry `i`
/// leads its row when `i == 0` or the previous entry belongs to another row.
/// Each leader then records how far its row's candidates extend.
pub fn elect_leaders(row_indexes: &[usize], row_count: usize, parallel: bool) -> Result<RowRuns> {
    let n = row_indexes.len();
    let is_leader = |i: usize| i == 0 || row_indexes[i - 1] != row_indexes[i];
    let lead = |i: usize| -> Option<RowRun> {
        if !is_leader(i) {
            return None;
        }
        let row = row_indexes[i];
        let len = row_indexes[i..]
            .iter()
            .position(|&r| r != row)
            .unwrap_or(n - i);
        Some(RowRun {
            row: row - 1,
            candidates: i..i + len,
        })
    };
    let leaders = if parallel {
        (0..n).into_par_iter().filter(|&i| is_leader(i)).count()
    } else {
        (0..n).filter(|&i| is_leader(i)).count()
    };
    let mut runs = try_vec::<RowRun>("row runs", leaders)?;
    if parallel {
        runs.par_extend((0..n).into_par_iter().filter_map(lead));
    } else {
        runs.extend((0..n).filter_map(lead));
    }

    let mut by_row = try_vec::<Option<usize>>("row lookup", row_count)?;
    by_row.resize(row_count, None);
    for (i, run) in runs.iter().enumerate() {
        by_row[run.row] = Some(i);
    }
    Ok(RowRuns { runs, by_row })
}

/// Apply the token cap; `max_tokens == 0` means unlimited.
#[inline(always)]
pub fn cap_tokens(count: usize, max_tokens: usize) -> usize {
    if max_tokens > 0 {
        count.min(max_tokens)
    } else {
        count
    }
}

/// Token count of every row in delimiter mode.
///
/// An initial pass sets 0 for null rows and 1 for valid ones; the leader pass
/// then overwrites the rows that own candidates with
/// `accepted occurrences + 1`, capped.
pub fn count_delimited<D: SplitDirection>(
    view: &ColumnView<'_>,
    positions: &[usize],
    runs: &RowRuns,
    dlen: usize,
    max_tokens: usize,
    parallel: bool,
) -> Result<Vec<usize>> {
    let rows = view.len();
    let mut counts = try_vec::<usize>("token counts", rows)?;
    let initial = |row: usize| usize::from(view.is_valid(row));
    if parallel {
        counts.par_extend((0..rows).into_par_iter().map(initial));
    } else {
        counts.extend((0..rows).map(initial));
    }

    let lead = |(row, count): (usize, &mut usize)| {
        let Some(run) = runs.for_row(row) else {
            return;
        };
        if !view.is_valid(row) {
            return;
        }
        let span = view.row_span(row);
        let mut accepted = 0usize;
        D::walk_occurrences(&positions[run.candidates.clone()], &span, dlen, |_| {
            accepted += 1;
            // Stop once the cap is reached; the rest can't add tokens.
            max_tokens == 0 || accepted + 1 < max_tokens
        });
        *count = cap_tokens(accepted + 1, max_tokens);
    };
    if parallel {
        counts.par_iter_mut().enumerate().for_each(lead);
    } else {
        counts.iter_mut().enumerate().for_each(lead);
    }
    Ok(counts)
}

/// Number of whitespace-separated tokens in one row: one per transition
/// from whitespace into a non-whitespace byte.
#[inline]
pub fn count_whitespace_runs(bytes: &[u8]) -> usize {
    let mut tokens = 0usize;
    let mut prev_ws = true;
    for &b in bytes {
        let ws = is_whitespace(b);
        tokens += usize::from(prev_ws && !ws);
        prev_ws = ws;
    }
    tokens
}

/// Token count of every row in whitespace mode. Null rows count 0; every
/// valid row counts at least 1, even when empty or all whitespace.
pub fn count_whitespace(view: &ColumnView<'_>, max_tokens: usize, parallel: bool) -> Result<Vec<usize>> {
    let rows = view.len();
    let mut counts = try_vec::<usize>("token counts", rows)?;
    let count = |row: usize| {
        if !view.is_valid(row) {
            return 0;
        }
        cap_tokens(count_whitespace_runs(view.row_bytes(row)), max_tokens).max(1)
    };
    if parallel {
        counts.par_extend((0..rows).into_par_iter().map(count));
    } else {
        counts.extend((0..rows).map(count));
    }
    Ok(counts)
}

/// Output column count: the largest per-row token count. Zero only when the
/// column is empty or every row is null.
pub fn columns_count(counts: &[usize], parallel: bool) -> usize {
    if parallel {
        counts.par_iter().copied().max().unwrap_or(0)
    } else {
        counts.iter().copied().max().unwrap_or(0)
    }
}
