use rayon::prelude::*;

use super::count::RowRuns;
use super::direction::SplitDirection;
use crate::column::{ColumnView, Token, TokenSlot};
use crate::error::{Result, SplitError, try_vec};

/// Row-major `rows × columns` token matrix. Row `r` owns the contiguous
/// slots `r * columns .. (r + 1) * columns`.
#[derive(Debug)]
pub struct TokenMatrix {
    slots: Vec<TokenSlot>,
    columns: usize,
}

impl TokenMatrix {
    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.slots.len() / self.columns
    }

    #[inline]
    pub fn get(&self, row: usize, column: usize) -> TokenSlot {
        self.slots[row * self.columns + column]
    }
}

/// Init phase: allocate the matrix once and give every valid row a single
/// token spanning the whole row, null-padded. Null rows are all null.
/// This is already the final answer for rows without a delimiter.
pub fn init_tokens(view: &ColumnView<'_>, columns: usize, parallel: bool) -> Result<TokenMatrix> {
    debug_assert!(columns > 0);
    let rows = view.len();
    let total = rows
        .checked_mul(columns)
        .ok_or(SplitError::Allocation {
            what: "token matrix",
            bytes: usize::MAX,
        })?;
    let mut slots = try_vec::<TokenSlot>("token matrix", total)?;
    slots.resize(total, None);

    let init = |(row, out): (usize, &mut [TokenSlot])| {
        if view.is_valid(row) {
            let span = view.row_span(row);
            out[0] = Some(Token::within(span.start, span.end, &span));
        }
    };
    if parallel {
        slots.par_chunks_mut(columns).enumerate().for_each(init);
    } else {
        slots.chunks_mut(columns).enumerate().for_each(init);
    }
    Ok(TokenMatrix { slots, columns })
}

/// Overwrite phase, delimiter mode: only rows that own a leader run do any
/// work, cutting their tokens between accepted occurrences.
pub fn cut_delimited<D: SplitDirection>(
    view: &ColumnView<'_>,
    positions: &[usize],
    runs: &RowRuns,
    counts: &[usize],
    dlen: usize,
    matrix: &mut TokenMatrix,
    parallel: bool,
) {
    let cut = |(row, out): (usize, &mut [TokenSlot])| {
        let Some(run) = runs.for_row(row) else {
            return;
        };
        let count = counts[row];
        if count == 0 {
            return;
        }
        let span = view.row_span(row);
        D::cut_delimited(&positions[run.candidates.clone()], &span, dlen, count, out);
    };
    let columns = matrix.columns;
    if parallel {
        matrix.slots.par_chunks_mut(columns).enumerate().for_each(cut);
    } else {
        matrix.slots.chunks_mut(columns).enumerate().for_each(cut);
    }
}

/// Overwrite phase, whitespace mode: each valid row rescans its own bytes.
/// When a cap is set and reached, the final token keeps the rest of the row.
pub fn cut_whitespace<D: SplitDirection>(
    view: &ColumnView<'_>,
    counts: &[usize],
    max_tokens: usize,
    matrix: &mut TokenMatrix,
    parallel: bool,
) {
    let chars = view.chars();
    let cut = |(row, out): (usize, &mut [TokenSlot])| {
        let count = counts[row];
        if count == 0 {
            return;
        }
        let span = view.row_span(row);
        if span.is_empty() {
            return;
        }
        let stretch = max_tokens > 0 && count == max_tokens;
        D::cut_whitespace(chars, &span, count, stretch, out);
    };
    let columns = matrix.columns;
    if parallel {
        matrix.slots.par_chunks_mut(columns).enumerate().for_each(cut);
    } else {
        matrix.slots.chunks_mut(columns).enumerate().for_each(cut);
    }
}
