use log::{debug, trace};

use super::assemble::assemble;
use super::count::{columns_count, count_delimited, count_whitespace, elect_leaders};
use super::direction::{Direction, Forward, Reverse, SplitDirection};
use super::materialize::{cut_delimited, cut_whitespace, init_tokens};
use super::scan::{find_positions, map_rows};
use crate::column::{ColumnView, StringColumn, StringScalar, Table};
use crate::error::{Result, SplitError};

/// Minimum character-buffer size for parallel processing (1MB).
/// Below this every stage runs on the calling thread; rayon's per-task
/// overhead would outweigh the work.
pub const PARALLEL_THRESHOLD: usize = 1024 * 1024;

/// Configuration for one split call.
#[derive(Debug, Clone)]
pub struct SplitConfig<'a> {
    pub direction: Direction,
    /// Literal delimiter; empty selects whitespace mode.
    pub delimiter: &'a [u8],
    /// Cap on tokens per row, 0 = unlimited.
    pub max_tokens: usize,
    /// Character-buffer size at which stages switch to the rayon pool.
    pub parallel_threshold: usize,
}

impl<'a> SplitConfig<'a> {
    pub fn new(direction: Direction, delimiter: &'a [u8], max_split: i64) -> Self {
        SplitConfig {
            direction,
            delimiter,
            max_tokens: max_tokens_for(max_split),
            parallel_threshold: PARALLEL_THRESHOLD,
        }
    }

    #[inline]
    fn parallel(&self, view: &ColumnView<'_>) -> bool {
        view.chars().len() >= self.parallel_threshold && rayon::current_num_threads() > 1
    }
}

/// Translate a `maxsplit` argument into a token cap: any positive value
/// allows `max_split + 1` tokens, anything else is unlimited (0).
#[inline]
pub fn max_tokens_for(max_split: i64) -> usize {
    if max_split > 0 {
        usize::try_from(max_split).map_or(usize::MAX, |n| n.saturating_add(1))
    } else {
        0
    }
}

/// Split every row of `column` on `delimiter` from the left.
/// An empty delimiter splits on runs of whitespace (bytes <= 0x20).
pub fn split(column: &StringColumn, delimiter: &StringScalar, max_split: i64) -> Result<Table> {
    run(column, delimiter, max_split, Direction::Forward)
}

/// Split every row of `column` on `delimiter` from the right.
pub fn rsplit(column: &StringColumn, delimiter: &StringScalar, max_split: i64) -> Result<Table> {
    run(column, delimiter, max_split, Direction::Reverse)
}

fn run(
    column: &StringColumn,
    delimiter: &StringScalar,
    max_split: i64,
    direction: Direction,
) -> Result<Table> {
    if !delimiter.is_valid() {
        return Err(SplitError::InvalidDelimiter);
    }
    let cfg = SplitConfig::new(direction, delimiter.value(), max_split);
    tokenize(&column.view(), &cfg)
}

/// Run the split pipeline over `view` as described by `cfg`.
///
/// Dispatch picks the whitespace path for an empty delimiter and the
/// delimiter path otherwise; the direction is a type parameter of either.
pub fn tokenize(view: &ColumnView<'_>, cfg: &SplitConfig<'_>) -> Result<Table> {
    let parallel = cfg.parallel(view);
    debug!(
        "tokenize: {} rows, {} bytes, {:?}, delimiter {} bytes, max_tokens {}, parallel {}",
        view.len(),
        view.chars().len(),
        cfg.direction,
        cfg.delimiter.len(),
        cfg.max_tokens,
        parallel
    );
    match (cfg.delimiter.is_empty(), cfg.direction) {
        (true, Direction::Forward) => whitespace_path::<Forward>(view, cfg, parallel),
        (true, Direction::Reverse) => whitespace_path::<Reverse>(view, cfg, parallel),
        (false, Direction::Forward) => delimiter_path::<Forward>(view, cfg, parallel),
        (false, Direction::Reverse) => delimiter_path::<Reverse>(view, cfg, parallel),
    }
}

fn delimiter_path<D: SplitDirection>(
    view: &ColumnView<'_>,
    cfg: &SplitConfig<'_>,
    parallel: bool,
) -> Result<Table> {
    let delim = cfg.delimiter;

    let positions = find_positions::<D>(view.chars(), delim, parallel)?;
    trace!("scan ({:?}): {} delimiter candidates", D::DIRECTION, positions.len());

    let row_indexes = map_rows(view.offsets(), &positions, parallel)?;
    let runs = elect_leaders(&row_indexes, view.len(), parallel)?;
    drop(row_indexes);
    trace!("leaders: {} rows hold candidates", runs.runs().len());

    let counts = count_delimited::<D>(view, &positions, &runs, delim.len(), cfg.max_tokens, parallel)?;
    let columns = columns_count(&counts, parallel);
    debug!("columns_count = {}", columns);
    if columns == 0 {
        return all_null(view.len());
    }

    let mut matrix = init_tokens(view, columns, parallel)?;
    cut_delimited::<D>(view, &positions, &runs, &counts, delim.len(), &mut matrix, parallel);
    assemble(view, &matrix, parallel)
}

fn whitespace_path<D: SplitDirection>(
    view: &ColumnView<'_>,
    cfg: &SplitConfig<'_>,
    parallel: bool,
) -> Result<Table> {
    let counts = count_whitespace(view, cfg.max_tokens, parallel)?;
    let columns = columns_count(&counts, parallel);
    debug!("columns_count = {}", columns);
    if columns == 0 {
        return all_null(view.len());
    }

    let mut matrix = init_tokens(view, columns, parallel)?;
    cut_whitespace::<D>(view, &counts, cfg.max_tokens, &mut matrix, parallel);
    assemble(view, &matrix, parallel)
}

/// Output when no row produced a token: one column, every row null.
fn all_null(rows: usize) -> Result<Table> {
    Table::new(vec![StringColumn::all_null(rows)?])
}
