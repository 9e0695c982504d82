use memchr::memchr_iter;
use rayon::prelude::*;

use super::direction::SplitDirection;
use crate::error::{Result, try_vec};

/// Smallest slice of the character buffer handed to one scanning task.
/// Keeps per-task rayon overhead well under the memchr work it wraps.
const MIN_SCAN_CHUNK: usize = 256 * 1024;

/// Collect every delimiter candidate position in `chars`, ascending.
///
/// Forward candidates are delimiter start offsets; reverse candidates are the
/// offset of the delimiter's last byte. Overlapping matches are all reported;
/// overlap is resolved per row by the counter. `delim` must be non-empty.
pub fn find_positions<D: SplitDirection>(
    chars: &[u8],
    delim: &[u8],
    parallel: bool,
) -> Result<Vec<usize>> {
    debug_assert!(!delim.is_empty());
    if chars.len() < delim.len() {
        return Ok(Vec::new());
    }

    let num_threads = rayon::current_num_threads().max(1);
    if !parallel || num_threads <= 1 || chars.len() < 2 * MIN_SCAN_CHUNK {
        return Ok(scan_range::<D>(chars, 0..chars.len(), delim));
    }

    let chunk = chars.len().div_ceil(num_threads).max(MIN_SCAN_CHUNK);
    let parts: Vec<Vec<usize>> = (0..chars.len().div_ceil(chunk))
        .into_par_iter()
        .map(|i| {
            let lo = i * chunk;
            let hi = (lo + chunk).min(chars.len());
            scan_range::<D>(chars, lo..hi, delim)
        })
        .collect();

    let total = parts.iter().map(Vec::len).sum();
    let mut positions = try_vec::<usize>("delimiter positions", total)?;
    for part in parts {
        positions.extend_from_slice(&part);
    }
    Ok(positions)
}

/// Candidates whose anchor byte lies in `range`. The full match may read
/// past the end of the range, so the whole buffer is passed in.
#[inline]
fn scan_range<D: SplitDirection>(
    chars: &[u8],
    range: std::ops::Range<usize>,
    delim: &[u8],
) -> Vec<usize> {
    let anchor = D::anchor(delim);
    let base = range.start;
    memchr_iter(anchor, &chars[range])
        .map(|p| base + p)
        .filter(|&p| D::matches_at(chars, p, delim))
        .collect()
}

/// Map each candidate position to its owning row, 1-based: the upper bound
/// of the position among the row offsets. Positions in the same row end up
/// adjacent since both inputs are sorted.
pub fn map_rows(offsets: &[usize], positions: &[usize], parallel: bool) -> Result<Vec<usize>> {
    let mut rows = try_vec::<usize>("row indexes", positions.len())?;
    let upper_bound = |&p: &usize| offsets.partition_point(|&o| o <= p);
    if parallel {
        rows.par_extend(positions.par_iter().map(upper_bound));
    } else {
        rows.extend(positions.iter().map(upper_bound));
    }
    Ok(rows)
}
