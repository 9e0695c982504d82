use std::ops::Range;

use crate::column::{Token, TokenSlot};

/// Which end of a row splitting starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `split`: tokens are cut left to right; the last slot keeps the remainder.
    Forward,
    /// `rsplit`: tokens are cut right to left; slot 0 keeps the remainder.
    Reverse,
}

/// Byte classification for whitespace mode: any byte at or below 0x20.
/// Deliberately byte-level; control bytes count, multi-byte spaces do not.
#[inline(always)]
pub fn is_whitespace(b: u8) -> bool {
    b <= 0x20
}

/// Token-ordering policy. Implemented by the zero-sized [`Forward`] and
/// [`Reverse`] markers and passed as a type parameter, so every per-byte and
/// per-row loop is monomorphized with no dynamic dispatch.
pub trait SplitDirection: Send + Sync + 'static {
    const DIRECTION: Direction;

    /// Byte that every candidate position lands on (first byte forward,
    /// last byte reverse). Used as the memchr prefilter.
    fn anchor(delim: &[u8]) -> u8;

    /// Whether `pos` is a delimiter candidate: the delimiter starts at `pos`
    /// (forward) or ends on `pos` inclusive (reverse).
    fn matches_at(chars: &[u8], pos: usize, delim: &[u8]) -> bool;

    /// Visit the accepted occurrences among `candidates` (all inside `row`'s
    /// run, ascending) in walking order, skipping any that leave the row or
    /// overlap the previous accepted one. `visit` returns `false` to stop.
    fn walk_occurrences(
        candidates: &[usize],
        row: &Range<usize>,
        dlen: usize,
        visit: impl FnMut(Range<usize>) -> bool,
    );

    /// Overwrite the first `count` slots of a row with its delimiter tokens.
    fn cut_delimited(
        candidates: &[usize],
        row: &Range<usize>,
        dlen: usize,
        count: usize,
        slots: &mut [TokenSlot],
    );

    /// Overwrite the first `count` slots of a row with its whitespace tokens.
    /// `stretch` makes the final token absorb the rest of the row.
    fn cut_whitespace(
        chars: &[u8],
        row: &Range<usize>,
        count: usize,
        stretch: bool,
        slots: &mut [TokenSlot],
    );
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Forward;

#[derive(Debug, Clone, Copy, Default)]
pub struct Reverse;

impl SplitDirection for Forward {
    const DIRECTION: Direction = Direction::Forward;

    #[inline(always)]
    fn anchor(delim: &[u8]) -> u8 {
        delim[0]
    }

    #[inline(always)]
    fn matches_at(chars: &[u8], pos: usize, delim: &[u8]) -> bool {
        pos + delim.len() <= chars.len() && &chars[pos..pos + delim.len()] == delim
    }

    fn walk_occurrences(
        candidates: &[usize],
        row: &Range<usize>,
        dlen: usize,
        mut visit: impl FnMut(Range<usize>) -> bool,
    ) {
        let mut cursor = row.start;
        for &p in candidates {
            if p < cursor || p + dlen > row.end {
                continue;
            }
            if !visit(p..p + dlen) {
                return;
            }
            cursor = p + dlen;
        }
    }

    fn cut_delimited(
        candidates: &[usize],
        row: &Range<usize>,
        dlen: usize,
        count: usize,
        slots: &mut [TokenSlot],
    ) {
        let mut cursor = row.start;
        let mut k = 0;
        if count > 1 {
            Self::walk_occurrences(candidates, row, dlen, |d| {
                slots[k] = Some(Token::within(cursor, d.start, row));
                cursor = d.end;
                k += 1;
                k + 1 < count
            });
        }
        debug_assert_eq!(k + 1, count);
        slots[k] = Some(Token::within(cursor, row.end, row));
    }

    fn cut_whitespace(
        chars: &[u8],
        row: &Range<usize>,
        count: usize,
        stretch: bool,
        slots: &mut [TokenSlot],
    ) {
        let base = row.start;
        let mut last = None;
        for (k, run) in WhitespaceRuns::new(&chars[row.clone()])
            .take(count)
            .enumerate()
        {
            slots[k] = Some(Token::within(base + run.start, base + run.end, row));
            last = Some((k, base + run.start));
        }
        if stretch {
            if let Some((k, start)) = last {
                slots[k] = Some(Token::within(start, row.end, row));
            }
        }
    }
}

impl SplitDirection for Reverse {
    const DIRECTION: Direction = Direction::Reverse;

    #[inline(always)]
    fn anchor(delim: &[u8]) -> u8 {
        delim[delim.len() - 1]
    }

    #[inline(always)]
    fn matches_at(chars: &[u8], pos: usize, delim: &[u8]) -> bool {
        let end = pos + 1;
        end >= delim.len() && end <= chars.len() && &chars[end - delim.len()..end] == delim
    }

    fn walk_occurrences(
        candidates: &[usize],
        row: &Range<usize>,
        dlen: usize,
        mut visit: impl FnMut(Range<usize>) -> bool,
    ) {
        let mut cursor = row.end;
        for &p in candidates.iter().rev() {
            let end = p + 1;
            if end > cursor || end < row.start + dlen {
                continue;
            }
            if !visit(end - dlen..end) {
                return;
            }
            cursor = end - dlen;
        }
    }

    fn cut_delimited(
        candidates: &[usize],
        row: &Range<usize>,
        dlen: usize,
        count: usize,
        slots: &mut [TokenSlot],
    ) {
        let mut cursor = row.end;
        let mut k = 0;
        if count > 1 {
            Self::walk_occurrences(candidates, row, dlen, |d| {
                slots[count - 1 - k] = Some(Token::within(d.end, cursor, row));
                cursor = d.start;
                k += 1;
                k + 1 < count
            });
        }
        debug_assert_eq!(k + 1, count);
        slots[0] = Some(Token::within(row.start, cursor, row));
    }

    fn cut_whitespace(
        chars: &[u8],
        row: &Range<usize>,
        count: usize,
        stretch: bool,
        slots: &mut [TokenSlot],
    ) {
        let base = row.start;
        let mut last = None;
        for (k, run) in WhitespaceRuns::new(&chars[row.clone()])
            .rev()
            .take(count)
            .enumerate()
        {
            let slot = count - 1 - k;
            slots[slot] = Some(Token::within(base + run.start, base + run.end, row));
            last = Some((slot, base + run.end));
        }
        if stretch {
            if let Some((slot, end)) = last {
                slots[slot] = Some(Token::within(row.start, end, row));
            }
        }
    }
}

/// Maximal non-whitespace runs of one row, as half-open ranges relative to
/// the row. Iterates from either end; the two cursors never cross.
#[derive(Debug, Clone)]
pub struct WhitespaceRuns<'a> {
    bytes: &'a [u8],
    front: usize,
    back: usize,
}

impl<'a> WhitespaceRuns<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        WhitespaceRuns {
            bytes,
            front: 0,
            back: bytes.len(),
        }
    }
}

impl Iterator for WhitespaceRuns<'_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Range<usize>> {
        let b = self.bytes;
        while self.front < self.back && is_whitespace(b[self.front]) {
            self.front += 1;
        }
        if self.front == self.back {
            return None;
        }
        let start = self.front;
        while self.front < self.back && !is_whitespace(b[self.front]) {
            self.front += 1;
        }
        Some(start..self.front)
    }
}

impl DoubleEndedIterator for WhitespaceRuns<'_> {
    fn next_back(&mut self) -> Option<Range<usize>> {
        let b = self.bytes;
        while self.back > self.front && is_whitespace(b[self.back - 1]) {
            self.back -= 1;
        }
        if self.back == self.front {
            return None;
        }
        let end = self.back;
        while self.back > self.front && !is_whitespace(b[self.back - 1]) {
            self.back -= 1;
        }
        Some(self.back..end)
    }
}
