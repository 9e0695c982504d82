use std::ops::Range;

use crate::error::{Result, SplitError, try_vec};

/// Initial state for a freshly built [`Bitmask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskState {
    AllValid,
    AllNull,
}

/// Row validity bitmap. Bit `i` (LSB-first within each byte) is set when
/// row `i` holds a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmask {
    bits: Vec<u8>,
    len: usize,
}

impl Bitmask {
    pub fn new(len: usize, state: MaskState) -> Self {
        Self::filled(vec![0; len.div_ceil(8)], len, state)
    }

    /// Like [`Bitmask::new`], but reports exhaustion as
    /// [`SplitError::Allocation`] instead of aborting.
    pub fn try_new(len: usize, state: MaskState) -> Result<Self> {
        let bytes = len.div_ceil(8);
        let mut bits = try_vec::<u8>("validity mask", bytes)?;
        bits.resize(bytes, 0);
        Ok(Self::filled(bits, len, state))
    }

    fn filled(mut bits: Vec<u8>, len: usize, state: MaskState) -> Self {
        if state == MaskState::AllValid {
            bits.fill(0xFF);
            // Keep padding bits clear so equality and null_count ignore them.
            if len % 8 != 0 {
                if let Some(last) = bits.last_mut() {
                    *last = (1u8 << (len % 8)) - 1;
                }
            }
        }
        Bitmask { bits, len }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn from_bools(valid: &[bool]) -> Self {
        let mut mask = Bitmask::new(valid.len(), MaskState::AllNull);
        for (i, &v) in valid.iter().enumerate() {
            if v {
                mask.set(i, true);
            }
        }
        mask
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_valid(&self, i: usize) -> bool {
        debug_assert!(i < self.len);
        (self.bits[i >> 3] >> (i & 7)) & 1 == 1
    }

    #[inline]
    pub fn set(&mut self, i: usize, valid: bool) {
        debug_assert!(i < self.len);
        let bit = 1u8 << (i & 7);
        if valid {
            self.bits[i >> 3] |= bit;
        } else {
            self.bits[i >> 3] &= !bit;
        }
    }

    pub fn null_count(&self) -> usize {
        let set: usize = self.bits.iter().map(|b| b.count_ones() as usize).sum();
        self.len - set
    }
}

/// Byte range of one token inside a column's character buffer.
/// Always paired with the [`ColumnView`] it was cut from; never owns bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub offset: usize,
    pub len: usize,
}

/// One cell of the token matrix. `None` is the null token; `Some` with
/// `len == 0` is the empty string.
pub type TokenSlot = Option<Token>;

impl Token {
    /// Token covering `start..end`, which must lie inside `row`.
    #[inline(always)]
    pub fn within(start: usize, end: usize, row: &Range<usize>) -> Self {
        debug_assert!(
            row.start <= start && start <= end && end <= row.end,
            "token {}..{} escapes row {:?}",
            start,
            end,
            row
        );
        Token {
            offset: start,
            len: end - start,
        }
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    #[inline]
    pub fn bytes<'a>(&self, chars: &'a [u8]) -> &'a [u8] {
        &chars[self.offset..self.end()]
    }
}

/// Borrowed, read-only view over a string column shared by every stage.
#[derive(Debug, Clone, Copy)]
pub struct ColumnView<'a> {
    chars: &'a [u8],
    offsets: &'a [usize],
    validity: Option<&'a Bitmask>,
}

impl<'a> ColumnView<'a> {
    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline(always)]
    pub fn is_valid(&self, row: usize) -> bool {
        self.validity.is_none_or(|m| m.is_valid(row))
    }

    #[inline(always)]
    pub fn row_span(&self, row: usize) -> Range<usize> {
        self.offsets[row]..self.offsets[row + 1]
    }

    #[inline(always)]
    pub fn row_bytes(&self, row: usize) -> &'a [u8] {
        &self.chars[self.row_span(row)]
    }

    #[inline]
    pub fn chars(&self) -> &'a [u8] {
        self.chars
    }

    #[inline]
    pub fn offsets(&self) -> &'a [usize] {
        self.offsets
    }
}

/// Owned column of variable-length byte strings: a flat character buffer,
/// `len + 1` monotone offsets, and an optional validity mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringColumn {
    chars: Vec<u8>,
    offsets: Vec<usize>,
    validity: Option<Bitmask>,
}

impl StringColumn {
    pub fn new(chars: Vec<u8>, offsets: Vec<usize>, validity: Option<Bitmask>) -> Result<Self> {
        let Some(&first) = offsets.first() else {
            return Err(SplitError::InvalidColumn(
                "offsets must hold at least one entry".to_string(),
            ));
        };
        if first != 0 {
            return Err(SplitError::InvalidColumn(format!(
                "first offset must be 0, got {}",
                first
            )));
        }
        if let Some(i) = offsets.windows(2).position(|w| w[0] > w[1]) {
            return Err(SplitError::InvalidColumn(format!(
                "offsets decrease at row {}",
                i
            )));
        }
        let last = offsets[offsets.len() - 1];
        if last != chars.len() {
            return Err(SplitError::InvalidColumn(format!(
                "last offset {} does not match {} character bytes",
                last,
                chars.len()
            )));
        }
        if let Some(ref mask) = validity {
            if mask.len() != offsets.len() - 1 {
                return Err(SplitError::InvalidColumn(format!(
                    "validity mask covers {} rows, column has {}",
                    mask.len(),
                    offsets.len() - 1
                )));
            }
        }
        Ok(StringColumn {
            chars,
            offsets,
            validity,
        })
    }

    pub fn from_strs<S: AsRef<[u8]>>(rows: &[S]) -> Self {
        let mut chars = Vec::new();
        let mut offsets = Vec::with_capacity(rows.len() + 1);
        offsets.push(0);
        for r in rows {
            chars.extend_from_slice(r.as_ref());
            offsets.push(chars.len());
        }
        StringColumn {
            chars,
            offsets,
            validity: None,
        }
    }

    /// Build from optional rows; `None` rows become nulls with an empty span.
    pub fn from_options<S: AsRef<[u8]>>(rows: &[Option<S>]) -> Self {
        let mut chars = Vec::new();
        let mut offsets = Vec::with_capacity(rows.len() + 1);
        let mut mask = Bitmask::new(rows.len(), MaskState::AllValid);
        offsets.push(0);
        for (i, r) in rows.iter().enumerate() {
            match r {
                Some(s) => chars.extend_from_slice(s.as_ref()),
                None => mask.set(i, false),
            }
            offsets.push(chars.len());
        }
        let validity = (mask.null_count() > 0).then_some(mask);
        StringColumn {
            chars,
            offsets,
            validity,
        }
    }

    /// `len` rows, every one null.
    pub fn all_null(len: usize) -> Result<Self> {
        let mut offsets = try_vec::<usize>("output offsets", len + 1)?;
        offsets.resize(len + 1, 0);
        Ok(StringColumn {
            chars: Vec::new(),
            offsets,
            validity: Some(Bitmask::try_new(len, MaskState::AllNull)?),
        })
    }

    /// Materialize a column from token references into `view`.
    /// Sizes are computed first so each buffer is reserved exactly once.
    pub fn from_tokens(view: &ColumnView<'_>, tokens: &[TokenSlot]) -> Result<Self> {
        let total: usize = tokens.iter().flatten().map(|t| t.len).sum();
        let has_nulls = tokens.iter().any(Option::is_none);

        let mut offsets = try_vec::<usize>("output offsets", tokens.len() + 1)?;
        let mut chars = try_vec::<u8>("output characters", total)?;
        offsets.push(0);
        for t in tokens {
            if let Some(t) = t {
                chars.extend_from_slice(t.bytes(view.chars()));
            }
            offsets.push(chars.len());
        }

        let validity = if has_nulls {
            let mut mask = Bitmask::try_new(tokens.len(), MaskState::AllValid)?;
            for (i, t) in tokens.iter().enumerate() {
                if t.is_none() {
                    mask.set(i, false);
                }
            }
            Some(mask)
        } else {
            None
        };

        Ok(StringColumn {
            chars,
            offsets,
            validity,
        })
    }

    #[inline]
    pub fn view(&self) -> ColumnView<'_> {
        ColumnView {
            chars: &self.chars,
            offsets: &self.offsets,
            validity: self.validity.as_ref(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_valid(&self, row: usize) -> bool {
        self.view().is_valid(row)
    }

    pub fn null_count(&self) -> usize {
        self.validity.as_ref().map_or(0, Bitmask::null_count)
    }

    pub fn validity(&self) -> Option<&Bitmask> {
        self.validity.as_ref()
    }

    pub fn chars(&self) -> &[u8] {
        &self.chars
    }

    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Row contents, or `None` when the row is null.
    pub fn get(&self, row: usize) -> Option<&[u8]> {
        self.is_valid(row)
            .then(|| &self.chars[self.offsets[row]..self.offsets[row + 1]])
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&[u8]>> + '_ {
        (0..self.len()).map(|i| self.get(i))
    }
}

/// A possibly-null string scalar, used for the delimiter argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringScalar {
    value: Vec<u8>,
    valid: bool,
}

impl StringScalar {
    pub fn new(value: impl Into<Vec<u8>>) -> Self {
        StringScalar {
            value: value.into(),
            valid: true,
        }
    }

    pub fn null() -> Self {
        StringScalar {
            value: Vec::new(),
            valid: false,
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    #[inline]
    pub fn value(&self) -> &[u8] {
        &self.value
    }
}

impl From<&str> for StringScalar {
    fn from(s: &str) -> Self {
        StringScalar::new(s.as_bytes())
    }
}

/// Ordered set of equally long string columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    columns: Vec<StringColumn>,
    num_rows: usize,
}

impl Table {
    pub fn new(columns: Vec<StringColumn>) -> Result<Self> {
        let num_rows = columns.first().map_or(0, StringColumn::len);
        if let Some(c) = columns.iter().position(|c| c.len() != num_rows) {
            return Err(SplitError::InvalidColumn(format!(
                "column {} has {} rows, expected {}",
                c,
                columns[c].len(),
                num_rows
            )));
        }
        Ok(Table { columns, num_rows })
    }

    #[inline]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    #[inline]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn column(&self, i: usize) -> &StringColumn {
        &self.columns[i]
    }

    pub fn columns(&self) -> &[StringColumn] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<StringColumn> {
        self.columns
    }

    /// Cells of row `row` across every column, in column order.
    pub fn row(&self, row: usize) -> Vec<Option<&[u8]>> {
        self.columns.iter().map(|c| c.get(row)).collect()
    }
}
