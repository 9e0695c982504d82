use std::collections::TryReserveError;

/// Broad category of a [`SplitError`], for callers that branch on the cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidDelimiter,
    InvalidColumn,
    Allocation,
}

/// Every failure the split pipeline can report. Returned before any stage
/// runs (precondition) or in place of the whole table (allocation); a partial
/// table is never handed back.
#[derive(Debug, thiserror::Error)]
pub enum SplitError {
    #[error("delimiter must be a valid string scalar")]
    InvalidDelimiter,

    #[error("invalid string column: {0}")]
    InvalidColumn(String),

    #[error("failed to allocate {bytes} bytes for {what}")]
    Allocation { what: &'static str, bytes: usize },
}

impl SplitError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SplitError::InvalidDelimiter => ErrorKind::InvalidDelimiter,
            SplitError::InvalidColumn(_) => ErrorKind::InvalidColumn,
            SplitError::Allocation { .. } => ErrorKind::Allocation,
        }
    }

    pub(crate) fn alloc<T>(what: &'static str, count: usize) -> impl FnOnce(TryReserveError) -> Self {
        move |_| SplitError::Allocation {
            what,
            bytes: count.saturating_mul(std::mem::size_of::<T>()),
        }
    }
}

pub type Result<T> = std::result::Result<T, SplitError>;

/// Allocate an empty `Vec` with exactly `len` slots reserved, reporting
/// exhaustion as [`SplitError::Allocation`] instead of aborting.
pub(crate) fn try_vec<T>(what: &'static str, len: usize) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len).map_err(SplitError::alloc::<T>(what, len))?;
    Ok(v)
}
