/// Use mimalloc as the global allocator for all binaries.
/// The pipeline allocates many short-lived scratch vectors per call
/// (positions, row indexes, counts, per-column token lists).
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod column;
pub mod common;
pub mod error;
pub mod split;

pub use column::{Bitmask, ColumnView, MaskState, StringColumn, StringScalar, Table, Token, TokenSlot};
pub use error::{ErrorKind, Result, SplitError};
pub use split::{Direction, SplitConfig, rsplit, split, tokenize};
