mod core;

#[cfg(test)]
mod tests;

pub use self::core::{
    Bitmask, ColumnView, MaskState, StringColumn, StringScalar, Table, Token, TokenSlot,
};
