use rayon::prelude::*;

use super::materialize::TokenMatrix;
use crate::column::{ColumnView, StringColumn, Table, TokenSlot};
use crate::error::{Result, try_vec};

/// Transpose the row-major matrix into one string column per token index.
/// Columns are independent of each other and are built concurrently.
pub fn assemble(view: &ColumnView<'_>, matrix: &TokenMatrix, parallel: bool) -> Result<Table> {
    let build = |column: usize| -> Result<StringColumn> {
        let rows = matrix.rows();
        let mut tokens = try_vec::<TokenSlot>("column tokens", rows)?;
        tokens.extend((0..rows).map(|row| matrix.get(row, column)));
        StringColumn::from_tokens(view, &tokens)
    };
    let columns: Vec<StringColumn> = if parallel {
        (0..matrix.columns())
            .into_par_iter()
            .map(build)
            .collect::<Result<_>>()?
    } else {
        (0..matrix.columns()).map(build).collect::<Result<_>>()?
    };
    Table::new(columns)
}
