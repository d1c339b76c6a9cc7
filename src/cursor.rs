use crate::error::Db2MiddlewareError;
use crate::results::Row;
use crate::types::Value;

/// Row-at-a-time fetch primitives plus the bulk helpers derived from them.
///
/// Only the two primitives touch the native layer. Every derived operation
/// is a provided method expressed purely in terms of them, so anything that
/// implements the primitives — including test fakes — gets the whole fetch
/// surface for free.
pub trait RowFetch {
    /// Fetch the next row as a positional sequence of column values.
    ///
    /// Returns `Ok(None)` at exhaustion, and immediately (without invoking
    /// the native layer) on a statement that was never successfully executed
    /// or whose cursor has been closed.
    ///
    /// # Errors
    ///
    /// Returns [`Db2MiddlewareError::CursorError`] when the native fetch
    /// call fails.
    fn fetch_indexed(&mut self) -> Result<Option<Vec<Value>>, Db2MiddlewareError>;

    /// Fetch the next row as a mapping from column name to value.
    ///
    /// Same guard and exhaustion behavior as
    /// [`fetch_indexed`](RowFetch::fetch_indexed).
    ///
    /// # Errors
    ///
    /// Returns [`Db2MiddlewareError::CursorError`] when the native fetch
    /// call fails.
    fn fetch_associative(&mut self) -> Result<Option<Row>, Db2MiddlewareError>;

    /// First column of the first remaining row, or `None` on an empty
    /// result.
    ///
    /// # Errors
    ///
    /// Propagates errors from the underlying fetch primitive.
    fn fetch_one(&mut self) -> Result<Option<Value>, Db2MiddlewareError> {
        Ok(self
            .fetch_indexed()?
            .and_then(|row| row.into_iter().next()))
    }

    /// Collect every remaining row as positional sequences.
    ///
    /// # Errors
    ///
    /// Propagates errors from the underlying fetch primitive.
    fn fetch_all_indexed(&mut self) -> Result<Vec<Vec<Value>>, Db2MiddlewareError> {
        let mut rows = Vec::new();
        while let Some(row) = self.fetch_indexed()? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Collect every remaining row keyed by column name.
    ///
    /// # Errors
    ///
    /// Propagates errors from the underlying fetch primitive.
    fn fetch_all_associative(&mut self) -> Result<Vec<Row>, Db2MiddlewareError> {
        let mut rows = Vec::new();
        while let Some(row) = self.fetch_associative()? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Collect one designated column (0-based) from every remaining row.
    ///
    /// # Errors
    ///
    /// Returns [`Db2MiddlewareError::CursorError`] when a fetched row is
    /// narrower than `column`, and propagates primitive fetch errors.
    fn fetch_column(&mut self, column: usize) -> Result<Vec<Value>, Db2MiddlewareError> {
        let mut values = Vec::new();
        while let Some(mut row) = self.fetch_indexed()? {
            if column >= row.len() {
                return Err(Db2MiddlewareError::CursorError(format!(
                    "column index {column} out of range for row of width {}",
                    row.len()
                )));
            }
            values.push(row.swap_remove(column));
        }
        Ok(values)
    }
}
