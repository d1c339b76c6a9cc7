use std::path::PathBuf;

use thiserror::Error;

use crate::results::Row;
use crate::types::{Value, ValueRef};

/// Error reported by the native client, carrying its last-error message
/// verbatim. The middleware wraps it into the variant matching the operation
/// that failed.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct NativeError(pub String);

/// How a parameter position is registered with the native layer.
#[derive(Debug, Clone)]
pub enum NativeBind {
    /// Long-integer bind for [`crate::types::ParamType::Integer`].
    Long(ValueRef),
    /// Char/text bind, the default route.
    Char(ValueRef),
    /// File-mode binary bind. The native client reads the file at execute
    /// time; the path, not the caller's value, is what gets registered.
    BinaryFile(PathBuf),
}

/// Contract of the opaque native prepared-statement handle.
///
/// The handle is externally allocated and owned; this layer never frees it
/// beyond [`free_result`](NativeStatement::free_result). Every call blocks
/// until the native client returns — there is no suspension point and no
/// cancellation at this seam.
pub trait NativeStatement {
    /// Register a bind target for a 1-based position.
    ///
    /// Range validation against the statement's parameter count happens here,
    /// in the native layer, and surfaces as an error.
    ///
    /// # Errors
    ///
    /// Returns [`NativeError`] with the engine's message when the
    /// position/type/target combination is rejected.
    fn bind(&mut self, position: u32, bind: NativeBind) -> Result<(), NativeError>;

    /// Execute with a fully assembled positional parameter list, returning
    /// the native result indicator.
    ///
    /// # Errors
    ///
    /// Returns [`NativeError`] with the engine's statement error message.
    fn execute(&mut self, params: &[Value]) -> Result<bool, NativeError>;

    /// Fetch the next row as a positional sequence, or `None` at exhaustion.
    ///
    /// # Errors
    ///
    /// Returns [`NativeError`] when the native fetch call fails.
    fn fetch_indexed(&mut self) -> Result<Option<Vec<Value>>, NativeError>;

    /// Fetch the next row keyed by column name, or `None` at exhaustion.
    ///
    /// # Errors
    ///
    /// Returns [`NativeError`] when the native fetch call fails.
    fn fetch_associative(&mut self) -> Result<Option<Row>, NativeError>;

    /// Release the active result set.
    ///
    /// # Errors
    ///
    /// Returns [`NativeError`] when the native free call reports failure.
    fn free_result(&mut self) -> Result<(), NativeError>;

    /// Column count of the active result, when the native client can
    /// determine it.
    fn column_count(&self) -> Option<usize>;

    /// Affected/fetched row count. Unreliable after row fetching on this
    /// class of client; the middleware swallows the error case.
    ///
    /// # Errors
    ///
    /// Returns [`NativeError`] when the count cannot be produced.
    fn row_count(&self) -> Result<u64, NativeError>;
}
