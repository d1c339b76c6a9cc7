//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and traits
//! to make it easier to get started with the library.

pub use crate::cursor::RowFetch;
pub use crate::error::Db2MiddlewareError;
pub use crate::native::{NativeBind, NativeError, NativeStatement};
pub use crate::results::Row;
pub use crate::staging::{LobSource, TempFileStore, TemporaryStream, TemporaryStreamStore};
pub use crate::statement::Db2Statement;
pub use crate::types::{ParamType, Value, ValueRef, value_ref};
