//! Synchronous statement middleware for IBM DB2-style native clients.
//!
//! The native client only binds variables by reference and wants large
//! objects streamed through files rather than passed inline. This crate
//! wraps that into a uniform statement surface: bind parameters by position
//! (scalars as lazily resolved cells, LOBs staged through temporary files),
//! execute, then fetch rows indexed or keyed by column name — plus the bulk
//! fetch helpers built generically on those two primitives.
//!
//! The native prepared-statement handle itself stays behind the
//! [`native::NativeStatement`] trait; connection setup, transactions, and
//! schema introspection belong to other layers.

pub mod cursor;
pub mod error;
pub mod native;
pub mod prelude;
pub mod results;
pub mod staging;
pub mod statement;
pub mod types;

mod executor;
mod params;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use cursor::RowFetch;
pub use error::Db2MiddlewareError;
pub use native::{NativeBind, NativeError, NativeStatement};
pub use results::Row;
pub use staging::{LobSource, TempFileStore, TemporaryStream, TemporaryStreamStore};
pub use statement::Db2Statement;
pub use types::{ParamType, Value, ValueRef, value_ref};
