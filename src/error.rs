use thiserror::Error;

/// Errors surfaced by the DB2 statement middleware.
///
/// Every raised error is fatal to the operation that produced it; nothing is
/// retried internally. The statement itself stays structurally usable for a
/// fresh bind/execute cycle afterwards.
#[derive(Debug, Error)]
pub enum Db2MiddlewareError {
    /// The native layer rejected a position/type/value combination.
    #[error("Bind error: {0}")]
    BindError(String),

    /// The native execute call failed. Staged LOB storage has already been
    /// released by the time this propagates.
    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    /// Temporary-storage creation, write, or stream copy failed at the OS
    /// level during the LOB staging phase.
    #[error("LOB staging error: {0}")]
    StagingError(#[from] std::io::Error),

    /// A value could not be routed to the requested bind path.
    #[error("Parameter conversion error: {0}")]
    ParameterError(String),

    /// The native layer failed to fetch from or free the result set, or a
    /// fetch helper was asked for a column the row does not have.
    #[error("Cursor error: {0}")]
    CursorError(String),
}
