use tracing::{debug, warn};

use crate::cursor::RowFetch;
use crate::error::Db2MiddlewareError;
use crate::executor::{drain_staged, release_staged};
use crate::native::NativeStatement;
use crate::params::BindingSet;
use crate::results::Row;
use crate::staging::{LobSource, StagingTable, TempFileStore, TemporaryStreamStore};
use crate::types::{ParamType, Value, ValueRef, value_ref};

/// A prepared statement bound to a native DB2-style handle.
///
/// Lifecycle: bind any number of times (rebinding a position replaces the
/// prior entry), then execute, then fetch until exhaustion, then optionally
/// close the cursor early. Execute drains staged LOB content into temporary
/// files before the native call and releases that storage afterwards, so a
/// staged LOB is one-shot per execute.
///
/// The statement is single-owner and sequential; every call blocks until the
/// native client returns. A statement whose execute or close failed stays
/// structurally usable for a later bind/execute cycle.
pub struct Db2Statement<S: NativeStatement> {
    native: S,
    bindings: BindingSet,
    staged: StagingTable,
    store: Box<dyn TemporaryStreamStore>,
    has_result: bool,
}

impl<S: NativeStatement> Db2Statement<S> {
    /// Wrap a native handle, staging LOBs through [`TempFileStore`].
    pub fn new(native: S) -> Self {
        Self::with_store(native, Box::new(TempFileStore))
    }

    /// Wrap a native handle with a custom temporary-storage backend.
    pub fn with_store(native: S, store: Box<dyn TemporaryStreamStore>) -> Self {
        Self {
            native,
            bindings: BindingSet::default(),
            staged: StagingTable::new(),
            store,
            has_result: false,
        }
    }

    /// Bind an owned value at a 1-based position.
    ///
    /// The value is wrapped in a fresh cell, so later mutation is not
    /// possible through this call — use [`bind_param`](Self::bind_param) for
    /// that. A `LargeObject` declared type routes text or binary content
    /// through LOB staging.
    ///
    /// # Errors
    ///
    /// Returns [`Db2MiddlewareError::BindError`] when the native layer
    /// rejects the bind, [`Db2MiddlewareError::ParameterError`] when the
    /// value cannot take the requested route, or
    /// [`Db2MiddlewareError::StagingError`] when LOB storage allocation
    /// fails.
    pub fn bind_value(
        &mut self,
        position: u32,
        value: Value,
        param_type: ParamType,
    ) -> Result<(), Db2MiddlewareError> {
        match param_type {
            ParamType::LargeObject => {
                let source = LobSource::try_from_value(value)?;
                self.bind_lob(position, source)
            }
            _ => self.bind_param(position, value_ref(value), param_type),
        }
    }

    /// Bind a caller-owned cell at a 1-based position.
    ///
    /// Scalar cells are resolved at execute time, so mutating the cell after
    /// binding changes the value the native layer sees. With `LargeObject`
    /// the cell becomes a staged source resolved at the drain phase instead.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`bind_value`](Self::bind_value).
    pub fn bind_param(
        &mut self,
        position: u32,
        value: ValueRef,
        param_type: ParamType,
    ) -> Result<(), Db2MiddlewareError> {
        match param_type {
            ParamType::LargeObject => self.bind_lob(position, LobSource::Shared(value)),
            _ => self.bindings.bind_scalar(
                &mut self.native,
                &mut self.staged,
                position,
                value,
                param_type,
            ),
        }
    }

    /// Bind a LOB source at a 1-based position.
    ///
    /// Allocates a fresh temporary-storage unit and registers its path with
    /// the native layer; the source itself waits in the staging table until
    /// the next execute drains it. Rebinding a LOB position releases the
    /// prior unit before the new one is created.
    ///
    /// # Errors
    ///
    /// Returns [`Db2MiddlewareError::StagingError`] when storage allocation
    /// fails and [`Db2MiddlewareError::BindError`] when the native layer
    /// rejects the file-mode bind.
    pub fn bind_lob(
        &mut self,
        position: u32,
        source: LobSource,
    ) -> Result<(), Db2MiddlewareError> {
        self.bindings.bind_lob(
            &mut self.native,
            self.store.as_ref(),
            &mut self.staged,
            position,
            source,
        )
    }

    /// Execute the statement, returning the native result indicator.
    ///
    /// Without explicit `params`, a positional list is reconstructed from
    /// the current bindings ascending by position: scalar cells resolve now,
    /// LOB entries contribute their temporary-storage path. Staged LOB
    /// content is drained into its storage before the native call, and all
    /// staged storage is released afterwards regardless of outcome.
    ///
    /// # Errors
    ///
    /// Returns [`Db2MiddlewareError::StagingError`] or
    /// [`Db2MiddlewareError::ParameterError`] from the drain phase (staged
    /// storage is fully released even then), or
    /// [`Db2MiddlewareError::ExecutionError`] when the native call fails —
    /// in which case the statement still has no active result.
    pub fn execute(
        &mut self,
        params: Option<Vec<Value>>,
    ) -> Result<bool, Db2MiddlewareError> {
        let params = params.unwrap_or_else(|| self.bindings.positional_values());

        drain_staged(&mut self.staged)?;

        let outcome = self.native.execute(&params);
        release_staged(&mut self.staged);

        match outcome {
            Ok(indicator) => {
                self.has_result = true;
                Ok(indicator)
            }
            Err(e) => Err(Db2MiddlewareError::ExecutionError(e.to_string())),
        }
    }

    /// Column count of the active result, or 0 when the native client
    /// cannot determine it. Never an error.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.native.column_count().unwrap_or(0)
    }

    /// Affected/fetched row count, or `None` when the native client cannot
    /// produce one. The native error case is swallowed here: row counts are
    /// routinely unsupported or unreliable after fetching on this class of
    /// client, so "unavailable" is data, not a failure.
    #[must_use]
    pub fn row_count(&self) -> Option<u64> {
        match self.native.row_count() {
            Ok(n) => Some(n),
            Err(e) => {
                debug!("native row count unavailable: {e}");
                None
            }
        }
    }

    /// Release all bound state and the underlying result set.
    ///
    /// Clears every scalar/LOB binding, frees the native result, and drops
    /// the result-ready flag so subsequent fetches return `None` without
    /// touching the native layer. The staging table is expected to be empty
    /// here (execute always drains it); leftovers are released defensively.
    ///
    /// # Errors
    ///
    /// Returns [`Db2MiddlewareError::CursorError`] when the native free
    /// call fails, in which case the result-ready flag is left unchanged.
    pub fn close_cursor(&mut self) -> Result<(), Db2MiddlewareError> {
        self.bindings.clear();
        if !self.staged.is_empty() {
            warn!("staging table not empty at cursor close, releasing leftover storage");
            release_staged(&mut self.staged);
        }

        self.native
            .free_result()
            .map_err(|e| Db2MiddlewareError::CursorError(e.to_string()))?;

        self.has_result = false;
        Ok(())
    }

    /// Whether a successful execute has produced an active result that fetch
    /// calls may read.
    #[must_use]
    pub fn has_result(&self) -> bool {
        self.has_result
    }

    /// Access the wrapped native handle.
    #[must_use]
    pub fn native(&self) -> &S {
        &self.native
    }

    /// Mutable access to the wrapped native handle.
    pub fn native_mut(&mut self) -> &mut S {
        &mut self.native
    }
}

impl<S: NativeStatement> RowFetch for Db2Statement<S> {
    fn fetch_indexed(&mut self) -> Result<Option<Vec<Value>>, Db2MiddlewareError> {
        if !self.has_result {
            return Ok(None);
        }
        self.native
            .fetch_indexed()
            .map_err(|e| Db2MiddlewareError::CursorError(e.to_string()))
    }

    fn fetch_associative(&mut self) -> Result<Option<Row>, Db2MiddlewareError> {
        if !self.has_result {
            return Ok(None);
        }
        self.native
            .fetch_associative()
            .map_err(|e| Db2MiddlewareError::CursorError(e.to_string()))
    }
}
