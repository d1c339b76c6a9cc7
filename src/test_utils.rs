//! Fakes for exercising the statement layer without a native DB2 client:
//! a scriptable [`FakeNativeStatement`] and a handle-counting
//! [`CountingStore`] temporary-storage backend.

use std::cell::Cell;
use std::collections::VecDeque;
use std::io::{self, Read};
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use crate::native::{NativeBind, NativeError, NativeStatement};
use crate::results::Row;
use crate::staging::{TempFileStore, TemporaryStream, TemporaryStreamStore};
use crate::types::Value;

/// Scriptable in-memory stand-in for the native prepared-statement handle.
///
/// Records every bind and execute call; replays the scripted rows after each
/// successful execute, the way the real client re-opens a result set. At
/// execute time it snapshots the contents of every file-mode bind target,
/// mirroring the native client reading staged LOB files during execution.
pub struct FakeNativeStatement {
    /// Every (position, bind) registered, in call order.
    pub binds: Vec<(u32, NativeBind)>,
    /// Parameter lists received by execute, in call order.
    pub executed_params: Vec<Vec<Value>>,
    /// (position, bytes) read from each file-mode bind target at execute.
    pub lob_contents: Vec<(u32, Vec<u8>)>,
    /// Times either fetch primitive reached this handle.
    pub fetch_calls: usize,
    /// Times free_result was called.
    pub free_calls: usize,
    /// When set, bind calls fail with this message.
    pub fail_bind: Option<String>,
    /// When set, execute calls fail with this message.
    pub fail_execute: Option<String>,
    /// When set, free_result calls fail with this message.
    pub fail_free: Option<String>,
    /// When true, row_count reports a native failure.
    pub fail_row_count: bool,
    /// Reported column count; `None` models a client that cannot determine it.
    pub column_count: Option<usize>,
    /// Reported row count when not failing.
    pub row_count: u64,
    columns: Arc<Vec<String>>,
    scripted_rows: Vec<Vec<Value>>,
    pending: VecDeque<Vec<Value>>,
}

impl FakeNativeStatement {
    /// A statement with no scripted result (and an undeterminable column
    /// count).
    #[must_use]
    pub fn new() -> Self {
        Self {
            binds: Vec::new(),
            executed_params: Vec::new(),
            lob_contents: Vec::new(),
            fetch_calls: 0,
            free_calls: 0,
            fail_bind: None,
            fail_execute: None,
            fail_free: None,
            fail_row_count: false,
            column_count: None,
            row_count: 0,
            columns: Arc::new(Vec::new()),
            scripted_rows: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    /// A statement that serves `rows` under `columns` after each successful
    /// execute.
    #[must_use]
    pub fn with_rows(columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        let mut fake = Self::new();
        fake.column_count = Some(columns.len());
        fake.row_count = rows.len() as u64;
        fake.columns = Arc::new(columns.iter().map(ToString::to_string).collect());
        fake.scripted_rows = rows;
        fake
    }
}

impl Default for FakeNativeStatement {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeStatement for FakeNativeStatement {
    fn bind(&mut self, position: u32, bind: NativeBind) -> Result<(), NativeError> {
        if let Some(msg) = &self.fail_bind {
            return Err(NativeError(msg.clone()));
        }
        self.binds.push((position, bind));
        Ok(())
    }

    fn execute(&mut self, params: &[Value]) -> Result<bool, NativeError> {
        self.executed_params.push(params.to_vec());

        // The real client reads staged files while executing; capture what
        // it would have seen.
        self.lob_contents.clear();
        for (position, bind) in &self.binds {
            if let NativeBind::BinaryFile(path) = bind
                && let Ok(bytes) = std::fs::read(path)
            {
                self.lob_contents.push((*position, bytes));
            }
        }

        if let Some(msg) = &self.fail_execute {
            return Err(NativeError(msg.clone()));
        }

        self.pending = self.scripted_rows.clone().into();
        Ok(true)
    }

    fn fetch_indexed(&mut self) -> Result<Option<Vec<Value>>, NativeError> {
        self.fetch_calls += 1;
        Ok(self.pending.pop_front())
    }

    fn fetch_associative(&mut self) -> Result<Option<Row>, NativeError> {
        self.fetch_calls += 1;
        Ok(self
            .pending
            .pop_front()
            .map(|values| Row::new(self.columns.clone(), values)))
    }

    fn free_result(&mut self) -> Result<(), NativeError> {
        self.free_calls += 1;
        if let Some(msg) = &self.fail_free {
            return Err(NativeError(msg.clone()));
        }
        self.pending.clear();
        Ok(())
    }

    fn column_count(&self) -> Option<usize> {
        self.column_count
    }

    fn row_count(&self) -> Result<u64, NativeError> {
        if self.fail_row_count {
            return Err(NativeError("row count unavailable".into()));
        }
        Ok(self.row_count)
    }
}

#[derive(Default)]
struct StoreState {
    open: Cell<usize>,
    created: Cell<usize>,
    fail_create: Cell<bool>,
    fail_writes: Cell<bool>,
}

/// Temporary-storage backend that counts open handles.
///
/// Wraps [`TempFileStore`] so staged content really lands on disk; clones
/// share state, so a test keeps one clone for assertions while the statement
/// owns the other. Write and create failures can be injected to exercise the
/// drain-failure cleanup path.
#[derive(Clone, Default)]
pub struct CountingStore {
    state: Rc<StoreState>,
    inner: TempFileStore,
}

impl CountingStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage units created and not yet closed.
    #[must_use]
    pub fn open_handles(&self) -> usize {
        self.state.open.get()
    }

    /// Storage units created in total.
    #[must_use]
    pub fn created(&self) -> usize {
        self.state.created.get()
    }

    /// Make subsequent `create` calls fail.
    pub fn fail_create(&self, fail: bool) {
        self.state.fail_create.set(fail);
    }

    /// Make subsequent writes/copies into any open unit fail.
    pub fn fail_writes(&self, fail: bool) {
        self.state.fail_writes.set(fail);
    }
}

struct CountingStream {
    inner: Box<dyn TemporaryStream>,
    state: Rc<StoreState>,
}

impl TemporaryStream for CountingStream {
    fn path(&self) -> &Path {
        self.inner.path()
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        if self.state.fail_writes.get() {
            return Err(io::Error::other("injected write failure"));
        }
        self.inner.write_all(bytes)
    }

    fn copy_from(&mut self, reader: &mut dyn Read) -> io::Result<u64> {
        if self.state.fail_writes.get() {
            return Err(io::Error::other("injected copy failure"));
        }
        self.inner.copy_from(reader)
    }

    fn close(self: Box<Self>) -> io::Result<()> {
        self.state.open.set(self.state.open.get() - 1);
        self.inner.close()
    }
}

impl TemporaryStreamStore for CountingStore {
    fn create(&self) -> io::Result<Box<dyn TemporaryStream>> {
        if self.state.fail_create.get() {
            return Err(io::Error::other("injected create failure"));
        }
        let inner = self.inner.create()?;
        self.state.created.set(self.state.created.get() + 1);
        self.state.open.set(self.state.open.get() + 1);
        Ok(Box::new(CountingStream {
            inner,
            state: self.state.clone(),
        }))
    }
}
