use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Read, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::Db2MiddlewareError;
use crate::types::{Value, ValueRef};

/// Content pending materialisation into temporary storage for a LOB bind.
///
/// The caller keeps ownership of nothing here — binding a LOB moves the
/// source into the staging table, where it waits until the next execute
/// drains it into the bound temporary file.
pub enum LobSource {
    /// Written verbatim as UTF-8 bytes.
    Text(String),
    /// Written verbatim.
    Blob(Vec<u8>),
    /// Copied to exhaustion at drain time.
    Stream(Box<dyn Read>),
    /// Caller-owned cell resolved at drain time; must hold `Text` or `Blob`
    /// by then.
    Shared(ValueRef),
}

impl LobSource {
    /// Route a plain [`Value`] to a LOB source, for value-style binds with a
    /// `LargeObject` declared type.
    ///
    /// # Errors
    ///
    /// Returns [`Db2MiddlewareError::ParameterError`] for values that carry
    /// no stageable content.
    pub fn try_from_value(value: Value) -> Result<Self, Db2MiddlewareError> {
        match value {
            Value::Text(s) => Ok(LobSource::Text(s)),
            Value::Blob(b) => Ok(LobSource::Blob(b)),
            other => Err(Db2MiddlewareError::ParameterError(format!(
                "LOB parameters take text or binary content, got {other:?}"
            ))),
        }
    }
}

impl fmt::Debug for LobSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LobSource::Text(s) => f.debug_tuple("Text").field(&s.len()).finish(),
            LobSource::Blob(b) => f.debug_tuple("Blob").field(&b.len()).finish(),
            LobSource::Stream(_) => f.write_str("Stream(..)"),
            LobSource::Shared(_) => f.write_str("Shared(..)"),
        }
    }
}

/// One unit of scoped temporary backing storage.
///
/// The unit stays alive (and its path readable) until `close`, which deletes
/// the backing storage.
pub trait TemporaryStream {
    /// Filesystem path the native bind call registers as its target.
    fn path(&self) -> &Path;

    /// Write `bytes` verbatim into the backing storage.
    ///
    /// # Errors
    ///
    /// Returns the underlying OS error on write failure.
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Copy `reader` to exhaustion into the backing storage, returning the
    /// number of bytes copied.
    ///
    /// # Errors
    ///
    /// Returns the underlying OS error on read or write failure.
    fn copy_from(&mut self, reader: &mut dyn Read) -> io::Result<u64>;

    /// Release the unit, deleting the backing storage.
    ///
    /// # Errors
    ///
    /// Returns the underlying OS error when deletion fails.
    fn close(self: Box<Self>) -> io::Result<()>;
}

/// Allocates scoped temporary storage for staged LOB content.
///
/// The statement holds this behind a trait object so tests can inject a
/// handle-counting fake.
pub trait TemporaryStreamStore {
    /// Allocate a fresh storage unit.
    ///
    /// # Errors
    ///
    /// Returns the underlying OS error when the unit cannot be created.
    fn create(&self) -> io::Result<Box<dyn TemporaryStream>>;
}

/// Default store backed by [`tempfile::NamedTempFile`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TempFileStore;

struct TempFileStream {
    file: NamedTempFile,
}

impl TemporaryStream for TempFileStream {
    fn path(&self) -> &Path {
        self.file.path()
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.file.as_file_mut().write_all(bytes)?;
        self.file.as_file_mut().flush()
    }

    fn copy_from(&mut self, reader: &mut dyn Read) -> io::Result<u64> {
        io::copy(reader, self.file.as_file_mut())
    }

    fn close(self: Box<Self>) -> io::Result<()> {
        self.file.close()
    }
}

impl TemporaryStreamStore for TempFileStore {
    fn create(&self) -> io::Result<Box<dyn TemporaryStream>> {
        Ok(Box::new(TempFileStream {
            file: NamedTempFile::new()?,
        }))
    }
}

/// Entry in the per-execute staging table: the pending source and the
/// storage unit whose path was registered with the native bind call.
pub(crate) struct StagedLob {
    pub(crate) source: LobSource,
    pub(crate) storage: Box<dyn TemporaryStream>,
}

impl fmt::Debug for StagedLob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StagedLob")
            .field("source", &self.source)
            .field("storage", &self.storage.path().display())
            .finish()
    }
}

/// Transient mapping of LOB positions to their pending content, populated at
/// bind time and fully drained and cleared at execute time.
pub(crate) type StagingTable = BTreeMap<u32, StagedLob>;
