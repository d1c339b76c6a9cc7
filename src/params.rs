use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::warn;

use crate::error::Db2MiddlewareError;
use crate::native::{NativeBind, NativeStatement};
use crate::staging::{LobSource, StagedLob, StagingTable, TemporaryStreamStore};
use crate::types::{ParamType, Value, ValueRef};

/// One bound parameter position.
#[derive(Debug)]
pub(crate) enum Binding {
    /// Alias to a caller-owned cell, resolved when execute runs.
    Scalar(ValueRef),
    /// Staged LOB; the temporary-storage path stands in for the caller's
    /// value in the reconstructed positional list.
    Lob(PathBuf),
}

/// Bound-parameter table keyed by 1-based position.
///
/// At most one binding per position: rebinding silently replaces the prior
/// entry, releasing its staged storage first when it was LOB-mode. The
/// `BTreeMap` keeps positions ascending, which is the order execute needs
/// when reconstructing a positional list.
#[derive(Debug, Default)]
pub(crate) struct BindingSet {
    entries: BTreeMap<u32, Binding>,
}

impl BindingSet {
    /// Bind a scalar cell over the long-integer or char route.
    pub(crate) fn bind_scalar(
        &mut self,
        native: &mut dyn NativeStatement,
        staged: &mut StagingTable,
        position: u32,
        value: ValueRef,
        param_type: ParamType,
    ) -> Result<(), Db2MiddlewareError> {
        let bind = match param_type {
            ParamType::Integer => NativeBind::Long(value.clone()),
            // Default route, including explicit Text.
            _ => NativeBind::Char(value.clone()),
        };

        native
            .bind(position, bind)
            .map_err(|e| Db2MiddlewareError::BindError(e.to_string()))?;

        release_staged_at(staged, position);
        self.entries.insert(position, Binding::Scalar(value));
        Ok(())
    }

    /// Bind a LOB source: allocate fresh temporary storage and register its
    /// path (not the caller's value) with the native layer.
    pub(crate) fn bind_lob(
        &mut self,
        native: &mut dyn NativeStatement,
        store: &dyn TemporaryStreamStore,
        staged: &mut StagingTable,
        position: u32,
        source: LobSource,
    ) -> Result<(), Db2MiddlewareError> {
        // Release any storage the prior binding at this position held before
        // allocating the replacement unit.
        release_staged_at(staged, position);

        let storage = store.create()?;
        let path = storage.path().to_path_buf();

        if let Err(e) = native.bind(position, NativeBind::BinaryFile(path.clone())) {
            // Rejected bind retains no partial state; drop the unit we just
            // allocated for it.
            if let Err(close_err) = storage.close() {
                warn!("failed to release storage for rejected LOB bind: {close_err}");
            }
            return Err(Db2MiddlewareError::BindError(e.to_string()));
        }

        staged.insert(position, StagedLob { source, storage });
        self.entries.insert(position, Binding::Lob(path));
        Ok(())
    }

    /// Reconstruct the positional parameter list, ascending by position.
    ///
    /// Scalar cells are resolved now, so a caller that mutated a bound cell
    /// after binding sees the current value used. LOB entries contribute
    /// their temporary-storage path.
    pub(crate) fn positional_values(&self) -> Vec<Value> {
        self.entries
            .values()
            .map(|binding| match binding {
                Binding::Scalar(cell) => cell.borrow().clone(),
                Binding::Lob(path) => Value::Text(path.to_string_lossy().into_owned()),
            })
            .collect()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Drop the staging entry for one position, closing its storage. Best-effort:
/// a failed close is logged, not raised, since the binding that owned it is
/// already gone.
pub(crate) fn release_staged_at(staged: &mut StagingTable, position: u32) {
    if let Some(entry) = staged.remove(&position)
        && let Err(e) = entry.storage.close()
    {
        warn!("failed to release staged LOB storage for position {position}: {e}");
    }
}
