use tracing::warn;

use crate::error::Db2MiddlewareError;
use crate::staging::{LobSource, StagedLob, StagingTable};
use crate::types::Value;

/// Materialise every staged LOB source into its temporary storage.
///
/// The first failure aborts the remaining drains, but every staged handle is
/// still released before the error propagates — staging never leaks storage
/// on a failed execute path. On success the units stay open (files readable)
/// for the native execute that follows.
pub(crate) fn drain_staged(staged: &mut StagingTable) -> Result<(), Db2MiddlewareError> {
    let mut failure = None;
    for (position, entry) in staged.iter_mut() {
        if let Err(e) = drain_entry(*position, entry) {
            failure = Some(e);
            break;
        }
    }

    if let Some(e) = failure {
        release_staged(staged);
        return Err(e);
    }
    Ok(())
}

fn drain_entry(position: u32, entry: &mut StagedLob) -> Result<(), Db2MiddlewareError> {
    let StagedLob { source, storage } = entry;
    match source {
        LobSource::Text(s) => storage.write_all(s.as_bytes())?,
        LobSource::Blob(b) => storage.write_all(b)?,
        LobSource::Stream(reader) => {
            storage.copy_from(reader.as_mut())?;
        }
        LobSource::Shared(cell) => match &*cell.borrow() {
            Value::Text(s) => storage.write_all(s.as_bytes())?,
            Value::Blob(b) => storage.write_all(b)?,
            other => {
                return Err(Db2MiddlewareError::ParameterError(format!(
                    "LOB parameter at position {position} must resolve to text \
                     or binary content, got {other:?}"
                )));
            }
        },
    }
    Ok(())
}

/// Close every temporary storage unit and clear the staging table. Staged
/// LOBs are one-shot per execute, so this runs whether or not the native
/// call succeeded. Close failures are logged rather than raised: the execute
/// outcome is already decided by the time storage is torn down.
pub(crate) fn release_staged(staged: &mut StagingTable) {
    for (position, entry) in std::mem::take(staged) {
        if let Err(e) = entry.storage.close() {
            warn!("failed to release staged LOB storage for position {position}: {e}");
        }
    }
}
