use std::path::Path;

use db2_middleware::prelude::*;
use db2_middleware::test_utils::{CountingStore, FakeNativeStatement};

fn statement_with_store(store: &CountingStore) -> Db2Statement<FakeNativeStatement> {
    Db2Statement::with_store(FakeNativeStatement::new(), Box::new(store.clone()))
}

#[test]
fn lob_binds_stage_the_path_not_the_value() -> Result<(), Db2MiddlewareError> {
    let store = CountingStore::new();
    let mut stmt = statement_with_store(&store);

    stmt.bind_value(1, Value::Text("hello".into()), ParamType::LargeObject)?;
    stmt.bind_value(2, Value::Int(42), ParamType::Integer)?;
    stmt.execute(None)?;

    let params = &stmt.native().executed_params[0];
    assert_eq!(params.len(), 2);

    // Position 1 carries the temporary-storage path, never the caller's
    // content; the native layer read "hello" out of that file mid-execute.
    let path = params[0].as_text().expect("path param").to_owned();
    assert_ne!(path, "hello");
    assert_eq!(params[1], Value::Int(42));
    assert_eq!(stmt.native().lob_contents, vec![(1, b"hello".to_vec())]);

    // One-shot: the backing storage is gone once execute returns.
    assert!(!Path::new(&path).exists());
    assert_eq!(store.open_handles(), 0);
    Ok(())
}

#[test]
fn rebinding_a_lob_position_releases_prior_storage_first() -> Result<(), Db2MiddlewareError> {
    let store = CountingStore::new();
    let mut stmt = statement_with_store(&store);

    stmt.bind_lob(1, LobSource::Text("first".into()))?;
    assert_eq!((store.created(), store.open_handles()), (1, 1));

    stmt.bind_lob(1, LobSource::Text("second".into()))?;
    assert_eq!((store.created(), store.open_handles()), (2, 1));

    stmt.execute(None)?;
    assert_eq!(store.open_handles(), 0);
    assert_eq!(stmt.native().lob_contents, vec![(1, b"second".to_vec())]);
    Ok(())
}

#[test]
fn rebinding_a_lob_position_as_scalar_releases_storage() -> Result<(), Db2MiddlewareError> {
    let store = CountingStore::new();
    let mut stmt = statement_with_store(&store);

    stmt.bind_lob(1, LobSource::Text("lob".into()))?;
    stmt.bind_value(1, Value::Int(9), ParamType::Integer)?;

    assert_eq!(store.open_handles(), 0);
    stmt.execute(None)?;
    assert_eq!(stmt.native().executed_params, vec![vec![Value::Int(9)]]);
    Ok(())
}

#[test]
fn every_staged_handle_is_closed_after_execute() -> Result<(), Db2MiddlewareError> {
    let store = CountingStore::new();
    let mut stmt = statement_with_store(&store);

    for position in 1..=3 {
        stmt.bind_lob(position, LobSource::Text(format!("lob-{position}")))?;
    }
    assert_eq!(store.open_handles(), 3);

    stmt.execute(None)?;
    assert_eq!(store.open_handles(), 0);
    assert_eq!(stmt.native().lob_contents.len(), 3);
    Ok(())
}

#[test]
fn drain_failure_releases_all_handles_and_skips_execute() -> Result<(), Db2MiddlewareError> {
    let store = CountingStore::new();
    let mut stmt = statement_with_store(&store);

    stmt.bind_lob(1, LobSource::Text("one".into()))?;
    stmt.bind_lob(2, LobSource::Text("two".into()))?;
    store.fail_writes(true);

    let err = stmt.execute(None).unwrap_err();
    assert!(matches!(err, Db2MiddlewareError::StagingError(_)));

    // The later entry's storage is released too, not just the one that
    // failed, and the native execute never ran.
    assert_eq!(store.open_handles(), 0);
    assert!(stmt.native().executed_params.is_empty());
    assert!(!stmt.has_result());
    Ok(())
}

#[test]
fn execute_failure_still_releases_staged_storage() -> Result<(), Db2MiddlewareError> {
    let store = CountingStore::new();
    let mut fake = FakeNativeStatement::new();
    fake.fail_execute = Some("SQL0964C transaction log full".into());
    let mut stmt = Db2Statement::with_store(fake, Box::new(store.clone()));

    stmt.bind_lob(1, LobSource::Text("payload".into()))?;
    assert!(stmt.execute(None).is_err());
    assert_eq!(store.open_handles(), 0);
    Ok(())
}

#[test]
fn stream_sources_are_copied_to_exhaustion() -> Result<(), Db2MiddlewareError> {
    let store = CountingStore::new();
    let mut stmt = statement_with_store(&store);

    let payload = vec![b'x'; 10_000];
    stmt.bind_lob(
        1,
        LobSource::Stream(Box::new(std::io::Cursor::new(payload.clone()))),
    )?;
    stmt.execute(None)?;

    assert_eq!(stmt.native().lob_contents, vec![(1, payload)]);
    assert_eq!(store.open_handles(), 0);
    Ok(())
}

#[test]
fn shared_cell_lob_resolves_at_drain_time() -> Result<(), Db2MiddlewareError> {
    let store = CountingStore::new();
    let mut stmt = statement_with_store(&store);
    let cell = value_ref(Value::Text("old".into()));

    stmt.bind_param(1, cell.clone(), ParamType::LargeObject)?;
    *cell.borrow_mut() = Value::Text("new".into());
    stmt.execute(None)?;

    assert_eq!(stmt.native().lob_contents, vec![(1, b"new".to_vec())]);
    Ok(())
}

#[test]
fn shared_cell_without_stageable_content_fails_drain_cleanly() -> Result<(), Db2MiddlewareError>
{
    let store = CountingStore::new();
    let mut stmt = statement_with_store(&store);

    stmt.bind_param(1, value_ref(Value::Int(5)), ParamType::LargeObject)?;
    let err = stmt.execute(None).unwrap_err();

    assert!(matches!(err, Db2MiddlewareError::ParameterError(_)));
    assert_eq!(store.open_handles(), 0);
    assert!(stmt.native().executed_params.is_empty());
    Ok(())
}

#[test]
fn lob_bind_value_rejects_non_stageable_values() {
    let store = CountingStore::new();
    let mut stmt = statement_with_store(&store);

    let err = stmt
        .bind_value(1, Value::Int(1), ParamType::LargeObject)
        .unwrap_err();
    assert!(matches!(err, Db2MiddlewareError::ParameterError(_)));
    assert_eq!(store.created(), 0);
}

#[test]
fn storage_creation_failure_retains_no_binding() -> Result<(), Db2MiddlewareError> {
    let store = CountingStore::new();
    let mut stmt = statement_with_store(&store);
    store.fail_create(true);

    let err = stmt
        .bind_lob(1, LobSource::Text("x".into()))
        .unwrap_err();
    assert!(matches!(err, Db2MiddlewareError::StagingError(_)));

    store.fail_create(false);
    stmt.execute(None)?;
    assert_eq!(stmt.native().executed_params, vec![Vec::<Value>::new()]);
    Ok(())
}

#[test]
fn rejected_native_lob_bind_releases_its_fresh_storage() {
    let store = CountingStore::new();
    let mut fake = FakeNativeStatement::new();
    fake.fail_bind = Some("SQL0313N wrong number of parameters".into());
    let mut stmt = Db2Statement::with_store(fake, Box::new(store.clone()));

    let err = stmt
        .bind_lob(1, LobSource::Text("x".into()))
        .unwrap_err();
    assert!(matches!(err, Db2MiddlewareError::BindError(_)));
    assert_eq!(store.open_handles(), 0);
}
