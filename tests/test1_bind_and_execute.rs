use db2_middleware::prelude::*;
use db2_middleware::test_utils::FakeNativeStatement;

#[test]
fn positional_list_is_ordered_by_position() -> Result<(), Db2MiddlewareError> {
    let mut stmt = Db2Statement::new(FakeNativeStatement::new());

    stmt.bind_value(3, Value::Text("c".into()), ParamType::Text)?;
    stmt.bind_value(1, Value::Text("a".into()), ParamType::Text)?;
    stmt.bind_value(2, Value::Text("b".into()), ParamType::Text)?;
    stmt.execute(None)?;

    assert_eq!(
        stmt.native().executed_params,
        vec![vec![
            Value::Text("a".into()),
            Value::Text("b".into()),
            Value::Text("c".into()),
        ]]
    );
    Ok(())
}

#[test]
fn rebinding_a_position_leaves_exactly_one_binding() -> Result<(), Db2MiddlewareError> {
    let mut stmt = Db2Statement::new(FakeNativeStatement::new());

    stmt.bind_value(1, Value::Text("first".into()), ParamType::Text)?;
    stmt.bind_value(1, Value::Text("second".into()), ParamType::Text)?;
    stmt.execute(None)?;

    assert_eq!(
        stmt.native().executed_params,
        vec![vec![Value::Text("second".into())]]
    );
    Ok(())
}

#[test]
fn bound_cell_resolves_at_execute_time() -> Result<(), Db2MiddlewareError> {
    let mut stmt = Db2Statement::new(FakeNativeStatement::new());
    let cell = value_ref(Value::Int(1));

    stmt.bind_param(1, cell.clone(), ParamType::Integer)?;
    *cell.borrow_mut() = Value::Int(99);
    stmt.execute(None)?;

    assert_eq!(stmt.native().executed_params, vec![vec![Value::Int(99)]]);
    Ok(())
}

#[test]
fn explicit_params_bypass_bindings() -> Result<(), Db2MiddlewareError> {
    let mut stmt = Db2Statement::new(FakeNativeStatement::new());

    stmt.bind_value(1, Value::Text("bound".into()), ParamType::Text)?;
    stmt.execute(Some(vec![Value::Int(7)]))?;

    assert_eq!(stmt.native().executed_params, vec![vec![Value::Int(7)]]);
    Ok(())
}

#[test]
fn declared_type_selects_the_native_route() -> Result<(), Db2MiddlewareError> {
    let mut stmt = Db2Statement::new(FakeNativeStatement::new());

    stmt.bind_value(1, Value::Int(5), ParamType::Integer)?;
    stmt.bind_value(2, Value::Text("t".into()), ParamType::Text)?;

    let binds = &stmt.native().binds;
    assert_eq!(binds.len(), 2);
    assert!(matches!(binds[0], (1, NativeBind::Long(_))));
    assert!(matches!(binds[1], (2, NativeBind::Char(_))));
    Ok(())
}

#[test]
fn native_bind_failure_surfaces_bind_error() {
    let mut fake = FakeNativeStatement::new();
    fake.fail_bind = Some("SQL0313N wrong number of parameters".into());
    let mut stmt = Db2Statement::new(fake);

    let err = stmt
        .bind_value(1, Value::Text("x".into()), ParamType::Text)
        .unwrap_err();
    assert!(matches!(err, Db2MiddlewareError::BindError(_)));
    assert!(err.to_string().contains("SQL0313N"));
}

#[test]
fn execute_failure_leaves_statement_without_result() {
    let mut fake = FakeNativeStatement::new();
    fake.fail_execute = Some("SQL0104N unexpected token".into());
    let mut stmt = Db2Statement::new(fake);

    stmt.bind_value(1, Value::Int(1), ParamType::Integer)
        .expect("bind");
    let err = stmt.execute(None).unwrap_err();

    assert!(matches!(err, Db2MiddlewareError::ExecutionError(_)));
    assert!(err.to_string().contains("SQL0104N"));
    assert!(!stmt.has_result());

    // The failed execute produced no result, so fetches short-circuit.
    assert_eq!(stmt.fetch_indexed().expect("fetch"), None);
    assert_eq!(stmt.native().fetch_calls, 0);
}

#[test]
fn statement_is_reusable_after_execute_failure() -> Result<(), Db2MiddlewareError> {
    let mut fake = FakeNativeStatement::new();
    fake.fail_execute = Some("SQL0911N deadlock".into());
    let mut stmt = Db2Statement::new(fake);

    stmt.bind_value(1, Value::Int(1), ParamType::Integer)?;
    assert!(stmt.execute(None).is_err());

    stmt.native_mut().fail_execute = None;
    stmt.execute(None)?;
    assert!(stmt.has_result());
    Ok(())
}
