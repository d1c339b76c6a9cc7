use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

/// Values bound as statement parameters or decoded from result rows.
///
/// One enum across the whole surface so calling code never branches on the
/// native client's type zoo:
/// ```rust
/// use db2_middleware::prelude::*;
///
/// let params = vec![
///     Value::Int(42),
///     Value::Text("alice".into()),
///     Value::Null,
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl Value {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        if let Value::Int(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let Value::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            Value::Int(1) => Some(true),
            Value::Int(0) => Some(false),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let Value::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Timestamp(value) => Some(*value),
            // DB2 renders timestamps as text in several fetch paths.
            Value::Text(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
                .ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let Value::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }
}

/// Declared type of a bound parameter, selecting the native bind route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamType {
    /// Char/text bind, the default route for anything not listed below.
    #[default]
    Text,
    /// Native long-integer bind.
    Integer,
    /// Staged through temporary storage and bound file-mode; see
    /// [`crate::staging::LobSource`].
    LargeObject,
}

/// Shared, mutable handle to a bound scalar value.
///
/// Reference-bound parameters resolve their cell when `execute` runs, not
/// when `bind_param` is called, so a caller can mutate the cell between the
/// two and the execute-time value wins. The statement layer is single-owner
/// and sequential, hence `Rc<RefCell>` rather than a synchronized cell.
pub type ValueRef = Rc<RefCell<Value>>;

/// Wrap a value in a fresh [`ValueRef`] cell.
#[must_use]
pub fn value_ref(value: Value) -> ValueRef {
    Rc::new(RefCell::new(value))
}
