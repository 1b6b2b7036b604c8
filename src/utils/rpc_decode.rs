//! Decoding of loosely-shaped RPC results
//!
//! The object API is not strict about result shapes: `search` usually
//! answers with a list of ids but older servers hand back a bare id or
//! `false` for an empty set, `read` wraps a single record in a list, and
//! write-style calls acknowledge with `true` or a non-zero integer.
//! These helpers normalize each shape so callers only ever see one.

use crate::types::*;
use serde_json::Value;

/// Coerce a result into a record id, if it holds one
pub fn record_id(value: &Value) -> Option<RecordId> {
    match value {
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

/// Coerce a search result into a list of ids
///
/// Accepts a JSON array of integers, a bare integer (one hit), and the
/// `false`/`null` empty-set shape older servers produce.
pub fn id_list(value: Value) -> ErpResult<Vec<RecordId>> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| {
                record_id(item).ok_or_else(|| {
                    ErpError::simple_parse_error(format!("Expected a record id, got {}", item))
                })
            })
            .collect(),
        Value::Number(_) => Ok(vec![record_id(&value).ok_or_else(|| {
            ErpError::simple_parse_error(format!("Expected a record id, got {}", value))
        })?]),
        Value::Bool(false) | Value::Null => Ok(Vec::new()),
        other => Err(ErpError::simple_parse_error(format!(
            "Expected a list of record ids, got {}",
            other
        ))),
    }
}

/// True when a write-style call reported success
pub fn acknowledged(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64().map(|v| v != 0).unwrap_or(false),
        _ => false,
    }
}

/// Coerce a read result into a list of records
pub fn record_list(value: Value) -> ErpResult<Vec<Record>> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(map) => Ok(map),
                other => Err(ErpError::simple_parse_error(format!(
                    "Expected a record object, got {}",
                    other
                ))),
            })
            .collect(),
        // Some servers unwrap single-id reads
        Value::Object(map) => Ok(vec![map]),
        other => Err(ErpError::simple_parse_error(format!(
            "Expected a list of records, got {}",
            other
        ))),
    }
}

/// The first record of a read result, erroring on an empty one
pub fn single_record(value: Value) -> ErpResult<Record> {
    let mut records = record_list(value)?;
    if records.is_empty() {
        return Err(ErpError::simple_parse_error(
            "Expected a record but the read returned none",
        ));
    }
    Ok(records.swap_remove(0))
}

/// A search_count result
pub fn count(value: &Value) -> ErpResult<i64> {
    value.as_i64().ok_or_else(|| {
        ErpError::simple_parse_error(format!("Expected a count, got {}", value))
    })
}
