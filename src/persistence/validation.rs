//! The validation engine.
//!
//! Turns a candidate value mapping into a complete [`Record`] for a given
//! [`Schema`]. Columns are resolved one at a time in schema order:
//!
//! 1. auto-increment columns take a store-computed value,
//! 2. supplied values must match the column type,
//! 3. unique columns must not collide with another row,
//! 4. absent values resolve through required, nullable and default, and
//!    present values run through the column validator.
//!
//! The first failure aborts the whole resolution. Nothing here touches a
//! table; callers only write the returned record.

use indexmap::IndexMap;
use serde_json::{Map, Number, Value};

use super::row::Record;
use super::schema::{ColumnDefinition, DataType, Schema, json_type_name};
use crate::error::{StoreError, StoreResult};

/// Why a record is being resolved, which decides where auto-increment values
/// come from and which row is exempt from the uniqueness scan.
pub(crate) enum Resolution<'a> {
    /// A fresh row; auto-increment columns take `next_id`.
    Insert { next_id: u64 },
    /// A merged row replacing `rows[position]`, which keeps its own
    /// auto-increment values.
    Update { current: &'a Record, position: usize },
}

pub(crate) fn validate(
    schema: &Schema,
    candidate: &Map<String, Value>,
    rows: &[Record],
    resolution: &Resolution<'_>,
) -> StoreResult<Record> {
    let mut record = IndexMap::with_capacity(schema.len());

    for column in schema.columns() {
        let value = resolve_column(column, candidate, rows, resolution)?;
        record.insert(column.name.clone(), value);
    }

    Ok(Record(record))
}

pub(crate) fn as_candidate(data: &Value) -> StoreResult<&Map<String, Value>> {
    //! Only JSON objects can describe a row.

    data.as_object().ok_or_else(|| StoreError::TypeMismatch {
        column: "$root".to_string(),
        expected: "object",
        actual: json_type_name(data),
    })
}

fn resolve_column(
    column: &ColumnDefinition,
    candidate: &Map<String, Value>,
    rows: &[Record],
    resolution: &Resolution<'_>,
) -> StoreResult<Value> {
    if column.auto_increment {
        return Ok(match resolution {
            Resolution::Insert { next_id } => Value::from(*next_id),
            Resolution::Update { current, .. } => {
                current.get(&column.name).cloned().unwrap_or(Value::Null)
            }
        });
    }

    // explicit null is treated as absent
    let supplied = candidate.get(&column.name).filter(|value| !value.is_null());

    if let Some(value) = supplied {
        check_type(column, value)?;
        if column.unique {
            check_unique(column, value, rows, resolution)?;
        }
    }

    match supplied {
        None if column.required => Err(StoreError::RequiredField(column.name.clone())),
        None if column.nullable => Ok(Value::Null),
        None => Ok(column.default.clone()),
        Some(value) => {
            if let Some(validate_func) = &column.validate_func {
                if !validate_func(value) {
                    return Err(StoreError::ValidationFunction {
                        column: column.name.clone(),
                        value: value.clone(),
                    });
                }
            }
            Ok(value.clone())
        }
    }
}

fn check_type(column: &ColumnDefinition, value: &Value) -> StoreResult<()> {
    if column.datatype.matches(value) {
        Ok(())
    } else {
        Err(StoreError::TypeMismatch {
            column: column.name.clone(),
            expected: column.datatype.name(),
            actual: json_type_name(value),
        })
    }
}

fn check_unique(
    column: &ColumnDefinition,
    value: &Value,
    rows: &[Record],
    resolution: &Resolution<'_>,
) -> StoreResult<()> {
    let exempt = match resolution {
        Resolution::Update { position, .. } => Some(*position),
        Resolution::Insert { .. } => None,
    };

    let collides = rows
        .iter()
        .enumerate()
        .filter(|(index, _)| Some(*index) != exempt)
        .any(|(_, row)| values_equal(column.datatype, row.get(&column.name), value));

    if collides {
        Err(StoreError::UniqueConstraintViolation {
            column: column.name.clone(),
            value: value.clone(),
        })
    } else {
        Ok(())
    }
}

fn values_equal(datatype: DataType, existing: Option<&Value>, candidate: &Value) -> bool {
    match (datatype, existing) {
        (DataType::Number, Some(Value::Number(existing))) => match candidate {
            Value::Number(candidate) => numbers_equal(existing, candidate),
            _ => false,
        },
        (_, Some(existing)) => existing == candidate,
        (_, None) => false,
    }
}

fn numbers_equal(existing: &Number, candidate: &Number) -> bool {
    // integers compare exactly; only a float on either side goes through f64,
    // so 1 and 1.0 are the same number
    if let (Some(existing), Some(candidate)) = (existing.as_i64(), candidate.as_i64()) {
        return existing == candidate;
    }
    if let (Some(existing), Some(candidate)) = (existing.as_u64(), candidate.as_u64()) {
        return existing == candidate;
    }
    if existing.is_f64() || candidate.is_f64() {
        return existing.as_f64() == candidate.as_f64();
    }
    false
}
