//! Projection of a raw result row into a column-name keyed map.
//!
//! The projector only needs the column names (in declared order) and a
//! by-name accessor that turns SQL NULL into `Value::Null`. Anything that
//! can provide those implements [`RowHandle`]; the Postgres row is one.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde_json::{Map, Value, json};
use sqlx::postgres::{PgRow, PgValueFormat};
use sqlx::{Column, Row, TypeInfo, ValueRef};
use uuid::Uuid;

use crate::repos::error::QueryResult;

/// One projected row. Keys keep the query's column order.
pub type ProjectedRow = Map<String, Value>;

pub trait RowHandle {
    /// Column names, 1..N in the query's declared order.
    fn column_names(&self) -> Vec<String>;

    /// Value of the named column; SQL NULL is `Value::Null`.
    fn value(&self, column: &str) -> QueryResult<Value>;
}

/// Map every column name to its (possibly null) value.
///
/// Duplicate column names collapse into one key; the last write wins and
/// the key keeps the position of its first occurrence.
pub fn project<R>(row: &R) -> QueryResult<ProjectedRow>
where
    R: RowHandle + ?Sized,
{
    row.column_names()
        .into_iter()
        .map(|name| {
            let value = row.value(&name)?;
            Ok((name, value))
        })
        .collect()
}

impl RowHandle for PgRow {
    fn column_names(&self) -> Vec<String> {
        self.columns().iter().map(|c| c.name().to_string()).collect()
    }

    fn value(&self, column: &str) -> QueryResult<Value> {
        let raw = self.try_get_raw(column)?;
        if raw.is_null() {
            return Ok(Value::Null);
        }
        let type_name = raw.type_info().name().to_string();

        let value = match type_name.as_str() {
            "BOOL" => Value::from(self.try_get::<bool, _>(column)?),
            "INT2" => Value::from(self.try_get::<i16, _>(column)?),
            "INT4" => Value::from(self.try_get::<i32, _>(column)?),
            "INT8" => Value::from(self.try_get::<i64, _>(column)?),
            "FLOAT4" => Value::from(self.try_get::<f32, _>(column)?),
            "FLOAT8" => Value::from(self.try_get::<f64, _>(column)?),
            // Kept as a string so no precision is lost.
            "NUMERIC" => Value::from(self.try_get::<Decimal, _>(column)?.to_string()),
            "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" | "CHAR" => {
                Value::from(self.try_get::<String, _>(column)?)
            }
            "BYTEA" => Value::from(bytea_hex(&self.try_get::<Vec<u8>, _>(column)?)),
            "JSON" | "JSONB" => self.try_get::<Value, _>(column)?,
            "UUID" => Value::from(self.try_get::<Uuid, _>(column)?.to_string()),
            "TIMESTAMPTZ" => Value::from(self.try_get::<DateTime<Utc>, _>(column)?.to_rfc3339()),
            "TIMESTAMP" => Value::from(self.try_get::<NaiveDateTime, _>(column)?.to_string()),
            "DATE" => Value::from(self.try_get::<NaiveDate, _>(column)?.to_string()),
            "TIME" => Value::from(self.try_get::<NaiveTime, _>(column)?.to_string()),
            "BOOL[]" => Value::from(self.try_get::<Vec<Option<bool>>, _>(column)?),
            "INT2[]" => Value::from(self.try_get::<Vec<Option<i16>>, _>(column)?),
            "INT4[]" => Value::from(self.try_get::<Vec<Option<i32>>, _>(column)?),
            "INT8[]" => Value::from(self.try_get::<Vec<Option<i64>>, _>(column)?),
            "FLOAT4[]" => Value::from(self.try_get::<Vec<Option<f32>>, _>(column)?),
            "FLOAT8[]" => Value::from(self.try_get::<Vec<Option<f64>>, _>(column)?),
            "TEXT[]" | "VARCHAR[]" | "BPCHAR[]" | "NAME[]" => {
                Value::from(self.try_get::<Vec<Option<String>>, _>(column)?)
            }
            "NUMERIC[]" => to_strings(self.try_get::<Vec<Option<Decimal>>, _>(column)?),
            "UUID[]" => to_strings(self.try_get::<Vec<Option<Uuid>>, _>(column)?),
            _ => undecoded(
                &type_name,
                raw.format(),
                raw.as_bytes().map_err(sqlx::Error::Decode)?,
            ),
        };

        Ok(value)
    }
}

// Same spelling as Postgres' own bytea output.
fn bytea_hex(bytes: &[u8]) -> String {
    format!("\\x{}", hex::encode(bytes))
}

fn to_strings<T: ToString>(items: Vec<Option<T>>) -> Value {
    Value::from(
        items
            .into_iter()
            .map(|item| item.map(|v| v.to_string()))
            .collect::<Vec<_>>(),
    )
}

/// Types without a dedicated mapping keep their wire value: text as is,
/// binary as hex tagged with the type name.
fn undecoded(type_name: &str, format: PgValueFormat, bytes: &[u8]) -> Value {
    match (format, std::str::from_utf8(bytes)) {
        (PgValueFormat::Text, Ok(text)) => Value::from(text),
        _ => json!({ "type": type_name, "hex": hex::encode(bytes) }),
    }
}
