//! Table loading: stamping, validation and the sink seam.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::WarehouseError;
use crate::schema::{TableSchema, LOAD_TIMESTAMP_COLUMN};

/// One serialized row, keyed by column name.
pub type Row = Map<String, Value>;

/// How a load treats rows already in the destination table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Keep existing rows and add these.
    Append,
    /// Replace the table's contents with these rows.
    Replace,
}

impl WriteMode {
    #[must_use]
    pub fn write_disposition(self) -> &'static str {
        match self {
            WriteMode::Append => "WRITE_APPEND",
            WriteMode::Replace => "WRITE_TRUNCATE",
        }
    }
}

impl std::fmt::Display for WriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteMode::Append => write!(f, "append"),
            WriteMode::Replace => write!(f, "replace"),
        }
    }
}

/// Destination for validated, stamped rows.
#[allow(async_fn_in_trait)]
pub trait WarehouseSink {
    /// Write `rows` into `schema.table` with the given mode.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError`] if the write is rejected or cannot be
    /// confirmed.
    async fn write_table(
        &self,
        schema: &TableSchema,
        rows: &[Row],
        mode: WriteMode,
    ) -> Result<(), WarehouseError>;
}

/// Serialize `records` and add `load_timestamp` to each row.
///
/// The timestamp is written as RFC 3339 with microsecond precision, the
/// finest BigQuery `TIMESTAMP` keeps.
///
/// # Errors
///
/// Returns [`WarehouseError::Serialize`] if a record fails to serialize, or
/// [`WarehouseError::SchemaMismatch`] if it does not serialize to an object.
pub fn stamp_rows<T: Serialize>(
    table: &str,
    records: &[T],
    load_timestamp: DateTime<Utc>,
) -> Result<Vec<Row>, WarehouseError> {
    let stamp = Value::String(load_timestamp.to_rfc3339_opts(SecondsFormat::Micros, true));

    records
        .iter()
        .enumerate()
        .map(|(idx, record)| match serde_json::to_value(record)? {
            Value::Object(mut row) => {
                row.insert(LOAD_TIMESTAMP_COLUMN.to_string(), stamp.clone());
                Ok(row)
            }
            other => Err(WarehouseError::SchemaMismatch {
                table: table.to_string(),
                row: idx,
                reason: format!("record serialized to {other}, not an object"),
            }),
        })
        .collect()
}

/// Stamp, validate and write one table.
///
/// `load_timestamp` is captured once, so every row of this load shares it.
/// Nothing is written if any row fails validation. Returns the row count.
///
/// # Errors
///
/// Any stamping, validation or sink error.
pub async fn load_table<S, T>(
    sink: &S,
    schema: &TableSchema,
    records: &[T],
    mode: WriteMode,
) -> Result<usize, WarehouseError>
where
    S: WarehouseSink,
    T: Serialize,
{
    let load_timestamp = Utc::now().trunc_subsecs(6);
    let rows = stamp_rows(schema.table, records, load_timestamp)?;
    schema.validate(&rows)?;

    if rows.is_empty() {
        tracing::warn!(table = schema.table, %mode, "loading an empty table");
    }

    sink.write_table(schema, &rows, mode).await?;
    tracing::info!(table = schema.table, rows = rows.len(), %mode, "table loaded");
    Ok(rows.len())
}

/// Sink that validates upstream and discards the rows.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunSink;

impl WarehouseSink for DryRunSink {
    async fn write_table(
        &self,
        schema: &TableSchema,
        rows: &[Row],
        mode: WriteMode,
    ) -> Result<(), WarehouseError> {
        tracing::info!(
            table = schema.table,
            rows = rows.len(),
            %mode,
            "dry run: skipping warehouse write"
        );
        Ok(())
    }
}
