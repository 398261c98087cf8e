//! Explicit column declarations for the four output tables.
//!
//! Rows are checked against these before any write, so a record type that
//! drifts from its table fails the run instead of reshaping the table.

use chrono::DateTime;
use serde_json::{json, Map, Value};

use crate::error::WarehouseError;

/// Column added to every row at load time.
pub const LOAD_TIMESTAMP_COLUMN: &str = "load_timestamp";

/// BigQuery column types used by tubeload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Float,
    Timestamp,
}

impl FieldType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "STRING",
            FieldType::Integer => "INTEGER",
            FieldType::Float => "FLOAT",
            FieldType::Timestamp => "TIMESTAMP",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Integer => value.is_i64(),
            FieldType::Float => value.is_number(),
            FieldType::Timestamp => value
                .as_str()
                .is_some_and(|s| DateTime::parse_from_rfc3339(s).is_ok()),
        }
    }
}

/// One `REQUIRED` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub field_type: FieldType,
}

const fn field(name: &'static str, field_type: FieldType) -> FieldSpec {
    FieldSpec { name, field_type }
}

/// A destination table and its exact column set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub table: &'static str,
    pub fields: &'static [FieldSpec],
}

const CHANNEL_FIELDS: &[FieldSpec] = &[
    field("channel_id", FieldType::String),
    field("channel_name", FieldType::String),
    field("view_count", FieldType::Integer),
    field("subscriber_count", FieldType::Integer),
    field("video_count", FieldType::Integer),
    field("playlist_id", FieldType::String),
    field(LOAD_TIMESTAMP_COLUMN, FieldType::Timestamp),
];

const VIDEO_FIELDS: &[FieldSpec] = &[
    field("video_id", FieldType::String),
    field("title", FieldType::String),
    field("published_at", FieldType::Timestamp),
    field("duration_sec", FieldType::Float),
    field("view_count", FieldType::Integer),
    field("like_count", FieldType::Integer),
    field("comment_count", FieldType::Integer),
    field(LOAD_TIMESTAMP_COLUMN, FieldType::Timestamp),
];

const COMMENT_FIELDS: &[FieldSpec] = &[
    field("comment_id", FieldType::String),
    field("video_id", FieldType::String),
    field("channel_id", FieldType::String),
    field("published_at", FieldType::Timestamp),
    field("text_display", FieldType::String),
    field("author_name", FieldType::String),
    field("like_count", FieldType::Integer),
    field("sentiment", FieldType::String),
    field("sentiment_score", FieldType::Float),
    field("question_category", FieldType::String),
    field("question_score", FieldType::Float),
    field(LOAD_TIMESTAMP_COLUMN, FieldType::Timestamp),
];

pub const CHANNEL_INFO: TableSchema = TableSchema {
    table: "channel_info",
    fields: CHANNEL_FIELDS,
};

pub const VIDEO_DETAILS: TableSchema = TableSchema {
    table: "video_details",
    fields: VIDEO_FIELDS,
};

pub const LATEST_VIDEO_DETAILS: TableSchema = TableSchema {
    table: "latest_video_details",
    fields: VIDEO_FIELDS,
};

pub const COMMENT_DETAILS: TableSchema = TableSchema {
    table: "comment_details",
    fields: COMMENT_FIELDS,
};

impl TableSchema {
    /// The `schema` object of a BigQuery load configuration.
    #[must_use]
    pub fn to_bigquery_json(&self) -> Value {
        let fields: Vec<Value> = self
            .fields
            .iter()
            .map(|f| {
                json!({
                    "name": f.name,
                    "type": f.field_type.as_str(),
                    "mode": "REQUIRED",
                })
            })
            .collect();
        json!({ "fields": fields })
    }

    /// Check that every row has exactly the declared columns, each holding a
    /// value of the declared type.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError::SchemaMismatch`] naming the first offending
    /// row and column.
    pub fn validate(&self, rows: &[Map<String, Value>]) -> Result<(), WarehouseError> {
        for (idx, row) in rows.iter().enumerate() {
            let mismatch = |reason: String| WarehouseError::SchemaMismatch {
                table: self.table.to_string(),
                row: idx,
                reason,
            };

            for spec in self.fields {
                match row.get(spec.name) {
                    None => return Err(mismatch(format!("missing column {}", spec.name))),
                    Some(Value::Null) => {
                        return Err(mismatch(format!("null in REQUIRED column {}", spec.name)));
                    }
                    Some(value) if !spec.field_type.accepts(value) => {
                        return Err(mismatch(format!(
                            "column {} expects {}, got {value}",
                            spec.name,
                            spec.field_type.as_str()
                        )));
                    }
                    Some(_) => {}
                }
            }

            if let Some(extra) = row
                .keys()
                .find(|k| !self.fields.iter().any(|f| f.name == k.as_str()))
            {
                return Err(mismatch(format!("undeclared column {extra}")));
            }
        }
        Ok(())
    }
}
