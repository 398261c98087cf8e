//! Load layer for tubeload.
//!
//! Declares the four output table schemas, stamps and validates rows, and
//! writes them to BigQuery through load jobs authenticated with a Google
//! service account.

pub mod bigquery;
pub mod credentials;
pub mod error;
pub mod load;
pub mod schema;

pub use bigquery::BigQuerySink;
pub use credentials::{ServiceAccountAuth, ServiceAccountKey, BIGQUERY_SCOPE};
pub use error::WarehouseError;
pub use load::{load_table, stamp_rows, DryRunSink, Row, WarehouseSink, WriteMode};
pub use schema::{
    FieldSpec, FieldType, TableSchema, CHANNEL_INFO, COMMENT_DETAILS, LATEST_VIDEO_DETAILS,
    LOAD_TIMESTAMP_COLUMN, VIDEO_DETAILS,
};
