//! Shared building blocks for the Kestrel merge layer: column values, rows,
//! schema metadata, error types and configuration.

pub mod config;
pub mod datum;
pub mod error;
pub mod schema;
pub mod types;

pub use config::{MergeConfig, MergeProperties};
pub use datum::{Datum, OwnedRow};
pub use error::{ErrorKind, KestrelError, KestrelResult};
pub use schema::{ColumnMeta, SchemaMetadata, TableMeta};
pub use types::{DataType, DatabaseType, ShardId};
