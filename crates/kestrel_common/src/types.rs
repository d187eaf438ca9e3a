use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a shard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShardId(pub u64);

impl fmt::Display for ShardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shard:{}", self.0)
    }
}

/// SQL data types a result column can carry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Boolean,
    Int32,
    Int64,
    Float64,
    Text,
    Timestamp,
    Date,
    Bytea,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Boolean => write!(f, "BOOLEAN"),
            DataType::Int32 => write!(f, "INT"),
            DataType::Int64 => write!(f, "BIGINT"),
            DataType::Float64 => write!(f, "DOUBLE PRECISION"),
            DataType::Text => write!(f, "TEXT"),
            DataType::Timestamp => write!(f, "TIMESTAMP"),
            DataType::Date => write!(f, "DATE"),
            DataType::Bytea => write!(f, "BYTEA"),
        }
    }
}

/// Backend database dialect the shards speak.
///
/// The merge layer only cares about dialect differences that change how rows
/// from different shards compare, such as where NULL sorts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    #[default]
    MySql,
    PostgreSql,
    Oracle,
    SqlServer,
    H2,
}

impl DatabaseType {
    /// Whether NULL sorts before every non-NULL value under `ASC`.
    pub fn nulls_first_ascending(self) -> bool {
        match self {
            DatabaseType::MySql | DatabaseType::SqlServer | DatabaseType::H2 => true,
            DatabaseType::PostgreSql | DatabaseType::Oracle => false,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DatabaseType::MySql => "MySQL",
            DatabaseType::PostgreSql => "PostgreSQL",
            DatabaseType::Oracle => "Oracle",
            DatabaseType::SqlServer => "SQLServer",
            DatabaseType::H2 => "H2",
        }
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
