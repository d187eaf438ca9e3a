use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::DataType;

/// Column metadata as seen by the merge layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub name: String,
    pub data_type: DataType,
    #[serde(default)]
    pub nullable: bool,
}

impl ColumnMeta {
    pub fn new(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            nullable: true,
        }
    }
}

/// Logical table metadata. Column order follows the table definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMeta {
    pub name: String,
    pub columns: Vec<ColumnMeta>,
}

impl TableMeta {
    pub fn new(name: &str, columns: Vec<ColumnMeta>) -> Self {
        Self {
            name: name.to_string(),
            columns,
        }
    }

    /// Case-insensitive column lookup.
    pub fn column(&self, name: &str) -> Option<&ColumnMeta> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

/// Schema metadata handed to merge strategies and decorators.
///
/// Table names are stored lowercased; lookups are case-insensitive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaMetadata {
    tables: HashMap<String, TableMeta>,
}

impl SchemaMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: TableMeta) -> Self {
        self.add_table(table);
        self
    }

    pub fn add_table(&mut self, table: TableMeta) {
        self.tables.insert(table.name.to_ascii_lowercase(), table);
    }

    pub fn table(&self, name: &str) -> Option<&TableMeta> {
        self.tables.get(&name.to_ascii_lowercase())
    }

    pub fn column(&self, table: &str, column: &str) -> Option<&ColumnMeta> {
        self.table(table).and_then(|t| t.column(column))
    }

    pub fn contains_table(&self, name: &str) -> bool {
        self.table(name).is_some()
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let schema = SchemaMetadata::new().with_table(TableMeta::new(
            "T_Order",
            vec![
                ColumnMeta::new("order_id", DataType::Int64),
                ColumnMeta::new("Status", DataType::Text),
            ],
        ));
        assert!(schema.contains_table("t_order"));
        assert_eq!(
            schema.column("T_ORDER", "status").map(|c| &c.data_type),
            Some(&DataType::Text)
        );
        assert!(schema.column("t_order", "missing").is_none());
        assert_eq!(schema.table_count(), 1);
    }
}
