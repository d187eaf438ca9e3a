//! Read-only description of the statement whose results are being merged.

use kestrel_common::types::DataType;

/// One projected column of the statement's result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    /// Column name or alias as the client sees it.
    pub name: String,
    pub data_type: Option<DataType>,
    /// Set when the projection is an aggregate (COUNT, SUM, ...).
    pub aggregate: bool,
}

impl Projection {
    pub fn column(name: &str) -> Self {
        Self {
            name: name.to_string(),
            data_type: None,
            aggregate: false,
        }
    }

    pub fn typed(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_string(),
            data_type: Some(data_type),
            aggregate: false,
        }
    }

    pub fn aggregate(name: &str) -> Self {
        Self {
            name: name.to_string(),
            data_type: None,
            aggregate: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderByItem {
    /// Index into the projection list.
    pub column_index: usize,
    pub ascending: bool,
}

impl OrderByItem {
    pub fn asc(column_index: usize) -> Self {
        Self {
            column_index,
            ascending: true,
        }
    }

    pub fn desc(column_index: usize) -> Self {
        Self {
            column_index,
            ascending: false,
        }
    }
}

/// LIMIT / OFFSET of the original statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pagination {
    pub offset: usize,
    /// `None` means no LIMIT clause.
    pub row_count: Option<usize>,
}

/// Statement context handed to merge strategies and decorators.
///
/// Built by the SQL layer before routing; the coordinator never inspects it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementContext {
    pub tables: Vec<String>,
    pub projections: Vec<Projection>,
    pub order_by: Vec<OrderByItem>,
    pub group_by: Vec<usize>,
    pub distinct: bool,
    pub pagination: Option<Pagination>,
}

impl StatementContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: &str) -> Self {
        self.tables.push(table.to_string());
        self
    }

    pub fn with_projections(mut self, projections: Vec<Projection>) -> Self {
        self.projections = projections;
        self
    }

    pub fn with_order_by(mut self, items: Vec<OrderByItem>) -> Self {
        self.order_by = items;
        self
    }

    pub fn with_group_by(mut self, indices: Vec<usize>) -> Self {
        self.group_by = indices;
        self
    }

    pub fn with_distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    pub fn with_pagination(mut self, offset: usize, row_count: Option<usize>) -> Self {
        self.pagination = Some(Pagination { offset, row_count });
        self
    }

    pub fn has_aggregation(&self) -> bool {
        !self.group_by.is_empty() || self.projections.iter().any(|p| p.aggregate)
    }

    /// Index of a projection by name, case-insensitive.
    pub fn projection_index(&self, name: &str) -> Option<usize> {
        self.projections
            .iter()
            .position(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// The single table the statement reads, if there is exactly one.
    pub fn single_table(&self) -> Option<&str> {
        match self.tables.as_slice() {
            [only] => Some(only.as_str()),
            _ => None,
        }
    }
}
