use std::cmp::Ordering;

use kestrel_common::datum::{compare_datums, Datum, OwnedRow};
use kestrel_common::error::{CursorError, KestrelResult};
use kestrel_common::types::DatabaseType;

use crate::context::OrderByItem;
use crate::cursor::{current_row, BoxedCursor, RowCursor};

pub(crate) fn compare_rows_by_columns(
    a: &OwnedRow,
    b: &OwnedRow,
    order_by: &[OrderByItem],
    nulls_first_ascending: bool,
) -> Ordering {
    for item in order_by {
        let null = Datum::Null;
        let va = a.get(item.column_index).unwrap_or(&null);
        let vb = b.get(item.column_index).unwrap_or(&null);
        let ord = compare_datums(va, vb, nulls_first_ascending);
        let ord = if item.ascending { ord } else { ord.reverse() };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// K-way merge of shard cursors that are each sorted by the same ORDER BY.
///
/// Buffers at most one row per shard. Nothing is read until the first
/// `next()`, which pulls one row from every shard. A failed upstream read
/// is retried on the following `next()`, so no shard drops out of the merge. Ties go to the lower
/// shard index, so equal keys keep shard order.
pub struct OrderByStreamMerger {
    cursors: Vec<Option<BoxedCursor>>,
    heads: Vec<Option<OwnedRow>>,
    order_by: Vec<OrderByItem>,
    nulls_first_ascending: bool,
    column_count: usize,
    /// Shards whose first row has been loaded.
    primed: usize,
    current: Option<usize>,
    /// Shard whose head was returned and still has to be advanced.
    pending: Option<usize>,
}

impl OrderByStreamMerger {
    pub fn new(cursors: Vec<BoxedCursor>, order_by: Vec<OrderByItem>, database_type: DatabaseType) -> Self {
        let column_count = cursors.first().map_or(0, |c| c.column_count());
        let heads = vec![None; cursors.len()];
        Self {
            cursors: cursors.into_iter().map(Some).collect(),
            heads,
            order_by,
            nulls_first_ascending: database_type.nulls_first_ascending(),
            column_count,
            primed: 0,
            current: None,
            pending: None,
        }
    }

    /// Advance shard `idx` and refresh its buffered head row. An exhausted
    /// shard cursor is dropped.
    fn refill(&mut self, idx: usize) -> KestrelResult<()> {
        let Some(cursor) = self.cursors[idx].as_mut() else {
            self.heads[idx] = None;
            return Ok(());
        };
        if cursor.next()? {
            self.heads[idx] = Some(current_row(&**cursor)?);
        } else {
            self.heads[idx] = None;
            self.cursors[idx] = None;
        }
        Ok(())
    }

    fn smallest_head(&self) -> Option<usize> {
        let mut best: Option<(usize, &OwnedRow)> = None;
        for (idx, head) in self.heads.iter().enumerate() {
            let Some(row) = head else { continue };
            best = match best {
                Some((_, best_row))
                    if compare_rows_by_columns(row, best_row, &self.order_by, self.nulls_first_ascending)
                        != Ordering::Less =>
                {
                    best
                }
                _ => Some((idx, row)),
            };
        }
        best.map(|(idx, _)| idx)
    }
}

impl RowCursor for OrderByStreamMerger {
    fn next(&mut self) -> KestrelResult<bool> {
        if let Some(idx) = self.current.take() {
            self.pending = Some(idx);
        }
        while self.primed < self.cursors.len() {
            let idx = self.primed;
            self.refill(idx)?;
            self.primed += 1;
        }
        if let Some(idx) = self.pending {
            self.refill(idx)?;
            self.pending = None;
        }
        self.current = self.smallest_head();
        Ok(self.current.is_some())
    }

    fn value(&self, column_index: usize) -> KestrelResult<Datum> {
        let row = self
            .current
            .and_then(|idx| self.heads[idx].as_ref())
            .ok_or(CursorError::NoCurrentRow)?;
        row.get(column_index).cloned().ok_or_else(|| {
            CursorError::ColumnOutOfBounds {
                index: column_index,
                column_count: row.len(),
            }
            .into()
        })
    }

    fn column_count(&self) -> usize {
        self.column_count
    }
}
