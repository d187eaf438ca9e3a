//! Row cursor contract and the two cursors the coordinator itself needs:
//! an in-memory shard result and the pass-through fallback.

use kestrel_common::datum::{Datum, OwnedRow};
use kestrel_common::error::{CursorError, KestrelResult};
use kestrel_common::types::ShardId;

/// Forward-only, single-pass handle over result rows.
///
/// `value` is only valid after `next` returned `true`. A cursor owns whatever
/// it reads from; dropping it releases the upstream chain.
pub trait RowCursor: Send {
    /// Advance to the next row. Returns `false` at end of stream.
    fn next(&mut self) -> KestrelResult<bool>;

    /// Read a column of the current row (0-based).
    fn value(&self, column_index: usize) -> KestrelResult<Datum>;

    fn column_count(&self) -> usize;
}

pub type BoxedCursor = Box<dyn RowCursor>;

impl<C: RowCursor + ?Sized> RowCursor for Box<C> {
    fn next(&mut self) -> KestrelResult<bool> {
        (**self).next()
    }

    fn value(&self, column_index: usize) -> KestrelResult<Datum> {
        (**self).value(column_index)
    }

    fn column_count(&self) -> usize {
        (**self).column_count()
    }
}

/// Read every column of the current row.
pub fn current_row(cursor: &dyn RowCursor) -> KestrelResult<OwnedRow> {
    let values = (0..cursor.column_count())
        .map(|i| cursor.value(i))
        .collect::<KestrelResult<Vec<_>>>()?;
    Ok(OwnedRow::new(values))
}

/// Drain a cursor into memory.
pub fn collect_rows(mut cursor: impl RowCursor) -> KestrelResult<Vec<OwnedRow>> {
    let mut rows = Vec::new();
    while cursor.next()? {
        rows.push(current_row(&cursor)?);
    }
    Ok(rows)
}

/// A shard result already materialized by in-process execution.
#[derive(Debug, Clone)]
pub struct MemoryCursor {
    shard_id: ShardId,
    column_count: usize,
    rows: Vec<OwnedRow>,
    /// Index of the next row to yield; the current row is `pos - 1`.
    pos: usize,
}

impl MemoryCursor {
    pub fn new(shard_id: ShardId, column_count: usize, rows: Vec<OwnedRow>) -> Self {
        Self {
            shard_id,
            column_count,
            rows,
            pos: 0,
        }
    }

    /// Infer the column count from the first row (0 when empty).
    pub fn from_rows(shard_id: ShardId, rows: Vec<OwnedRow>) -> Self {
        let column_count = rows.first().map_or(0, OwnedRow::len);
        Self::new(shard_id, column_count, rows)
    }

    pub fn shard_id(&self) -> ShardId {
        self.shard_id
    }

    pub fn boxed(self) -> BoxedCursor {
        Box::new(self)
    }

    fn current(&self) -> Result<&OwnedRow, CursorError> {
        match self.pos.checked_sub(1) {
            Some(idx) if idx < self.rows.len() => Ok(&self.rows[idx]),
            _ => Err(CursorError::NoCurrentRow),
        }
    }
}

impl RowCursor for MemoryCursor {
    fn next(&mut self) -> KestrelResult<bool> {
        if self.pos < self.rows.len() {
            self.pos += 1;
            Ok(true)
        } else {
            // Park past the end so value() reports NoCurrentRow.
            self.pos = self.rows.len() + 1;
            Ok(false)
        }
    }

    fn value(&self, column_index: usize) -> KestrelResult<Datum> {
        let row = self.current()?;
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

/// Pass-through over a single shard cursor. Returned when no rule applies.
pub struct TransparentCursor {
    inner: BoxedCursor,
}

impl TransparentCursor {
    pub fn new(inner: BoxedCursor) -> Self {
        Self { inner }
    }
}

impl RowCursor for TransparentCursor {
    fn next(&mut self) -> KestrelResult<bool> {
        self.inner.next()
    }

    fn value(&self, column_index: usize) -> KestrelResult<Datum> {
        self.inner.value(column_index)
    }

    fn column_count(&self) -> usize {
        self.inner.column_count()
    }
}
