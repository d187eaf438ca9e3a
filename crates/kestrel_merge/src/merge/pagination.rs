use kestrel_common::datum::Datum;
use kestrel_common::error::{CursorError, KestrelResult};

use crate::context::Pagination;
use crate::cursor::{BoxedCursor, RowCursor};

/// Applies the statement's global OFFSET/LIMIT on top of a merged stream.
///
/// Shards each return up to `offset + row_count` rows; the skip happens here,
/// lazily on the first `next()` and resumes where it stopped if an upstream
/// read fails. Once `row_count` rows have been yielded the upstream cursor is
/// not advanced again.
pub struct LimitCursor {
    inner: BoxedCursor,
    offset: usize,
    row_count: Option<usize>,
    skipped: usize,
    yielded: usize,
    on_row: bool,
}

impl LimitCursor {
    pub fn new(inner: BoxedCursor, pagination: Pagination) -> Self {
        Self {
            inner,
            offset: pagination.offset,
            row_count: pagination.row_count,
            skipped: 0,
            yielded: 0,
            on_row: false,
        }
    }
}

impl RowCursor for LimitCursor {
    fn next(&mut self) -> KestrelResult<bool> {
        self.on_row = false;
        while self.skipped < self.offset {
            if !self.inner.next()? {
                self.skipped = self.offset;
                return Ok(false);
            }
            self.skipped += 1;
        }
        if self.row_count.is_some_and(|limit| self.yielded >= limit) {
            return Ok(false);
        }
        self.on_row = self.inner.next()?;
        if self.on_row {
            self.yielded += 1;
        }
        Ok(self.on_row)
    }

    fn value(&self, column_index: usize) -> KestrelResult<Datum> {
        if !self.on_row {
            return Err(CursorError::NoCurrentRow.into());
        }
        self.inner.value(column_index)
    }

    fn column_count(&self) -> usize {
        self.inner.column_count()
    }
}
