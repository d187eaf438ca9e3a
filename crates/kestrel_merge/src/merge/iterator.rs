use std::collections::VecDeque;

use kestrel_common::datum::Datum;
use kestrel_common::error::{CursorError, KestrelResult};

use crate::cursor::{BoxedCursor, RowCursor};

/// Concatenates shard cursors in shard order.
///
/// An exhausted shard cursor is dropped before the next one is advanced, so
/// its resources are released as early as possible.
pub struct IteratorStreamMerger {
    remaining: VecDeque<BoxedCursor>,
    column_count: usize,
    on_row: bool,
}

impl IteratorStreamMerger {
    pub fn new(cursors: Vec<BoxedCursor>) -> Self {
        let column_count = cursors.first().map_or(0, |c| c.column_count());
        Self {
            remaining: cursors.into(),
            column_count,
            on_row: false,
        }
    }
}

impl RowCursor for IteratorStreamMerger {
    fn next(&mut self) -> KestrelResult<bool> {
        while let Some(front) = self.remaining.front_mut() {
            if front.next()? {
                self.on_row = true;
                return Ok(true);
            }
            self.remaining.pop_front();
        }
        self.on_row = false;
        Ok(false)
    }

    fn value(&self, column_index: usize) -> KestrelResult<Datum> {
        match self.remaining.front() {
            Some(current) if self.on_row => current.value(column_index),
            _ => Err(CursorError::NoCurrentRow.into()),
        }
    }

    fn column_count(&self) -> usize {
        self.column_count
    }
}
