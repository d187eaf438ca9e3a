//! Built-in merge strategies. All of them stream: rows are pulled from shard
//! cursors only while the merged cursor is being advanced.
//!
//! - **Iterator**: concatenation in shard order
//! - **OrderBy**: k-way merge of individually sorted shard streams
//! - **Pagination**: global OFFSET + LIMIT over the merged stream

pub mod iterator;
pub mod order_by;
pub mod pagination;
pub mod sharding;

pub use iterator::IteratorStreamMerger;
pub use order_by::OrderByStreamMerger;
pub use pagination::LimitCursor;
pub use sharding::{ShardingMergeEngine, ShardingMergeProvider};
