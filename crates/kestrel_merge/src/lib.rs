//! Result assembly for sharded statement execution.
//!
//! After a statement ran on several shards, [`MergeCoordinator::assemble`]
//! folds the per-shard cursors into one logical cursor: at most one merge
//! strategy collapses the shard streams, then every registered decorator wraps
//! the result in registry order. All transforms are lazy and pull one row at a
//! time from upstream.

pub mod context;
pub mod coordinator;
pub mod cursor;
pub mod decorate;
pub mod engine;
pub mod merge;
pub mod registry;
pub mod rule;

pub use context::{OrderByItem, Pagination, Projection, StatementContext};
pub use coordinator::MergeCoordinator;
pub use cursor::{collect_rows, current_row, BoxedCursor, MemoryCursor, RowCursor, TransparentCursor};
pub use decorate::{Base64Encryptor, EncryptDecorator, EncryptDecoratorProvider, Encryptor};
pub use engine::{DecoratorProvider, MergeEngine, MergeEngineProvider, ResultDecorator};
pub use merge::{
    IteratorStreamMerger, LimitCursor, OrderByStreamMerger, ShardingMergeEngine, ShardingMergeProvider,
};
pub use registry::{Capability, RegistryEntry, RuleRegistry};
pub use rule::{
    downcast_rule, EncryptColumn, EncryptRule, ReadWriteSplittingRule, Rule, RuleId, RuleKind,
    ShadowRule, ShardingRule,
};
