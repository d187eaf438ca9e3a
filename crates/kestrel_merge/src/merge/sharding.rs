use kestrel_common::config::MergeProperties;
use kestrel_common::error::{KestrelError, KestrelResult, MergeError};
use kestrel_common::schema::SchemaMetadata;
use kestrel_common::types::DatabaseType;

use crate::context::StatementContext;
use crate::cursor::BoxedCursor;
use crate::engine::{MergeEngine, MergeEngineProvider};
use crate::merge::iterator::IteratorStreamMerger;
use crate::merge::order_by::OrderByStreamMerger;
use crate::merge::pagination::LimitCursor;
use crate::rule::{downcast_rule, Rule, ShardingRule};

/// Merge provider registered with a [`ShardingRule`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ShardingMergeProvider;

impl MergeEngineProvider for ShardingMergeProvider {
    fn new_instance(
        &self,
        database_type: DatabaseType,
        rule: &dyn Rule,
        _properties: &MergeProperties,
        ctx: &StatementContext,
    ) -> KestrelResult<Box<dyn MergeEngine>> {
        let sharding = downcast_rule::<ShardingRule>(rule).ok_or_else(|| {
            KestrelError::internal_bug(
                "E-MERGE-002",
                "sharding merge provider registered with a non-sharding rule",
                format!("rule={} kind={:?}", rule.id(), rule.kind()),
            )
        })?;

        if ctx.has_aggregation() {
            return Err(MergeError::UnsupportedStatement(
                "GROUP BY / aggregate projections cannot be stream-merged".into(),
            )
            .into());
        }
        if ctx.distinct {
            return Err(MergeError::UnsupportedStatement("DISTINCT cannot be stream-merged".into()).into());
        }
        if !ctx.projections.is_empty() {
            if let Some(item) = ctx
                .order_by
                .iter()
                .find(|item| item.column_index >= ctx.projections.len())
            {
                return Err(MergeError::ColumnOutOfBounds {
                    index: item.column_index,
                    column_count: ctx.projections.len(),
                }
                .into());
            }
        }

        let broadcast_only =
            !ctx.tables.is_empty() && ctx.tables.iter().all(|t| sharding.is_broadcast_table(t));

        Ok(Box::new(ShardingMergeEngine {
            database_type,
            broadcast_only,
        }))
    }
}

/// Stream merge for sharded SELECTs: ordered k-way merge when the statement
/// has ORDER BY, plain concatenation otherwise, then global pagination.
#[derive(Debug)]
pub struct ShardingMergeEngine {
    database_type: DatabaseType,
    /// Every table is replicated, so any single shard holds the full answer.
    broadcast_only: bool,
}

impl MergeEngine for ShardingMergeEngine {
    fn merge(
        &self,
        mut cursors: Vec<BoxedCursor>,
        ctx: &StatementContext,
        _schema: &SchemaMetadata,
    ) -> KestrelResult<BoxedCursor> {
        if self.broadcast_only {
            cursors.truncate(1);
        }
        // Single-shard statements are not rewritten, so the shard already
        // applied ORDER BY and LIMIT itself.
        if cursors.len() == 1 {
            tracing::debug!(broadcast = self.broadcast_only, "single shard result, iterator merge");
            return Ok(Box::new(IteratorStreamMerger::new(cursors)));
        }

        let merged: BoxedCursor = if ctx.order_by.is_empty() {
            tracing::debug!(shards = cursors.len(), "iterator stream merge");
            Box::new(IteratorStreamMerger::new(cursors))
        } else {
            tracing::debug!(
                shards = cursors.len(),
                order_by = ctx.order_by.len(),
                database_type = %self.database_type,
                "order-by stream merge"
            );
            Box::new(OrderByStreamMerger::new(
                cursors,
                ctx.order_by.clone(),
                self.database_type,
            ))
        };

        Ok(match ctx.pagination {
            Some(pagination) => Box::new(LimitCursor::new(merged, pagination)),
            None => merged,
        })
    }
}
