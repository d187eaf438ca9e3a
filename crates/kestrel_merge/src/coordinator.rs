//! Merge coordinator: turns per-shard cursors into the single result cursor
//! returned to the client.
//!
//! 1. **Merge**: the first merge-capable rule in registry order collapses all
//!    shard cursors into one. Later merge-capable rules are ignored.
//! 2. **Decorate**: every decorate-capable rule, in registry order, wraps the
//!    current cursor. The last registered decorator ends up outermost.
//! 3. **Fallback**: when nothing applied, a transparent cursor over the only
//!    shard result is returned.
//!
//! Assembly performs no I/O and reads no rows; all row traffic happens when
//! the returned cursor is advanced.

use std::sync::Arc;

use kestrel_common::config::{MergeConfig, MergeProperties};
use kestrel_common::error::{KestrelError, KestrelResult, MergeError};
use kestrel_common::schema::SchemaMetadata;
use kestrel_common::types::DatabaseType;

use crate::context::StatementContext;
use crate::cursor::{BoxedCursor, TransparentCursor};
use crate::registry::RuleRegistry;

/// Cursor state between the merge and decoration phases.
enum BaseCursor {
    /// Produced by a merge strategy.
    Merged(BoxedCursor),
    /// The single shard cursor, no merge applied.
    BaseOnly(BoxedCursor),
}

pub struct MergeCoordinator {
    database_type: DatabaseType,
    schema: Arc<SchemaMetadata>,
    properties: MergeProperties,
    registry: RuleRegistry,
}

impl MergeCoordinator {
    pub fn new(
        database_type: DatabaseType,
        schema: Arc<SchemaMetadata>,
        properties: MergeProperties,
        registry: RuleRegistry,
    ) -> Self {
        Self {
            database_type,
            schema,
            properties,
            registry,
        }
    }

    /// Build from a loaded config. Validates the registry against
    /// `strict_merge_rules` up front.
    pub fn from_config(
        config: &MergeConfig,
        schema: Arc<SchemaMetadata>,
        registry: RuleRegistry,
    ) -> KestrelResult<Self> {
        config.validate()?;
        registry.validate(config.properties.strict_merge_rules)?;
        Ok(Self::new(
            config.database_type,
            schema,
            config.properties.clone(),
            registry,
        ))
    }

    pub fn database_type(&self) -> DatabaseType {
        self.database_type
    }

    pub fn properties(&self) -> &MergeProperties {
        &self.properties
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Assemble the result cursor for one executed statement.
    ///
    /// `cursors` holds one cursor per shard, in routing order, and must not be
    /// empty. Errors from providers, strategies and decorators are returned
    /// unchanged.
    pub fn assemble(&self, cursors: Vec<BoxedCursor>, ctx: &StatementContext) -> KestrelResult<BoxedCursor> {
        let shard_count = cursors.len();
        if shard_count == 0 {
            let err = KestrelError::internal_bug(
                "E-MERGE-001",
                "assemble called without shard cursors",
                format!("tables={:?}", ctx.tables),
            );
            err.log_if_fatal();
            return Err(err);
        }
        if shard_count > self.properties.max_shard_cursors {
            return Err(MergeError::TooManyShards {
                shard_count,
                limit: self.properties.max_shard_cursors,
            }
            .into());
        }

        let mut applied: Vec<&str> = Vec::new();
        let base = self.merge(cursors, ctx, &mut applied)?;
        let merged = matches!(base, BaseCursor::Merged(_));
        let (result, decorated) = self.decorate(base, ctx, &mut applied)?;

        let result = if !merged && !decorated {
            Box::new(TransparentCursor::new(result)) as BoxedCursor
        } else {
            result
        };

        if self.properties.sql_show {
            tracing::info!(
                shards = shard_count,
                rules = ?applied,
                database_type = %self.database_type,
                "assembled result cursor"
            );
        } else {
            tracing::debug!(shards = shard_count, rules = ?applied, "assembled result cursor");
        }
        Ok(result)
    }

    fn merge<'a>(
        &'a self,
        mut cursors: Vec<BoxedCursor>,
        ctx: &StatementContext,
        applied: &mut Vec<&'a str>,
    ) -> KestrelResult<BaseCursor> {
        let mut candidates = self.registry.merge_candidates();
        let Some((rule, provider)) = candidates.next() else {
            if cursors.len() > 1 {
                return Err(MergeError::NoMergeRule {
                    shard_count: cursors.len(),
                }
                .into());
            }
            return Ok(BaseCursor::BaseOnly(cursors.swap_remove(0)));
        };

        let ignored: Vec<&str> = candidates.map(|(r, _)| r.id().as_str()).collect();
        if !ignored.is_empty() {
            if self.properties.strict_merge_rules {
                let mut rules = vec![rule.id().as_str().to_string()];
                rules.extend(ignored.iter().map(|r| r.to_string()));
                return Err(MergeError::MultipleMergeRules { rules }.into());
            }
            tracing::warn!(
                winner = rule.id().as_str(),
                ignored = ?ignored,
                "multiple merge-capable rules; only the first applies"
            );
        }

        let engine = provider
            .new_instance(self.database_type, rule.as_ref(), &self.properties, ctx)
            .inspect_err(|e| {
                tracing::debug!(rule = rule.id().as_str(), error = %e, "merge provider failed")
            })?;
        let merged = engine.merge(cursors, ctx, &self.schema)?;
        applied.push(rule.id().as_str());
        Ok(BaseCursor::Merged(merged))
    }

    /// Fold every decorator over the base cursor. Returns the resulting cursor
    /// and whether any decorator was applied.
    fn decorate<'a>(
        &'a self,
        base: BaseCursor,
        ctx: &StatementContext,
        applied: &mut Vec<&'a str>,
    ) -> KestrelResult<(BoxedCursor, bool)> {
        let mut current = match base {
            BaseCursor::Merged(cursor) | BaseCursor::BaseOnly(cursor) => cursor,
        };
        let mut decorated = false;
        for (rule, provider) in self.registry.decorator_candidates() {
            let decorator = provider
                .new_instance(self.database_type, rule.as_ref(), &self.properties, ctx)
                .inspect_err(|e| {
                    tracing::debug!(rule = rule.id().as_str(), error = %e, "decorator provider failed")
                })?;
            current = decorator.decorate(current, ctx, &self.schema)?;
            applied.push(rule.id().as_str());
            decorated = true;
        }
        Ok((current, decorated))
    }
}
