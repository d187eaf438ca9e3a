//! Capability contracts a rule can contribute to result assembly.

use kestrel_common::config::MergeProperties;
use kestrel_common::error::KestrelResult;
use kestrel_common::schema::SchemaMetadata;
use kestrel_common::types::DatabaseType;

use crate::context::StatementContext;
use crate::cursor::BoxedCursor;
use crate::rule::Rule;

/// Combines many shard cursors into one.
pub trait MergeEngine {
    fn merge(
        &self,
        cursors: Vec<BoxedCursor>,
        ctx: &StatementContext,
        schema: &SchemaMetadata,
    ) -> KestrelResult<BoxedCursor>;
}

/// Wraps one cursor with decorated behaviour.
pub trait ResultDecorator {
    fn decorate(
        &self,
        cursor: BoxedCursor,
        ctx: &StatementContext,
        schema: &SchemaMetadata,
    ) -> KestrelResult<BoxedCursor>;
}

/// Builds a [`MergeEngine`] for one statement. Fails when the statement
/// shape is not supported by the strategy.
pub trait MergeEngineProvider: Send + Sync {
    fn new_instance(
        &self,
        database_type: DatabaseType,
        rule: &dyn Rule,
        properties: &MergeProperties,
        ctx: &StatementContext,
    ) -> KestrelResult<Box<dyn MergeEngine>>;
}

/// Builds a [`ResultDecorator`] for one statement.
pub trait DecoratorProvider: Send + Sync {
    fn new_instance(
        &self,
        database_type: DatabaseType,
        rule: &dyn Rule,
        properties: &MergeProperties,
        ctx: &StatementContext,
    ) -> KestrelResult<Box<dyn ResultDecorator>>;
}
