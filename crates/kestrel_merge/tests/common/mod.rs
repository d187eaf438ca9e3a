#![allow(dead_code, unused_imports)]

pub use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
pub use std::sync::{Arc, Mutex};

pub use kestrel_common::config::MergeProperties;
pub use kestrel_common::datum::{Datum, OwnedRow};
pub use kestrel_common::error::{KestrelError, KestrelResult};
pub use kestrel_common::schema::SchemaMetadata;
pub use kestrel_common::types::{DatabaseType, ShardId};
pub use kestrel_merge::{
    collect_rows, BoxedCursor, Capability, DecoratorProvider, IteratorStreamMerger, MemoryCursor,
    MergeCoordinator, MergeEngine, MergeEngineProvider, Projection, ResultDecorator, RowCursor,
    Rule, RuleId, RuleKind, RuleRegistry, StatementContext,
};

use std::any::Any;

/// Rule with no behaviour of its own; capabilities come from the registry.
#[derive(Debug)]
pub struct TestRule {
    id: RuleId,
}

impl TestRule {
    pub fn new(name: &str) -> Arc<dyn Rule> {
        Arc::new(Self { id: RuleId::new(name) })
    }
}

impl Rule for TestRule {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Custom("test".into())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Concatenating merge provider that counts how often it builds an engine.
#[derive(Default)]
pub struct CountingMergeProvider {
    pub instances: AtomicUsize,
    pub fail: bool,
}

impl CountingMergeProvider {
    pub fn failing() -> Self {
        Self {
            instances: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn count(&self) -> usize {
        self.instances.load(Ordering::SeqCst)
    }
}

struct ConcatEngine;

impl MergeEngine for ConcatEngine {
    fn merge(
        &self,
        cursors: Vec<BoxedCursor>,
        _ctx: &StatementContext,
        _schema: &SchemaMetadata,
    ) -> KestrelResult<BoxedCursor> {
        Ok(Box::new(IteratorStreamMerger::new(cursors)))
    }
}

struct FailingEngine;

impl MergeEngine for FailingEngine {
    fn merge(
        &self,
        _cursors: Vec<BoxedCursor>,
        _ctx: &StatementContext,
        _schema: &SchemaMetadata,
    ) -> KestrelResult<BoxedCursor> {
        Err(KestrelError::Internal("merge refused".into()))
    }
}

impl MergeEngineProvider for CountingMergeProvider {
    fn new_instance(
        &self,
        _database_type: DatabaseType,
        _rule: &dyn Rule,
        _properties: &MergeProperties,
        _ctx: &StatementContext,
    ) -> KestrelResult<Box<dyn MergeEngine>> {
        self.instances.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Ok(Box::new(FailingEngine))
        } else {
            Ok(Box::new(ConcatEngine))
        }
    }
}

/// Provider whose construction always fails with an internal error.
pub struct RefusingProvider;

impl RefusingProvider {
    pub fn error() -> KestrelError {
        KestrelError::internal_bug("E-TEST-001", "provider refused", "fixture")
    }
}

impl MergeEngineProvider for RefusingProvider {
    fn new_instance(
        &self,
        _database_type: DatabaseType,
        _rule: &dyn Rule,
        _properties: &MergeProperties,
        _ctx: &StatementContext,
    ) -> KestrelResult<Box<dyn MergeEngine>> {
        Err(Self::error())
    }
}

impl DecoratorProvider for RefusingProvider {
    fn new_instance(
        &self,
        _database_type: DatabaseType,
        _rule: &dyn Rule,
        _properties: &MergeProperties,
        _ctx: &StatementContext,
    ) -> KestrelResult<Box<dyn ResultDecorator>> {
        Err(Self::error())
    }
}

/// How a [`MapDecoratorProvider`] rewrites text cells.
#[derive(Clone, Copy)]
pub enum TextMap {
    /// Append `+tag`.
    Tag(&'static str),
    Uppercase,
}

/// Decorator rewriting every text cell; counts instantiations.
pub struct MapDecoratorProvider {
    map: TextMap,
    pub instances: AtomicUsize,
}

impl MapDecoratorProvider {
    pub fn tag(tag: &'static str) -> Self {
        Self {
            map: TextMap::Tag(tag),
            instances: AtomicUsize::new(0),
        }
    }

    pub fn uppercase() -> Self {
        Self {
            map: TextMap::Uppercase,
            instances: AtomicUsize::new(0),
        }
    }

    pub fn count(&self) -> usize {
        self.instances.load(Ordering::SeqCst)
    }
}

impl DecoratorProvider for MapDecoratorProvider {
    fn new_instance(
        &self,
        _database_type: DatabaseType,
        _rule: &dyn Rule,
        _properties: &MergeProperties,
        _ctx: &StatementContext,
    ) -> KestrelResult<Box<dyn ResultDecorator>> {
        self.instances.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MapDecorator { map: self.map }))
    }
}

struct MapDecorator {
    map: TextMap,
}

impl ResultDecorator for MapDecorator {
    fn decorate(
        &self,
        cursor: BoxedCursor,
        _ctx: &StatementContext,
        _schema: &SchemaMetadata,
    ) -> KestrelResult<BoxedCursor> {
        Ok(Box::new(MappedCursor {
            inner: cursor,
            map: self.map,
        }))
    }
}

struct MappedCursor {
    inner: BoxedCursor,
    map: TextMap,
}

impl RowCursor for MappedCursor {
    fn next(&mut self) -> KestrelResult<bool> {
        self.inner.next()
    }

    fn value(&self, column_index: usize) -> KestrelResult<Datum> {
        Ok(match (self.inner.value(column_index)?, self.map) {
            (Datum::Text(s), TextMap::Tag(tag)) => Datum::Text(format!("{}+{}", s, tag)),
            (Datum::Text(s), TextMap::Uppercase) => Datum::Text(s.to_uppercase()),
            (other, _) => other,
        })
    }

    fn column_count(&self) -> usize {
        self.inner.column_count()
    }
}

/// Observation points for a [`TrackedCursor`].
#[derive(Clone, Default)]
pub struct Probe {
    pub advances: Arc<AtomicUsize>,
    pub dropped: Arc<AtomicBool>,
}

impl Probe {
    pub fn advances(&self) -> usize {
        self.advances.load(Ordering::SeqCst)
    }

    pub fn is_dropped(&self) -> bool {
        self.dropped.load(Ordering::SeqCst)
    }
}

/// Shard cursor that records advances and its own release.
pub struct TrackedCursor {
    inner: MemoryCursor,
    probe: Probe,
}

impl TrackedCursor {
    pub fn new(shard: u64, rows: Vec<OwnedRow>) -> (BoxedCursor, Probe) {
        let probe = Probe::default();
        let cursor = Self {
            inner: MemoryCursor::new(ShardId(shard), 2, rows),
            probe: probe.clone(),
        };
        (Box::new(cursor), probe)
    }
}

impl RowCursor for TrackedCursor {
    fn next(&mut self) -> KestrelResult<bool> {
        self.probe.advances.fetch_add(1, Ordering::SeqCst);
        self.inner.next()
    }

    fn value(&self, column_index: usize) -> KestrelResult<Datum> {
        self.inner.value(column_index)
    }

    fn column_count(&self) -> usize {
        self.inner.column_count()
    }
}

impl Drop for TrackedCursor {
    fn drop(&mut self) {
        self.probe.dropped.store(true, Ordering::SeqCst);
    }
}

pub fn row(id: i64, text: &str) -> OwnedRow {
    OwnedRow::new(vec![Datum::Int64(id), Datum::Text(text.into())])
}

pub fn shard(id: u64, rows: Vec<OwnedRow>) -> BoxedCursor {
    MemoryCursor::new(ShardId(id), 2, rows).boxed()
}

pub fn ctx() -> StatementContext {
    StatementContext::new()
        .with_table("t_order")
        .with_projections(vec![Projection::column("order_id"), Projection::column("status")])
}

pub fn coordinator(registry: RuleRegistry) -> MergeCoordinator {
    MergeCoordinator::new(
        DatabaseType::MySql,
        Arc::new(SchemaMetadata::new()),
        MergeProperties::default(),
        registry,
    )
}
