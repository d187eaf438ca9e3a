//! Rules: independently configured middleware features.
//!
//! A rule is opaque to the coordinator. Providers registered next to a rule
//! downcast it back to their concrete type through [`Rule::as_any`].

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::decorate::encryptor::Encryptor;

/// Unique identifier of a configured rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(pub String);

impl RuleId {
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule:{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Sharding,
    Encrypt,
    Shadow,
    ReadWriteSplitting,
    Custom(String),
}

pub trait Rule: fmt::Debug + Send + Sync {
    fn id(&self) -> &RuleId;

    fn kind(&self) -> RuleKind;

    fn as_any(&self) -> &dyn Any;
}

/// Downcast a rule to its concrete type.
pub fn downcast_rule<R: Rule + 'static>(rule: &dyn Rule) -> Option<&R> {
    rule.as_any().downcast_ref::<R>()
}

/// Horizontal sharding of logical tables across data nodes.
#[derive(Debug, Clone)]
pub struct ShardingRule {
    id: RuleId,
    /// Logical tables split across shards.
    pub sharded_tables: Vec<String>,
    /// Tables replicated to every shard.
    pub broadcast_tables: Vec<String>,
}

impl ShardingRule {
    pub fn new(name: &str, sharded_tables: Vec<String>) -> Self {
        Self {
            id: RuleId::new(name),
            sharded_tables,
            broadcast_tables: Vec::new(),
        }
    }

    pub fn with_broadcast_tables(mut self, tables: Vec<String>) -> Self {
        self.broadcast_tables = tables;
        self
    }

    pub fn is_sharded_table(&self, table: &str) -> bool {
        self.sharded_tables.iter().any(|t| t.eq_ignore_ascii_case(table))
    }

    pub fn is_broadcast_table(&self, table: &str) -> bool {
        self.broadcast_tables.iter().any(|t| t.eq_ignore_ascii_case(table))
    }
}

impl Rule for ShardingRule {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Sharding
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// One encrypted column of a logical table.
#[derive(Clone)]
pub struct EncryptColumn {
    /// Logical column name as projected to clients.
    pub logical_name: String,
    pub encryptor: Arc<dyn Encryptor>,
}

impl fmt::Debug for EncryptColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptColumn")
            .field("logical_name", &self.logical_name)
            .field("encryptor", &self.encryptor.name())
            .finish()
    }
}

/// Column-level encryption of one logical table.
#[derive(Debug, Clone)]
pub struct EncryptRule {
    id: RuleId,
    pub table: String,
    pub columns: Vec<EncryptColumn>,
}

impl EncryptRule {
    pub fn new(name: &str, table: &str) -> Self {
        Self {
            id: RuleId::new(name),
            table: table.to_string(),
            columns: Vec::new(),
        }
    }

    pub fn with_column(mut self, logical_name: &str, encryptor: Arc<dyn Encryptor>) -> Self {
        self.columns.push(EncryptColumn {
            logical_name: logical_name.to_string(),
            encryptor,
        });
        self
    }

    pub fn column(&self, logical_name: &str) -> Option<&EncryptColumn> {
        self.columns
            .iter()
            .find(|c| c.logical_name.eq_ignore_ascii_case(logical_name))
    }
}

impl Rule for EncryptRule {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Encrypt
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Routes marked traffic to shadow tables. Acts before execution only.
#[derive(Debug, Clone)]
pub struct ShadowRule {
    id: RuleId,
    /// Column whose truthy value marks a shadow request.
    pub shadow_column: String,
}

impl ShadowRule {
    pub fn new(name: &str, shadow_column: &str) -> Self {
        Self {
            id: RuleId::new(name),
            shadow_column: shadow_column.to_string(),
        }
    }
}

impl Rule for ShadowRule {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn kind(&self) -> RuleKind {
        RuleKind::Shadow
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Primary/replica routing. Acts before execution only.
#[derive(Debug, Clone)]
pub struct ReadWriteSplittingRule {
    id: RuleId,
    pub primary: String,
    pub replicas: Vec<String>,
}

impl ReadWriteSplittingRule {
    pub fn new(name: &str, primary: &str, replicas: Vec<String>) -> Self {
        Self {
            id: RuleId::new(name),
            primary: primary.to_string(),
            replicas,
        }
    }
}

impl Rule for ReadWriteSplittingRule {
    fn id(&self) -> &RuleId {
        &self.id
    }

    fn kind(&self) -> RuleKind {
        RuleKind::ReadWriteSplitting
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
