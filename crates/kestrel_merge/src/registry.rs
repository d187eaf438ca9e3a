//! Insertion-ordered mapping from rule to its processing capability.

use std::fmt;
use std::sync::Arc;

use kestrel_common::error::{KestrelResult, MergeError};

use crate::engine::{DecoratorProvider, MergeEngineProvider};
use crate::rule::{Rule, RuleId};

/// What a rule contributes to result assembly.
#[derive(Clone)]
pub enum Capability {
    None,
    MergeOnly(Arc<dyn MergeEngineProvider>),
    DecorateOnly(Arc<dyn DecoratorProvider>),
    Both {
        merge: Arc<dyn MergeEngineProvider>,
        decorate: Arc<dyn DecoratorProvider>,
    },
}

impl Capability {
    pub fn merge_provider(&self) -> Option<&Arc<dyn MergeEngineProvider>> {
        match self {
            Capability::MergeOnly(merge) | Capability::Both { merge, .. } => Some(merge),
            Capability::None | Capability::DecorateOnly(_) => None,
        }
    }

    pub fn decorator_provider(&self) -> Option<&Arc<dyn DecoratorProvider>> {
        match self {
            Capability::DecorateOnly(decorate) | Capability::Both { decorate, .. } => Some(decorate),
            Capability::None | Capability::MergeOnly(_) => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Capability::None => "None",
            Capability::MergeOnly(_) => "MergeOnly",
            Capability::DecorateOnly(_) => "DecorateOnly",
            Capability::Both { .. } => "Both",
        }
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone)]
pub struct RegistryEntry {
    pub rule: Arc<dyn Rule>,
    pub capability: Capability,
}

/// Rules in registration order. Order decides which merge rule wins and
/// how decorators nest.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    entries: Vec<RegistryEntry>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule. A rule id may be registered once.
    pub fn register(&mut self, rule: Arc<dyn Rule>, capability: Capability) -> KestrelResult<()> {
        if self.contains(rule.id()) {
            return Err(MergeError::DuplicateRule(rule.id().as_str().to_string()).into());
        }
        tracing::debug!(
            rule = rule.id().as_str(),
            capability = capability.label(),
            position = self.entries.len(),
            "registered rule"
        );
        self.entries.push(RegistryEntry { rule, capability });
        Ok(())
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_rule(mut self, rule: Arc<dyn Rule>, capability: Capability) -> KestrelResult<Self> {
        self.register(rule, capability)?;
        Ok(self)
    }

    pub fn contains(&self, id: &RuleId) -> bool {
        self.entries.iter().any(|e| e.rule.id() == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    /// Merge-capable rules in registration order.
    pub fn merge_candidates(
        &self,
    ) -> impl Iterator<Item = (&Arc<dyn Rule>, &Arc<dyn MergeEngineProvider>)> + '_ {
        self.entries
            .iter()
            .filter_map(|e| e.capability.merge_provider().map(|p| (&e.rule, p)))
    }

    /// Decorate-capable rules in registration order.
    pub fn decorator_candidates(
        &self,
    ) -> impl Iterator<Item = (&Arc<dyn Rule>, &Arc<dyn DecoratorProvider>)> + '_ {
        self.entries
            .iter()
            .filter_map(|e| e.capability.decorator_provider().map(|p| (&e.rule, p)))
    }

    /// Reject registries where more than one rule offers a merge strategy.
    /// Without `strict` the first one wins and the rest are only reported.
    pub fn validate(&self, strict: bool) -> KestrelResult<()> {
        let merge_rules: Vec<String> = self
            .merge_candidates()
            .map(|(rule, _)| rule.id().as_str().to_string())
            .collect();
        if merge_rules.len() > 1 {
            if strict {
                return Err(MergeError::MultipleMergeRules { rules: merge_rules }.into());
            }
            tracing::warn!(
                winner = merge_rules[0].as_str(),
                ignored = ?&merge_rules[1..],
                "multiple merge-capable rules registered; only the first applies"
            );
        }
        Ok(())
    }
}
