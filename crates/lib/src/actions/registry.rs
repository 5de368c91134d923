//! Tag to behaviour lookup.

use std::{collections::HashMap, sync::Arc};

use tracing::warn;

use super::{ActionKind, ActionType, BaseAction};
use crate::{Result, constants::MAX_ACTION_TYPE_LEN, ledger::LedgerError};

#[derive(Debug, Clone)]
struct Registered {
    type_name: &'static str,
    kind: Arc<dyn ActionKind>,
}

/// Maps stored type tags to their behaviours.
///
/// Filled by explicit [`register`](Self::register) calls when a ledger is
/// opened; there is no global registration state.
#[derive(Debug, Clone)]
pub struct ActionRegistry {
    kinds: HashMap<String, Registered>,
    fallback: Arc<dyn ActionKind>,
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionRegistry {
    /// An empty registry. Every tag resolves to [`BaseAction`].
    pub fn new() -> Self {
        Self {
            kinds: HashMap::new(),
            fallback: Arc::new(BaseAction),
        }
    }

    /// A registry holding every built-in action type.
    pub fn with_builtins() -> Result<Self> {
        let mut registry = Self::new();
        super::register_builtins(&mut registry)?;
        Ok(registry)
    }

    /// Registers `K` under its derived tag.
    pub fn register<K: ActionType>(&mut self) -> Result<()> {
        let tag = K::type_tag();
        if tag.len() > MAX_ACTION_TYPE_LEN {
            return Err(LedgerError::ActionTypeTooLong {
                tag,
                max: MAX_ACTION_TYPE_LEN,
            }
            .into());
        }
        if self.kinds.contains_key(&tag) {
            return Err(LedgerError::DuplicateActionType { tag }.into());
        }
        self.kinds.insert(
            tag,
            Registered {
                type_name: K::NAME,
                kind: Arc::new(K::default()),
            },
        );
        Ok(())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.kinds.contains_key(tag)
    }

    pub fn get(&self, tag: &str) -> Option<Arc<dyn ActionKind>> {
        self.kinds.get(tag).map(|r| Arc::clone(&r.kind))
    }

    /// Type name a tag was registered from.
    pub fn type_name(&self, tag: &str) -> Option<&'static str> {
        self.kinds.get(tag).map(|r| r.type_name)
    }

    /// Resolves a tag, falling back to the inert [`BaseAction`] for tags
    /// nobody registered.
    pub fn resolve(&self, tag: &str) -> Arc<dyn ActionKind> {
        self.get(tag).unwrap_or_else(|| {
            warn!(action_type = tag, "Unknown action type, using base behaviour");
            Arc::clone(&self.fallback)
        })
    }

    /// Resolves a tag for an operation that must not silently do nothing.
    pub fn resolve_strict(&self, tag: &str) -> Result<Arc<dyn ActionKind>> {
        self.get(tag).ok_or_else(|| {
            LedgerError::UnknownActionType {
                tag: tag.to_string(),
            }
            .into()
        })
    }

    /// Registered tags in alphabetical order.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.kinds.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}
