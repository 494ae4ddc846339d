//! evaluation context: the root entity map plus parent and self records

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::i18n::Language;

/// one fetched entity in the root map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fetched {
    /// the fetched record, list or `null`
    #[serde(default)]
    pub data: Value,
}

/// entity name -> already fetched data
///
/// filled incrementally by the command scheduler. an entity that is absent
/// here has not been fetched yet; an entity present with `null` data was
/// fetched and found nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Root {
    entities: HashMap<String, Fetched>,
}

impl Root {
    pub fn new() -> Self {
        Self::default()
    }

    /// record the fetched data for `name`
    pub fn insert(&mut self, name: impl Into<String>, data: Value) {
        self.entities.insert(name.into(), Fetched { data });
    }

    /// builder form of [`Root::insert`]
    pub fn with(mut self, name: impl Into<String>, data: Value) -> Self {
        self.insert(name, data);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    /// fetched data for `name`; `None` when not fetched yet
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entities.get(name).map(|f| &f.data)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// context for evaluating conditions and resolving tags
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    /// fetched entities addressed by `/Entity` tags
    pub root: &'a Root,
    /// record addressed by `$` tags
    pub parent: Option<&'a Value>,
    /// record whose bare-name properties are addressed
    pub current: Option<&'a Value>,
    /// language for error text
    pub lang: Language,
}

impl<'a> EvalContext<'a> {
    /// create a new evaluation context
    pub fn new(root: &'a Root) -> Self {
        Self {
            root,
            parent: None,
            current: None,
            lang: Language::default(),
        }
    }

    /// set the parent record
    pub fn with_parent(mut self, parent: Option<&'a Value>) -> Self {
        self.parent = parent;
        self
    }

    /// set the self record
    pub fn with_current(mut self, current: Option<&'a Value>) -> Self {
        self.current = current;
        self
    }

    pub fn with_language(mut self, lang: Language) -> Self {
        self.lang = lang;
        self
    }

    /// same context with no self record in scope
    pub fn without_current(self) -> Self {
        self.with_current(None)
    }
}
