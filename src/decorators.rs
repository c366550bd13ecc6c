//! Configured overrides replacing generated declarations with hand-authored ones.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use crate::config::CodegenConfig;
use crate::error::CodegenError;
use crate::model::TypeModel;

static DECORATOR_PATH: OnceLock<Regex> = OnceLock::new();

fn decorator_path_regex() -> &'static Regex {
    DECORATOR_PATH.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_.-]+(/[A-Za-z0-9_.-]+)*$").expect("invalid decorator path regex")
    })
}

/// One override: `decorated` is replaced by the symbol at `path` in `package`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DecoratorEntry {
    /// Canonical name of the decorated source type.
    pub decorated: String,
    /// Unscoped source module that owns the decorated type.
    pub decorated_module: String,
    /// Package the decorator is imported from.
    pub package: String,
    /// Path of the decorator within its package.
    pub path: String,
}

impl DecoratorEntry {
    /// `acme-decorators/decorators/Bar` becomes `acmedecorators_decorators_Bar`.
    pub fn alias(&self) -> String {
        self.path.replace('/', "_").replace('-', "")
    }
}

/// The override table. At most one entry per decorated identity.
#[derive(Debug, Clone, Default)]
pub struct DecoratorStore {
    entries: HashMap<String, DecoratorEntry>,
}

impl DecoratorStore {
    /// Build a store; the first entry for an identity wins, later ones are dropped.
    pub fn new(entries: impl IntoIterator<Item = DecoratorEntry>) -> Self {
        let mut map: HashMap<String, DecoratorEntry> = HashMap::new();
        for entry in entries {
            match map.get(&entry.decorated) {
                Some(kept) => warn!(
                    decorated = %entry.decorated,
                    kept = %kept.path,
                    discarded = %entry.path,
                    "more than one decorator for type, keeping the first"
                ),
                None => {
                    map.insert(entry.decorated.clone(), entry);
                }
            }
        }
        Self { entries: map }
    }

    /// Build the store from the `[[decorators]]` libraries of `config`, checking
    /// every target against `model` before any translation runs.
    pub fn from_config(config: &CodegenConfig, model: &dyn TypeModel) -> Result<Self, CodegenError> {
        let mut entries = Vec::new();
        for library in &config.decorators {
            for (path, identity) in &library.entries {
                if path.trim().is_empty() {
                    return Err(CodegenError::MissingOverride {
                        identity: identity.clone(),
                        package: library.package.clone(),
                    });
                }
                if !decorator_path_regex().is_match(path) {
                    return Err(CodegenError::InvalidDecoratorPath {
                        identity: identity.clone(),
                        path: path.clone(),
                    });
                }
                if model.declaration(identity).is_none() {
                    return Err(CodegenError::UnresolvedDecoratorTarget {
                        identity: identity.clone(),
                        package: library.package.clone(),
                        path: path.clone(),
                    });
                }
                entries.push(DecoratorEntry {
                    decorated: identity.clone(),
                    decorated_module: library.module.clone(),
                    package: library.package.clone(),
                    path: path.clone(),
                });
            }
        }
        Ok(Self::new(entries))
    }

    pub fn get(&self, identity: &str) -> Option<&DecoratorEntry> {
        self.entries.get(identity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any override decorates a type of the unscoped source `module`.
    pub fn has_overrides_for(&self, module: &str) -> bool {
        self.entries.values().any(|e| e.decorated_module == module)
    }

    /// The decorator package serving `module`. When several packages decorate
    /// the same module the lexicographically first one is reported.
    pub fn decorator_package_for(&self, module: &str) -> Option<&str> {
        self.entries
            .values()
            .filter(|e| e.decorated_module == module)
            .map(|e| e.package.as_str())
            .min()
    }
}

/// A read-only view over a [`DecoratorStore`].
///
/// The self-excluding view suppresses an override while rendering the module
/// that owns the decorated type, so a module never imports an override of one
/// of its own members.
#[derive(Debug, Clone, Copy)]
pub struct DecoratorView<'a> {
    store: Option<&'a DecoratorStore>,
    self_excluding: bool,
}

impl<'a> DecoratorView<'a> {
    /// A view with no overrides at all.
    pub fn none() -> Self {
        Self {
            store: None,
            self_excluding: false,
        }
    }

    pub fn normal(store: &'a DecoratorStore) -> Self {
        Self {
            store: Some(store),
            self_excluding: false,
        }
    }

    pub fn self_excluding(store: &'a DecoratorStore) -> Self {
        Self {
            store: Some(store),
            self_excluding: true,
        }
    }

    /// Whether `identity`, referenced from a type of the unscoped source
    /// module `context_module`, is replaced by its override.
    pub fn should_override(&self, identity: &str, context_module: Option<&str>) -> bool {
        match self.override_for(identity) {
            None => false,
            Some(entry) if self.self_excluding => {
                context_module != Some(entry.decorated_module.as_str())
            }
            Some(_) => true,
        }
    }

    pub fn override_for(&self, identity: &str) -> Option<&'a DecoratorEntry> {
        self.store?.get(identity)
    }
}
