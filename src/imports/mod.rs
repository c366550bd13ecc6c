//! Import entries: the external symbols a piece of generated text needs.

pub mod store;

use crate::decorators::DecoratorEntry;

/// Module that ships the numeric wrappers, `Portable`, `JavaEnum` and the rpc helpers.
pub const RUNTIME_MODULE: &str = "typebridge-runtime";

/// A stateless wrapper symbol exported by [`RUNTIME_MODULE`].
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct BuiltInWrapper {
    pub symbol: &'static str,
    pub path: &'static str,
}

/// Reference to the generated declaration of a source type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeneratedRef {
    /// Canonical name of the referenced source type.
    pub identity: String,
    /// Scoped target module the type is generated into.
    pub module: String,
    /// Path of the declaration within its module (`com/acme/Foo`).
    pub path: String,
    /// Local name the referencing text uses.
    pub alias: String,
}

/// One external symbol required by generated text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImportEntry {
    Generated(GeneratedRef),
    BuiltIn(&'static BuiltInWrapper),
    /// A hand-authored override replacing a generated type.
    Decorator(DecoratorEntry),
    /// A decorator presented as a member of its decorated module instead of
    /// the decorator package.
    ShadowedDecorator { entry: DecoratorEntry, module: String },
}

impl ImportEntry {
    /// Module the symbol is imported from.
    pub fn module(&self) -> &str {
        match self {
            ImportEntry::Generated(r) => &r.module,
            ImportEntry::BuiltIn(_) => RUNTIME_MODULE,
            ImportEntry::Decorator(d) => &d.package,
            ImportEntry::ShadowedDecorator { module, .. } => module,
        }
    }

    /// Path of the symbol within its module.
    pub fn path(&self) -> &str {
        match self {
            ImportEntry::Generated(r) => &r.path,
            ImportEntry::BuiltIn(w) => w.path,
            ImportEntry::Decorator(d) | ImportEntry::ShadowedDecorator { entry: d, .. } => &d.path,
        }
    }

    /// The exported symbol: the last path segment.
    pub fn symbol(&self) -> &str {
        let path = self.path();
        path.rsplit('/').next().unwrap_or(path)
    }

    /// Unique local alias the symbol is bound to.
    pub fn alias(&self) -> String {
        match self {
            ImportEntry::Generated(r) => r.alias.clone(),
            ImportEntry::BuiltIn(w) => w.symbol.to_owned(),
            ImportEntry::Decorator(d) | ImportEntry::ShadowedDecorator { entry: d, .. } => d.alias(),
        }
    }

    /// Whether this entry is the generated declaration of `identity` itself.
    pub fn represents(&self, identity: &str) -> bool {
        matches!(self, ImportEntry::Generated(r) if r.identity == identity)
    }

    /// The source type this entry stands for. Decorators stand for the type
    /// they decorate; built-ins stand for nothing.
    pub fn source_identity(&self) -> Option<&str> {
        match self {
            ImportEntry::Generated(r) => Some(&r.identity),
            ImportEntry::BuiltIn(_) => None,
            ImportEntry::Decorator(d) | ImportEntry::ShadowedDecorator { entry: d, .. } => {
                Some(&d.decorated)
            }
        }
    }

    /// Present a decorator as belonging to `{scope}/{decorated module}`.
    /// Other entries are returned unchanged.
    pub fn shadowed(self, package_scope: &str) -> ImportEntry {
        match self {
            ImportEntry::Decorator(entry) => ImportEntry::ShadowedDecorator {
                module: format!("{package_scope}/{}", entry.decorated_module),
                entry,
            },
            other => other,
        }
    }
}
