use std::collections::BTreeMap;

use serde::Serialize;

use super::ImportEntry;
use crate::graph::edge::{EdgeKind, EdgeKinds};
use crate::translate::repr::TargetRepr;

/// A fully resolved import statement handed to the emitter.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ResolvedImport {
    pub line: String,
    pub module: String,
    pub alias: String,
    pub symbol: String,
}

/// Import entries accumulated by one generated type, keyed by entry path.
#[derive(Debug, Clone)]
pub struct ImportStore {
    owner: String,
    module: String,
    path: String,
    entries: BTreeMap<String, (ImportEntry, EdgeKinds)>,
}

impl ImportStore {
    /// `owner` is the canonical name of the type being generated, `module` and
    /// `path` its location.
    pub fn new(owner: &str, module: &str, path: &str) -> Self {
        Self {
            owner: owner.to_owned(),
            module: module.to_owned(),
            path: path.to_owned(),
            entries: BTreeMap::new(),
        }
    }

    /// Record every import `repr` needs under `kind` and hand `repr` back.
    pub fn with(&mut self, kind: EdgeKind, repr: TargetRepr) -> TargetRepr {
        for entry in repr.imports() {
            self.record(kind, entry);
        }
        repr
    }

    pub fn record(&mut self, kind: EdgeKind, entry: ImportEntry) {
        self.entries
            .entry(entry.path().to_owned())
            .and_modify(|(_, kinds)| kinds.insert(kind))
            .or_insert((entry, kind.into()));
    }

    /// Every recorded entry except those naming the owner itself.
    pub fn imports(&self) -> Vec<(ImportEntry, EdgeKinds)> {
        self.entries
            .values()
            .filter(|(entry, _)| !entry.represents(&self.owner))
            .cloned()
            .collect()
    }

    /// Resolved statements, sorted by rendered line.
    pub fn resolved(&self) -> Vec<ResolvedImport> {
        let mut resolved: Vec<ResolvedImport> = self
            .imports()
            .into_iter()
            .map(|(entry, _)| self.resolve(&entry))
            .collect();
        resolved.sort();
        resolved.dedup_by(|a, b| a.line == b.line);
        resolved
    }

    /// The import block: one statement per line.
    pub fn render(&self) -> String {
        self.resolved()
            .into_iter()
            .map(|r| r.line)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn resolve(&self, entry: &ImportEntry) -> ResolvedImport {
        let alias = entry.alias();
        let symbol = entry.symbol().to_owned();
        let source = if entry.module() == self.module {
            let depth = self.path.split('/').count().saturating_sub(1);
            format!("{}{}", "../".repeat(depth), entry.path())
        } else {
            entry.module().to_owned()
        };
        ResolvedImport {
            line: format!("import {{ {symbol} as {alias} }} from '{source}';"),
            module: entry.module().to_owned(),
            alias,
            symbol,
        }
    }
}
