//! Factory tables for values received at a polymorphic boundary.
//!
//! Given the declared type of such a value, every concrete class or enum the
//! value could be an instance of gets a construction closure keyed by its
//! runtime identity.

use petgraph::Direction;
use serde::Serialize;

use crate::graph::DependencyGraph;
use crate::graph::edge::EdgeKind;
use crate::graph::reach::{find_reachable, identities};
use crate::imports::ImportEntry;
use crate::model::{DeclKind, SourceType, TypeRef};
use crate::translate::Translator;
use crate::translate::repr::{RenderContext, TargetRepr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FactoryKind {
    /// A zero-argument constructor closure.
    Constructor,
    /// A name -> constant dispatch closure.
    EnumDispatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactoryEntry {
    /// Runtime identity (binary name) the deserializer looks up.
    pub key: String,
    /// Canonical name of the source type.
    pub identity: String,
    pub kind: FactoryKind,
    /// Target-language expression building the value.
    pub source: String,
}

/// Runtime identity -> factory, sorted by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FactoryTable {
    pub entries: Vec<FactoryEntry>,
    #[serde(skip)]
    imports: Vec<ImportEntry>,
}

impl FactoryTable {
    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.key.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Imports the entry sources need, all referenced as code.
    pub fn imports(&self) -> &[ImportEntry] {
        &self.imports
    }

    /// `["key", factory]` pairs, one per line, as fed to a `Map` constructor.
    pub fn render(&self, indent: &str) -> String {
        self.entries
            .iter()
            .map(|e| format!("{indent}[\"{}\", {}]", e.key, e.source))
            .collect::<Vec<_>>()
            .join(",\n")
    }

    fn import(&mut self, repr: &TargetRepr) {
        for entry in repr.imports() {
            if !self.imports.contains(&entry) {
                self.imports.push(entry);
            }
        }
    }
}

/// Build the factory table for a boundary whose declared type translated to
/// `return_repr`.
///
/// Roots are the source types behind the representation's imports; they are
/// admitted into `graph` first. From there, field edges are followed forward
/// and hierarchy edges backward (an abstract type's dependents are its
/// implementors), keeping only instantiable types.
pub fn build_factory_table(
    graph: &mut DependencyGraph<'_>,
    translator: &Translator<'_>,
    return_repr: &TargetRepr,
) -> FactoryTable {
    let roots: Vec<String> = return_repr
        .imports()
        .iter()
        .filter_map(|e| e.source_identity().map(str::to_owned))
        .collect();
    for root in &roots {
        graph.add(root);
    }

    let reachable = find_reachable(
        graph,
        roots.iter().map(String::as_str),
        &[
            (Direction::Outgoing, EdgeKind::Field.into()),
            (Direction::Incoming, EdgeKind::Hierarchy.into()),
        ],
    );

    let model = translator.model();
    let mut table = FactoryTable::default();
    let mut candidates: Vec<(String, String)> = identities(graph, &reachable)
        .into_iter()
        .filter(|id| graph.vertex(id).is_some_and(|v| v.is_instantiable()))
        .map(|id| (model.binary_name(id), id.to_owned()))
        .collect();
    candidates.sort();
    candidates.dedup();

    for (key, identity) in candidates {
        let Some(decl) = model.declaration(&identity) else {
            continue;
        };
        let erased = SourceType::raw(&identity);
        let class = translator.translate_fresh(&TypeRef::new(erased.clone(), SourceType::None));
        table.import(&class);
        let name = class.render(RenderContext::UseSite);

        let (kind, source) = if decl.kind == DeclKind::Enum {
            let cases = decl
                .enum_constants
                .iter()
                .map(|c| format!("case \"{c}\": return {name}.{c};"))
                .collect::<Vec<_>>()
                .join(" ");
            let source = format!(
                "((name: string) => {{ switch (name) {{ {cases} default: throw new Error(`Unknown value ${{name}} for enum {name}!`); }}}}) as any"
            );
            (FactoryKind::EnumDispatch, source)
        } else {
            let mut defaults = Vec::new();
            for field in model.all_fields(&identity) {
                let repr = translator.translate_fresh(&TypeRef::new(field.ty.clone(), erased.clone()));
                if repr.is_boxed_numeric() {
                    table.import(&repr);
                    defaults.push(format!(
                        "{}: new {}(\"0\")",
                        field.name,
                        repr.render(RenderContext::UseSite)
                    ));
                }
            }
            let source = format!("() => new {name}({{ {} }}) as any", defaults.join(", "));
            (FactoryKind::Constructor, source)
        };

        table.entries.push(FactoryEntry {
            key,
            identity,
            kind,
            source,
        });
    }
    table
}
