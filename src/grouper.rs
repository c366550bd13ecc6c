//! The generation driver: builds the dependency graphs for a set of roots and
//! groups the generated declarations by target module.

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{CodegenConfig, unscoped};
use crate::decorators::{DecoratorStore, DecoratorView};
use crate::error::CodegenError;
use crate::factory::FactoryTable;
use crate::graph::DependencyGraph;
use crate::graph::edge::EdgeKinds;
use crate::imports::store::ResolvedImport;
use crate::imports::{ImportEntry, RUNTIME_MODULE};
use crate::model::TypeModel;
use crate::output::CodegenStats;
use crate::pojo::PojoClass;
use crate::remote::{self, RemoteCaller};
use crate::translate::{NameMode, Translator};

/// Which rendering of a module a group holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Flavor {
    /// A decorated module rendered without its own overrides, as the base
    /// the hand-authored decorators extend.
    Raw,
    /// A decorated module with overrides applied.
    Final,
    /// A module with no overrides configured.
    Undecorated,
}

/// One generated declaration, ready for an emitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedType {
    pub identity: String,
    pub module: String,
    pub path: String,
    pub body: String,
    /// Import statements, sorted by rendered line.
    pub imports: Vec<ResolvedImport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleGroup {
    /// Scoped module name.
    pub name: String,
    pub flavor: Flavor,
    /// Sorted by path.
    pub types: Vec<GeneratedType>,
    /// Other modules the group imports from, sorted.
    pub dependencies: Vec<String>,
    /// The package providing overrides for a decorated module.
    pub decorator_package: Option<String>,
}

/// Everything a generation run produced.
#[derive(Debug, Clone)]
pub struct CodegenResult {
    /// Raw groups first, then final and undecorated groups, each sorted by name.
    pub groups: Vec<ModuleGroup>,
    /// Types that failed to generate, by identity.
    pub failures: BTreeMap<String, CodegenError>,
    /// Factory table per remote endpoint.
    pub factories: BTreeMap<String, FactoryTable>,
    pub stats: CodegenStats,
}

impl CodegenResult {
    pub fn group(&self, name: &str, flavor: Flavor) -> Option<&ModuleGroup> {
        self.groups
            .iter()
            .find(|g| g.name == name && g.flavor == flavor)
    }
}

/// Drives generation over a type model, a decorator table and a configuration.
pub struct Codegen<'a> {
    model: &'a dyn TypeModel,
    decorators: &'a DecoratorStore,
    config: &'a CodegenConfig,
    mode: NameMode,
}

struct PassOutput {
    groups: Vec<ModuleGroup>,
    failures: Vec<(String, CodegenError)>,
    factories: BTreeMap<String, FactoryTable>,
    remote_callers: usize,
    vertices: usize,
    edges: usize,
}

impl<'a> Codegen<'a> {
    pub fn new(
        model: &'a dyn TypeModel,
        decorators: &'a DecoratorStore,
        config: &'a CodegenConfig,
    ) -> Self {
        Self {
            model,
            decorators,
            config,
            mode: NameMode::default(),
        }
    }

    pub fn with_name_mode(self, mode: NameMode) -> Self {
        Self { mode, ..self }
    }

    /// Generate every portable root and remote interface plus everything they
    /// reach.
    ///
    /// The raw pass (self-excluding decorator view, roots of decorated modules
    /// only) and the final pass (normal view, all roots and remote callers)
    /// build independent graphs and run in parallel.
    pub fn generate(&self, portables: &[&str], remotes: &[&str]) -> Result<CodegenResult, CodegenError> {
        for identity in portables.iter().chain(remotes) {
            if self.model.declaration(identity).is_none() {
                return Err(CodegenError::UnknownType((*identity).to_owned()));
            }
        }

        let (raw, fin) = rayon::join(|| self.raw_pass(portables), || self.final_pass(portables, remotes));

        let mut failures = BTreeMap::new();
        for (identity, err) in raw.failures.into_iter().chain(fin.failures) {
            failures.entry(identity).or_insert(err);
        }

        let stats = CodegenStats {
            modules: fin.groups.len(),
            raw_modules: raw.groups.len(),
            types: fin.groups.iter().map(|g| g.types.len()).sum(),
            remote_callers: fin.remote_callers,
            vertices: fin.vertices,
            edges: fin.edges,
            factory_entries: fin.factories.values().map(FactoryTable::len).sum(),
            failures: failures.len(),
        };
        debug!(summary = %stats, "generation finished");

        let mut groups = raw.groups;
        groups.extend(fin.groups);
        Ok(CodegenResult {
            groups,
            failures,
            factories: fin.factories,
            stats,
        })
    }

    fn translator(&self, view: DecoratorView<'a>) -> Translator<'a> {
        Translator::new(self.model, view, self.config).with_mode(self.mode)
    }

    fn raw_pass(&self, portables: &[&str]) -> PassOutput {
        let roots = portables.iter().copied().filter(|id| {
            self.model
                .declaration(id)
                .is_some_and(|d| self.decorators.has_overrides_for(&d.module))
        });
        let graph = DependencyGraph::with_roots(
            self.translator(DecoratorView::self_excluding(self.decorators)),
            roots,
        );
        let sources = graph.vertices().map(|v| Source::Pojo(&v.pojo)).collect();
        let groups = self.group(sources, |module| {
            self.decorators
                .has_overrides_for(unscoped(module))
                .then_some(Flavor::Raw)
        });
        debug!(pass = "raw", groups = groups.len(), vertices = graph.vertex_count(), "pass finished");

        PassOutput {
            groups,
            failures: collect_failures(&graph),
            factories: BTreeMap::new(),
            remote_callers: 0,
            vertices: graph.vertex_count(),
            edges: graph.edge_count(),
        }
    }

    fn final_pass(&self, portables: &[&str], remotes: &[&str]) -> PassOutput {
        let mut graph = DependencyGraph::with_roots(
            self.translator(DecoratorView::normal(self.decorators)),
            portables.iter().copied(),
        );

        let mut callers: Vec<RemoteCaller> = Vec::new();
        let mut failures = Vec::new();
        for identity in remotes {
            match remote::generate(&mut graph, identity) {
                Ok(caller) => callers.push(caller),
                Err(err) => {
                    warn!(identity, error = %err, "remote caller failed to generate");
                    failures.push(((*identity).to_owned(), err));
                }
            }
        }

        let factories = callers
            .iter()
            .flat_map(|c| c.factories.iter().map(|(k, t)| (k.clone(), t.clone())))
            .collect();

        let sources = graph
            .vertices()
            .map(|v| Source::Pojo(&v.pojo))
            .chain(callers.iter().map(Source::Remote))
            .collect();
        let groups = self.group(sources, |module| {
            Some(if self.decorators.has_overrides_for(unscoped(module)) {
                Flavor::Final
            } else {
                Flavor::Undecorated
            })
        });
        debug!(pass = "final", groups = groups.len(), vertices = graph.vertex_count(), "pass finished");

        failures.extend(collect_failures(&graph));
        PassOutput {
            groups,
            failures,
            factories,
            remote_callers: callers.len(),
            vertices: graph.vertex_count(),
            edges: graph.edge_count(),
        }
    }

    /// Bucket `sources` by module and build one group per bucket `flavor_of`
    /// accepts. Groups come back sorted by name.
    fn group(
        &self,
        sources: Vec<Source<'_>>,
        flavor_of: impl Fn(&str) -> Option<Flavor> + Sync,
    ) -> Vec<ModuleGroup> {
        let mut buckets: BTreeMap<&str, Vec<&Source<'_>>> = BTreeMap::new();
        for source in &sources {
            buckets.entry(source.module()).or_default().push(source);
        }
        let buckets: Vec<(&str, Vec<&Source<'_>>)> = buckets.into_iter().collect();

        let scope = self.config.package_scope.as_str();
        let decorators = self.decorators;
        buckets
            .par_iter()
            .filter_map(|(module, members)| {
                let flavor = flavor_of(module)?;
                let mut group = build_group(module, flavor, members, scope);
                if flavor != Flavor::Undecorated {
                    group.decorator_package = decorators
                        .decorator_package_for(unscoped(module))
                        .map(str::to_owned);
                }
                Some(group)
            })
            .collect()
    }
}

fn build_group(module: &str, flavor: Flavor, members: &[&Source<'_>], scope: &str) -> ModuleGroup {
    let mut dependencies = BTreeSet::new();
    let mut types = Vec::with_capacity(members.len());
    for source in members {
        for (entry, _) in source.dependencies() {
            let entry = match flavor {
                Flavor::Final => entry,
                Flavor::Raw | Flavor::Undecorated => entry.shadowed(scope),
            };
            let dependency = entry.module();
            if dependency != module && dependency != RUNTIME_MODULE {
                dependencies.insert(dependency.to_owned());
            }
        }
        types.push(source.generated());
    }
    types.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.identity.cmp(&b.identity)));
    types.dedup_by(|a, b| a.identity == b.identity);

    ModuleGroup {
        name: module.to_owned(),
        flavor,
        types,
        dependencies: dependencies.into_iter().collect(),
        decorator_package: None,
    }
}

fn collect_failures(graph: &DependencyGraph<'_>) -> Vec<(String, CodegenError)> {
    graph
        .failures()
        .map(|(identity, err)| (identity.to_owned(), err.clone()))
        .collect()
}

/// Anything that lands in a module group.
enum Source<'g> {
    Pojo(&'g PojoClass),
    Remote(&'g RemoteCaller),
}

impl Source<'_> {
    fn module(&self) -> &str {
        match self {
            Source::Pojo(p) => &p.module,
            Source::Remote(r) => &r.module,
        }
    }

    fn dependencies(&self) -> Vec<(ImportEntry, EdgeKinds)> {
        match self {
            Source::Pojo(p) => p.dependencies(),
            Source::Remote(r) => r.dependencies(),
        }
    }

    fn generated(&self) -> GeneratedType {
        let (identity, module, path, body, imports) = match self {
            Source::Pojo(p) => (&p.identity, &p.module, &p.path, &p.body, p.resolved_imports()),
            Source::Remote(r) => (&r.identity, &r.module, &r.path, &r.body, r.resolved_imports()),
        };
        GeneratedType {
            identity: identity.clone(),
            module: module.clone(),
            path: path.clone(),
            body: body.clone(),
            imports,
        }
    }
}
