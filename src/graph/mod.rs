pub mod edge;
pub mod node;
pub mod reach;

use std::collections::{BTreeMap, HashMap};

use petgraph::Directed;
use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;
use tracing::{debug, warn};

use crate::error::CodegenError;
use crate::pojo::PojoClass;
use crate::translate::Translator;
use edge::EdgeKinds;
use node::Vertex;

/// Registry of admitted source types with set-labelled dependency edges.
///
/// An edge `a -> b` means the generated text of `a` imports `b`; its weight
/// is every kind under which that happened.
pub struct DependencyGraph<'a> {
    /// The underlying directed graph.
    pub graph: StableGraph<Vertex, EdgeKinds, Directed>,
    /// Maps canonical names to their vertex for O(1) lookup.
    index: HashMap<String, NodeIndex>,
    translator: Translator<'a>,
    failures: BTreeMap<String, CodegenError>,
}

impl<'a> DependencyGraph<'a> {
    /// Create an empty graph whose vertices are generated by `translator`.
    pub fn new(translator: Translator<'a>) -> Self {
        Self {
            graph: StableGraph::new(),
            index: HashMap::new(),
            translator,
            failures: BTreeMap::new(),
        }
    }

    /// Create a graph and admit every root.
    pub fn with_roots<'r>(translator: Translator<'a>, roots: impl IntoIterator<Item = &'r str>) -> Self {
        let mut graph = Self::new(translator);
        for root in roots {
            graph.add(root);
        }
        graph
    }

    pub fn translator(&self) -> &Translator<'a> {
        &self.translator
    }

    /// Admit `identity` and, transitively, everything its declaration imports.
    ///
    /// Returns `None` if the model declares no class, interface or enum by that
    /// name, or if the type's own declaration failed to generate. The vertex is
    /// registered before its dependencies are added, so a re-entrant call for a
    /// type under construction returns the existing vertex.
    pub fn add(&mut self, identity: &str) -> Option<NodeIndex> {
        if let Some(&existing) = self.index.get(identity) {
            return Some(existing);
        }
        if self.failures.contains_key(identity) {
            return None;
        }
        self.translator.model().declaration(identity)?;

        let pojo = match PojoClass::generate(&self.translator, identity) {
            Ok(pojo) => pojo,
            Err(err) => {
                warn!(identity, error = %err, "type failed to generate");
                self.failures.insert(identity.to_owned(), err);
                return None;
            }
        };
        let dependencies = pojo.dependencies();

        let idx = self.graph.add_node(Vertex::new(pojo));
        self.index.insert(identity.to_owned(), idx);
        debug!(identity, dependencies = dependencies.len(), "vertex added");

        for (entry, kinds) in dependencies {
            let Some(target) = entry.source_identity() else {
                continue;
            };
            if let Some(dependency) = self.add(target) {
                self.link(idx, dependency, kinds);
            }
        }
        Some(idx)
    }

    /// Merge `kinds` into the edge `from -> to`.
    pub fn link(&mut self, from: NodeIndex, to: NodeIndex, kinds: EdgeKinds) {
        match self.graph.find_edge(from, to) {
            Some(edge) => self.graph[edge] |= kinds,
            None => {
                self.graph.add_edge(from, to, kinds);
            }
        }
    }

    pub fn index_of(&self, identity: &str) -> Option<NodeIndex> {
        self.index.get(identity).copied()
    }

    pub fn vertex(&self, identity: &str) -> Option<&Vertex> {
        self.index_of(identity).map(|idx| &self.graph[idx])
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.graph.node_weights()
    }

    /// Number of vertices in the graph.
    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of distinct ordered pairs linked by an edge.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// The kinds on `from -> to`, empty if the pair is not linked.
    pub fn kinds_between(&self, from: &str, to: &str) -> EdgeKinds {
        match (self.index_of(from), self.index_of(to)) {
            (Some(a), Some(b)) => self
                .graph
                .find_edge(a, b)
                .map(|e| self.graph[e])
                .unwrap_or_default(),
            _ => EdgeKinds::EMPTY,
        }
    }

    /// Direct neighbours of `identity` in `direction`, sorted by identity.
    pub fn neighbours(&self, identity: &str, direction: Direction) -> Vec<(&str, EdgeKinds)> {
        let Some(idx) = self.index_of(identity) else {
            return Vec::new();
        };
        let mut result: Vec<(&str, EdgeKinds)> = self
            .graph
            .edges_directed(idx, direction)
            .map(|e| {
                let other = match direction {
                    Direction::Outgoing => e.target(),
                    Direction::Incoming => e.source(),
                };
                (self.graph[other].identity(), *e.weight())
            })
            .collect();
        result.sort_by(|a, b| a.0.cmp(b.0));
        result
    }

    /// Types whose declaration failed, by identity.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &CodegenError)> {
        self.failures.iter().map(|(k, v)| (k.as_str(), v))
    }
}
