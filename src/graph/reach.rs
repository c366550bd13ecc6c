use std::collections::{HashSet, VecDeque};

use petgraph::Direction;
use petgraph::stable_graph::NodeIndex;
use petgraph::visit::EdgeRef;

use super::DependencyGraph;
use super::edge::EdgeKinds;

/// Direction/kind pairs followed by one traversal. `Outgoing` walks
/// dependencies, `Incoming` walks dependents.
pub type Traversal = [(Direction, EdgeKinds)];

/// Multi-root reachability under `traversal`.
///
/// The result contains every admitted root plus everything transitively
/// reachable along an edge whose kinds intersect the set paired with its
/// direction. Roots not in the graph are ignored. Order is unspecified;
/// callers sort.
pub fn find_reachable<'r>(
    graph: &DependencyGraph<'_>,
    roots: impl IntoIterator<Item = &'r str>,
    traversal: &Traversal,
) -> HashSet<NodeIndex> {
    let mut queue: VecDeque<NodeIndex> = VecDeque::new();
    let mut visited: HashSet<NodeIndex> = HashSet::new();

    for root in roots {
        if let Some(idx) = graph.index_of(root) {
            if visited.insert(idx) {
                queue.push_back(idx);
            }
        }
    }

    while let Some(current) = queue.pop_front() {
        for &(direction, kinds) in traversal {
            for edge_ref in graph.graph.edges_directed(current, direction) {
                if !edge_ref.weight().intersects(kinds) {
                    continue;
                }
                let next = match direction {
                    Direction::Outgoing => edge_ref.target(),
                    Direction::Incoming => edge_ref.source(),
                };
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
    }

    visited
}

/// Everything `roots` depend on under `kinds` (empty = all kinds).
pub fn find_all_dependencies<'r>(
    graph: &DependencyGraph<'_>,
    roots: impl IntoIterator<Item = &'r str>,
    kinds: EdgeKinds,
) -> HashSet<NodeIndex> {
    find_reachable(graph, roots, &[(Direction::Outgoing, kinds.or_all())])
}

/// Everything depending on `roots` under `kinds` (empty = all kinds).
pub fn find_all_dependents<'r>(
    graph: &DependencyGraph<'_>,
    roots: impl IntoIterator<Item = &'r str>,
    kinds: EdgeKinds,
) -> HashSet<NodeIndex> {
    find_reachable(graph, roots, &[(Direction::Incoming, kinds.or_all())])
}

/// Identities of `nodes`, sorted.
pub fn identities<'g>(graph: &'g DependencyGraph<'_>, nodes: &HashSet<NodeIndex>) -> Vec<&'g str> {
    let mut names: Vec<&str> = nodes
        .iter()
        .filter_map(|&idx| graph.graph.node_weight(idx))
        .map(|v| v.identity())
        .collect();
    names.sort_unstable();
    names
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodegenConfig;
    use crate::decorators::DecoratorView;
    use crate::graph::edge::EdgeKind;
    use crate::model::fixture::FixtureModel;
    use crate::translate::Translator;

    /// Chain `Top -> Mid -> Leaf` by fields, plus `Impl` implementing `Api`
    /// and `Top` holding an `Api`.
    fn model() -> FixtureModel {
        FixtureModel::from_json_str(
            r#"{ "types": [
              { "name": "r.Top", "module": "r",
                "fields": [ { "name": "mid", "type": "r.Mid" }, { "name": "api", "type": "r.Api" } ] },
              { "name": "r.Mid", "module": "r", "fields": [ { "name": "leaf", "type": "r.Leaf" } ] },
              { "name": "r.Leaf", "module": "r" },
              { "name": "r.Api", "module": "r", "kind": "interface" },
              { "name": "r.Impl", "module": "r", "interfaces": ["r.Api"] }
            ] }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_dependencies_follow_outgoing_fields() {
        let model = model();
        let config = CodegenConfig::default();
        let tr = Translator::new(&model, DecoratorView::none(), &config);
        let graph = DependencyGraph::with_roots(tr, ["r.Top", "r.Impl"]);
        let deps = find_all_dependencies(&graph, ["r.Mid"], EdgeKind::Field.into());
        assert_eq!(identities(&graph, &deps), vec!["r.Leaf", "r.Mid"]);
        let all = find_all_dependencies(&graph, ["r.Top"], EdgeKinds::EMPTY);
        assert_eq!(identities(&graph, &all), vec!["r.Api", "r.Leaf", "r.Mid", "r.Top"]);
    }

    #[test]
    fn test_dependents_follow_incoming() {
        let model = model();
        let config = CodegenConfig::default();
        let tr = Translator::new(&model, DecoratorView::none(), &config);
        let graph = DependencyGraph::with_roots(tr, ["r.Top", "r.Impl"]);
        let implementors = find_all_dependents(&graph, ["r.Api"], EdgeKind::Hierarchy.into());
        assert_eq!(identities(&graph, &implementors), vec!["r.Api", "r.Impl"]);
        let users = find_all_dependents(&graph, ["r.Leaf"], EdgeKinds::EMPTY);
        assert_eq!(identities(&graph, &users), vec!["r.Leaf", "r.Mid", "r.Top"]);
    }

    #[test]
    fn test_combined_traversal() {
        let model = model();
        let config = CodegenConfig::default();
        let tr = Translator::new(&model, DecoratorView::none(), &config);
        let graph = DependencyGraph::with_roots(tr, ["r.Top", "r.Impl"]);
        let reach = find_reachable(
            &graph,
            ["r.Top"],
            &[
                (Direction::Outgoing, EdgeKind::Field.into()),
                (Direction::Incoming, EdgeKind::Hierarchy.into()),
            ],
        );
        assert_eq!(
            identities(&graph, &reach),
            vec!["r.Api", "r.Impl", "r.Leaf", "r.Mid", "r.Top"]
        );
    }

    #[test]
    fn test_cycle_closes_in_both_directions() {
        let model = FixtureModel::from_json_str(
            r#"{ "types": [
              { "name": "c.A", "module": "c", "fields": [ { "name": "b", "type": "c.B" } ] },
              { "name": "c.B", "module": "c", "fields": [ { "name": "a", "type": "c.A" } ] }
            ] }"#,
        )
        .unwrap();
        let config = CodegenConfig::default();
        let tr = Translator::new(&model, DecoratorView::none(), &config);
        let graph = DependencyGraph::with_roots(tr, ["c.A"]);
        for root in ["c.A", "c.B"] {
            let forward = find_all_dependencies(&graph, [root], EdgeKind::Field.into());
            assert_eq!(identities(&graph, &forward), vec!["c.A", "c.B"]);
            let backward = find_all_dependents(&graph, [root], EdgeKind::Field.into());
            assert_eq!(identities(&graph, &backward), vec!["c.A", "c.B"]);
        }
    }

    #[test]
    fn test_unknown_roots_are_ignored() {
        let model = model();
        let config = CodegenConfig::default();
        let tr = Translator::new(&model, DecoratorView::none(), &config);
        let graph = DependencyGraph::with_roots(tr, ["r.Leaf"]);
        let reach = find_all_dependencies(&graph, ["r.Nope"], EdgeKinds::ALL);
        assert!(reach.is_empty());
    }
}
