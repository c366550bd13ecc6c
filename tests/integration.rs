/// Integration test suite: drives the public API against the `zoo.json` fixture model.
///
/// The fixture covers an abstract hierarchy with an enum, a cross-module cycle
/// (`zoo.Keeper` <-> `ops.Shift`), a self-referential bound (`shapes.Box`), a
/// field-name collision (`zoo.Puppy`) and a remote service interface.
use std::path::PathBuf;

use petgraph::Direction;
use typebridge::factory::FactoryKind;
use typebridge::graph::edge::{EdgeKind, EdgeKinds};
use typebridge::graph::reach::{find_all_dependencies, find_all_dependents, identities};
use typebridge::model::fixture::FixtureModel;
use typebridge::output::CodegenStats;
use typebridge::{
    Codegen, CodegenConfig, CodegenError, DecoratorStore, DecoratorView, DependencyGraph, Flavor,
    NameMode, Translator,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("zoo.json")
}

fn model() -> FixtureModel {
    FixtureModel::load(&fixture_path()).expect("fixture model should load")
}

const DECORATED: &str = r#"
package_scope = "@zoo"

[[decorators]]
module = "zoo-api"
package = "zoo-decorators"
entries = { "zoo-decorators/Badge" = "zoo.Badge" }
"#;

/// Write `contents` as `typebridge.toml` in a fresh directory and load it.
fn load_config(contents: &str) -> CodegenConfig {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join(CodegenConfig::FILE_NAME), contents).expect("write config");
    CodegenConfig::load(dir.path()).expect("config should load")
}

const PORTABLES: &[&str] = &["zoo.Keeper", "zoo.Dog", "zoo.Cat", "shapes.Box"];
const REMOTES: &[&str] = &["zoo.KeeperService"];

// ---------------------------------------------------------------------------
// Translation
// ---------------------------------------------------------------------------

#[test]
fn test_self_referential_bound_terminates() {
    let model = model();
    let config = CodegenConfig::default();
    let tr = Translator::new(&model, DecoratorView::none(), &config);
    let graph = DependencyGraph::with_roots(tr, ["shapes.Box"]);

    let bx = &graph.vertex("shapes.Box").unwrap().pojo;
    assert!(bx
        .body
        .contains("export class Box<T extends Box<T>> implements Portable<Box<T>> {"));
    assert!(bx.body.contains("  public readonly inner?: T = undefined;"));
    assert_eq!(graph.vertex_count(), 1);
}

#[test]
fn test_numeric_types_are_boxed_and_opaque_types_have_no_imports() {
    let model = model();
    let config = CodegenConfig::default();
    let tr = Translator::new(&model, DecoratorView::none(), &config);
    let graph = DependencyGraph::with_roots(tr, ["zoo.Keeper"]);

    let keeper = &graph.vertex("zoo.Keeper").unwrap().pojo;
    assert!(keeper.body.contains("started?: any /* date */"));
    assert!(keeper.body.contains("animals?: Array<zoo_Animal>"));
    let lines: Vec<String> = keeper.resolved_imports().into_iter().map(|r| r.line).collect();
    assert!(lines.iter().all(|l| !l.contains("Date")));

    let log = &graph.vertex("ops.Log").unwrap().pojo;
    assert!(log.body.contains("entries?: JavaTreeMap<string, JavaLong>"));
    let symbols: Vec<String> = log.resolved_imports().into_iter().map(|r| r.symbol).collect();
    assert!(symbols.contains(&"JavaTreeMap".to_owned()));
    assert!(symbols.contains(&"JavaLong".to_owned()));
}

#[test]
fn test_simple_name_mode() {
    let model = model();
    let config = CodegenConfig::default();
    let tr = Translator::new(&model, DecoratorView::none(), &config).with_mode(NameMode::Simple);
    let graph = DependencyGraph::with_roots(tr, ["zoo.Keeper"]);
    let keeper = &graph.vertex("zoo.Keeper").unwrap().pojo;
    assert!(keeper.body.contains("animals?: Array<Animal>"));
    assert!(keeper.body.contains("shift?: Shift"));
}

// ---------------------------------------------------------------------------
// Dependency graph
// ---------------------------------------------------------------------------

#[test]
fn test_cycle_closure_in_both_directions() {
    let model = model();
    let config = CodegenConfig::default();
    let tr = Translator::new(&model, DecoratorView::none(), &config);
    let graph = DependencyGraph::with_roots(tr, ["ops.Shift"]);

    let deps = find_all_dependencies(&graph, ["ops.Shift"], EdgeKinds::EMPTY);
    assert!(identities(&graph, &deps).contains(&"zoo.Keeper"));
    let dependents = find_all_dependents(&graph, ["ops.Shift"], EdgeKinds::EMPTY);
    assert!(identities(&graph, &dependents).contains(&"zoo.Keeper"));

    assert_eq!(graph.kinds_between("zoo.Keeper", "ops.Shift"), EdgeKind::Field.into());
    assert_eq!(graph.kinds_between("ops.Shift", "zoo.Keeper"), EdgeKind::Field.into());
}

#[test]
fn test_hierarchy_edges_point_at_supertypes() {
    let model = model();
    let config = CodegenConfig::default();
    let tr = Translator::new(&model, DecoratorView::none(), &config);
    let graph = DependencyGraph::with_roots(tr, ["zoo.Dog", "zoo.Cat"]);

    let implementors: Vec<&str> = graph
        .neighbours("zoo.Animal", Direction::Incoming)
        .into_iter()
        .filter(|(_, kinds)| kinds.contains(EdgeKind::Hierarchy))
        .map(|(id, _)| id)
        .collect();
    assert_eq!(implementors, vec!["zoo.Cat", "zoo.Dog"]);
    // Inherited fields are re-declared in the constructor signature.
    assert!(graph
        .kinds_between("zoo.Dog", "zoo.Kind")
        .contains(EdgeKind::Field));
}

#[test]
fn test_name_collision_fails_only_that_type() {
    let model = model();
    let config = CodegenConfig::default();
    let tr = Translator::new(&model, DecoratorView::none(), &config);
    let mut graph = DependencyGraph::new(tr);

    assert!(graph.add("zoo.Puppy").is_none());
    assert!(graph.add("zoo.Dog").is_some());
    let failures: Vec<(&str, &CodegenError)> = graph.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(
        failures[0].1,
        &CodegenError::NameCollision {
            type_name: "zoo.Puppy".into(),
            field: "age".into(),
        }
    );
}

// ---------------------------------------------------------------------------
// Decorators and grouping
// ---------------------------------------------------------------------------

#[test]
fn test_config_loads_from_toml_file() {
    let config = load_config(DECORATED);
    assert_eq!(config.package_scope, "@zoo");
    assert_eq!(config.decorators.len(), 1);
    assert!(config.is_reserved("delete"));

    let defaults = CodegenConfig::load(tempfile::tempdir().unwrap().path()).unwrap();
    assert_eq!(defaults.package_scope, "@ts-generated");
}

#[test]
fn test_decorator_target_must_exist() {
    let model = model();
    let config = load_config(
        r#"
        [[decorators]]
        module = "zoo-api"
        package = "zoo-decorators"
        entries = { "zoo-decorators/Ghost" = "zoo.Ghost" }
        "#,
    );
    let err = DecoratorStore::from_config(&config, &model).unwrap_err();
    assert_eq!(err.identity(), "zoo.Ghost");
}

#[test]
fn test_decorator_substitution_and_self_exclusion() {
    let model = model();
    let config = load_config(DECORATED);
    let store = DecoratorStore::from_config(&config, &model).unwrap();
    let result = Codegen::new(&model, &store, &config)
        .generate(PORTABLES, REMOTES)
        .unwrap();

    let raw = result.group("@zoo/zoo-api", Flavor::Raw).unwrap();
    let keeper = raw.types.iter().find(|t| t.identity == "zoo.Keeper").unwrap();
    assert!(keeper.body.contains("badge?: zoo_Badge"));
    assert!(keeper
        .imports
        .iter()
        .any(|i| i.line == "import { Badge as zoo_Badge } from '../zoo/Badge';"));
    assert_eq!(raw.dependencies, vec!["@zoo/ops-api"]);

    let fin = result.group("@zoo/zoo-api", Flavor::Final).unwrap();
    let keeper = fin.types.iter().find(|t| t.identity == "zoo.Keeper").unwrap();
    assert!(keeper.body.contains("badge?: zoodecorators_Badge"));
    assert_eq!(fin.dependencies, vec!["@zoo/ops-api", "zoo-decorators"]);

    // Undecorated modules see the override too, but depend on the decorated
    // module rather than the decorator package.
    let ops = result.group("@zoo/ops-api", Flavor::Undecorated).unwrap();
    let log = ops.types.iter().find(|t| t.identity == "ops.Log").unwrap();
    assert!(log.body.contains("signedBy?: zoodecorators_Badge"));
    assert!(log
        .imports
        .iter()
        .any(|i| i.line == "import { Badge as zoodecorators_Badge } from 'zoo-decorators';"));
    assert_eq!(ops.dependencies, vec!["@zoo/zoo-api"]);
    assert!(result.group("@zoo/ops-api", Flavor::Raw).is_none());
}

#[test]
fn test_generation_is_deterministic() {
    let model = model();
    let config = load_config(DECORATED);
    let store = DecoratorStore::from_config(&config, &model).unwrap();
    let codegen = Codegen::new(&model, &store, &config);

    let first = codegen.generate(PORTABLES, REMOTES).unwrap();
    let reversed: Vec<&str> = PORTABLES.iter().rev().copied().collect();
    let second = codegen.generate(&reversed, REMOTES).unwrap();

    assert_eq!(first.groups, second.groups);
    assert_eq!(first.factories, second.factories);
    assert_eq!(first.stats, second.stats);
    assert_eq!(
        serde_json::to_string(&first.groups).unwrap(),
        serde_json::to_string(&second.groups).unwrap()
    );
}

#[test]
fn test_failures_are_reported_without_aborting() {
    let model = model();
    let store = DecoratorStore::default();
    let config = CodegenConfig::default();
    let result = Codegen::new(&model, &store, &config)
        .generate(&["zoo.Puppy", "zoo.Keeper"], &[])
        .unwrap();

    assert_eq!(result.stats.failures, 1);
    assert!(result.failures.contains_key("zoo.Puppy"));
    let zoo = result.group("@ts-generated/zoo-api", Flavor::Undecorated).unwrap();
    assert!(zoo.types.iter().any(|t| t.identity == "zoo.Keeper"));
    assert!(zoo.types.iter().all(|t| t.identity != "zoo.Puppy"));
}

// ---------------------------------------------------------------------------
// Factories and remote callers
// ---------------------------------------------------------------------------

#[test]
fn test_factory_table_covers_every_concrete_subtype() {
    let model = model();
    let store = DecoratorStore::default();
    let config = CodegenConfig::default();
    // Subtypes are only known to the graph once admitted as roots.
    let result = Codegen::new(&model, &store, &config)
        .generate(PORTABLES, REMOTES)
        .unwrap();

    let table = &result.factories["zoo.KeeperService|findAnimals:"];
    assert_eq!(table.keys(), vec!["zoo.Cat", "zoo.Dog", "zoo.Kind"]);
    assert_eq!(table.entries[2].kind, FactoryKind::EnumDispatch);

    let dog = &table.entries[1];
    assert_eq!(dog.kind, FactoryKind::Constructor);
    assert_eq!(
        dog.source,
        "() => new zoo_Dog({ age: new JavaInteger(\"0\"), weight: new JavaDouble(\"0\") }) as any"
    );
    assert_eq!(
        table.entries[0].source,
        "() => new zoo_Cat({ lives: new JavaLong(\"0\") }) as any"
    );
}

#[test]
fn test_remote_caller_module_and_body() {
    let model = model();
    let store = DecoratorStore::default();
    let config = CodegenConfig::default();
    let result = Codegen::new(&model, &store, &config)
        .generate(&[], REMOTES)
        .unwrap();

    let rpc = result
        .group("@ts-generated/zoo-services-rpc", Flavor::Undecorated)
        .unwrap();
    assert_eq!(rpc.types.len(), 1);
    let caller = &rpc.types[0];
    assert!(caller
        .body
        .starts_with("import { rpc, marshall, unmarshall } from 'typebridge-runtime';"));
    assert!(caller.body.contains("public findKeeper(args: { id: string })"));
    assert!(caller
        .body
        .contains("return rpc(\"zoo.KeeperService|findKeeper:java.lang.String:\", [marshall(args.id)])"));
    assert!(caller.body.contains("])) as Array<zoo_Animal>;"));
    assert!(rpc.dependencies.contains(&"@ts-generated/zoo-api".to_owned()));
    assert!(rpc.dependencies.contains(&"@ts-generated/ops-api".to_owned()));
}

#[test]
fn test_stats_summarize_the_run() {
    let model = model();
    let config = load_config(DECORATED);
    let store = DecoratorStore::from_config(&config, &model).unwrap();
    let result = Codegen::new(&model, &store, &config)
        .generate(PORTABLES, REMOTES)
        .unwrap();

    let stats: &CodegenStats = &result.stats;
    assert_eq!(stats.raw_modules, 1);
    assert_eq!(stats.remote_callers, 1);
    assert_eq!(stats.failures, 0);
    assert_eq!(
        stats.modules,
        result.groups.iter().filter(|g| g.flavor != Flavor::Raw).count()
    );
    assert_eq!(
        stats.factory_entries,
        result.factories.values().map(|t| t.len()).sum::<usize>()
    );
    let json = serde_json::to_value(stats).unwrap();
    assert_eq!(json["remote_callers"], 1);
}
