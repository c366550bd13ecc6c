//! Client stubs for remote service interfaces.

use std::collections::BTreeMap;

use crate::error::CodegenError;
use crate::factory::{FactoryTable, build_factory_table};
use crate::graph::DependencyGraph;
use crate::graph::edge::{EdgeKind, EdgeKinds};
use crate::imports::store::{ImportStore, ResolvedImport};
use crate::imports::{ImportEntry, RUNTIME_MODULE};
use crate::model::{MethodDecl, SourceType, TOP_TYPE, TypeDecl, TypeModel, TypeRef, TypeVarId};
use crate::translate::Translator;
use crate::translate::repr::{RenderContext, TargetRepr};

/// Generated caller class for one remote interface.
#[derive(Debug, Clone)]
pub struct RemoteCaller {
    pub identity: String,
    /// Scoped module: the interface's module suffixed with `-rpc`.
    pub module: String,
    pub path: String,
    pub body: String,
    /// Factory table per rpc endpoint string.
    pub factories: BTreeMap<String, FactoryTable>,
    imports: ImportStore,
}

impl RemoteCaller {
    pub fn dependencies(&self) -> Vec<(ImportEntry, EdgeKinds)> {
        self.imports.imports()
    }

    pub fn resolved_imports(&self) -> Vec<ResolvedImport> {
        self.imports.resolved()
    }
}

/// A method together with the interface that declares it.
#[derive(Clone, Copy)]
struct Member<'d> {
    owner: &'d str,
    decl: &'d MethodDecl,
}

struct Method<'d> {
    /// Emitted name, possibly suffixed.
    name: String,
    member: Member<'d>,
}

/// Generate the caller for remote interface `identity`, admitting every type
/// its signatures reference into `graph`.
pub fn generate(graph: &mut DependencyGraph<'_>, identity: &str) -> Result<RemoteCaller, CodegenError> {
    let translator = *graph.translator();
    let model = translator.model();
    let config = translator.config();
    let decl = model
        .declaration(identity)
        .ok_or_else(|| CodegenError::UnknownType(identity.to_owned()))?;

    let module = format!("{}-rpc", config.scoped(&decl.module));
    let path = model.canonical_path(identity);
    let self_ty = decl.self_type();

    let mut caller = Caller {
        translator,
        self_ty: self_ty.clone(),
        interface: identity,
        store: ImportStore::new(identity, &module, &path),
        factories: BTreeMap::new(),
    };

    let plain = translator.without_decorators();
    let name_repr = caller
        .store
        .with(EdgeKind::Hierarchy, plain.translate_fresh(&TypeRef::of_self(self_ty)));
    let class_name = name_repr.render(RenderContext::Declaration);

    let methods = resolve_names(collect_methods(model, decl), |n| config.is_reserved(n));
    let rendered: Vec<String> = methods
        .iter()
        .map(|m| caller.method(graph, m))
        .collect();

    let imports = caller.store.render();
    let body = format!(
        "import {{ rpc, marshall, unmarshall }} from '{RUNTIME_MODULE}';\n{imports}\n\nexport class {class_name} {{\n{}}}\n",
        rendered.join("\n")
    );

    Ok(RemoteCaller {
        identity: identity.to_owned(),
        module,
        path,
        body,
        factories: caller.factories,
        imports: caller.store,
    })
}

/// Methods of the interface and its superinterfaces, own methods first. An
/// inherited method is hidden by a collected one with the same name and
/// erased parameter list.
fn collect_methods<'d>(model: &'d dyn TypeModel, decl: &'d TypeDecl) -> Vec<Member<'d>> {
    let mut methods: Vec<Member<'d>> = decl
        .methods
        .iter()
        .map(|m| Member {
            owner: decl.name.as_str(),
            decl: m,
        })
        .collect();
    for iface in &decl.interfaces {
        let Some(name) = iface.declared_name() else {
            continue;
        };
        if name == TOP_TYPE || name == decl.name {
            continue;
        }
        if let Some(parent) = model.declaration(name) {
            for inherited in collect_methods(model, parent) {
                let signature = erased_signature(model, inherited.decl);
                let hidden = methods.iter().any(|m| {
                    std::ptr::eq(m.decl, inherited.decl)
                        || (m.decl.name == inherited.decl.name
                            && erased_signature(model, m.decl) == signature)
                });
                if !hidden {
                    methods.push(inherited);
                }
            }
        }
    }
    methods
}

/// Overloaded and reserved names get an index suffix, in declaration order.
/// Groups are emitted sorted by name.
fn resolve_names<'d>(methods: Vec<Member<'d>>, is_reserved: impl Fn(&str) -> bool) -> Vec<Method<'d>> {
    let mut groups: BTreeMap<&str, Vec<Member<'d>>> = BTreeMap::new();
    for member in methods {
        groups.entry(member.decl.name.as_str()).or_default().push(member);
    }
    let mut resolved = Vec::new();
    for (name, group) in groups {
        let suffix = group.len() > 1 || is_reserved(name);
        for (i, member) in group.into_iter().enumerate() {
            let name = if suffix { format!("{name}{i}") } else { name.to_owned() };
            resolved.push(Method { name, member });
        }
    }
    resolved
}

fn erased_signature(model: &dyn TypeModel, method: &MethodDecl) -> Vec<String> {
    method.params.iter().map(|p| erased_name(model, &p.ty)).collect()
}

/// Erased textual form of a parameter type, as used in the endpoint string.
fn erased_name(model: &dyn TypeModel, ty: &SourceType) -> String {
    match ty {
        SourceType::TypeVar(var) => model
            .upper_bound(var)
            .map(|b| erased_name(model, &b))
            .unwrap_or_else(|| TOP_TYPE.to_owned()),
        SourceType::Intersection(parts) => parts
            .first()
            .map(|p| erased_name(model, p))
            .unwrap_or_else(|| TOP_TYPE.to_owned()),
        SourceType::Array(component) => format!("{}[]", erased_name(model, component)),
        other => other.erasure().display_name(),
    }
}

struct Caller<'a, 'i> {
    translator: Translator<'a>,
    self_ty: SourceType,
    interface: &'i str,
    store: ImportStore,
    factories: BTreeMap<String, FactoryTable>,
}

impl Caller<'_, '_> {
    /// Admit every type behind `repr` and record its imports as code.
    fn importing(&mut self, graph: &mut DependencyGraph<'_>, repr: TargetRepr) -> TargetRepr {
        for entry in repr.imports() {
            if let Some(identity) = entry.source_identity() {
                graph.add(identity);
            }
        }
        self.store.with(EdgeKind::Code, repr)
    }

    fn method(&mut self, graph: &mut DependencyGraph<'_>, method: &Method<'_>) -> String {
        let model = self.translator.model();
        let plain = self.translator.without_decorators();
        let Member { owner, decl } = method.member;
        let context = self.self_ty.clone();
        let in_context = |ty: SourceType| TypeRef::new(ty, context.clone());

        let type_params = SourceType::Executable {
            type_params: decl
                .type_params
                .iter()
                .map(|p| SourceType::TypeVar(TypeVarId::of_method(owner, &decl.name, &p.name)))
                .collect(),
        };
        let type_params = plain.translate_fresh(&in_context(type_params));
        let type_params = self
            .importing(graph, type_params)
            .render(RenderContext::Declaration);

        let mut params = Vec::new();
        let mut marshalled = Vec::new();
        for param in &decl.params {
            let repr = plain.translate_fresh(&in_context(param.ty.clone()));
            let rendered = self.importing(graph, repr).render(RenderContext::UseSite);
            params.push(format!("{}: {}", param.name, rendered));
            marshalled.push(format!("marshall(args.{})", param.name));
        }

        let endpoint = format!(
            "{}|{}:{}",
            self.interface,
            decl.name,
            erased_signature(model, decl)
                .iter()
                .map(|p| format!("{p}:"))
                .collect::<String>()
        );

        let returns = self.translator.translate_fresh(&in_context(decl.returns.clone()));
        let returns = self.importing(graph, returns);
        let return_type = returns.render(RenderContext::UseSite);

        let factories = build_factory_table(graph, &self.translator, &returns);
        for entry in factories.imports() {
            self.store.record(EdgeKind::Code, entry.clone());
        }
        let oracle = factories.render("             ");
        self.factories.insert(endpoint.clone(), factories);

        format!(
            "\n  public {name}{type_params}(args: {{ {params} }}) {{\n\
             \x20   return rpc(\"{endpoint}\", [{marshalled}])\n\
             \x20     .then((json: string) => {{\n\
             \x20       return unmarshall(json, new Map([\n\
             {oracle}\n\
             \x20       ])) as {return_type};\n\
             \x20     }});\n\
             \x20 }}\n",
            name = method.name,
            params = params.join(", "),
            marshalled = marshalled.join(", "),
        )
    }
}
