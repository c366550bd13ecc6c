//! Source type -> target representation.

pub mod builtin;
pub mod repr;

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::config::CodegenConfig;
use crate::decorators::DecoratorView;
use crate::imports::{GeneratedRef, ImportEntry};
use crate::model::{Primitive, SourceType, TOP_TYPE, TypeDecl, TypeModel, TypeRef, TypeVarId};
use builtin::{BuiltIn, JAVA_INTEGER, JAVA_OPTIONAL};
use repr::{RenderContext, TargetRepr};

/// Type variables being expanded on the current translation path. Entries
/// are removed once their expansion returns, so sibling type arguments never
/// see each other's variables.
pub type VisitedVars = HashSet<TypeVarId>;

static NON_IDENTIFIER: OnceLock<Regex> = OnceLock::new();

/// `com.acme.Outer.Inner` becomes `com_acme_Outer_Inner`.
fn sanitize(name: &str) -> String {
    NON_IDENTIFIER
        .get_or_init(|| Regex::new(r"[^A-Za-z0-9_$]").expect("invalid identifier regex"))
        .replace_all(name, "_")
        .into_owned()
}

/// How generated types are named at use sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameMode {
    /// Sanitized canonical names, unique across modules.
    #[default]
    Qualified,
    /// Bare simple names.
    Simple,
}

/// Translates source types under a fixed decorator view, naming mode and
/// configuration. Pure: discovered types are reported through the import
/// entries of the result, never registered.
#[derive(Clone, Copy)]
pub struct Translator<'a> {
    model: &'a dyn TypeModel,
    decorators: DecoratorView<'a>,
    config: &'a CodegenConfig,
    mode: NameMode,
}

impl<'a> Translator<'a> {
    pub fn new(
        model: &'a dyn TypeModel,
        decorators: DecoratorView<'a>,
        config: &'a CodegenConfig,
    ) -> Self {
        Self {
            model,
            decorators,
            config,
            mode: NameMode::default(),
        }
    }

    pub fn with_mode(self, mode: NameMode) -> Self {
        Self { mode, ..self }
    }

    /// The same translator over a different decorator view.
    pub fn with_decorators(self, decorators: DecoratorView<'a>) -> Self {
        Self { decorators, ..self }
    }

    pub fn without_decorators(self) -> Self {
        self.with_decorators(DecoratorView::none())
    }

    pub fn model(&self) -> &'a dyn TypeModel {
        self.model
    }

    pub fn decorators(&self) -> DecoratorView<'a> {
        self.decorators
    }

    pub fn config(&self) -> &'a CodegenConfig {
        self.config
    }

    pub fn mode(&self) -> NameMode {
        self.mode
    }

    /// Scoped target module of a declared type.
    pub fn module_of(&self, identity: &str) -> Option<String> {
        self.model
            .declaration(identity)
            .map(|decl| self.config.scoped(&decl.module))
    }

    /// Translate with a fresh visited set.
    pub fn translate_fresh(&self, r: &TypeRef) -> TargetRepr {
        self.translate(r, &mut VisitedVars::new())
    }

    /// Translate `r`. `visited` guards the current recursion path.
    pub fn translate(&self, r: &TypeRef, visited: &mut VisitedVars) -> TargetRepr {
        match &r.ty {
            SourceType::Primitive(Primitive::Boolean) => TargetRepr::scalar("boolean"),
            SourceType::Primitive(Primitive::Char) => TargetRepr::scalar("string"),
            SourceType::Primitive(p) => match builtin::numeric_primitive(*p) {
                Some(wrapper) => TargetRepr::BoxedNumeric(wrapper),
                None => TargetRepr::opaque("unknown"),
            },
            SourceType::Void => TargetRepr::scalar("void"),
            SourceType::Null => TargetRepr::scalar("null"),
            SourceType::None => TargetRepr::scalar("any"),
            SourceType::Array(component) => {
                TargetRepr::ArrayOf(Box::new(self.translate(&r.with((**component).clone()), visited)))
            }
            SourceType::TypeVar(var) => self.translate_var(r, var, visited),
            SourceType::Declared { name, args } => self.translate_declared(r, name, args, visited),
            SourceType::Wildcard {
                extends: Some(bound),
                ..
            } => self.translate(&r.with((**bound).clone()), visited),
            SourceType::Wildcard {
                super_bound: Some(bound),
                ..
            } => TargetRepr::Generic {
                name: "Partial".to_owned(),
                imports: Vec::new(),
                args: vec![self.translate(&r.with((**bound).clone()), visited)],
            },
            SourceType::Wildcard { .. } => TargetRepr::opaque("wildcard"),
            SourceType::Executable { type_params } if type_params.is_empty() => {
                TargetRepr::scalar("")
            }
            SourceType::Executable { type_params } => TargetRepr::Generic {
                name: String::new(),
                imports: Vec::new(),
                args: type_params
                    .iter()
                    .map(|p| self.translate(&r.with(p.clone()), visited))
                    .collect(),
            },
            SourceType::Intersection(_) | SourceType::Union(_) | SourceType::Error => {
                TargetRepr::opaque("unknown")
            }
        }
    }

    fn translate_var(&self, r: &TypeRef, var: &TypeVarId, visited: &mut VisitedVars) -> TargetRepr {
        if visited.contains(var) {
            return TargetRepr::scalar(var.name.clone());
        }
        match self.model.member_of(var, &r.context) {
            Some(SourceType::TypeVar(resolved)) => self.type_variable(r, &resolved),
            Some(concrete) => {
                visited.insert(var.clone());
                let repr = self.translate(&r.with(concrete), visited);
                visited.remove(var);
                repr
            }
            None => self.type_variable(r, var),
        }
    }

    fn type_variable(&self, r: &TypeRef, var: &TypeVarId) -> TargetRepr {
        let bound = self
            .model
            .upper_bound(var)
            .filter(|b| *b != SourceType::Null && b.declared_name() != Some(TOP_TYPE));
        let Some(bound) = bound else {
            return TargetRepr::TypeVariable {
                use_form: var.name.clone(),
                declaration_form: var.name.clone(),
                bound_imports: Vec::new(),
            };
        };
        let mut seeded = VisitedVars::from([var.clone()]);
        let bound = self.translate(&r.with(bound), &mut seeded);
        TargetRepr::TypeVariable {
            use_form: var.name.clone(),
            declaration_form: format!("{} extends {}", var.name, bound.render(RenderContext::UseSite)),
            bound_imports: bound.imports(),
        }
    }

    fn translate_declared(
        &self,
        r: &TypeRef,
        name: &str,
        args: &[SourceType],
        visited: &mut VisitedVars,
    ) -> TargetRepr {
        let decl = self.model.declaration(name);

        match builtin::lookup(name) {
            Some(BuiltIn::Numeric(wrapper)) => return TargetRepr::BoxedNumeric(wrapper),
            Some(BuiltIn::Scalar(text)) => return TargetRepr::scalar(text),
            Some(BuiltIn::Abstract(wrapper)) => {
                return TargetRepr::Generic {
                    name: wrapper.symbol.to_owned(),
                    imports: vec![ImportEntry::BuiltIn(wrapper)],
                    args: Vec::new(),
                };
            }
            Some(BuiltIn::OptionalInt) => {
                return TargetRepr::Generic {
                    name: JAVA_OPTIONAL.symbol.to_owned(),
                    imports: vec![ImportEntry::BuiltIn(&JAVA_OPTIONAL)],
                    args: vec![TargetRepr::BoxedNumeric(&JAVA_INTEGER)],
                };
            }
            Some(BuiltIn::Container {
                name: target,
                wrapper,
                arity,
            }) => {
                let arity = decl.map_or(arity, |d| d.type_params.len());
                return TargetRepr::Generic {
                    name: target.to_owned(),
                    imports: wrapper.map(ImportEntry::BuiltIn).into_iter().collect(),
                    args: self.translate_args(r, args, arity, visited),
                };
            }
            None => {}
        }

        if let Some(tag) = builtin::opaque_tag(name) {
            return TargetRepr::opaque(tag);
        }
        if let Some(tag) = self.config.opaque_types.get(name) {
            return TargetRepr::opaque(tag);
        }

        let Some(decl) = decl else {
            debug!(identity = name, "declared type missing from the type model");
            return TargetRepr::opaque("unresolved");
        };

        let args = self.translate_args(r, args, decl.type_params.len(), visited);

        let context_module = self.context_module(r);
        if self.decorators.should_override(name, context_module) {
            if let Some(entry) = self.decorators.override_for(name) {
                return TargetRepr::Generic {
                    name: entry.alias(),
                    imports: vec![ImportEntry::Decorator(entry.clone())],
                    args,
                };
            }
        }

        let local = self.local_name(r, decl);
        TargetRepr::Generic {
            name: local.clone(),
            imports: vec![ImportEntry::Generated(GeneratedRef {
                identity: decl.name.clone(),
                module: self.config.scoped(&decl.module),
                path: self.model.canonical_path(&decl.name),
                alias: local,
            })],
            args,
        }
    }

    /// Explicit arguments, or one placeholder per parameter for an erased use.
    fn translate_args(
        &self,
        r: &TypeRef,
        args: &[SourceType],
        arity: usize,
        visited: &mut VisitedVars,
    ) -> Vec<TargetRepr> {
        if args.is_empty() {
            let placeholder = TypeRef::of_self(SourceType::None);
            return (0..arity)
                .map(|_| self.translate(&placeholder, visited))
                .collect();
        }
        args.iter()
            .map(|a| self.translate(&r.with(a.clone()), visited))
            .collect()
    }

    fn local_name(&self, r: &TypeRef, decl: &TypeDecl) -> String {
        if self.mode == NameMode::Simple || r.context.declared_name() == Some(decl.name.as_str()) {
            decl.simple_name().to_owned()
        } else {
            sanitize(&decl.name)
        }
    }

    /// Unscoped source module of the context type.
    fn context_module(&self, r: &TypeRef) -> Option<&'a str> {
        let name = r.context.declared_name()?;
        self.model.declaration(name).map(|d| d.module.as_str())
    }
}
