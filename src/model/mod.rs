//! The source type model: nominal types, declarations, and the capability
//! interface the translator queries instead of a live compiler.

pub mod fixture;
mod parse;

use serde::{Deserialize, Serialize};

/// Canonical name of the universal top type. A type-variable bound equal to it
/// is treated as "no bound".
pub const TOP_TYPE: &str = "java.lang.Object";

/// Primitive (non-reference) source types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Char,
    Float,
    Double,
}

impl Primitive {
    /// Parse a primitive keyword (`int`, `boolean`, ...).
    pub fn from_keyword(s: &str) -> Option<Primitive> {
        match s {
            "boolean" => Some(Primitive::Boolean),
            "byte" => Some(Primitive::Byte),
            "short" => Some(Primitive::Short),
            "int" => Some(Primitive::Int),
            "long" => Some(Primitive::Long),
            "char" => Some(Primitive::Char),
            "float" => Some(Primitive::Float),
            "double" => Some(Primitive::Double),
            _ => None,
        }
    }
}

/// The element that declares a type variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarOwner {
    /// Declared by a class or interface (`class Box<T>`).
    Type(String),
    /// Declared by a method (`<U> U get()`), identified by its declaring type and name.
    Method { ty: String, method: String },
}

/// Identity of a type variable: its declaring element plus its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeVarId {
    pub owner: VarOwner,
    pub name: String,
}

impl TypeVarId {
    pub fn of_type(ty: &str, name: &str) -> Self {
        Self {
            owner: VarOwner::Type(ty.to_owned()),
            name: name.to_owned(),
        }
    }

    pub fn of_method(ty: &str, method: &str, name: &str) -> Self {
        Self {
            owner: VarOwner::Method {
                ty: ty.to_owned(),
                method: method.to_owned(),
            },
            name: name.to_owned(),
        }
    }
}

/// A source type descriptor. Type-variable bounds are not embedded (they may
/// refer back to the variable); they are looked up through [`TypeModel::upper_bound`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Primitive(Primitive),
    Void,
    Null,
    /// Absent type. Also used as the placeholder argument of an erased generic use.
    None,
    Array(Box<SourceType>),
    Declared { name: String, args: Vec<SourceType> },
    TypeVar(TypeVarId),
    Wildcard {
        extends: Option<Box<SourceType>>,
        super_bound: Option<Box<SourceType>>,
    },
    /// A method type; only its type-parameter list is ever translated.
    Executable { type_params: Vec<SourceType> },
    Intersection(Vec<SourceType>),
    Union(Vec<SourceType>),
    Error,
}

impl SourceType {
    /// A declared type with explicit arguments.
    pub fn declared(name: &str, args: Vec<SourceType>) -> Self {
        SourceType::Declared {
            name: name.to_owned(),
            args,
        }
    }

    /// A declared type used without type arguments.
    pub fn raw(name: &str) -> Self {
        Self::declared(name, Vec::new())
    }

    /// The canonical name of a declared type, if this is one.
    pub fn declared_name(&self) -> Option<&str> {
        match self {
            SourceType::Declared { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The erased form: a declared type without arguments, arrays of erased
    /// components, everything else unchanged.
    pub fn erasure(&self) -> SourceType {
        match self {
            SourceType::Declared { name, .. } => SourceType::raw(name),
            SourceType::Array(component) => SourceType::Array(Box::new(component.erasure())),
            other => other.clone(),
        }
    }

    /// Textual form used in wire identifiers and diagnostics.
    pub fn display_name(&self) -> String {
        match self {
            SourceType::Primitive(p) => format!("{p:?}").to_lowercase(),
            SourceType::Void => "void".to_owned(),
            SourceType::Null => "null".to_owned(),
            SourceType::None => "none".to_owned(),
            SourceType::Array(c) => format!("{}[]", c.display_name()),
            SourceType::Declared { name, args } if args.is_empty() => name.clone(),
            SourceType::Declared { name, args } => format!(
                "{}<{}>",
                name,
                args.iter()
                    .map(SourceType::display_name)
                    .collect::<Vec<_>>()
                    .join(",")
            ),
            SourceType::TypeVar(var) => var.name.clone(),
            SourceType::Wildcard {
                extends: Some(b), ..
            } => format!("? extends {}", b.display_name()),
            SourceType::Wildcard {
                super_bound: Some(b),
                ..
            } => format!("? super {}", b.display_name()),
            SourceType::Wildcard { .. } => "?".to_owned(),
            SourceType::Executable { .. } => "<method>".to_owned(),
            SourceType::Intersection(parts) => parts
                .iter()
                .map(SourceType::display_name)
                .collect::<Vec<_>>()
                .join(" & "),
            SourceType::Union(parts) => parts
                .iter()
                .map(SourceType::display_name)
                .collect::<Vec<_>>()
                .join(" | "),
            SourceType::Error => "<error>".to_owned(),
        }
    }

    /// Replace every type variable bound in `bindings` by its binding.
    pub fn substitute(&self, bindings: &[(TypeVarId, SourceType)]) -> SourceType {
        match self {
            SourceType::TypeVar(var) => bindings
                .iter()
                .find(|(id, _)| id == var)
                .map(|(_, bound)| bound.clone())
                .unwrap_or_else(|| self.clone()),
            SourceType::Array(c) => SourceType::Array(Box::new(c.substitute(bindings))),
            SourceType::Declared { name, args } => SourceType::Declared {
                name: name.clone(),
                args: args.iter().map(|a| a.substitute(bindings)).collect(),
            },
            SourceType::Wildcard {
                extends,
                super_bound,
            } => SourceType::Wildcard {
                extends: extends.as_ref().map(|b| Box::new(b.substitute(bindings))),
                super_bound: super_bound.as_ref().map(|b| Box::new(b.substitute(bindings))),
            },
            SourceType::Intersection(parts) => {
                SourceType::Intersection(parts.iter().map(|p| p.substitute(bindings)).collect())
            }
            SourceType::Union(parts) => {
                SourceType::Union(parts.iter().map(|p| p.substitute(bindings)).collect())
            }
            other => other.clone(),
        }
    }
}

/// A (type, enclosing context) pair. The context decides how type variables
/// resolve: a variable of `Box<T>` viewed through `IntBox extends Box<Integer>`
/// resolves to `Integer`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    pub ty: SourceType,
    pub context: SourceType,
}

impl TypeRef {
    pub fn new(ty: SourceType, context: SourceType) -> Self {
        Self { ty, context }
    }

    /// A type viewed through itself.
    pub fn of_self(ty: SourceType) -> Self {
        Self {
            context: ty.clone(),
            ty,
        }
    }

    /// The same context with a different type.
    pub fn with(&self, ty: SourceType) -> Self {
        Self {
            ty,
            context: self.context.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    Class,
    Interface,
    Enum,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParam {
    pub name: String,
    pub bound: Option<SourceType>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: String,
    pub ty: SourceType,
    pub is_static: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDecl {
    pub name: String,
    pub ty: SourceType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    pub name: String,
    pub type_params: Vec<TypeParam>,
    pub params: Vec<ParamDecl>,
    pub returns: SourceType,
}

/// A class, interface or enum declaration as supplied by the type model host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    /// Canonical dotted name (`com.acme.Outer.Inner`), the globally unique identity.
    pub name: String,
    /// Binary ("flat") name (`com.acme.Outer$Inner`), when it differs from `name`.
    pub binary_name: Option<String>,
    /// Source module that owns the type; decides the target module.
    pub module: String,
    pub kind: DeclKind,
    pub is_abstract: bool,
    pub type_params: Vec<TypeParam>,
    pub superclass: Option<SourceType>,
    pub interfaces: Vec<SourceType>,
    pub fields: Vec<FieldDecl>,
    pub enum_constants: Vec<String>,
    pub methods: Vec<MethodDecl>,
}

impl TypeDecl {
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// The generic self type: `Box<T>` for `class Box<T>`.
    pub fn self_type(&self) -> SourceType {
        SourceType::Declared {
            name: self.name.clone(),
            args: self
                .type_params
                .iter()
                .map(|p| SourceType::TypeVar(TypeVarId::of_type(&self.name, &p.name)))
                .collect(),
        }
    }

    /// Concrete classes and enums can be instantiated from deserialized data.
    pub fn is_instantiable(&self) -> bool {
        match self.kind {
            DeclKind::Class => !self.is_abstract,
            DeclKind::Enum => true,
            DeclKind::Interface => false,
        }
    }

    /// The non-static fields declared directly on this type, in declaration order.
    pub fn instance_fields(&self) -> impl Iterator<Item = &FieldDecl> {
        self.fields
            .iter()
            .filter(|f| !f.is_static && !is_functional(&f.ty))
    }

    fn bindings_for(&self, args: &[SourceType]) -> Vec<(TypeVarId, SourceType)> {
        if args.len() != self.type_params.len() {
            return Vec::new();
        }
        self.type_params
            .iter()
            .zip(args)
            .map(|(p, a)| (TypeVarId::of_type(&self.name, &p.name), a.clone()))
            .collect()
    }
}

/// Fields holding lambdas cannot cross the wire.
fn is_functional(ty: &SourceType) -> bool {
    ty.declared_name()
        .is_some_and(|n| n.starts_with("java.util.function."))
}

/// Capability interface over whatever front-end produces the source model.
///
/// Only [`TypeModel::declaration`] is required; the other operations have
/// generic implementations over declarations and may be overridden by hosts
/// that can answer them natively.
pub trait TypeModel: Sync {
    /// Look up a class/interface/enum by canonical name.
    fn declaration(&self, name: &str) -> Option<&TypeDecl>;

    /// The declared upper bound of a type variable, if any.
    fn upper_bound(&self, var: &TypeVarId) -> Option<SourceType> {
        match &var.owner {
            VarOwner::Type(ty) => self
                .declaration(ty)?
                .type_params
                .iter()
                .find(|p| p.name == var.name)?
                .bound
                .clone(),
            VarOwner::Method { ty, method } => self
                .declaration(ty)?
                .methods
                .iter()
                .filter(|m| m.name == *method)
                .flat_map(|m| m.type_params.iter())
                .find(|p| p.name == var.name)?
                .bound
                .clone(),
        }
    }

    /// Direct supertypes of `ty` with the type's arguments substituted in.
    fn supertypes(&self, ty: &SourceType) -> Vec<SourceType> {
        let SourceType::Declared { name, args } = ty else {
            return Vec::new();
        };
        let Some(decl) = self.declaration(name) else {
            return Vec::new();
        };
        let bindings = decl.bindings_for(args);
        decl.superclass
            .iter()
            .chain(decl.interfaces.iter())
            .map(|s| s.substitute(&bindings))
            .collect()
    }

    /// View `ty` as its (possibly indirect) supertype named `target`.
    fn as_super(&self, ty: &SourceType, target: &str) -> Option<SourceType> {
        if ty.declared_name()? == target {
            return Some(ty.clone());
        }
        self.supertypes(ty)
            .iter()
            .find_map(|s| self.as_super(s, target))
    }

    /// Resolve `var` as a member of `context`. Returns `None` when the context
    /// does not determine it (method variables, raw contexts, unrelated types).
    fn member_of(&self, var: &TypeVarId, context: &SourceType) -> Option<SourceType> {
        let VarOwner::Type(owner) = &var.owner else {
            return None;
        };
        let decl = self.declaration(owner)?;
        let index = decl.type_params.iter().position(|p| p.name == var.name)?;
        match self.as_super(context, owner)? {
            SourceType::Declared { args, .. } if args.len() == decl.type_params.len() => {
                Some(args[index].clone())
            }
            _ => None,
        }
    }

    /// Stable, globally unique path of a type (`com/acme/Outer/Inner`).
    fn canonical_path(&self, name: &str) -> String {
        name.replace('.', "/")
    }

    /// Binary name used as the runtime type identity.
    fn binary_name(&self, name: &str) -> String {
        self.declaration(name)
            .and_then(|d| d.binary_name.clone())
            .unwrap_or_else(|| name.to_owned())
    }

    /// All non-static fields of a class, inherited fields first.
    fn all_fields(&self, name: &str) -> Vec<FieldDecl> {
        let Some(decl) = self.declaration(name) else {
            return Vec::new();
        };
        let mut fields = match decl.superclass.as_ref().and_then(SourceType::declared_name) {
            Some(sup) if sup != TOP_TYPE && sup != name => self.all_fields(sup),
            _ => Vec::new(),
        };
        fields.extend(decl.instance_fields().cloned());
        fields
    }
}
