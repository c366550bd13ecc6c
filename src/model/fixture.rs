//! A scripted, serde-loadable [`TypeModel`] implementation.
//!
//! Declarations are written as JSON with type expressions in source syntax:
//!
//! ```json
//! { "types": [
//!   { "name": "shapes.Circle", "module": "shapes",
//!     "type_params": ["T extends shapes.Circle<T>"],
//!     "fields": [ { "name": "radius", "type": "double" } ] }
//! ] }
//! ```

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::parse::{Scope, parse_type, split_type_param};
use super::{
    DeclKind, FieldDecl, MethodDecl, ParamDecl, SourceType, TOP_TYPE, TypeDecl, TypeModel,
    TypeParam,
};

#[derive(Debug, Deserialize)]
struct RawModel {
    types: Vec<RawDecl>,
}

#[derive(Debug, Deserialize)]
struct RawDecl {
    name: String,
    #[serde(default)]
    binary_name: Option<String>,
    module: String,
    #[serde(default = "default_kind")]
    kind: DeclKind,
    #[serde(default, rename = "abstract")]
    is_abstract: bool,
    #[serde(default)]
    type_params: Vec<String>,
    #[serde(default)]
    superclass: Option<String>,
    #[serde(default)]
    interfaces: Vec<String>,
    #[serde(default)]
    fields: Vec<RawField>,
    #[serde(default)]
    enum_constants: Vec<String>,
    #[serde(default)]
    methods: Vec<RawMethod>,
}

#[derive(Debug, Deserialize)]
struct RawField {
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default, rename = "static")]
    is_static: bool,
}

#[derive(Debug, Deserialize)]
struct RawMethod {
    name: String,
    #[serde(default)]
    type_params: Vec<String>,
    #[serde(default)]
    params: Vec<RawField>,
    #[serde(default = "default_returns")]
    returns: String,
}

fn default_kind() -> DeclKind {
    DeclKind::Class
}

fn default_returns() -> String {
    "void".to_owned()
}

/// An in-memory type model keyed by canonical name.
#[derive(Debug, Default, Clone)]
pub struct FixtureModel {
    decls: HashMap<String, TypeDecl>,
}

impl FixtureModel {
    /// Build a model from already-constructed declarations.
    pub fn from_decls(decls: impl IntoIterator<Item = TypeDecl>) -> Self {
        Self {
            decls: decls.into_iter().map(|d| (d.name.clone(), d)).collect(),
        }
    }

    /// Parse a model from its JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawModel = serde_json::from_str(json).context("invalid fixture model JSON")?;
        let decls = raw
            .types
            .into_iter()
            .map(|d| {
                let name = d.name.clone();
                build_decl(d).with_context(|| format!("in declaration of {name}"))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_decls(decls))
    }

    /// Load a model from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read type model {}", path.display()))?;
        Self::from_json_str(&contents)
            .with_context(|| format!("failed to parse type model {}", path.display()))
    }

    /// All declared canonical names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.decls.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

impl TypeModel for FixtureModel {
    fn declaration(&self, name: &str) -> Option<&TypeDecl> {
        self.decls.get(name)
    }
}

fn build_decl(raw: RawDecl) -> Result<TypeDecl> {
    let split: Vec<(String, Option<String>)> =
        raw.type_params.iter().map(|p| split_type_param(p)).collect();
    let param_names: Vec<String> = split.iter().map(|(n, _)| n.clone()).collect();
    let scope = Scope {
        declaring_type: &raw.name,
        type_params: &param_names,
        method: None,
    };

    let type_params = split
        .iter()
        .map(|(name, bound)| {
            Ok(TypeParam {
                name: name.clone(),
                bound: bound.as_deref().map(|b| parse_type(b, &scope)).transpose()?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let superclass = match (&raw.superclass, raw.kind) {
        (Some(s), _) => Some(parse_type(s, &scope)?),
        (None, DeclKind::Class) => Some(SourceType::raw(TOP_TYPE)),
        (None, DeclKind::Enum) => Some(SourceType::declared(
            "java.lang.Enum",
            vec![SourceType::raw(&raw.name)],
        )),
        (None, DeclKind::Interface) => None,
    };

    let interfaces = raw
        .interfaces
        .iter()
        .map(|i| parse_type(i, &scope))
        .collect::<Result<Vec<_>>>()?;

    let fields = raw
        .fields
        .iter()
        .map(|f| {
            Ok(FieldDecl {
                name: f.name.clone(),
                ty: parse_type(&f.ty, &scope)?,
                is_static: f.is_static,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let methods = raw
        .methods
        .iter()
        .map(|m| build_method(m, &raw.name, &param_names))
        .collect::<Result<Vec<_>>>()?;

    Ok(TypeDecl {
        name: raw.name,
        binary_name: raw.binary_name,
        module: raw.module,
        kind: raw.kind,
        is_abstract: raw.is_abstract,
        type_params,
        superclass,
        interfaces,
        fields,
        enum_constants: raw.enum_constants,
        methods,
    })
}

fn build_method(raw: &RawMethod, declaring_type: &str, class_params: &[String]) -> Result<MethodDecl> {
    let split: Vec<(String, Option<String>)> =
        raw.type_params.iter().map(|p| split_type_param(p)).collect();
    let method_params: Vec<String> = split.iter().map(|(n, _)| n.clone()).collect();
    let scope = Scope {
        declaring_type,
        type_params: class_params,
        method: Some((raw.name.as_str(), method_params.as_slice())),
    };

    let type_params = split
        .iter()
        .map(|(name, bound)| {
            Ok(TypeParam {
                name: name.clone(),
                bound: bound.as_deref().map(|b| parse_type(b, &scope)).transpose()?,
            })
        })
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("in type parameters of method {}", raw.name))?;

    let params = raw
        .params
        .iter()
        .map(|p| {
            Ok(ParamDecl {
                name: p.name.clone(),
                ty: parse_type(&p.ty, &scope)?,
            })
        })
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("in parameters of method {}", raw.name))?;

    Ok(MethodDecl {
        name: raw.name.clone(),
        type_params,
        params,
        returns: parse_type(&raw.returns, &scope)
            .with_context(|| format!("in return type of method {}", raw.name))?,
    })
}
