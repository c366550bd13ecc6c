use thiserror::Error;

/// Failures surfaced by generation. Each aborts one unit of work (a type, or
/// the decorator table) and never the whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    /// Two fields with the same name across a class's inheritance chain.
    #[error("class {type_name} has a field named '{field}' that collides with a field of one of its parent classes")]
    NameCollision { type_name: String, field: String },

    #[error("decorator '{path}' in package '{package}' targets {identity}, which is not declared in the type model")]
    UnresolvedDecoratorTarget {
        identity: String,
        package: String,
        path: String,
    },

    #[error("decorator for {identity} in package '{package}' has no override path")]
    MissingOverride { identity: String, package: String },

    #[error("decorator path '{path}' for {identity} is not a valid module path")]
    InvalidDecoratorPath { identity: String, path: String },

    #[error("type {0} is not declared in the type model")]
    UnknownType(String),
}

impl CodegenError {
    /// The source type the error is attached to.
    pub fn identity(&self) -> &str {
        match self {
            CodegenError::NameCollision { type_name, .. } => type_name,
            CodegenError::UnresolvedDecoratorTarget { identity, .. }
            | CodegenError::MissingOverride { identity, .. }
            | CodegenError::InvalidDecoratorPath { identity, .. } => identity,
            CodegenError::UnknownType(identity) => identity,
        }
    }
}
