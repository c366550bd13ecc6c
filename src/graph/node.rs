use crate::model::DeclKind;
use crate::pojo::PojoClass;

/// A vertex of the dependency graph: one admitted source type and its
/// generated declaration.
#[derive(Debug, Clone)]
pub struct Vertex {
    pub pojo: PojoClass,
}

impl Vertex {
    pub fn new(pojo: PojoClass) -> Self {
        Self { pojo }
    }

    /// Canonical name of the source type.
    pub fn identity(&self) -> &str {
        &self.pojo.identity
    }

    /// Scoped target module the type is generated into.
    pub fn module(&self) -> &str {
        &self.pojo.module
    }

    pub fn kind(&self) -> DeclKind {
        self.pojo.kind
    }

    pub fn is_instantiable(&self) -> bool {
        self.pojo.is_instantiable()
    }
}
