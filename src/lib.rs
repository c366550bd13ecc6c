//! Translates types of a nominal, generic source object model into
//! TypeScript-like declarations and tracks the cross-module imports the
//! generated text needs.

pub mod config;
pub mod decorators;
pub mod error;
pub mod factory;
pub mod graph;
pub mod grouper;
pub mod imports;
pub mod model;
pub mod output;
pub mod pojo;
pub mod remote;
pub mod translate;

pub use config::CodegenConfig;
pub use decorators::{DecoratorStore, DecoratorView};
pub use error::CodegenError;
pub use graph::DependencyGraph;
pub use grouper::{Codegen, CodegenResult, Flavor, GeneratedType, ModuleGroup};
pub use model::{SourceType, TypeModel, TypeRef};
pub use translate::{NameMode, Translator};
