use thiserror::Error;

use crate::imports::{BuiltInWrapper, ImportEntry};

/// Where a representation is being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderContext {
    /// Declaring a type or method: type variables carry their bounds.
    Declaration,
    /// Referencing a type: the full parameterized form.
    UseSite,
    /// Only the bare symbol, as bound by an import statement.
    ImportOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("{variant} cannot be rendered in {context:?} context")]
    IllegalContext {
        variant: &'static str,
        context: RenderContext,
    },
}

/// The result of translating one source type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetRepr {
    /// A fixed target expression.
    Scalar(String),
    /// A numeric type, always rendered as its wrapper symbol.
    BoxedNumeric(&'static BuiltInWrapper),
    ArrayOf(Box<TargetRepr>),
    /// A named type with its own imports and translated type arguments.
    Generic {
        name: String,
        imports: Vec<ImportEntry>,
        args: Vec<TargetRepr>,
    },
    TypeVariable {
        use_form: String,
        declaration_form: String,
        bound_imports: Vec<ImportEntry>,
    },
}

impl TargetRepr {
    pub fn scalar(text: impl Into<String>) -> Self {
        TargetRepr::Scalar(text.into())
    }

    /// The lossy escape hatch: `any` with a comment naming what was dropped.
    pub fn opaque(tag: &str) -> Self {
        TargetRepr::Scalar(format!("any /* {tag} */"))
    }

    pub fn try_render(&self, context: RenderContext) -> Result<String, RenderError> {
        match self {
            TargetRepr::Scalar(text) => Ok(text.clone()),
            TargetRepr::BoxedNumeric(wrapper) => Ok(wrapper.symbol.to_owned()),
            TargetRepr::ArrayOf(component) => match context {
                RenderContext::ImportOnly => component.try_render(context),
                _ => Ok(format!("{}[]", component.try_render(context)?)),
            },
            TargetRepr::Generic { name, args, .. } => {
                if context == RenderContext::ImportOnly || args.is_empty() {
                    return Ok(name.clone());
                }
                let args = args
                    .iter()
                    .map(|a| a.try_render(context))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(format!("{}<{}>", name, args.join(", ")))
            }
            TargetRepr::TypeVariable {
                use_form,
                declaration_form,
                ..
            } => match context {
                RenderContext::UseSite => Ok(use_form.clone()),
                RenderContext::Declaration => Ok(declaration_form.clone()),
                RenderContext::ImportOnly => Err(RenderError::IllegalContext {
                    variant: "type variable",
                    context,
                }),
            },
        }
    }

    /// Render in `context`.
    ///
    /// # Panics
    ///
    /// Panics when the variant does not support `context`. That is a wiring
    /// error, never a property of the input.
    pub fn render(&self, context: RenderContext) -> String {
        self.try_render(context).unwrap_or_else(|err| panic!("{err}"))
    }

    /// Every import entry required by this subtree, own entries first.
    pub fn imports(&self) -> Vec<ImportEntry> {
        match self {
            TargetRepr::Scalar(_) => Vec::new(),
            TargetRepr::BoxedNumeric(wrapper) => vec![ImportEntry::BuiltIn(*wrapper)],
            TargetRepr::ArrayOf(component) => component.imports(),
            TargetRepr::Generic { imports, args, .. } => imports
                .iter()
                .cloned()
                .chain(args.iter().flat_map(TargetRepr::imports))
                .collect(),
            TargetRepr::TypeVariable { bound_imports, .. } => bound_imports.clone(),
        }
    }

    /// Only named types backed by an import can appear in an `extends` clause.
    pub fn can_be_subclassed(&self) -> bool {
        matches!(self, TargetRepr::Generic { imports, .. } if !imports.is_empty())
    }

    pub fn is_boxed_numeric(&self) -> bool {
        matches!(self, TargetRepr::BoxedNumeric(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::builtin::{JAVA_INTEGER, JAVA_TREE_MAP};

    fn type_var() -> TargetRepr {
        TargetRepr::TypeVariable {
            use_form: "T".into(),
            declaration_form: "T extends Box<T>".into(),
            bound_imports: Vec::new(),
        }
    }

    #[test]
    fn test_generic_renders_by_context() {
        let repr = TargetRepr::Generic {
            name: "JavaTreeMap".into(),
            imports: vec![ImportEntry::BuiltIn(&JAVA_TREE_MAP)],
            args: vec![TargetRepr::scalar("string"), TargetRepr::BoxedNumeric(&JAVA_INTEGER)],
        };
        assert_eq!(
            repr.render(RenderContext::UseSite),
            "JavaTreeMap<string, JavaInteger>"
        );
        assert_eq!(repr.render(RenderContext::ImportOnly), "JavaTreeMap");
        assert_eq!(repr.imports().len(), 2);
        assert!(repr.can_be_subclassed());
    }

    #[test]
    fn test_array_forwards_import_only() {
        let repr = TargetRepr::ArrayOf(Box::new(TargetRepr::BoxedNumeric(&JAVA_INTEGER)));
        assert_eq!(repr.render(RenderContext::UseSite), "JavaInteger[]");
        assert_eq!(repr.render(RenderContext::ImportOnly), "JavaInteger");
    }

    #[test]
    fn test_type_variable_forms() {
        let repr = type_var();
        assert_eq!(repr.render(RenderContext::UseSite), "T");
        assert_eq!(repr.render(RenderContext::Declaration), "T extends Box<T>");
        assert_eq!(
            repr.try_render(RenderContext::ImportOnly),
            Err(RenderError::IllegalContext {
                variant: "type variable",
                context: RenderContext::ImportOnly,
            })
        );
    }

    #[test]
    #[should_panic(expected = "type variable cannot be rendered")]
    fn test_render_panics_on_illegal_context() {
        type_var().render(RenderContext::ImportOnly);
    }

    #[test]
    fn test_method_type_parameter_list() {
        let repr = TargetRepr::Generic {
            name: String::new(),
            imports: Vec::new(),
            args: vec![type_var(), TargetRepr::scalar("S")],
        };
        assert_eq!(
            repr.render(RenderContext::Declaration),
            "<T extends Box<T>, S>"
        );
        assert!(!repr.can_be_subclassed());
    }

    #[test]
    fn test_opaque_has_no_imports() {
        let repr = TargetRepr::opaque("unknown");
        assert_eq!(repr.render(RenderContext::UseSite), "any /* unknown */");
        assert!(repr.imports().is_empty());
    }
}
