//! Generated declaration body for one class, interface or enum.

use std::collections::HashSet;

use crate::error::CodegenError;
use crate::graph::edge::{EdgeKind, EdgeKinds};
use crate::imports::store::{ImportStore, ResolvedImport};
use crate::imports::{ImportEntry, RUNTIME_MODULE};
use crate::model::{DeclKind, SourceType, TOP_TYPE, TypeDecl, TypeRef};
use crate::translate::Translator;
use crate::translate::repr::{RenderContext, TargetRepr};

/// The generated text of one source type plus the imports it needs.
#[derive(Debug, Clone)]
pub struct PojoClass {
    pub identity: String,
    /// Scoped target module.
    pub module: String,
    /// Path of the declaration within its module.
    pub path: String,
    pub kind: DeclKind,
    pub is_abstract: bool,
    pub body: String,
    imports: ImportStore,
}

impl PojoClass {
    /// Generate the body of `identity`.
    ///
    /// References to the type itself and to its supertypes are translated
    /// without decorators; fields use the translator's decorator view.
    pub fn generate(translator: &Translator<'_>, identity: &str) -> Result<PojoClass, CodegenError> {
        let model = translator.model();
        let decl = model
            .declaration(identity)
            .ok_or_else(|| CodegenError::UnknownType(identity.to_owned()))?;
        let module = translator.config().scoped(&decl.module);
        let path = model.canonical_path(identity);

        let mut builder = Builder {
            translator: *translator,
            plain: translator.without_decorators(),
            decl,
            self_ty: decl.self_type(),
            store: ImportStore::new(identity, &module, &path),
        };
        let body = match decl.kind {
            DeclKind::Class => builder.class()?,
            DeclKind::Interface => builder.interface(),
            DeclKind::Enum => builder.enumeration(),
        };

        Ok(PojoClass {
            identity: identity.to_owned(),
            module,
            path,
            kind: decl.kind,
            is_abstract: decl.is_abstract,
            body,
            imports: builder.store,
        })
    }

    /// Concrete classes and enums.
    pub fn is_instantiable(&self) -> bool {
        match self.kind {
            DeclKind::Class => !self.is_abstract,
            DeclKind::Enum => true,
            DeclKind::Interface => false,
        }
    }

    /// Imported entries with the kinds they were referenced under.
    pub fn dependencies(&self) -> Vec<(ImportEntry, EdgeKinds)> {
        self.imports.imports()
    }

    pub fn resolved_imports(&self) -> Vec<ResolvedImport> {
        self.imports.resolved()
    }
}

struct Builder<'t, 'a> {
    translator: Translator<'a>,
    plain: Translator<'a>,
    decl: &'t TypeDecl,
    self_ty: SourceType,
    store: ImportStore,
}

impl Builder<'_, '_> {
    fn self_repr(&mut self) -> TargetRepr {
        let repr = self.plain.translate_fresh(&TypeRef::of_self(self.self_ty.clone()));
        self.store.with(EdgeKind::Hierarchy, repr)
    }

    fn in_context(&self, ty: &SourceType) -> TypeRef {
        TypeRef::new(ty.clone(), self.self_ty.clone())
    }

    /// Superinterfaces that translate to an importable named type.
    fn interfaces(&mut self) -> Vec<String> {
        let mut rendered = Vec::new();
        for iface in &self.decl.interfaces {
            let repr = self.plain.translate_fresh(&self.in_context(iface));
            if repr.can_be_subclassed() {
                let repr = self.store.with(EdgeKind::Hierarchy, repr);
                rendered.push(repr.render(RenderContext::UseSite));
            }
        }
        rendered
    }

    fn field_type(&mut self, ty: &SourceType) -> String {
        let repr = self.translator.translate_fresh(&self.in_context(ty));
        self.store
            .with(EdgeKind::Field, repr)
            .render(RenderContext::UseSite)
    }

    fn fqcn(&self) -> String {
        self.translator.model().binary_name(&self.decl.name)
    }

    fn class(&mut self) -> Result<String, CodegenError> {
        let model = self.translator.model();
        let this = self.self_repr();
        let declared = this.render(RenderContext::Declaration);
        let used = this.render(RenderContext::UseSite);
        let erased = this.render(RenderContext::ImportOnly);

        // Inherited fields first; every name must be unique along the chain.
        let all_fields = model.all_fields(&self.decl.name);
        let mut seen = HashSet::new();
        if let Some(dup) = all_fields.iter().find(|f| !seen.insert(f.name.as_str())) {
            return Err(CodegenError::NameCollision {
                type_name: self.decl.name.clone(),
                field: dup.name.clone(),
            });
        }

        let superclass = self
            .decl
            .superclass
            .as_ref()
            .map(|s| self.plain.translate_fresh(&self.in_context(s)))
            .filter(TargetRepr::can_be_subclassed)
            .map(|s| self.store.with(EdgeKind::Hierarchy, s));
        let extends = superclass
            .as_ref()
            .map(|s| format!("extends {} ", s.render(RenderContext::UseSite)))
            .unwrap_or_default();

        let mut implements = self.interfaces();
        implements.push(format!("Portable<{used}>"));

        let own_fields: Vec<_> = self.decl.instance_fields().cloned().collect();
        let fields = own_fields
            .iter()
            .map(|f| {
                format!(
                    "  public readonly {}?: {} = undefined;",
                    f.name,
                    self.field_type(&f.ty)
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let constructor_args = all_fields
            .iter()
            .map(|f| format!("{}?: {}", f.name, self.field_type(&f.ty)))
            .collect::<Vec<_>>()
            .join(", ");

        let super_call = match (&superclass, self.decl.superclass.as_ref().and_then(SourceType::declared_name)) {
            (Some(_), Some(sup)) if sup != TOP_TYPE => {
                let args = model
                    .all_fields(sup)
                    .iter()
                    .map(|f| format!("{0}: self.{0}", f.name))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("    super({{ {args} }});\n")
            }
            _ => String::new(),
        };

        let abstract_kw = if self.decl.is_abstract { "abstract " } else { "" };
        let imports = self.store.render();
        let fqcn = self.fqcn();

        Ok(format!(
            "import {{ Portable }} from '{RUNTIME_MODULE}';\n\
             {imports}\n\
             \n\
             export {abstract_kw}class {declared} {extends}implements {implements} {{\n\
             \n\
             \x20 protected readonly _fqcn: string = {erased}.__fqcn();\n\
             \n\
             {fields}\n\
             \n\
             \x20 constructor(self: {{ {constructor_args} }}) {{\n\
             {super_call}\
             \x20   Object.assign(this, self);\n\
             \x20 }}\n\
             \n\
             \x20 public static __fqcn(): string {{\n\
             \x20   return '{fqcn}';\n\
             \x20 }}\n\
             }}\n",
            implements = implements.join(", "),
        ))
    }

    fn interface(&mut self) -> String {
        let this = self.self_repr();
        let declared = this.render(RenderContext::Declaration);
        let interfaces = self.interfaces();
        let extends = if interfaces.is_empty() {
            String::new()
        } else {
            format!("extends {} ", interfaces.join(", "))
        };
        let imports = self.store.render();
        format!("{imports}\n\nexport interface {declared} {extends}{{\n}}\n")
    }

    fn enumeration(&mut self) -> String {
        let this = self.self_repr();
        let name = this.render(RenderContext::Declaration);
        let erased = this.render(RenderContext::ImportOnly);
        let constants = self
            .decl
            .enum_constants
            .iter()
            .map(|c| format!("  public static readonly {c}: {name} = new {name}(\"{c}\");"))
            .collect::<Vec<_>>()
            .join("\n");
        let values = self
            .decl
            .enum_constants
            .iter()
            .map(|c| format!("{name}.{c}"))
            .collect::<Vec<_>>()
            .join(", ");
        let fqcn = self.fqcn();
        format!(
            "import {{ JavaEnum }} from '{RUNTIME_MODULE}';\n\
             \n\
             export class {name} extends JavaEnum<{name}> {{\n\
             \n\
             {constants}\n\
             \n\
             \x20 protected readonly _fqcn: string = {erased}.__fqcn();\n\
             \n\
             \x20 public static __fqcn(): string {{\n\
             \x20   return '{fqcn}';\n\
             \x20 }}\n\
             \n\
             \x20 public static values() {{\n\
             \x20   return [{values}];\n\
             \x20 }}\n\
             }}\n"
        )
    }
}
