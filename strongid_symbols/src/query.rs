//! The read-only query surface of the host compiler.

use std::borrow::Cow;

use derive_more::{Display, From, Into};

use crate::error::SymbolResult;
use crate::symbol::{Namespace, TypeSymbol};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into)]
#[display("unit#{_0}")]
pub struct SyntaxUnitId(pub usize);

/// A type declaration node inside a syntax unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("{unit}/decl#{index}")]
pub struct DeclarationId {
    pub unit: SyntaxUnitId,
    pub index: usize,
}

/// A binary module the compilation references.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
#[display("{name}")]
pub struct ModuleReference {
    pub name: String,
}

impl ModuleReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One namespace of an assembly, with its types and nested namespaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceSymbol {
    pub namespace: Namespace,
    types: Vec<TypeSymbol>,
    children: Vec<NamespaceSymbol>,
}

impl NamespaceSymbol {
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            types: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builds a namespace tree rooted at the global namespace from a flat
    /// list of types. Types keep their relative order inside a namespace and
    /// child namespaces appear in first-seen order.
    pub fn from_types(types: impl IntoIterator<Item = TypeSymbol>) -> Self {
        let mut root = NamespaceSymbol::new(Namespace::global());
        for symbol in types {
            let segments = symbol.namespace.segments().to_vec();
            root.insert(&segments, symbol);
        }
        root
    }

    fn insert(&mut self, remaining: &[String], symbol: TypeSymbol) {
        match remaining.split_first() {
            None => self.types.push(symbol),
            Some((head, tail)) => {
                let position = self
                    .children
                    .iter()
                    .position(|child| child.namespace.segments().last() == Some(head));
                let index = match position {
                    Some(index) => index,
                    None => {
                        self.children
                            .push(NamespaceSymbol::new(self.namespace.child(head.clone())));
                        self.children.len() - 1
                    }
                };
                self.children[index].insert(tail, symbol);
            }
        }
    }

    /// Types declared directly in this namespace.
    pub fn type_members(&self) -> &[TypeSymbol] {
        &self.types
    }

    /// Namespaces nested directly in this namespace.
    pub fn namespace_members(&self) -> &[NamespaceSymbol] {
        &self.children
    }
}

/// A resolved referenced assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblySymbol {
    pub name: String,
    pub global_namespace: NamespaceSymbol,
}

impl AssemblySymbol {
    pub fn new(name: impl Into<String>, types: impl IntoIterator<Item = TypeSymbol>) -> Self {
        Self {
            name: name.into(),
            global_namespace: NamespaceSymbol::from_types(types),
        }
    }
}

/// Read-only view over the host compiler's type universe.
///
/// Implementations answer exactly the questions the generators ask and
/// nothing more. Enumeration order is whatever the host provides; the
/// generators treat it as meaningful only for statement ordering.
pub trait SymbolQuery {
    /// Name of the assembly being compiled, if the host knows it.
    fn assembly_name(&self) -> Option<&str>;

    fn syntax_units(&self) -> Vec<SyntaxUnitId>;

    /// Full text of a syntax unit, or `None` when the text is not available
    /// without forcing a load.
    fn unit_text(&self, unit: SyntaxUnitId) -> Option<Cow<'_, str>>;

    /// Every type declaration node in the unit, nested ones included.
    fn type_declarations(&self, unit: SyntaxUnitId) -> SymbolResult<Vec<DeclarationId>>;

    /// The declared symbol of a type declaration, or `None` when it does not
    /// resolve to a named type.
    fn declared_symbol(&self, declaration: DeclarationId) -> SymbolResult<Option<TypeSymbol>>;

    fn referenced_modules(&self) -> Vec<ModuleReference>;

    /// The assembly symbol behind a referenced module, or `None` for modules
    /// that are not assemblies or cannot be resolved.
    fn assembly_symbol(&self, module: &ModuleReference) -> Option<&AssemblySymbol>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(ns: &str, name: &str) -> TypeSymbol {
        TypeSymbol::builder().namespace(ns).name(name).build()
    }

    #[test]
    fn test_namespace_tree_from_flat_types() {
        let root = NamespaceSymbol::from_types(vec![
            named("Acme.Domain", "UserId"),
            named("Acme.Domain.Orders", "OrderId"),
            named("", "GlobalId"),
            named("Acme.Domain", "TenantId"),
        ]);

        assert!(root.namespace.is_global());
        assert_eq!(root.type_members().len(), 1);
        assert_eq!(root.type_members()[0].name, "GlobalId");

        let acme = &root.namespace_members()[0];
        assert_eq!(acme.namespace.to_string(), "Acme");
        assert!(acme.type_members().is_empty());

        let domain = &acme.namespace_members()[0];
        assert_eq!(domain.namespace.to_string(), "Acme.Domain");
        let names: Vec<_> = domain.type_members().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["UserId", "TenantId"]);

        let orders = &domain.namespace_members()[0];
        assert_eq!(orders.namespace.to_string(), "Acme.Domain.Orders");
        assert_eq!(orders.type_members()[0].name, "OrderId");
    }

    #[test]
    fn test_ids_display() {
        let decl = DeclarationId {
            unit: SyntaxUnitId(3),
            index: 1,
        };
        assert_eq!(decl.to_string(), "unit#3/decl#1");
    }
}
