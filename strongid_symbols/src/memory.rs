//! An in-memory compilation that answers [`SymbolQuery`] from plain data.
//!
//! Used by the command line driver (via the TOML manifest) and by tests to
//! stand in for a real host compiler.

use std::borrow::Cow;

use log::trace;

use crate::error::{SymbolError, SymbolResult};
use crate::query::{AssemblySymbol, DeclarationId, ModuleReference, SymbolQuery, SyntaxUnitId};
use crate::symbol::TypeSymbol;

/// A type declaration node as the host parsed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Resolved(TypeSymbol),
    /// A declaration the host could not bind to a named type
    Unresolved(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyntaxUnit {
    pub path: String,
    /// `None` models a unit whose text the host will not hand out
    pub text: Option<String>,
    pub declarations: Vec<Declaration>,
}

impl SyntaxUnit {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: Some(text.into()),
            declarations: Vec::new(),
        }
    }

    pub fn without_text(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: None,
            declarations: Vec::new(),
        }
    }

    pub fn declare(mut self, symbol: TypeSymbol) -> Self {
        self.declarations.push(Declaration::Resolved(symbol));
        self
    }

    pub fn declare_unresolved(mut self, name: impl Into<String>) -> Self {
        self.declarations.push(Declaration::Unresolved(name.into()));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Reference {
    module: ModuleReference,
    assembly: Option<AssemblySymbol>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryCompilation {
    assembly_name: Option<String>,
    units: Vec<SyntaxUnit>,
    references: Vec<Reference>,
}

impl InMemoryCompilation {
    pub fn new(assembly_name: impl Into<String>) -> Self {
        Self {
            assembly_name: Some(assembly_name.into()),
            ..Default::default()
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_unit(mut self, unit: SyntaxUnit) -> Self {
        self.units.push(unit);
        self
    }

    /// Adds a reference that resolves to an assembly holding `types`.
    pub fn with_assembly(
        mut self,
        module: impl Into<String>,
        assembly_name: impl Into<String>,
        types: impl IntoIterator<Item = TypeSymbol>,
    ) -> Self {
        self.references.push(Reference {
            module: ModuleReference::new(module),
            assembly: Some(AssemblySymbol::new(assembly_name, types)),
        });
        self
    }

    /// Adds a reference the host cannot resolve to an assembly.
    pub fn with_unresolved_reference(mut self, module: impl Into<String>) -> Self {
        self.references.push(Reference {
            module: ModuleReference::new(module),
            assembly: None,
        });
        self
    }

    pub fn units(&self) -> &[SyntaxUnit] {
        &self.units
    }

    fn unit(&self, id: SyntaxUnitId) -> SymbolResult<&SyntaxUnit> {
        self.units.get(id.0).ok_or(SymbolError::UnknownUnit(id))
    }
}

impl SymbolQuery for InMemoryCompilation {
    fn assembly_name(&self) -> Option<&str> {
        self.assembly_name.as_deref()
    }

    fn syntax_units(&self) -> Vec<SyntaxUnitId> {
        (0..self.units.len()).map(SyntaxUnitId).collect()
    }

    fn unit_text(&self, unit: SyntaxUnitId) -> Option<Cow<'_, str>> {
        self.units
            .get(unit.0)
            .and_then(|u| u.text.as_deref())
            .map(Cow::Borrowed)
    }

    fn type_declarations(&self, unit: SyntaxUnitId) -> SymbolResult<Vec<DeclarationId>> {
        let syntax_unit = self.unit(unit)?;
        trace!(
            "InMemoryCompilation: {} declarations in {}",
            syntax_unit.declarations.len(),
            syntax_unit.path
        );
        Ok((0..syntax_unit.declarations.len())
            .map(|index| DeclarationId { unit, index })
            .collect())
    }

    fn declared_symbol(&self, declaration: DeclarationId) -> SymbolResult<Option<TypeSymbol>> {
        let unit = self.unit(declaration.unit)?;
        match unit.declarations.get(declaration.index) {
            Some(Declaration::Resolved(symbol)) => Ok(Some(symbol.clone())),
            Some(Declaration::Unresolved(_)) => Ok(None),
            None => Err(SymbolError::UnknownDeclaration(declaration)),
        }
    }

    fn referenced_modules(&self) -> Vec<ModuleReference> {
        self.references.iter().map(|r| r.module.clone()).collect()
    }

    fn assembly_symbol(&self, module: &ModuleReference) -> Option<&AssemblySymbol> {
        self.references
            .iter()
            .find(|r| &r.module == module)
            .and_then(|r| r.assembly.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn compilation() -> InMemoryCompilation {
        InMemoryCompilation::new("Acme.Orders")
            .with_unit(
                SyntaxUnit::new("UserId.cs", "class UserId : IStronglyTypedId<int> {}")
                    .declare(TypeSymbol::builder().namespace("Acme").name("UserId").build())
                    .declare_unresolved("Broken"),
            )
            .with_unit(SyntaxUnit::without_text("Generated.cs"))
            .with_assembly("Acme.Shared.dll", "Acme.Shared", vec![])
            .with_unresolved_reference("native.so")
    }

    #[test]
    fn test_units_and_text() {
        let c = compilation();
        let units = c.syntax_units();
        assert_eq!(units.len(), 2);
        assert!(c.unit_text(units[0]).unwrap().contains("UserId"));
        assert!(c.unit_text(units[1]).is_none());
        assert_eq!(c.assembly_name(), Some("Acme.Orders"));
    }

    #[test]
    fn test_declared_symbols_resolve_or_not() {
        let c = compilation();
        let decls = c.type_declarations(SyntaxUnitId(0)).unwrap();
        assert_eq!(decls.len(), 2);
        assert_eq!(c.declared_symbol(decls[0]).unwrap().unwrap().name, "UserId");
        assert!(c.declared_symbol(decls[1]).unwrap().is_none());
    }

    #[test]
    fn test_unknown_ids_are_errors() {
        let c = compilation();
        assert_matches!(
            c.type_declarations(SyntaxUnitId(9)),
            Err(SymbolError::UnknownUnit(SyntaxUnitId(9)))
        );
        let bogus = DeclarationId {
            unit: SyntaxUnitId(0),
            index: 42,
        };
        assert_matches!(c.declared_symbol(bogus), Err(SymbolError::UnknownDeclaration(_)));
    }

    #[test]
    fn test_references() {
        let c = compilation();
        let modules = c.referenced_modules();
        assert_eq!(modules.len(), 2);
        assert_eq!(c.assembly_symbol(&modules[0]).unwrap().name, "Acme.Shared");
        assert!(c.assembly_symbol(&modules[1]).is_none());
    }
}
