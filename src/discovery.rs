//! Discovery of strongly-typed identifier types.
//!
//! Discovery looks in two places:
//!
//! 1. **Local scope**: type declarations in the compilation's own syntax
//!    units. Units whose text does not mention the marker token are skipped
//!    before anything is resolved.
//! 2. **Referenced scope**: every type of every referenced assembly whose
//!    name starts with the first dot-separated segment of the current
//!    assembly's name (`Acme.Orders.Web` scans `Acme.*`, not `Microsoft.*`).
//!
//! Results are merged by `(namespace, name)` identity, local types first, so
//! a type visible both as source and through a project reference counts once.

use std::collections::HashSet;

use log::{debug, trace};
use strongid_symbols::{NamespaceSymbol, SymbolQuery, TypeIdentity, TypeSymbol};

use crate::config::StatementOrder;
use crate::context::{CancellationFlag, GeneratorContext};
use crate::error::CodegenResult;
use crate::matcher::MarkerMatcher;

/// Where an identifier type was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryScope {
    Local,
    Referenced { assembly: String },
}

/// A type known to satisfy the marker predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierType {
    symbol: TypeSymbol,
    scope: DiscoveryScope,
}

impl IdentifierType {
    pub fn new(symbol: TypeSymbol, scope: DiscoveryScope) -> Self {
        Self { symbol, scope }
    }

    pub fn symbol(&self) -> &TypeSymbol {
        &self.symbol
    }

    pub fn scope(&self) -> &DiscoveryScope {
        &self.scope
    }

    pub fn name(&self) -> &str {
        &self.symbol.name
    }

    pub fn identity(&self) -> TypeIdentity {
        self.symbol.identity()
    }
}

/// Identifier types of one pass, unique by identity, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct IdentifierSet {
    items: Vec<IdentifierType>,
    seen: HashSet<TypeIdentity>,
}

impl IdentifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `id` unless a type with the same identity is already present.
    pub fn insert(&mut self, id: IdentifierType) -> bool {
        if !self.seen.insert(id.identity()) {
            trace!("Discovery: {} already known, ignoring duplicate", id.identity());
            return false;
        }
        self.items.push(id);
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IdentifierType> {
        self.items.iter()
    }

    pub fn ordered(&self, order: StatementOrder) -> Vec<&IdentifierType> {
        let mut ids: Vec<_> = self.items.iter().collect();
        if order == StatementOrder::ByName {
            ids.sort_by(|a, b| {
                a.name()
                    .cmp(b.name())
                    .then_with(|| a.symbol.namespace.cmp(&b.symbol.namespace))
            });
        }
        ids
    }
}

impl<'a> IntoIterator for &'a IdentifierSet {
    type Item = &'a IdentifierType;
    type IntoIter = std::slice::Iter<'a, IdentifierType>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// First dot-separated segment of an assembly name, if it has a usable one.
pub fn assembly_prefix(assembly_name: &str) -> Option<&str> {
    assembly_name.split('.').next().filter(|prefix| !prefix.is_empty())
}

pub struct DiscoveryEngine<'a> {
    symbols: &'a dyn SymbolQuery,
    matcher: &'a MarkerMatcher,
    marker_token: &'a str,
    cancellation: &'a CancellationFlag,
}

impl<'a> DiscoveryEngine<'a> {
    pub fn new(context: &'a GeneratorContext<'a>, matcher: &'a MarkerMatcher, marker_token: &'a str) -> Self {
        Self {
            symbols: context.symbols,
            matcher,
            marker_token,
            cancellation: &context.cancellation,
        }
    }

    pub fn discover(&self) -> CodegenResult<IdentifierSet> {
        let mut ids = IdentifierSet::new();
        self.discover_local(&mut ids)?;
        let local = ids.len();
        self.discover_referenced(&mut ids)?;
        debug!(
            "Discovery: {} identifier types ({} local, {} referenced)",
            ids.len(),
            local,
            ids.len() - local
        );
        Ok(ids)
    }

    fn discover_local(&self, ids: &mut IdentifierSet) -> CodegenResult<()> {
        for unit in self.symbols.syntax_units() {
            self.cancellation.check()?;

            // Units whose text is unavailable are resolved anyway.
            if let Some(text) = self.symbols.unit_text(unit)
                && !text.contains(self.marker_token)
            {
                continue;
            }

            for declaration in self.symbols.type_declarations(unit)? {
                let Some(symbol) = self.symbols.declared_symbol(declaration)? else {
                    continue;
                };
                if self.matcher.is_identifier_type(&symbol) {
                    trace!("Discovery: local identifier {}", symbol.qualified_name());
                    ids.insert(IdentifierType::new(symbol, DiscoveryScope::Local));
                }
            }
        }
        Ok(())
    }

    fn discover_referenced(&self, ids: &mut IdentifierSet) -> CodegenResult<()> {
        let Some(prefix) = self.symbols.assembly_name().and_then(assembly_prefix) else {
            debug!("Discovery: current assembly has no name prefix, skipping referenced modules");
            return Ok(());
        };

        for module in self.symbols.referenced_modules() {
            self.cancellation.check()?;

            let Some(assembly) = self.symbols.assembly_symbol(&module) else {
                trace!("Discovery: {module} does not resolve to an assembly");
                continue;
            };
            if !assembly.name.starts_with(prefix) {
                trace!("Discovery: skipping {} (outside '{prefix}')", assembly.name);
                continue;
            }

            let mut types = Vec::new();
            collect_types(&assembly.global_namespace, &mut types);
            for symbol in types.into_iter().filter(|t| self.matcher.is_identifier_type(t)) {
                trace!(
                    "Discovery: referenced identifier {} in {}",
                    symbol.qualified_name(),
                    assembly.name
                );
                ids.insert(IdentifierType::new(
                    symbol.clone(),
                    DiscoveryScope::Referenced {
                        assembly: assembly.name.clone(),
                    },
                ));
            }
        }
        Ok(())
    }
}

/// Collects the types of `namespace` and all of its nested namespaces.
fn collect_types<'s>(namespace: &'s NamespaceSymbol, types: &mut Vec<&'s TypeSymbol>) {
    types.extend(namespace.type_members());
    for child in namespace.namespace_members() {
        collect_types(child, types);
    }
}
