//! # strongid_symbols
//!
//! The read-only symbol query facade the `strongid_codegen` generators run
//! against, plus an in-memory compilation model that implements it.
//!
//! A real host compiler implements [`SymbolQuery`] over its own semantic
//! model. Everything else in this crate exists so the generators can be
//! driven without one: [`InMemoryCompilation`] holds syntax units and
//! referenced assemblies as plain data, and [`manifest`] loads that data
//! from TOML.

pub mod error;
pub mod manifest;
pub mod memory;
pub mod query;
pub mod symbol;

pub use error::{SymbolError, SymbolResult};
pub use manifest::{CompilationManifest, parse_manifest, parse_manifest_from_str};
pub use memory::{Declaration, InMemoryCompilation, SyntaxUnit};
pub use query::{
    AssemblySymbol, DeclarationId, ModuleReference, NamespaceSymbol, SymbolQuery, SyntaxUnitId,
};
pub use symbol::{MemberKind, MemberSymbol, Namespace, TypeIdentity, TypeKind, TypeRef, TypeSymbol};
