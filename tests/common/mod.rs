// Common test utilities and helpers

#![allow(dead_code)]

use strongid_codegen::prelude::*;
use strongid_symbols::{SymbolQuery, TypeRef, TypeSymbol};

pub const ROOT_NAMESPACE: &str = "Acme.Web";
pub const BASES_NAMESPACE: &str = "NetCorePal.Extensions.Repository.EntityFrameworkCore";

/// An identifier class implementing `IStronglyTypedId<primitive>`.
pub fn identifier(namespace: &str, name: &str, primitive: &str) -> TypeSymbol {
    TypeSymbol::builder()
        .namespace(namespace)
        .name(name)
        .interfaces(vec![
            TypeRef::new("NetCorePal.Extensions.Domain", "IStronglyTypedId").with_argument(TypeRef::new("", primitive)),
        ])
        .build()
}

/// A concrete context deriving from `base`.
pub fn db_context(namespace: &str, name: &str, base: &str) -> TypeSymbol {
    TypeSymbol::builder()
        .namespace(namespace)
        .name(name)
        .base_type(TypeRef::new(BASES_NAMESPACE, base))
        .build()
}

/// Runs one generator pass against `symbols` with the given root namespace.
pub fn run_pass(
    generator: &dyn SourceGenerator,
    symbols: &dyn SymbolQuery,
    root_namespace: Option<&str>,
) -> (PassOutcome, MemorySink) {
    let properties = match root_namespace {
        Some(root) => BuildProperties::new().with_root_namespace(root),
        None => BuildProperties::new(),
    };
    let context = GeneratorContext::new(symbols, &properties);
    let mut sink = MemorySink::new();
    let outcome = run_generator(generator, &context, &mut sink).unwrap();
    (outcome, sink)
}
