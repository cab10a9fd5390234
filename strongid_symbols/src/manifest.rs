//! TOML compilation manifests
//!
//! A manifest describes a compilation the way the host compiler would see
//! it: the assembly being built, its build properties, its syntax units with
//! the types they declare, and the binary modules it references.
//!
//! ```toml
//! assembly_name = "Acme.Orders.Infrastructure"
//!
//! [build_properties]
//! "build_property.RootNamespace" = "Acme.Orders.Infrastructure"
//!
//! [[units]]
//! path = "Domain/UserId.cs"
//! text = "public partial record UserId(int Id) : IStronglyTypedId<int>;"
//!
//! [[units.types]]
//! namespace = "Acme.Orders.Domain"
//! name = "UserId"
//! interfaces = [{ name = "IStronglyTypedId", type_arguments = [{ name = "int" }] }]
//!
//! [[references]]
//! module = "Acme.Shared.dll"
//! assembly = "Acme.Shared"
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{SymbolError, SymbolResult};
use crate::memory::{InMemoryCompilation, SyntaxUnit};
use crate::symbol::TypeSymbol;

/// Root manifest
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CompilationManifest {
    pub assembly_name: Option<String>,
    #[serde(default)]
    pub build_properties: BTreeMap<String, String>,
    #[serde(default)]
    pub units: Vec<UnitConfig>,
    #[serde(default)]
    pub references: Vec<ReferenceConfig>,
}

/// Syntax unit configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UnitConfig {
    pub path: String,
    /// Leave out to model a unit whose text is unavailable
    pub text: Option<String>,
    #[serde(default)]
    pub types: Vec<TypeSymbol>,
    /// Declarations that do not bind to a named type
    #[serde(default)]
    pub unresolved: Vec<String>,
}

/// Referenced module configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReferenceConfig {
    pub module: String,
    /// Assembly name; leave out for a module that does not resolve to an assembly
    pub assembly: Option<String>,
    #[serde(default)]
    pub types: Vec<TypeSymbol>,
}

impl CompilationManifest {
    /// Checks the manifest for contradictions a host compiler would never produce.
    pub fn validate(&self) -> SymbolResult<()> {
        let mut paths = HashSet::new();
        for unit in &self.units {
            if unit.path.trim().is_empty() {
                return Err(SymbolError::InvalidManifest(
                    "syntax unit path cannot be empty".to_string(),
                ));
            }
            if !paths.insert(unit.path.as_str()) {
                return Err(SymbolError::InvalidManifest(format!(
                    "duplicate syntax unit path: {}",
                    unit.path
                )));
            }
            validate_types(&unit.types, &unit.path)?;
        }

        let mut modules = HashSet::new();
        for reference in &self.references {
            if !modules.insert(reference.module.as_str()) {
                return Err(SymbolError::InvalidManifest(format!(
                    "duplicate referenced module: {}",
                    reference.module
                )));
            }
            if reference.assembly.is_none() && !reference.types.is_empty() {
                return Err(SymbolError::InvalidManifest(format!(
                    "module '{}' declares types but no assembly",
                    reference.module
                )));
            }
            validate_types(&reference.types, &reference.module)?;
        }

        Ok(())
    }

    /// Builds the in-memory compilation this manifest describes.
    pub fn into_compilation(self) -> InMemoryCompilation {
        let mut compilation = match self.assembly_name {
            Some(name) => InMemoryCompilation::new(name),
            None => InMemoryCompilation::anonymous(),
        };

        for unit in self.units {
            let mut syntax_unit = match unit.text {
                Some(text) => SyntaxUnit::new(unit.path, text),
                None => SyntaxUnit::without_text(unit.path),
            };
            for symbol in unit.types {
                syntax_unit = syntax_unit.declare(symbol);
            }
            for name in unit.unresolved {
                syntax_unit = syntax_unit.declare_unresolved(name);
            }
            compilation = compilation.with_unit(syntax_unit);
        }

        for reference in self.references {
            compilation = match reference.assembly {
                Some(assembly) => compilation.with_assembly(reference.module, assembly, reference.types),
                None => compilation.with_unresolved_reference(reference.module),
            };
        }

        compilation
    }
}

fn validate_types(types: &[TypeSymbol], owner: &str) -> SymbolResult<()> {
    if let Some(symbol) = types.iter().find(|t| t.name.trim().is_empty()) {
        return Err(SymbolError::InvalidManifest(format!(
            "type in '{}' (namespace '{}') has an empty name",
            owner, symbol.namespace
        )));
    }
    Ok(())
}

/// Parse a compilation manifest from a TOML file
pub fn parse_manifest<P: AsRef<Path>>(path: P) -> SymbolResult<CompilationManifest> {
    let content = fs::read_to_string(&path).map_err(|source| SymbolError::Io {
        path: path.as_ref().to_path_buf(),
        source,
    })?;

    debug!("Manifest: read {} bytes from {}", content.len(), path.as_ref().display());
    parse_manifest_from_str(&content)
}

/// Parse a compilation manifest from a TOML string
pub fn parse_manifest_from_str(content: &str) -> SymbolResult<CompilationManifest> {
    let manifest: CompilationManifest = toml::from_str(content)?;
    manifest.validate()?;
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SymbolQuery;
    use crate::symbol::TypeKind;
    use assert_matches::assert_matches;

    const MANIFEST: &str = r#"
        assembly_name = "Acme.Orders.Infrastructure"

        [build_properties]
        "build_property.RootNamespace" = "Acme.Orders.Infrastructure"

        [[units]]
        path = "Domain/UserId.cs"
        text = "public partial record UserId(int Id) : IStronglyTypedId<int>;"
        unresolved = ["Partial"]

        [[units.types]]
        namespace = "Acme.Orders.Domain"
        name = "UserId"
        interfaces = [{ name = "IStronglyTypedId", namespace = "Acme.Core", type_arguments = [{ name = "int" }] }]
        members = [{ name = "Id", type = { name = "int" } }]

        [[units]]
        path = "Infrastructure/AppDbContext.cs"

        [[units.types]]
        namespace = "Acme.Orders.Infrastructure"
        name = "AppDbContext"
        base = { name = "AppDbContextBase", namespace = "Acme.Core.Repository" }

        [[references]]
        module = "Acme.Shared.dll"
        assembly = "Acme.Shared"

        [[references.types]]
        namespace = "Acme.Shared"
        name = "IEntity"
        kind = "interface"
        abstract = true

        [[references]]
        module = "libnative.so"
    "#;

    #[test]
    fn test_parse_manifest() {
        let manifest = parse_manifest_from_str(MANIFEST).unwrap();
        assert_eq!(manifest.assembly_name.as_deref(), Some("Acme.Orders.Infrastructure"));
        assert_eq!(manifest.units.len(), 2);
        assert_eq!(manifest.references.len(), 2);
        assert_eq!(
            manifest.build_properties.get("build_property.RootNamespace").map(String::as_str),
            Some("Acme.Orders.Infrastructure")
        );

        let user_id = &manifest.units[0].types[0];
        assert_eq!(user_id.kind, TypeKind::Class);
        assert_eq!(user_id.interfaces[0].type_arguments[0].name, "int");
        assert_eq!(user_id.members[0].name, "Id");

        let context = &manifest.units[1].types[0];
        assert_eq!(context.base_name(), Some("AppDbContextBase"));
        assert!(manifest.units[1].text.is_none());

        let entity = &manifest.references[0].types[0];
        assert_eq!(entity.kind, TypeKind::Interface);
        assert!(entity.is_abstract);
    }

    #[test]
    fn test_manifest_into_compilation() {
        let compilation = parse_manifest_from_str(MANIFEST).unwrap().into_compilation();
        let units = compilation.syntax_units();
        assert_eq!(units.len(), 2);
        assert_eq!(compilation.type_declarations(units[0]).unwrap().len(), 2);
        assert!(compilation.unit_text(units[1]).is_none());

        let modules = compilation.referenced_modules();
        assert!(compilation.assembly_symbol(&modules[0]).is_some());
        assert!(compilation.assembly_symbol(&modules[1]).is_none());
    }

    #[test]
    fn test_duplicate_unit_paths_rejected() {
        let toml = r#"
            [[units]]
            path = "A.cs"
            [[units]]
            path = "A.cs"
        "#;
        assert_matches!(parse_manifest_from_str(toml), Err(SymbolError::InvalidManifest(_)));
    }

    #[test]
    fn test_types_without_assembly_rejected() {
        let toml = r#"
            [[references]]
            module = "Lost.dll"
            [[references.types]]
            name = "UserId"
        "#;
        assert_matches!(parse_manifest_from_str(toml), Err(SymbolError::InvalidManifest(_)));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        assert_matches!(parse_manifest_from_str("units = 3"), Err(SymbolError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert_matches!(
            parse_manifest("/definitely/not/here.toml"),
            Err(SymbolError::Io { .. })
        );
    }
}
