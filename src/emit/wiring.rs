//! Persistence-context wiring.

use std::fmt;

use log::trace;
use strongid_symbols::{Namespace, TypeIdentity, TypeSymbol};

use crate::config::{ContextBase, GeneratorConfig};
use crate::discovery::IdentifierType;
use crate::emit::{AUTO_GENERATED_HEADER, ConverterStrategy, SourceArtifact};

/// Method the context base declares for converter registration.
pub const CONFIGURE_METHOD: &str = "ConfigureStronglyTypedIdValueConverter";

/// A concrete type directly deriving from a recognized context base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextType {
    symbol: TypeSymbol,
    base: ContextBase,
}

impl ContextType {
    pub fn symbol(&self) -> &TypeSymbol {
        &self.symbol
    }

    pub fn base(&self) -> ContextBase {
        self.base
    }

    pub fn name(&self) -> &str {
        &self.symbol.name
    }

    pub fn identity(&self) -> TypeIdentity {
        self.symbol.identity()
    }
}

/// Why a scanned declaration is not a persistence context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    Abstract,
    UnrecognizedBase(Option<String>),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Abstract => f.write_str("type is abstract"),
            Violation::UnrecognizedBase(Some(base)) => write!(f, "base type '{base}' is not a context base"),
            Violation::UnrecognizedBase(None) => f.write_str("type has no base type"),
        }
    }
}

/// Classifies a declared type. Abstractness is checked before the base.
pub fn classify_context(symbol: TypeSymbol, config: &GeneratorConfig) -> Result<ContextType, Violation> {
    if symbol.is_abstract {
        return Err(Violation::Abstract);
    }

    let base = symbol
        .base_name()
        .and_then(|name| config.context_bases.iter().copied().find(|b| b.as_ref() == name));
    match base {
        Some(base) => Ok(ContextType { symbol, base }),
        None => Err(Violation::UnrecognizedBase(symbol.base_name().map(str::to_string))),
    }
}

/// The registration override for one persistence context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WiringArtifact {
    pub context: TypeIdentity,
    pub statements: Vec<String>,
    pub hint_name: String,
    pub source: String,
}

impl WiringArtifact {
    pub fn to_source(&self) -> SourceArtifact {
        SourceArtifact::new(self.hint_name.clone(), self.source.clone())
    }
}

fn registration(id: &IdentifierType, strategy: &dyn ConverterStrategy) -> String {
    let symbol = id.symbol();
    let converter = strategy
        .converter_namespace(symbol)
        .qualify(&strategy.class_name(symbol));
    format!(
        "configurationBuilder.Properties<global::{}>().HaveConversion<global::{}>();",
        symbol.qualified_name(),
        converter
    )
}

/// Builds the wiring artifact for `context`, one registration per
/// identifier, in the order given.
pub fn emit_wiring(
    context: &ContextType,
    ids: &[&IdentifierType],
    strategy: &dyn ConverterStrategy,
) -> WiringArtifact {
    let statements: Vec<String> = ids.iter().map(|id| registration(id, strategy)).collect();
    let hint_name = format!("{}ValueConverterConfigure.g.cs", context.name());
    let source = render_wiring(context, &statements);

    trace!(
        "Wiring: {} with {} registrations -> {}",
        context.identity(),
        statements.len(),
        hint_name
    );
    WiringArtifact {
        context: context.identity(),
        statements,
        hint_name,
        source,
    }
}

fn render_wiring(context: &ContextType, statements: &[String]) -> String {
    let mut source = String::new();
    source.push_str(AUTO_GENERATED_HEADER);
    source.push('\n');
    source.push_str("using Microsoft.EntityFrameworkCore;\n");
    if let Some(base_namespace) = context
        .symbol()
        .base_type
        .as_ref()
        .map(|base| &base.namespace)
        .filter(|ns| !ns.is_global())
    {
        source.push_str(&format!("using {base_namespace};\n"));
    }

    let body: String = statements
        .iter()
        .map(|statement| format!("            {statement}\n"))
        .collect();
    let class = format!(
        r#"public partial class {name}
{{
    protected override void {method}(ModelConfigurationBuilder configurationBuilder)
    {{
{body}    }}
}}
"#,
        name = context.name(),
        method = CONFIGURE_METHOD,
    );

    let namespace: &Namespace = &context.symbol().namespace;
    if namespace.is_global() {
        source.push_str(&class);
    } else {
        source.push_str(&format!("namespace {namespace}\n{{\n"));
        for line in class.lines() {
            if line.is_empty() {
                source.push('\n');
            } else {
                source.push_str(&format!("    {line}\n"));
            }
        }
        source.push_str("}\n");
    }
    source
}
