//! Converter synthesis.
//!
//! Two entry points emit converters and they disagree on where the class
//! goes, so placement is a [`ConverterStrategy`]:
//!
//! * [`IdentifierNamespaceStrategy`] puts `{Id}ValueConverter` in
//!   `{identifier namespace}.ValueConverters`, next to the identifier.
//! * [`RootNamespaceStrategy`] puts every converter in
//!   `{root namespace}.ValueConverters` as a partial class. Identifiers that
//!   share a simple name across namespaces get namespace-qualified converter
//!   names there, see [`RootNamespaceStrategy::disambiguating`].

use std::collections::HashSet;

use log::trace;
use strongid_symbols::{MemberKind, Namespace, TypeRef, TypeSymbol};

use crate::discovery::IdentifierType;
use crate::emit::{
    AUTO_GENERATED_HEADER, CONVERTER_NAMESPACE_SEGMENT, ConverterArtifact, Projection,
};
use crate::error::{CodegenError, CodegenResult};
use crate::matcher::MarkerMatcher;

pub trait ConverterStrategy {
    fn name(&self) -> &'static str;

    /// Namespace the converter class is declared in.
    fn converter_namespace(&self, id: &TypeSymbol) -> Namespace;

    /// How the converter refers to the wrapper type.
    fn wrapper_reference(&self, id: &TypeSymbol) -> String;

    fn hint_name(&self, id: &TypeSymbol) -> String;

    fn class_name(&self, id: &TypeSymbol) -> String {
        format!("{}ValueConverter", id.name)
    }

    fn partial(&self) -> bool;

    /// `using` directives emitted ahead of the namespace block.
    fn usings(&self, id: &TypeSymbol) -> Vec<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IdentifierNamespaceStrategy;

impl ConverterStrategy for IdentifierNamespaceStrategy {
    fn name(&self) -> &'static str {
        "identifier-namespace"
    }

    fn converter_namespace(&self, id: &TypeSymbol) -> Namespace {
        id.namespace.child(CONVERTER_NAMESPACE_SEGMENT)
    }

    fn wrapper_reference(&self, id: &TypeSymbol) -> String {
        id.qualified_name()
    }

    fn hint_name(&self, id: &TypeSymbol) -> String {
        format!("{}ValueConverters.g.cs", id.qualified_name())
    }

    fn partial(&self) -> bool {
        false
    }

    fn usings(&self, _id: &TypeSymbol) -> Vec<String> {
        vec![
            "Microsoft.EntityFrameworkCore.Storage.ValueConversion".to_string(),
            "System".to_string(),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct RootNamespaceStrategy {
    root: Namespace,
    /// Simple names declared in more than one namespace
    shared: HashSet<String>,
}

impl RootNamespaceStrategy {
    pub fn new(root: impl Into<Namespace>) -> Self {
        Self {
            root: root.into(),
            shared: HashSet::new(),
        }
    }

    /// Records which of `ids` share a simple name. Converters for those are
    /// named after the identifier's namespace as well (`Acme.Sales.UserId`
    /// becomes `Acme_Sales_UserIdValueConverter` in
    /// `Acme.Sales.UserIdValueConverter.g.cs`) and refer to the wrapper by
    /// its qualified name. Global-namespace identifiers keep the plain form.
    pub fn disambiguating<'s>(mut self, ids: impl IntoIterator<Item = &'s TypeSymbol>) -> Self {
        let mut seen = HashSet::new();
        for id in ids {
            if !seen.insert(id.name.as_str()) {
                self.shared.insert(id.name.clone());
            }
        }
        self
    }

    fn is_shared(&self, id: &TypeSymbol) -> bool {
        !id.namespace.is_global() && self.shared.contains(&id.name)
    }
}

impl ConverterStrategy for RootNamespaceStrategy {
    fn name(&self) -> &'static str {
        "root-namespace"
    }

    fn converter_namespace(&self, _id: &TypeSymbol) -> Namespace {
        self.root.child(CONVERTER_NAMESPACE_SEGMENT)
    }

    fn wrapper_reference(&self, id: &TypeSymbol) -> String {
        if self.is_shared(id) {
            id.qualified_name()
        } else {
            id.name.clone()
        }
    }

    fn hint_name(&self, id: &TypeSymbol) -> String {
        if self.is_shared(id) {
            format!("{}ValueConverter.g.cs", id.qualified_name())
        } else {
            format!("{}ValueConverter.g.cs", id.name)
        }
    }

    fn class_name(&self, id: &TypeSymbol) -> String {
        if self.is_shared(id) {
            format!("{}_{}ValueConverter", id.namespace.segments().join("_"), id.name)
        } else {
            format!("{}ValueConverter", id.name)
        }
    }

    fn partial(&self) -> bool {
        true
    }

    fn usings(&self, id: &TypeSymbol) -> Vec<String> {
        let mut usings = vec![
            "Microsoft.EntityFrameworkCore.Storage.ValueConversion".to_string(),
            "System".to_string(),
        ];
        if !id.namespace.is_global() && !self.is_shared(id) {
            usings.push(id.namespace.to_string());
        }
        usings
    }
}

/// The sole type argument of the identifier's marker tag.
///
/// Fails unless exactly one implemented interface counts as the marker and
/// that interface carries exactly one type argument.
pub fn marker_argument<'s>(id: &'s IdentifierType, matcher: &MarkerMatcher) -> CodegenResult<&'s TypeRef> {
    let markers: Vec<&TypeRef> = id
        .symbol()
        .interfaces
        .iter()
        .filter(|i| matcher.is_marker(i))
        .collect();

    let precondition = |found: String| CodegenError::SynthesisPrecondition {
        type_name: id.symbol().qualified_name(),
        marker: matcher.interface_name().to_string(),
        found,
    };

    match markers[..] {
        [marker] => match marker.type_arguments.as_slice() {
            [argument] => Ok(argument),
            arguments => Err(precondition(format!("{} type arguments", arguments.len()))),
        },
        _ => Err(precondition(format!("{} marker interfaces", markers.len()))),
    }
}

/// Picks the scalar member a converter reads.
///
/// `preferred` wins whenever the type lists it or lists no properties at
/// all. Otherwise a lone property of the primitive's type is used.
fn canonical_member(symbol: &TypeSymbol, primitive: &TypeRef, preferred: &str) -> String {
    let mut properties = symbol
        .members
        .iter()
        .filter(|m| m.kind == MemberKind::Property)
        .peekable();
    if properties.peek().is_none() || symbol.members.iter().any(|m| m.name == preferred) {
        return preferred.to_string();
    }

    let scalars: Vec<_> = properties
        .filter(|m| m.type_ref.as_ref().is_some_and(|t| t.name == primitive.name))
        .collect();
    match scalars.as_slice() {
        [only] => only.name.clone(),
        _ => preferred.to_string(),
    }
}

pub fn synthesize_converter(
    id: &IdentifierType,
    matcher: &MarkerMatcher,
    value_member: &str,
    strategy: &dyn ConverterStrategy,
) -> CodegenResult<ConverterArtifact> {
    let symbol = id.symbol();
    let primitive = marker_argument(id, matcher)?.clone();
    let wrapper = strategy.wrapper_reference(symbol);

    let mut artifact = ConverterArtifact {
        identity: id.identity(),
        class_name: strategy.class_name(symbol),
        namespace: strategy.converter_namespace(symbol),
        unwrap: Projection::Member {
            name: canonical_member(symbol, &primitive, value_member),
        },
        wrap: Projection::Construct {
            type_name: wrapper.clone(),
        },
        wrapper,
        primitive,
        partial: strategy.partial(),
        hint_name: strategy.hint_name(symbol),
        source: String::new(),
    };
    artifact.source = render_converter(&artifact, &strategy.usings(symbol));

    trace!(
        "Converter: {} -> {} ({})",
        artifact.identity,
        artifact.hint_name,
        strategy.name()
    );
    Ok(artifact)
}

fn render_converter(artifact: &ConverterArtifact, usings: &[String]) -> String {
    let mut source = String::new();
    source.push_str(AUTO_GENERATED_HEADER);
    source.push('\n');
    for using in usings {
        source.push_str(&format!("using {using};\n"));
    }

    let modifier = if artifact.partial { "public partial class" } else { "public class" };
    source.push_str(&format!(
        r#"namespace {namespace}
{{
    {modifier} {class} : ValueConverter<{wrapper}, {primitive}>
    {{
        public {class}() : base({unwrap}, {wrap}) {{ }}
    }}
}}
"#,
        namespace = artifact.namespace,
        class = artifact.class_name,
        wrapper = artifact.wrapper,
        primitive = artifact.primitive.name,
        unwrap = artifact.unwrap,
        wrap = artifact.wrap,
    ));
    source
}
