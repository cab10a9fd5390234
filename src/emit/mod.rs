//! Source artifacts produced by the generators.
//!
//! Converters and wiring are modelled structurally first ([`ConverterArtifact`],
//! [`WiringArtifact`]) and rendered to text second. The structural form is
//! what the tests reason about; the text is what the host compiles.

pub mod converter;
pub mod wiring;

use std::collections::BTreeMap;
use std::fmt;

use strongid_symbols::{MemberKind, Namespace, TypeIdentity, TypeRef, TypeSymbol};

pub use converter::{
    ConverterStrategy, IdentifierNamespaceStrategy, RootNamespaceStrategy, marker_argument,
    synthesize_converter,
};
pub use wiring::{ContextType, Violation, WiringArtifact, classify_context, emit_wiring};

/// Namespace segment converters are placed under.
pub const CONVERTER_NAMESPACE_SEGMENT: &str = "ValueConverters";

/// Header every generated file starts with.
pub const AUTO_GENERATED_HEADER: &str = "// <auto-generated/>";

/// A named text file handed to the artifact sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceArtifact {
    pub hint_name: String,
    pub text: String,
}

impl SourceArtifact {
    pub fn new(hint_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            hint_name: hint_name.into(),
            text: text.into(),
        }
    }
}

/// One direction of a converter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Projection {
    /// Wrapper to primitive: read the wrapper's scalar member
    Member { name: String },
    /// Primitive to wrapper: call the wrapper's single-argument constructor
    Construct { type_name: String },
}

impl Projection {
    /// The projection as a lambda over the parameter `p`.
    pub fn lambda(&self) -> String {
        match self {
            Projection::Member { name } => format!("p => p.{name}"),
            Projection::Construct { type_name } => format!("p => new {type_name}(p)"),
        }
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lambda())
    }
}

/// A primitive value a strongly-typed identifier can wrap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Text(String),
    Guid(u128),
}

/// A wrapper value as seen by a converter: its type and scalar members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperInstance {
    pub type_name: String,
    pub members: BTreeMap<String, ScalarValue>,
}

impl WrapperInstance {
    /// Models `new {type_name}(value)` for a type shaped like `shape`.
    ///
    /// The argument is stored in every declared property typed as
    /// `primitive`. A type that declares no properties only exposes
    /// `interface_member`, the value property of the marker interface.
    pub fn construct(
        type_name: impl Into<String>,
        shape: &TypeSymbol,
        primitive: &TypeRef,
        interface_member: &str,
        value: ScalarValue,
    ) -> Self {
        let declared: Vec<_> = shape
            .members
            .iter()
            .filter(|m| m.kind == MemberKind::Property)
            .collect();

        let members = if declared.is_empty() {
            BTreeMap::from([(interface_member.to_string(), value)])
        } else {
            declared
                .into_iter()
                .filter(|m| m.type_ref.as_ref().is_some_and(|t| t.name == primitive.name))
                .map(|m| (m.name.clone(), value.clone()))
                .collect()
        };

        Self {
            type_name: type_name.into(),
            members,
        }
    }
}

/// The conversion unit for one identifier type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterArtifact {
    pub identity: TypeIdentity,
    pub class_name: String,
    pub namespace: Namespace,
    /// How the wrapper type is spelled inside the converter
    pub wrapper: String,
    pub primitive: TypeRef,
    pub unwrap: Projection,
    pub wrap: Projection,
    /// Whether the converter is emitted as a partial class
    pub partial: bool,
    pub hint_name: String,
    pub source: String,
}

impl ConverterArtifact {
    /// Fully qualified converter reference usable from any namespace.
    pub fn global_reference(&self) -> String {
        format!("global::{}", self.namespace.qualify(&self.class_name))
    }

    /// Applies the unwrap projection. `None` when the instance is not of the
    /// wrapper type or lacks the member the projection reads.
    pub fn unwrap_value(&self, instance: &WrapperInstance) -> Option<ScalarValue> {
        let Projection::Member { name } = &self.unwrap else {
            return None;
        };
        if instance.type_name != self.wrapper {
            return None;
        }
        instance.members.get(name).cloned()
    }

    /// Applies the wrap projection to `value`, building the instance from
    /// the identifier's declared shape.
    pub fn wrap_value(&self, shape: &TypeSymbol, interface_member: &str, value: ScalarValue) -> WrapperInstance {
        let type_name = match &self.wrap {
            Projection::Construct { type_name } => type_name.as_str(),
            Projection::Member { .. } => self.wrapper.as_str(),
        };
        WrapperInstance::construct(type_name, shape, &self.primitive, interface_member, value)
    }

    pub fn to_source(&self) -> SourceArtifact {
        SourceArtifact::new(self.hint_name.clone(), self.source.clone())
    }
}
