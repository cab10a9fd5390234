//! Resolved symbol shapes handed out by the facade.
//!
//! These mirror what a host compiler knows about a named type after
//! resolution: where it lives, what kind of type it is, what it derives from
//! and which interfaces it implements. They are plain values; nothing in the
//! generators mutates them after they come out of a [`SymbolQuery`].
//!
//! [`SymbolQuery`]: crate::query::SymbolQuery

use std::fmt;
use std::str::FromStr;

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use strum::{Display as StrumDisplay, EnumString};
use typed_builder::TypedBuilder;

/// A dot-separated namespace. The empty namespace is the global namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, From, Into)]
#[derive(Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Namespace(Vec<String>);

impl Namespace {
    pub fn global() -> Self {
        Self(Vec::new())
    }

    pub fn is_global(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Returns a namespace one level deeper.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// Qualifies `name` with this namespace, leaving it bare in the global namespace.
    pub fn qualify(&self, name: &str) -> String {
        if self.is_global() {
            name.to_string()
        } else {
            format!("{self}.{name}")
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl From<&str> for Namespace {
    fn from(value: &str) -> Self {
        Self(
            value
                .split('.')
                .map(str::trim)
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}

impl From<String> for Namespace {
    fn from(value: String) -> Self {
        Namespace::from(value.as_str())
    }
}

impl From<Namespace> for String {
    fn from(value: Namespace) -> Self {
        value.to_string()
    }
}

impl FromStr for Namespace {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Namespace::from(s))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, StrumDisplay, EnumString)]
#[derive(Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    #[default]
    Class,
    Interface,
    Struct,
    Enum,
    Delegate,
    Other,
}

/// A reference to a type as it appears in a base list or a type argument.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    #[serde(default)]
    pub namespace: Namespace,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_arguments: Vec<TypeRef>,
}

impl TypeRef {
    pub fn new(namespace: impl Into<Namespace>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            type_arguments: Vec::new(),
        }
    }

    pub fn with_argument(mut self, argument: TypeRef) -> Self {
        self.type_arguments.push(argument);
        self
    }

    pub fn qualified_name(&self) -> String {
        self.namespace.qualify(&self.name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, StrumDisplay, EnumString)]
#[derive(Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    #[default]
    Property,
    Field,
    Method,
    Constructor,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberSymbol {
    pub name: String,
    #[serde(default)]
    pub kind: MemberKind,
    #[serde(default, rename = "type")]
    pub type_ref: Option<TypeRef>,
}

impl MemberSymbol {
    pub fn property(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Property,
            type_ref: Some(type_ref),
        }
    }
}

/// Identity of a named type within one generation pass.
///
/// Two symbols with the same identity are the same logical type even when
/// one was resolved from source and the other from a referenced binary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("{}", namespace.qualify(name))]
pub struct TypeIdentity {
    pub namespace: Namespace,
    pub name: String,
}

/// A fully resolved named type.
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder, Serialize, Deserialize)]
pub struct TypeSymbol {
    #[builder(default, setter(into))]
    #[serde(default)]
    pub namespace: Namespace,

    #[builder(setter(into))]
    pub name: String,

    #[builder(default)]
    #[serde(default)]
    pub kind: TypeKind,

    #[builder(default)]
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,

    #[builder(default)]
    #[serde(default, rename = "generic")]
    pub is_generic: bool,

    /// Direct base type, if any
    #[builder(default, setter(strip_option))]
    #[serde(default, rename = "base")]
    pub base_type: Option<TypeRef>,

    /// Every interface the type implements, directly or through its bases
    #[builder(default)]
    #[serde(default)]
    pub interfaces: Vec<TypeRef>,

    #[builder(default)]
    #[serde(default)]
    pub members: Vec<MemberSymbol>,
}

impl TypeSymbol {
    pub fn identity(&self) -> TypeIdentity {
        TypeIdentity {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
        }
    }

    pub fn qualified_name(&self) -> String {
        self.namespace.qualify(&self.name)
    }

    pub fn base_name(&self) -> Option<&str> {
        self.base_type.as_ref().map(|base| base.name.as_str())
    }

    pub fn interfaces_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a TypeRef> + 'a {
        self.interfaces.iter().filter(move |i| i.name == name)
    }
}
