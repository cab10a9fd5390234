//! Generator configuration and build properties.
//!
//! Both generators read the same [`GeneratorConfig`]. Every field has a
//! default matching the conventions of the persistence library the generated
//! code targets, so an empty configuration file (or none at all) is valid.
//!
//! ```
//! use strongid_codegen::config::{GeneratorConfig, ViolationPolicy};
//!
//! let config = GeneratorConfig::builder()
//!     .violation_policy(ViolationPolicy::AbortUnit)
//!     .build();
//! assert_eq!(config.marker_interface, "IStronglyTypedId");
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use derive_more::{From, Into};
use serde::{Deserialize, Serialize};
use strongid_symbols::Namespace;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};
use typed_builder::TypedBuilder;

use crate::error::{CodegenError, CodegenResult};

/// Build property carrying the project's root namespace.
pub const ROOT_NAMESPACE_PROPERTY: &str = "build_property.RootNamespace";

pub const DEFAULT_MARKER_INTERFACE: &str = "IStronglyTypedId";
pub const DEFAULT_MARKER_TOKEN: &str = "StronglyTypedId";
pub const DEFAULT_VALUE_MEMBER: &str = "Id";

/// Global options the build system exposes to generators.
#[derive(Debug, Clone, Default, PartialEq, Eq, From, Into)]
pub struct BuildProperties(BTreeMap<String, String>);

impl BuildProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn with_root_namespace(self, root_namespace: impl Into<String>) -> Self {
        self.with(ROOT_NAMESPACE_PROPERTY, root_namespace)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// The root namespace, treating a blank value like a missing one.
    pub fn root_namespace(&self) -> Option<&str> {
        self.get(ROOT_NAMESPACE_PROPERTY)
            .map(str::trim)
            .filter(|ns| !ns.is_empty())
    }
}

/// Base types a persistence context may directly derive from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter)]
#[derive(Serialize, Deserialize)]
pub enum ContextBase {
    AppDbContextBase,
    AppIdentityDbContextBase,
    AppIdentityUserContextBase,
}

/// How an implemented interface is recognized as the marker tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[derive(Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MarkerMatch {
    /// Any interface with the marker's simple name, in any namespace and of
    /// any arity
    #[default]
    SimpleName,
    /// Simple name, namespace and a single type argument must all match
    Qualified,
}

/// What the wiring generator does with a scanned declaration that is not a
/// valid persistence context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[derive(Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ViolationPolicy {
    /// Skip the offending declaration and keep scanning the unit
    #[default]
    SkipDeclaration,
    /// Drop everything the unit produced and move on to the next unit
    AbortUnit,
    /// Drop everything the unit produced and end the pass
    AbortPass,
}

/// Order of registration statements inside a wiring artifact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[derive(Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StatementOrder {
    /// Local identifiers first, then referenced ones, each in host order
    #[default]
    Discovery,
    /// Sorted by simple name, then namespace
    ByName,
}

#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder, Serialize, Deserialize)]
#[builder(doc)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Simple name of the marker interface
    #[builder(default = DEFAULT_MARKER_INTERFACE.to_string(), setter(into))]
    pub marker_interface: String,

    /// Text a syntax unit must contain to be scanned for identifier types
    #[builder(default = DEFAULT_MARKER_TOKEN.to_string(), setter(into))]
    pub marker_token: String,

    #[builder(default)]
    pub marker_match: MarkerMatch,

    /// Namespace of the marker interface, required for qualified matching
    #[builder(default, setter(strip_option, into))]
    pub marker_namespace: Option<Namespace>,

    #[builder(default = ContextBase::iter().collect())]
    pub context_bases: Vec<ContextBase>,

    /// Scalar member a converter reads to unwrap an identifier
    #[builder(default = DEFAULT_VALUE_MEMBER.to_string(), setter(into))]
    pub value_member: String,

    #[builder(default)]
    pub violation_policy: ViolationPolicy,

    #[builder(default)]
    pub statement_order: StatementOrder,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl GeneratorConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> CodegenResult<Self> {
        let content = fs::read_to_string(&path).map_err(|e| {
            CodegenError::Configuration(format!(
                "Failed to read configuration file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> CodegenResult<Self> {
        let config: GeneratorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CodegenResult<()> {
        for (field, value) in [
            ("marker_interface", &self.marker_interface),
            ("marker_token", &self.marker_token),
            ("value_member", &self.value_member),
        ] {
            if value.trim().is_empty() {
                return Err(CodegenError::Configuration(format!("{field} cannot be empty")));
            }
        }

        if self.context_bases.is_empty() {
            return Err(CodegenError::Configuration(
                "context_bases must name at least one base".to_string(),
            ));
        }

        if self.marker_match == MarkerMatch::Qualified
            && self.marker_namespace.as_ref().is_none_or(Namespace::is_global)
        {
            return Err(CodegenError::Configuration(
                "qualified marker matching requires marker_namespace".to_string(),
            ));
        }

        Ok(())
    }

    pub fn recognizes_base(&self, base_name: &str) -> bool {
        self.context_bases.iter().any(|base| base.as_ref() == base_name)
    }
}
