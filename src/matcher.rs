//! Recognizes strongly-typed identifier types.

use strongid_symbols::{Namespace, TypeKind, TypeRef, TypeSymbol};

use crate::config::{GeneratorConfig, MarkerMatch};

/// Decides whether a type is a strongly-typed identifier.
///
/// A match is a concrete, non-generic class implementing the marker
/// interface. With [`MarkerMatch::SimpleName`] any interface carrying the
/// marker's simple name counts, whatever its namespace or arity, so an
/// unrelated interface that happens to share the name is accepted too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerMatcher {
    interface: String,
    mode: MarkerMatch,
    namespace: Option<Namespace>,
}

impl MarkerMatcher {
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            mode: MarkerMatch::SimpleName,
            namespace: None,
        }
    }

    pub fn qualified(namespace: impl Into<Namespace>, interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            mode: MarkerMatch::Qualified,
            namespace: Some(namespace.into()),
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self {
            interface: config.marker_interface.clone(),
            mode: config.marker_match,
            namespace: config.marker_namespace.clone(),
        }
    }

    pub fn interface_name(&self) -> &str {
        &self.interface
    }

    pub fn is_marker(&self, interface: &TypeRef) -> bool {
        if interface.name != self.interface {
            return false;
        }
        match self.mode {
            MarkerMatch::SimpleName => true,
            MarkerMatch::Qualified => {
                interface.type_arguments.len() == 1
                    && self.namespace.as_ref() == Some(&interface.namespace)
            }
        }
    }

    /// Every implemented interface that counts as the marker.
    pub fn marker_interfaces<'a>(&'a self, symbol: &'a TypeSymbol) -> impl Iterator<Item = &'a TypeRef> + 'a {
        symbol.interfaces.iter().filter(move |i| self.is_marker(i))
    }

    pub fn is_identifier_type(&self, symbol: &TypeSymbol) -> bool {
        symbol.kind == TypeKind::Class
            && !symbol.is_abstract
            && !symbol.is_generic
            && self.marker_interfaces(symbol).next().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(ns: &str) -> TypeRef {
        TypeRef::new(ns, "IStronglyTypedId").with_argument(TypeRef::new("System", "Int64"))
    }

    fn candidate() -> TypeSymbol {
        TypeSymbol::builder()
            .namespace("Acme.Domain")
            .name("OrderId")
            .interfaces(vec![TypeRef::new("System", "IEquatable"), marker("NetCorePal.Domain")])
            .build()
    }

    #[test]
    fn test_concrete_class_with_marker_matches() {
        let matcher = MarkerMatcher::new("IStronglyTypedId");
        assert!(matcher.is_identifier_type(&candidate()));
    }

    #[test]
    fn test_abstract_generic_and_non_class_rejected() {
        let matcher = MarkerMatcher::new("IStronglyTypedId");

        let mut abstract_id = candidate();
        abstract_id.is_abstract = true;
        assert!(!matcher.is_identifier_type(&abstract_id));

        let mut generic_id = candidate();
        generic_id.is_generic = true;
        assert!(!matcher.is_identifier_type(&generic_id));

        for kind in [TypeKind::Struct, TypeKind::Interface, TypeKind::Enum] {
            let mut other = candidate();
            other.kind = kind;
            assert!(!matcher.is_identifier_type(&other), "{kind} should not match");
        }
    }

    #[test]
    fn test_type_without_marker_rejected() {
        let matcher = MarkerMatcher::new("IStronglyTypedId");
        let plain = TypeSymbol::builder().namespace("Acme").name("Order").build();
        assert!(!matcher.is_identifier_type(&plain));
    }

    #[test]
    fn test_simple_name_accepts_unrelated_same_named_interface() {
        let matcher = MarkerMatcher::new("IStronglyTypedId");
        let lookalike = TypeSymbol::builder()
            .namespace("ThirdParty")
            .name("Handle")
            .interfaces(vec![TypeRef::new("ThirdParty.Ids", "IStronglyTypedId")])
            .build();
        assert!(matcher.is_identifier_type(&lookalike));
    }

    #[test]
    fn test_qualified_rejects_lookalikes() {
        let matcher = MarkerMatcher::qualified("NetCorePal.Domain", "IStronglyTypedId");
        assert!(matcher.is_identifier_type(&candidate()));

        let wrong_namespace = TypeSymbol::builder()
            .name("Handle")
            .interfaces(vec![marker("ThirdParty.Ids")])
            .build();
        assert!(!matcher.is_identifier_type(&wrong_namespace));

        let wrong_arity = TypeSymbol::builder()
            .name("Handle")
            .interfaces(vec![TypeRef::new("NetCorePal.Domain", "IStronglyTypedId")])
            .build();
        assert!(!matcher.is_identifier_type(&wrong_arity));
    }

    #[test]
    fn test_from_config() {
        let config = GeneratorConfig::builder()
            .marker_match(MarkerMatch::Qualified)
            .marker_namespace("NetCorePal.Domain")
            .build();
        let matcher = MarkerMatcher::from_config(&config);
        assert_eq!(matcher, MarkerMatcher::qualified("NetCorePal.Domain", "IStronglyTypedId"));
    }
}
