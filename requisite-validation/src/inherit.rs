// `_inheritFrom` resolution

use crate::{PropertyRule, RequirementsError, RequirementsOptions, Result, RuleSetKey, RuleStore};
use requisite_core::logging::warn;

/// Effective rule for `property`: the same-named top-level rule of the
/// referenced rule set, layered under `rule`.
///
/// References are resolved one level deep; a referenced rule that itself
/// inherits is used without following its own reference.
pub fn merge(
    rule: &PropertyRule,
    property: &str,
    current: &RuleSetKey,
    store: &dyn RuleStore,
    options: &RequirementsOptions,
) -> Result<PropertyRule> {
    let Some(reference) = rule.inherit_from.as_deref() else {
        return Ok(rule.clone());
    };

    let source_key = current.reference(reference)?;
    let source = store.resolve(&source_key, options)?;
    let base = source
        .property(property)
        .ok_or_else(|| RequirementsError::InheritanceNotFound {
            rule_set: source_key.to_string(),
            property: property.to_string(),
        })?;

    if let Some(next) = &base.inherit_from {
        warn!(
            property = property,
            rule_set = %source_key,
            reference = %next,
            "Inherited rule declares its own _inheritFrom; not followed"
        );
    }

    Ok(layer(base, rule))
}

/// Layer `local` over `base`: local predicates come first in their own
/// order, a same-named inherited predicate is replaced entirely, and the
/// predicates only `base` declares follow in inherited order. `required` is
/// never inherited.
pub fn layer(base: &PropertyRule, local: &PropertyRule) -> PropertyRule {
    let inherited_only = base
        .predicates
        .iter()
        .filter(|(name, _)| local.predicate(name).is_none());
    let predicates = local
        .predicates
        .iter()
        .chain(inherited_only)
        .cloned()
        .collect();

    PropertyRule {
        required: local.required.clone(),
        inherit_from: None,
        predicates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryRuleStore;
    use serde_json::{Value, json};

    fn rule(value: Value) -> PropertyRule {
        PropertyRule::from_value("name", &value, &RequirementsOptions::default()).unwrap()
    }

    fn names(rule: &PropertyRule) -> Vec<&str> {
        rule.predicates.iter().map(|(name, _)| name.as_str()).collect()
    }

    #[test]
    fn test_layer_order_and_override() {
        let base = rule(json!({
            "required": true,
            "notEmpty": true,
            "isAlpha": { "errorMessage": "%@_must_be_alpha" }
        }));
        let local = rule(json!({
            "_inheritFrom": "source",
            "isAlpha": { "errorMessage": "%@_letters_only" },
            "isLength": { "max": 10 }
        }));

        let merged = layer(&base, &local);
        assert_eq!(names(&merged), ["isAlpha", "isLength", "notEmpty"]);
        assert_eq!(
            merged.predicate("isAlpha").unwrap().error_message.as_deref(),
            Some("%@_letters_only")
        );
        assert!(!merged.is_required());
        assert!(merged.inherit_from.is_none());
    }

    #[test]
    fn test_merge_from_sibling() {
        let store = MemoryRuleStore::new()
            .with_collection(
                "route",
                json!({
                    "source": { "name": { "isAlpha": true }, "age": { "isInt": true } },
                    "target": { "name": { "_inheritFrom": "source", "required": true } }
                }),
            )
            .unwrap();
        let options = RequirementsOptions::default();
        let current = RuleSetKey::parse("route.target").unwrap();
        let local = rule(json!({ "_inheritFrom": "source", "required": true }));

        let merged = merge(&local, "name", &current, &store, &options).unwrap();
        assert_eq!(names(&merged), ["isAlpha"]);
        assert!(merged.is_required());

        let missing = merge(&local, "nickname", &current, &store, &options);
        assert!(matches!(missing, Err(RequirementsError::InheritanceNotFound { .. })));
    }

    #[test]
    fn test_merge_from_full_key() {
        let store = MemoryRuleStore::new()
            .with_collection("shared", json!({ "people": { "name": { "isLowercase": true } } }))
            .unwrap();
        let current = RuleSetKey::parse("route.target").unwrap();
        let local = rule(json!({ "_inheritFrom": "shared.people" }));

        let merged = merge(&local, "name", &current, &store, &RequirementsOptions::default()).unwrap();
        assert_eq!(names(&merged), ["isLowercase"]);
    }

    #[test]
    fn test_merge_without_reference_is_identity() {
        let store = MemoryRuleStore::new();
        let current = RuleSetKey::parse("route.target").unwrap();
        let local = rule(json!({ "isInt": true }));

        let merged = merge(&local, "name", &current, &store, &RequirementsOptions::default()).unwrap();
        assert_eq!(merged, local);
    }
}
