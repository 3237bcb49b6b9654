//! Rule set evaluation.
//!
//! An [`Engine`] evaluates one rule set against one request's containers.
//! Every call builds its own evaluation state, so concurrent requests never
//! share a latch or an inspected property.

use crate::format::{ErrorFormatter, MISSING_PARAMETER_TEMPLATE};
use crate::registry::Predicate;
use crate::rules::predicates_of;
use crate::{
    PredicateRegistry, PropertyRule, RequestContainers, RequirementsError, RequirementsOptions,
    Result, RuleEntry, RuleSetKey, RuleStore, Scope, ValidationError, ValidatorSpec, inherit,
};
use requisite_core::logging::{debug, trace};
use serde_json::{Map, Number, Value};
use std::borrow::Cow;
use std::sync::Arc;

/// `isArray` option holding the per-element predicates
pub const ARRAY_CONTENT_KEY: &str = "content";

#[derive(Clone)]
pub struct Engine {
    store: Arc<dyn RuleStore>,
    registry: Arc<PredicateRegistry>,
    options: Arc<RequirementsOptions>,
}

impl Engine {
    pub fn new(
        store: Arc<dyn RuleStore>,
        registry: Arc<PredicateRegistry>,
        options: Arc<RequirementsOptions>,
    ) -> Self {
        Self {
            store,
            registry,
            options,
        }
    }

    pub fn options(&self) -> &RequirementsOptions {
        &self.options
    }

    pub fn registry(&self) -> &PredicateRegistry {
        &self.registry
    }

    /// Validate `containers` against the rule set named by the dotted `key`.
    ///
    /// `Ok(None)` means the request passes; `Ok(Some(_))` carries the first
    /// failure. `Err` is a configuration problem.
    pub fn check(&self, key: &str, containers: &RequestContainers) -> Result<Option<ValidationError>> {
        self.check_key(&RuleSetKey::parse(key)?, containers)
    }

    pub fn check_key(
        &self,
        key: &RuleSetKey,
        containers: &RequestContainers,
    ) -> Result<Option<ValidationError>> {
        let rule_set = self.store.resolve(key, &self.options)?;

        let mut evaluation = Evaluation {
            engine: self,
            key,
            containers,
            formatter: ErrorFormatter::new(&self.options),
        };
        evaluation.run(rule_set.entries())?;

        let inspected = evaluation.formatter.inspected().to_string();
        let error = evaluation.formatter.into_error();
        if let Some(error) = &error {
            debug!(
                key = %key,
                property = %inspected,
                code = error.code,
                "Request rejected"
            );
        }
        Ok(error)
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("registry", &self.registry)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// String form handed to predicates: strings as-is, everything else as
/// compact JSON with numbers written the way JavaScript prints them
/// (`10.0` becomes `10`)
pub fn predicate_input(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        other => {
            let mut out = String::new();
            write_compact(other, &mut out);
            Cow::Owned(out)
        }
    }
}

fn write_compact(value: &Value, out: &mut String) {
    match value {
        Value::Number(n) => out.push_str(&number_text(n)),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_compact(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::from(key.as_str()).to_string());
                out.push(':');
                write_compact(item, out);
            }
            out.push('}');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if !n.is_i64() && !n.is_u64() && f.fract() == 0.0 && f.abs() < 1e21 => {
            if f == 0.0 {
                "0".to_string()
            } else {
                format!("{f:.0}")
            }
        }
        _ => n.to_string(),
    }
}

struct Evaluation<'a> {
    engine: &'a Engine,
    key: &'a RuleSetKey,
    containers: &'a RequestContainers,
    formatter: ErrorFormatter<'a>,
}

impl<'a> Evaluation<'a> {
    fn run(&mut self, entries: &[RuleEntry]) -> Result<()> {
        for entry in entries {
            match entry {
                RuleEntry::Property { name, rule } => self.check_property(name, rule, None)?,
                RuleEntry::Scoped { scope, properties } => {
                    for (name, rule) in properties {
                        self.check_property(name, rule, Some(*scope))?;
                        if self.formatter.is_latched() {
                            break;
                        }
                    }
                }
            }

            if self.formatter.is_latched() {
                break;
            }
        }
        Ok(())
    }

    fn check_property(&mut self, property: &str, rule: &PropertyRule, hint: Option<Scope>) -> Result<()> {
        self.formatter.inspect(property);

        let containers = self.containers;
        let Some(found) = containers.locate(property, hint) else {
            if let Some(required) = rule.required.as_ref().filter(|r| r.enabled) {
                self.formatter.fail(
                    required.error_code,
                    Some(required.error_message.as_deref().unwrap_or(MISSING_PARAMETER_TEMPLATE)),
                );
            }
            return Ok(());
        };

        let merged;
        let rule = if rule.inherit_from.is_some() {
            merged = inherit::merge(
                rule,
                property,
                self.key,
                self.engine.store.as_ref(),
                &self.engine.options,
            )?;
            &merged
        } else {
            rule
        };

        self.apply(&predicate_input(found.value), &rule.predicates)
    }

    fn apply(&mut self, input: &str, predicates: &[(String, ValidatorSpec)]) -> Result<()> {
        for (name, spec) in predicates {
            if self.formatter.is_latched() {
                break;
            }

            let passed = self.invoke(name, input, spec.argument())?;
            trace!(
                property = %self.formatter.inspected(),
                predicate = %name,
                passed,
                "Predicate evaluated"
            );
            if !passed {
                self.formatter
                    .fail(spec.error_code, spec.error_message.as_deref());
            }
        }
        Ok(())
    }

    fn invoke(&mut self, name: &str, input: &str, argument: Option<&Value>) -> Result<bool> {
        let engine = self.engine;
        match engine.registry.get(name) {
            Some(Predicate::Check(check)) => Ok(check(input, argument)),
            Some(Predicate::Array) => self.check_array(input, argument),
            None => Err(RequirementsError::UnknownPredicate(name.to_string())),
        }
    }

    /// `isArray`: the input must parse as a JSON array. `content` predicates
    /// run against each element; the remaining option keys are predicates run
    /// once against the raw input. Nested failures latch their own error and
    /// leave `isArray` itself passing.
    fn check_array(&mut self, raw: &str, argument: Option<&Value>) -> Result<bool> {
        let Ok(Value::Array(items)) = serde_json::from_str::<Value>(raw) else {
            return Ok(false);
        };
        let Some(options) = argument.and_then(Value::as_object) else {
            return Ok(true);
        };

        let engine = self.engine;
        let settings = engine.options.as_ref();
        let mut group_pending = true;
        for (key, spec) in options {
            if self.formatter.is_latched() {
                break;
            }

            if key == ARRAY_CONTENT_KEY {
                let predicates = match spec {
                    Value::Object(map) => predicates_of(map, settings),
                    _ => Vec::new(),
                };
                for item in &items {
                    if self.formatter.is_latched() {
                        break;
                    }
                    self.apply(&predicate_input(item), &predicates)?;
                }
            } else if group_pending {
                group_pending = false;
                let group: Map<String, Value> = options
                    .iter()
                    .filter(|(name, _)| name.as_str() != ARRAY_CONTENT_KEY)
                    .map(|(name, spec)| (name.clone(), spec.clone()))
                    .collect();
                self.apply(raw, &predicates_of(&group, settings))?;
            }
        }
        Ok(true)
    }
}
