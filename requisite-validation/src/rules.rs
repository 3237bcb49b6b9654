//! Typed rule model.
//!
//! Rule set definitions arrive as JSON documents. Parsing them into these
//! types is the only place raw definitions are read, and it always produces
//! owned values, so evaluation never writes into a cached definition.
//!
//! A definition looks like:
//!
//! ```json
//! {
//!   "firstName": { "required": true, "notEmpty": true, "isAlpha": true },
//!   "data": { "matches": { "_parameter": "[0-9]{3}", "errorMessage": "wrong_%@" } },
//!   "_headers": { "x-auth": { "isAlpha": true } }
//! }
//! ```

use crate::{RequirementsError, RequirementsOptions, Result, RuleSetKey, Scope};
use serde_json::{Map, Value};

/// Marks a property as mandatory
pub const REQUIRED_MARKER: &str = "required";

/// Names the rule set a property rule inherits from
pub const INHERIT_MARKER: &str = "_inheritFrom";

/// Explicit argument passed to a predicate
pub const PARAMETER_KEY: &str = "_parameter";

/// One predicate invocation: its argument and its error overrides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatorSpec {
    /// `_parameter`, when declared
    pub parameter: Option<Value>,

    /// Remaining keys once error fields and `_parameter` are stripped;
    /// `None` if nothing remains
    pub options: Option<Value>,

    pub error_code: Option<u16>,
    pub error_message: Option<String>,
}

impl ValidatorSpec {
    /// Parse a spec. Anything but an object (`true`, `1`, ...) is a spec
    /// without argument or overrides.
    pub fn from_value(value: &Value, options: &RequirementsOptions) -> Self {
        let Value::Object(map) = value else {
            return Self::default();
        };

        let mut rest = map.clone();
        let error_code = rest
            .remove(&options.error_code_key)
            .and_then(|code| parse_error_code(&code));
        let error_message = rest
            .remove(&options.error_message_key)
            .and_then(|message| match message {
                Value::String(message) if !message.is_empty() => Some(message),
                _ => None,
            });
        let parameter = rest.remove(PARAMETER_KEY).filter(|p| !p.is_null());

        Self {
            parameter,
            options: (!rest.is_empty()).then_some(Value::Object(rest)),
            error_code,
            error_message,
        }
    }

    /// Argument handed to the predicate: `_parameter` if declared, else the
    /// remaining options object
    pub fn argument(&self) -> Option<&Value> {
        self.parameter.as_ref().or(self.options.as_ref())
    }
}

/// The `required` marker with its own error overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct Requirement {
    /// Truthiness of the marker; `required: false` is no requirement
    pub enabled: bool,
    pub error_code: Option<u16>,
    pub error_message: Option<String>,
}

impl Requirement {
    pub fn from_value(value: &Value, options: &RequirementsOptions) -> Self {
        let spec = ValidatorSpec::from_value(value, options);
        Self {
            enabled: is_truthy(value),
            error_code: spec.error_code,
            error_message: spec.error_message,
        }
    }
}

/// Rules for one property: markers plus predicates in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyRule {
    pub required: Option<Requirement>,
    pub inherit_from: Option<String>,
    pub predicates: Vec<(String, ValidatorSpec)>,
}

impl PropertyRule {
    pub fn from_value(property: &str, value: &Value, options: &RequirementsOptions) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(RequirementsError::MalformedRule {
                property: property.to_string(),
                reason: format!("expected an object, found {}", kind(value)),
            });
        };

        let inherit_from = match map.get(INHERIT_MARKER) {
            None | Some(Value::Null) => None,
            Some(Value::String(name)) => Some(name.clone()),
            Some(other) => {
                return Err(RequirementsError::MalformedRule {
                    property: property.to_string(),
                    reason: format!("{INHERIT_MARKER} must be a string, found {}", kind(other)),
                });
            }
        };

        Ok(Self {
            required: map
                .get(REQUIRED_MARKER)
                .map(|marker| Requirement::from_value(marker, options)),
            inherit_from,
            predicates: predicates_of(map, options),
        })
    }

    /// Whether a missing value is an error
    pub fn is_required(&self) -> bool {
        self.required.as_ref().is_some_and(|r| r.enabled)
    }

    pub fn predicate(&self, name: &str) -> Option<&ValidatorSpec> {
        self.predicates
            .iter()
            .find(|(predicate, _)| predicate == name)
            .map(|(_, spec)| spec)
    }
}

/// Predicate entries of a rule map, reserved markers stripped
pub fn predicates_of(
    map: &Map<String, Value>,
    options: &RequirementsOptions,
) -> Vec<(String, ValidatorSpec)> {
    map.iter()
        .filter(|(name, _)| name.as_str() != REQUIRED_MARKER && name.as_str() != INHERIT_MARKER)
        .map(|(name, spec)| (name.clone(), ValidatorSpec::from_value(spec, options)))
        .collect()
}

/// A top-level rule set entry
#[derive(Debug, Clone, PartialEq)]
pub enum RuleEntry {
    /// Searched in every container
    Property { name: String, rule: PropertyRule },
    /// `_body`, `_headers` or `_params` block
    Scoped {
        scope: Scope,
        properties: Vec<(String, PropertyRule)>,
    },
}

/// A resolved, owned rule set.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    key: RuleSetKey,
    entries: Vec<RuleEntry>,
}

impl RuleSet {
    pub fn from_value(key: RuleSetKey, value: &Value, options: &RequirementsOptions) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(RequirementsError::MalformedRule {
                property: key.to_string(),
                reason: format!("rule set must be an object, found {}", kind(value)),
            });
        };

        let mut entries = Vec::with_capacity(map.len());
        for (name, rule) in map {
            let entry = match Scope::from_key(name) {
                Some(scope) => {
                    let Value::Object(block) = rule else {
                        return Err(RequirementsError::MalformedRule {
                            property: name.clone(),
                            reason: format!("scope block must be an object, found {}", kind(rule)),
                        });
                    };
                    let properties = block
                        .iter()
                        .map(|(property, rule)| {
                            PropertyRule::from_value(property, rule, options)
                                .map(|rule| (property.clone(), rule))
                        })
                        .collect::<Result<Vec<_>>>()?;
                    RuleEntry::Scoped { scope, properties }
                }
                None => RuleEntry::Property {
                    name: name.clone(),
                    rule: PropertyRule::from_value(name, rule, options)?,
                },
            };
            entries.push(entry);
        }

        Ok(Self { key, entries })
    }

    pub fn key(&self) -> &RuleSetKey {
        &self.key
    }

    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }

    /// Number of property rules, scoped ones included
    pub fn property_count(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| match entry {
                RuleEntry::Property { .. } => 1,
                RuleEntry::Scoped { properties, .. } => properties.len(),
            })
            .sum()
    }

    /// Top-level (unscoped) rule for `name`, the target of `_inheritFrom`
    pub fn property(&self, name: &str) -> Option<&PropertyRule> {
        self.entries.iter().find_map(|entry| match entry {
            RuleEntry::Property { name: n, rule } if n == name => Some(rule),
            _ => None,
        })
    }
}

/// JavaScript-style truthiness of a marker value
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Status code from a number or a string with a leading integer (`"403"`,
/// `"403 Forbidden"`). Codes outside `100..=999` are ignored.
fn parse_error_code(value: &Value) -> Option<u16> {
    let code = match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f.trunc() as u64))?,
        Value::String(s) => {
            let digits: String = s
                .trim_start()
                .chars()
                .take_while(char::is_ascii_digit)
                .collect();
            digits.parse().ok()?
        }
        _ => return None,
    };
    u16::try_from(code).ok().filter(|code| (100..=999).contains(code))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
