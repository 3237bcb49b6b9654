// Built-in string predicates
//
// Every predicate receives the string form of the value and the optional
// argument from its spec. Predicates are total: malformed input or a
// malformed argument is a failed check, never a panic.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde_json::Value;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Signature shared by the built-in string predicates
pub type StringPredicate = fn(&str, Option<&Value>) -> bool;

// Common regex patterns
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$").unwrap()
});

static URL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").unwrap());

static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$").unwrap()
});

static ALPHA_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z]+$").unwrap());

static ALPHANUMERIC_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]+$").unwrap());

static NUMERIC_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?([0-9]*\.)?[0-9]+$").unwrap());

static INT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-+]?[0-9]+$").unwrap());

static STRICT_INT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+]?(?:0|[1-9][0-9]*)$").unwrap());

static FLOAT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-+]?(?:[0-9]+)?(?:\.[0-9]*)?(?:[eE][+-]?[0-9]+)?$").unwrap()
});

static HEX_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(?:0x|0h)?[0-9a-f]+$").unwrap());

/// Name and function of every built-in string predicate
pub static BUILTIN: &[(&str, StringPredicate)] = &[
    ("contains", contains),
    ("equals", equals),
    ("matches", matches),
    ("isAlpha", is_alpha),
    ("isAlphanumeric", is_alphanumeric),
    ("isAscii", is_ascii),
    ("isBoolean", is_boolean),
    ("isDivisibleBy", is_divisible_by),
    ("isEmail", is_email),
    ("isEmpty", is_empty),
    ("isFloat", is_float),
    ("isHexadecimal", is_hexadecimal),
    ("isIn", is_in),
    ("isInt", is_int),
    ("isIP", is_ip),
    ("isJSON", is_json),
    ("isLength", is_length),
    ("isLowercase", is_lowercase),
    ("isNumeric", is_numeric),
    ("isURL", is_url),
    ("isUUID", is_uuid),
    ("isUppercase", is_uppercase),
    ("notEmpty", not_empty),
];

// Argument helpers

/// A number given as JSON number or numeric string
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// String form of a scalar argument
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Numeric bound `name` of an options object. `Err` when present but not
/// a number.
fn bound(arg: Option<&Value>, name: &str) -> Result<Option<f64>, ()> {
    match arg.and_then(|a| a.get(name)) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => number(value).map(Some).ok_or(()),
    }
}

fn within(value: f64, arg: Option<&Value>) -> bool {
    let check = || -> Result<bool, ()> {
        let min = bound(arg, "min")?.is_none_or(|min| value >= min);
        let max = bound(arg, "max")?.is_none_or(|max| value <= max);
        let gt = bound(arg, "gt")?.is_none_or(|gt| value > gt);
        let lt = bound(arg, "lt")?.is_none_or(|lt| value < lt);
        Ok(min && max && gt && lt)
    };
    check().unwrap_or(false)
}

// String predicates

pub fn contains(value: &str, arg: Option<&Value>) -> bool {
    arg.and_then(text).is_some_and(|needle| value.contains(&needle))
}

pub fn equals(value: &str, arg: Option<&Value>) -> bool {
    arg.and_then(text).is_some_and(|other| value == other)
}

/// Regex match. The argument is a pattern string, or
/// `{ "pattern": ..., "flags": "i" }` (`i`, `m` and `s` are understood).
pub fn matches(value: &str, arg: Option<&Value>) -> bool {
    let (pattern, flags) = match arg {
        Some(Value::String(pattern)) => (pattern.as_str(), ""),
        Some(Value::Object(map)) => match map.get("pattern").and_then(Value::as_str) {
            Some(pattern) => (pattern, map.get("flags").and_then(Value::as_str).unwrap_or("")),
            None => return false,
        },
        _ => return false,
    };

    RegexBuilder::new(pattern)
        .case_insensitive(flags.contains('i'))
        .multi_line(flags.contains('m'))
        .dot_matches_new_line(flags.contains('s'))
        .size_limit(1 << 20)
        .build()
        .is_ok_and(|regex| regex.is_match(value))
}

pub fn is_alpha(value: &str, _arg: Option<&Value>) -> bool {
    ALPHA_REGEX.is_match(value)
}

pub fn is_alphanumeric(value: &str, _arg: Option<&Value>) -> bool {
    ALPHANUMERIC_REGEX.is_match(value)
}

pub fn is_ascii(value: &str, _arg: Option<&Value>) -> bool {
    !value.is_empty() && value.is_ascii()
}

pub fn is_boolean(value: &str, _arg: Option<&Value>) -> bool {
    matches!(value, "true" | "false" | "1" | "0")
}

/// Numeric value divisible by the integer argument
pub fn is_divisible_by(value: &str, arg: Option<&Value>) -> bool {
    let Some(divisor) = arg.and_then(number).map(f64::trunc) else {
        return false;
    };
    if divisor == 0.0 || !is_float(value, None) {
        return false;
    }
    value.parse::<f64>().is_ok_and(|v| v % divisor == 0.0)
}

pub fn is_email(value: &str, _arg: Option<&Value>) -> bool {
    EMAIL_REGEX.is_match(value)
}

pub fn is_empty(value: &str, _arg: Option<&Value>) -> bool {
    value.is_empty()
}

/// Float, optionally bounded by `{min, max, gt, lt}`
pub fn is_float(value: &str, arg: Option<&Value>) -> bool {
    if matches!(value, "" | "." | "+" | "-") || !FLOAT_REGEX.is_match(value) {
        return false;
    }
    value.parse::<f64>().is_ok_and(|v| within(v, arg))
}

pub fn is_hexadecimal(value: &str, _arg: Option<&Value>) -> bool {
    HEX_REGEX.is_match(value)
}

/// One of the values of an array argument, a key of an object argument, or
/// a substring of a string argument
pub fn is_in(value: &str, arg: Option<&Value>) -> bool {
    match arg {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(text)
            .any(|item| item == value),
        Some(Value::Object(map)) => map.contains_key(value),
        Some(Value::String(s)) => s.contains(value),
        _ => false,
    }
}

/// Integer, optionally bounded by `{min, max, gt, lt}`. Leading zeroes are
/// accepted unless `allow_leading_zeroes` is `false`.
pub fn is_int(value: &str, arg: Option<&Value>) -> bool {
    let strict = arg
        .and_then(|a| a.get("allow_leading_zeroes"))
        .and_then(Value::as_bool)
        == Some(false);
    let shape = if strict { &STRICT_INT_REGEX } else { &INT_REGEX };

    shape.is_match(value) && value.parse::<f64>().is_ok_and(|v| within(v, arg))
}

/// IP address; the argument may restrict the version to 4 or 6
pub fn is_ip(value: &str, arg: Option<&Value>) -> bool {
    match arg.and_then(number) {
        Some(version) if version == 4.0 => value.parse::<Ipv4Addr>().is_ok(),
        Some(version) if version == 6.0 => value.parse::<Ipv6Addr>().is_ok(),
        Some(_) => false,
        None => value.parse::<IpAddr>().is_ok(),
    }
}

/// JSON object or array
pub fn is_json(value: &str, _arg: Option<&Value>) -> bool {
    matches!(
        serde_json::from_str::<Value>(value),
        Ok(Value::Object(_) | Value::Array(_))
    )
}

/// Length in characters within `{min, max}`; `min` defaults to 0
pub fn is_length(value: &str, arg: Option<&Value>) -> bool {
    let check = || -> Result<bool, ()> {
        let length = value.chars().count() as f64;
        let min = bound(arg, "min")?.unwrap_or(0.0);
        let max = bound(arg, "max")?;
        Ok(length >= min && max.is_none_or(|max| length <= max))
    };
    check().unwrap_or(false)
}

pub fn is_lowercase(value: &str, _arg: Option<&Value>) -> bool {
    value == value.to_lowercase()
}

pub fn is_numeric(value: &str, _arg: Option<&Value>) -> bool {
    NUMERIC_REGEX.is_match(value)
}

pub fn is_url(value: &str, _arg: Option<&Value>) -> bool {
    URL_REGEX.is_match(value)
}

pub fn is_uuid(value: &str, _arg: Option<&Value>) -> bool {
    UUID_REGEX.is_match(value)
}

pub fn is_uppercase(value: &str, _arg: Option<&Value>) -> bool {
    value == value.to_uppercase()
}

/// A JSON array must have elements; anything else must be at least one
/// character long
pub fn not_empty(value: &str, _arg: Option<&Value>) -> bool {
    match serde_json::from_str::<Value>(value) {
        Ok(Value::Array(items)) => !items.is_empty(),
        _ => is_length(value, Some(&serde_json::json!({"min": 1}))),
    }
}
