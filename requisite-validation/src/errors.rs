// Validation and configuration errors

use requisite_core::HttpResponse;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The single error reported for a request that fails its requirements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// HTTP status code of the rejection
    pub code: u16,

    /// Formatted message, placeholder already substituted
    pub message: String,
}

impl ValidationError {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// JSON envelope `{ <json_error_key>: message }`
    pub fn to_json(&self, json_error_key: &str) -> serde_json::Value {
        let mut envelope = serde_json::Map::new();
        envelope.insert(
            json_error_key.to_string(),
            serde_json::Value::String(self.message.clone()),
        );
        serde_json::Value::Object(envelope)
    }

    /// Render the rejection as an HTTP response
    pub fn into_response(
        &self,
        json_error_key: &str,
    ) -> std::result::Result<HttpResponse, requisite_core::Error> {
        HttpResponse::new(self.code).with_json(&self.to_json(json_error_key))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Configuration errors: missing rule sets or predicates, skipped mount
/// step, malformed definitions. Never part of the validation channel.
#[derive(Error, Debug)]
pub enum RequirementsError {
    #[error("Requirements route folder must be init! (mount middleware missing)")]
    NotMounted,

    #[error("Invalid rule set key: {0:?}")]
    InvalidKey(String),

    #[error("Failed to load rule sets from {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    #[error("Failed to parse rule sets in {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Rule set {name:?} not found in {location:?}")]
    RuleSetNotFound { location: String, name: String },

    #[error("Unknown predicate: {0}")]
    UnknownPredicate(String),

    #[error("Property {property:?} to inherit not found in rule set {rule_set:?}")]
    InheritanceNotFound { rule_set: String, property: String },

    #[error("Malformed rule for {property:?}: {reason}")]
    MalformedRule { property: String, reason: String },
}

pub type Result<T> = std::result::Result<T, RequirementsError>;

impl From<RequirementsError> for requisite_core::Error {
    fn from(err: RequirementsError) -> Self {
        requisite_core::Error::Internal(err.to_string())
    }
}
