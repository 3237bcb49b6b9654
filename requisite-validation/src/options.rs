//! Mount-time configuration.
//!
//! [`RequirementsOptions`] is shared read-only by every request once a mount
//! middleware is built. Overrides never touch it: they produce a new
//! effective record.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequirementsOptions {
    /// Key holding a predicate's custom message inside a validator spec
    pub error_message_key: String,

    /// Key holding a predicate's custom status code inside a validator spec
    pub error_code_key: String,

    /// Status code used when a spec declares none
    pub default_error_code: u16,

    /// Message used when a spec declares none
    pub default_error_message: String,

    /// Field name of the message in the JSON error body
    pub json_error_key: String,
}

impl Default for RequirementsOptions {
    fn default() -> Self {
        Self {
            error_message_key: "errorMessage".to_string(),
            error_code_key: "errorCode".to_string(),
            default_error_code: 400,
            default_error_message: "bad_request".to_string(),
            json_error_key: "error".to_string(),
        }
    }
}

impl RequirementsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Effective configuration: `self` with every set override applied.
    pub fn with_overrides(&self, overrides: &OptionsOverrides) -> Self {
        Self {
            error_message_key: overrides
                .error_message_key
                .clone()
                .unwrap_or_else(|| self.error_message_key.clone()),
            error_code_key: overrides
                .error_code_key
                .clone()
                .unwrap_or_else(|| self.error_code_key.clone()),
            default_error_code: overrides
                .default_error_code
                .unwrap_or(self.default_error_code),
            default_error_message: overrides
                .default_error_message
                .clone()
                .unwrap_or_else(|| self.default_error_message.clone()),
            json_error_key: overrides
                .json_error_key
                .clone()
                .unwrap_or_else(|| self.json_error_key.clone()),
        }
    }
}

/// Per-mount overrides; unset fields keep the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptionsOverrides {
    pub error_message_key: Option<String>,
    pub error_code_key: Option<String>,
    pub default_error_code: Option<u16>,
    pub default_error_message: Option<String>,
    pub json_error_key: Option<String>,
}

impl OptionsOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error_message_key(mut self, key: impl Into<String>) -> Self {
        self.error_message_key = Some(key.into());
        self
    }

    pub fn error_code_key(mut self, key: impl Into<String>) -> Self {
        self.error_code_key = Some(key.into());
        self
    }

    pub fn default_error_code(mut self, code: u16) -> Self {
        self.default_error_code = Some(code);
        self
    }

    pub fn default_error_message(mut self, message: impl Into<String>) -> Self {
        self.default_error_message = Some(message.into());
        self
    }

    pub fn json_error_key(mut self, key: impl Into<String>) -> Self {
        self.json_error_key = Some(key.into());
        self
    }
}
