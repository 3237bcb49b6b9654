// Error message templating and the first-failure latch

use crate::{RequirementsOptions, ValidationError};

/// Replaced by the name of the property being inspected
pub const PROPERTY_PLACEHOLDER: &str = "%@";

/// Message used when a required property is absent
pub const MISSING_PARAMETER_TEMPLATE: &str = "missing_%@_parameter";

/// Build an error from a template. Only the first placeholder is replaced;
/// missing code or template fall back to the configured defaults.
pub fn format_error(
    code: Option<u16>,
    template: Option<&str>,
    property: &str,
    options: &RequirementsOptions,
) -> ValidationError {
    let template = template.unwrap_or(&options.default_error_message);
    ValidationError::new(
        code.unwrap_or(options.default_error_code),
        template.replacen(PROPERTY_PLACEHOLDER, property, 1),
    )
}

/// Collects the outcome of one request validation.
///
/// The first recorded failure wins; later calls to [`fail`](Self::fail) are
/// ignored.
#[derive(Debug)]
pub struct ErrorFormatter<'a> {
    options: &'a RequirementsOptions,
    inspected: String,
    error: Option<ValidationError>,
}

impl<'a> ErrorFormatter<'a> {
    pub fn new(options: &'a RequirementsOptions) -> Self {
        Self {
            options,
            inspected: String::new(),
            error: None,
        }
    }

    /// Set the property substituted into subsequent messages
    pub fn inspect(&mut self, property: &str) {
        self.inspected.clear();
        self.inspected.push_str(property);
    }

    pub fn inspected(&self) -> &str {
        &self.inspected
    }

    pub fn fail(&mut self, code: Option<u16>, template: Option<&str>) {
        if self.error.is_none() {
            self.error = Some(format_error(code, template, &self.inspected, self.options));
        }
    }

    pub fn is_latched(&self) -> bool {
        self.error.is_some()
    }

    pub fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }

    pub fn into_error(self) -> Option<ValidationError> {
        self.error
    }
}
