// Request scopes and the containers a rule reads its value from

use requisite_core::logging::debug;
use requisite_core::{HttpRequest, parse_form_map};
use serde_json::{Map, Value};

/// One of the three request containers a property can live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Body,
    Headers,
    Params,
}

impl Scope {
    /// Order in which unscoped properties are searched
    pub const SEARCH_ORDER: [Scope; 3] = [Scope::Body, Scope::Headers, Scope::Params];

    /// Reserved rule set key for this scope
    pub fn key(&self) -> &'static str {
        match self {
            Scope::Body => "_body",
            Scope::Headers => "_headers",
            Scope::Params => "_params",
        }
    }

    /// Parse a reserved scope key (`_body`, `_headers`, `_params`)
    pub fn from_key(key: &str) -> Option<Self> {
        Self::SEARCH_ORDER.into_iter().find(|scope| scope.key() == key)
    }
}

/// A value found in one of the containers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Located<'a> {
    pub value: &'a Value,
    pub scope: Scope,
}

/// Body, headers and path parameters of one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestContainers {
    body: Map<String, Value>,
    headers: Map<String, Value>,
    params: Map<String, Value>,
}

impl RequestContainers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the containers from a request.
    ///
    /// JSON bodies (by content type, or a body starting with `{`) become the
    /// body container; other non-empty bodies are read as URL-encoded forms.
    /// A body that is not an object yields an empty body container. Header
    /// names are lower-cased.
    pub fn from_request(req: &HttpRequest) -> Self {
        let mut containers = Self {
            body: parse_body(req),
            ..Self::default()
        };
        for (name, value) in &req.headers {
            containers
                .headers
                .insert(name.to_ascii_lowercase(), Value::String(value.clone()));
        }
        for (name, value) in &req.path_params {
            containers
                .params
                .insert(name.clone(), Value::String(value.clone()));
        }
        containers
    }

    /// Replace the body container. Non-object values clear it.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = match body {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.to_ascii_lowercase(), Value::String(value.into()));
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), Value::String(value.into()));
        self
    }

    pub fn container(&self, scope: Scope) -> &Map<String, Value> {
        match scope {
            Scope::Body => &self.body,
            Scope::Headers => &self.headers,
            Scope::Params => &self.params,
        }
    }

    /// Find `property`, either in the hinted container only or in the first
    /// container of [`Scope::SEARCH_ORDER`] that has the key. Presence of the
    /// key counts, whatever its value.
    pub fn locate(&self, property: &str, hint: Option<Scope>) -> Option<Located<'_>> {
        let lookup = |scope: Scope| {
            self.container(scope)
                .get(property)
                .map(|value| Located { value, scope })
        };

        match hint {
            Some(scope) => lookup(scope),
            None => Scope::SEARCH_ORDER.into_iter().find_map(lookup),
        }
    }
}

fn parse_body(req: &HttpRequest) -> Map<String, Value> {
    if req.body.is_empty() {
        return Map::new();
    }

    let is_json = req
        .content_type()
        .is_some_and(|ct| ct.to_ascii_lowercase().contains("json"))
        || req.body.trim_ascii_start().starts_with(b"{");

    if is_json {
        match serde_json::from_slice::<Value>(&req.body) {
            Ok(Value::Object(map)) => map,
            Ok(_) => Map::new(),
            Err(e) => {
                debug!(error = %e, "Request body is not valid JSON, using empty body");
                Map::new()
            }
        }
    } else {
        match parse_form_map(&req.body) {
            Ok(form) => form
                .into_iter()
                .map(|(key, value)| (key, Value::String(value)))
                .collect(),
            Err(e) => {
                debug!(error = %e, "Request body is not a form, using empty body");
                Map::new()
            }
        }
    }
}
