//! Declarative request validation for Requisite
//!
//! Routes name a rule set (`route.simple_get`) stored in a collection file
//! (`route.req.json`) under a mounted folder. Each rule set lists properties,
//! the predicates they must satisfy, and the status code and message to
//! answer with when one fails. The first failure ends validation.
//!
//! # Examples
//!
//! ```
//! use requisite_validation::{Engine, MemoryRuleStore, RequestContainers,
//!     RequirementsOptions, ValidationError, default_registry};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let store = MemoryRuleStore::new()
//!     .with_collection("route", json!({
//!         "simple_get": {
//!             "firstName": { "required": true, "isAlpha": true },
//!             "age": { "isInt": { "errorMessage": "%@_must_be_int", "errorCode": 422 } }
//!         }
//!     }))
//!     .unwrap();
//! let engine = Engine::new(Arc::new(store), default_registry(), Arc::new(RequirementsOptions::default()));
//!
//! let request = RequestContainers::new().with_body(json!({ "firstName": "John", "age": "x" }));
//! assert_eq!(
//!     engine.check("route.simple_get", &request).unwrap(),
//!     Some(ValidationError::new(422, "age_must_be_int"))
//! );
//! ```
//!
//! ## As middleware
//!
//! ```no_run
//! use requisite_core::MiddlewareChain;
//! use requisite_validation::{OptionsOverrides, Requirements};
//!
//! let chain = MiddlewareChain::new()
//!     .with(Requirements::mount("./routes", OptionsOverrides::new()))
//!     .with(Requirements::validate("route.simple_get"));
//! ```

mod engine;
mod errors;
mod format;
mod inherit;
mod key;
mod loader;
mod middleware;
mod options;
mod registry;
mod rules;
mod scope;
mod store;
pub mod validators;

pub use engine::*;
pub use errors::*;
pub use format::*;
pub use inherit::{layer, merge};
pub use key::*;
pub use loader::*;
pub use middleware::*;
pub use options::*;
pub use registry::*;
pub use rules::*;
pub use scope::*;
pub use store::*;
