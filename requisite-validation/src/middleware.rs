//! Mount and validation middlewares.
//!
//! [`Requirements::mount`] returns the middleware that attaches the rule
//! source and effective options to every request. [`Requirements::validate`]
//! returns the per-route middleware that evaluates one rule set and either
//! rejects the request or hands it to the next handler.

use crate::{
    Engine, FileRuleStore, OptionsOverrides, PredicateRegistry, RequestContainers,
    RequirementsError, RequirementsOptions, RuleStore, default_registry,
};
use async_trait::async_trait;
use requisite_core::logging::error;
use requisite_core::{Error, HttpRequest, HttpResponse, Middleware, Next};
use std::path::PathBuf;
use std::sync::Arc;

/// Attached to each request by the mount middleware.
#[derive(Clone)]
pub struct RequirementsContext {
    pub store: Arc<dyn RuleStore>,
    pub registry: Arc<PredicateRegistry>,
    pub options: Arc<RequirementsOptions>,
}

impl RequirementsContext {
    pub fn engine(&self) -> Engine {
        Engine::new(
            Arc::clone(&self.store),
            Arc::clone(&self.registry),
            Arc::clone(&self.options),
        )
    }
}

impl std::fmt::Debug for RequirementsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequirementsContext")
            .field("registry", &self.registry)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Entry points.
pub struct Requirements;

impl Requirements {
    /// Mount rule sets stored under `base`
    pub fn mount(base: impl Into<PathBuf>, overrides: OptionsOverrides) -> RequirementsMount {
        Self::mount_store(Arc::new(FileRuleStore::new(base)), overrides)
    }

    /// Mount an arbitrary rule source
    pub fn mount_store(store: Arc<dyn RuleStore>, overrides: OptionsOverrides) -> RequirementsMount {
        RequirementsMount {
            context: RequirementsContext {
                store,
                registry: default_registry(),
                options: Arc::new(RequirementsOptions::default().with_overrides(&overrides)),
            },
        }
    }

    /// Validate requests against the rule set named by `key`
    pub fn validate(key: impl Into<String>) -> Validate {
        Validate { key: key.into() }
    }
}

/// Shorthand for [`Requirements::validate`]
pub fn validate(key: impl Into<String>) -> Validate {
    Requirements::validate(key)
}

/// Mount middleware.
#[derive(Clone, Debug)]
pub struct RequirementsMount {
    context: RequirementsContext,
}

impl RequirementsMount {
    /// Replace the predicate registry
    pub fn with_registry(mut self, registry: impl Into<Arc<PredicateRegistry>>) -> Self {
        self.context.registry = registry.into();
        self
    }

    pub fn context(&self) -> &RequirementsContext {
        &self.context
    }
}

#[async_trait]
impl Middleware for RequirementsMount {
    async fn handle(&self, mut req: HttpRequest, next: Next) -> Result<HttpResponse, Error> {
        req.extensions.insert(self.context.clone());
        next(req).await
    }
}

/// Per-route validation middleware.
#[derive(Clone, Debug)]
pub struct Validate {
    key: String,
}

impl Validate {
    pub fn key(&self) -> &str {
        &self.key
    }
}

#[async_trait]
impl Middleware for Validate {
    async fn handle(&self, req: HttpRequest, next: Next) -> Result<HttpResponse, Error> {
        let context = req
            .extensions
            .get_arc::<RequirementsContext>()
            .ok_or(RequirementsError::NotMounted)?;

        let containers = RequestContainers::from_request(&req);
        let outcome = context.engine().check(&self.key, &containers).map_err(|e| {
            error!(key = %self.key, error = %e, "Requirements check failed");
            Error::from(e)
        })?;

        match outcome {
            Some(rejection) => rejection.into_response(&context.options.json_error_key),
            None => next(req).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryRuleStore;
    use requisite_core::{MiddlewareChain, handler};
    use serde_json::{Value, json};

    fn store() -> Arc<dyn RuleStore> {
        Arc::new(
            MemoryRuleStore::new()
                .with_collection("route", json!({ "get": { "name": { "required": true } } }))
                .unwrap(),
        )
    }

    fn ok_handler() -> requisite_core::HandlerFn {
        handler(|_req| async { Ok(HttpResponse::ok()) })
    }

    #[tokio::test]
    async fn test_mount_attaches_context() {
        let mount = Requirements::mount_store(
            store(),
            OptionsOverrides::new().json_error_key("reason"),
        );
        let chain = MiddlewareChain::new().with(mount);

        let inspect = handler(|req: HttpRequest| async move {
            let context = req
                .extensions
                .get::<RequirementsContext>()
                .expect("context attached");
            assert_eq!(context.options.json_error_key, "reason");
            assert_eq!(context.options.default_error_code, 400);
            Ok(HttpResponse::ok())
        });

        let response = chain.apply(HttpRequest::default(), inspect).await.unwrap();
        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn test_validate_without_mount() {
        let chain = MiddlewareChain::new().with(validate("route.get"));
        let result = chain.apply(HttpRequest::default(), ok_handler()).await;

        let err = result.unwrap_err();
        assert_eq!(err.status_code(), 500);
        assert!(err.to_string().contains("must be init"));
    }

    #[tokio::test]
    async fn test_validate_rejects_and_passes() {
        let chain = MiddlewareChain::new()
            .with(Requirements::mount_store(store(), OptionsOverrides::new()))
            .with(validate("route.get"));

        let rejected = chain
            .apply(HttpRequest::default(), ok_handler())
            .await
            .unwrap();
        assert_eq!(rejected.status, 400);
        assert_eq!(
            rejected.json::<Value>().unwrap(),
            json!({ "error": "missing_name_parameter" })
        );

        let req = HttpRequest::default()
            .with_json(&json!({ "name": "Jane" }))
            .unwrap();
        let passed = chain.apply(req, ok_handler()).await.unwrap();
        assert_eq!(passed.status, 200);
    }

    #[tokio::test]
    async fn test_validate_configuration_error() {
        let chain = MiddlewareChain::new()
            .with(Requirements::mount_store(store(), OptionsOverrides::new()))
            .with(validate("route.unknown"));

        let err = chain
            .apply(HttpRequest::default(), ok_handler())
            .await
            .unwrap_err();
        assert!(err.is_server_error());
    }
}
