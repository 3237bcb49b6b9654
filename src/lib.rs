// Requisite - declarative request validation middleware
//
// Routes are guarded by named rule sets loaded from a mounted folder. The
// validation crate does the work; this crate re-exports it together with the
// host types it runs on.

// Re-export core functionality
pub use requisite_core::*;

// Re-export the validation engine
pub use requisite_validation;
pub use requisite_validation::{
    Engine, FileRuleStore, MemoryRuleStore, OptionsOverrides, PredicateRegistry,
    RequestContainers, Requirements, RequirementsContext, RequirementsError, RequirementsMount,
    RequirementsOptions, RuleSet, RuleSetKey, RuleStore, Scope, Validate, ValidationError,
    default_registry, validate,
};

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Error,
        HttpRequest,
        HttpResponse,
        Json,
        Middleware,
        MiddlewareChain,
        Next,
        OptionsOverrides,
        PredicateRegistry,
        Requirements,
        RequirementsOptions,
        ValidationError,
        handler,
        validate,
    };
    pub use crate::logging::LogConfig;
}
