// Core library for the Requisite request-requirements toolkit
// This module contains the host-framework types the validation engine is mounted on

pub mod error;
pub mod extensions;
pub mod form;
pub mod http;
pub mod logging;
pub mod middleware;

// Re-export commonly used types
pub use error::*;
pub use extensions::Extensions;
pub use form::*;
pub use http::*;
pub use middleware::*;
