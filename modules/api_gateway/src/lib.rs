//! # api_gateway
//!
//! axum/tower layers that make a resource API speak JSON:API:
//!
//! - [`validate::validate_json_api_request`] rejects requests with bad
//!   headers or malformed documents before any handler runs
//! - [`envelope::enforce_response_envelope`] passes every outgoing JSON body
//!   through the document assembler and stamps the JSON:API media type
//! - [`auth_errors::translate_jwt_errors`] rewrites upstream authentication
//!   failure bodies into JSON:API error documents
//!
//! [`json_api_layers`] applies the three in the canonical order. All layers
//! are stateless apart from the injected configuration.

pub mod auth_errors;
pub mod config;
pub mod envelope;
pub mod validate;

use std::sync::Arc;

use axum::{middleware, Router};

pub use config::{ConfigError, GatewayConfig};

/// Mount the JSON:API layers on a router: request validation runs first on
/// the way in, JWT translation and envelope enforcement run on the way out
/// (translated bodies pass through the assembler like any other).
pub fn json_api_layers(router: Router, config: &GatewayConfig) -> Router {
    let jwt = Arc::new(config.jwt.clone());
    router
        .layer(middleware::from_fn_with_state(
            jwt,
            auth_errors::translate_jwt_errors,
        ))
        .layer(middleware::from_fn(envelope::enforce_response_envelope))
        .layer(middleware::from_fn(validate::validate_json_api_request))
}
