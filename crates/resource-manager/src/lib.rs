//! # resource-manager - Generic HTTP CRUD dispatcher
//!
//! This crate exposes any resource type over HTTP through five standard
//! operations. The owner of a resource type supplies a spec type and a
//! storage handler; the crate supplies routing, content negotiation, body
//! decoding, identity assignment, pagination parameters, envelopes and a
//! uniform error format.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use resource_manager::{Manager, ResourceManager, ServerConfig, create_app};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::default();
//!     let widgets = Manager::new("widget", "widgets", WidgetStore::default(), config.manager_config())?;
//!
//!     let managers: Vec<Arc<dyn ResourceManager>> = vec![Arc::new(widgets)];
//!     let app = create_app(managers, &config)?;
//!
//!     let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## API Endpoints
//!
//! | Operation | HTTP Method | URL Pattern | Success |
//! |-----------|-------------|-------------|---------|
//! | List | GET | `/[plural]?take&skip&query&sortBy&sortDirection` | 200 |
//! | Create | POST | `/[plural]` | 201 |
//! | Get | GET | `/[plural]/[id]` | 200 |
//! | Update | PUT | `/[plural]/[id]` | 200 |
//! | Delete | DELETE | `/[plural]/[id]` | 204 |
//! | health | GET | `/health` | 200 |
//! | liveness | GET | `/_liveness` | 200 |
//!
//! ## Wire Format
//!
//! Single resources travel as `{"type": <singular>, "spec": {...}}`; lists as
//! `{"count": n, "items": [...]}`. Errors are `{"code": <status>, "error":
//! <message>}` in the negotiated encoding, except 404 which has no body and
//! negotiation failures which are plain text.
//!
//! ## Content Negotiation
//!
//! `Content-Type` is consulted first, then `Accept`. JSON (`application/json`,
//! `+json` suffixes) and YAML (`text/yaml`, `application/yaml`,
//! `application/x-yaml`) are built in; a request with neither header gets
//! JSON.
//!
//! ## Configuration
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `RESOURCE_SERVER_PORT` | 8080 | Server port |
//! | `RESOURCE_SERVER_HOST` | 127.0.0.1 | Host to bind |
//! | `RESOURCE_LOG_LEVEL` | info | Log level (error, warn, info, debug, trace) |
//! | `RESOURCE_MAX_BODY_SIZE` | 10485760 | Max request body size (bytes) |
//! | `RESOURCE_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `RESOURCE_ENABLE_CORS` | true | Enable CORS |
//! | `RESOURCE_ENABLE_REQUEST_ID` | true | Set and propagate `x-request-id` |
//!
//! ## Architecture
//!
//! - [`resource`] - Identities, envelopes and the spec capability
//! - [`handler`] - The storage capability and request context
//! - [`encoding`] - Encoders and negotiation
//! - [`pagination`] - List parameters
//! - [`operation`] - The five operations
//! - [`manager`] - The dispatcher, its configuration and routes
//! - [`error`] - Error types and HTTP mapping
//! - [`config`] - Server configuration
//! - [`health`] - Health endpoints

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod encoding;
pub mod error;
pub mod handler;
pub mod health;
pub mod manager;
pub mod operation;
pub mod pagination;
pub mod resource;

pub use config::ServerConfig;
pub use encoding::{Encoder, JsonEncoder, Negotiator, YamlEncoder};
pub use error::{
    ConfigurationError, ConfigurationIssue, EncodingError, HandlerError, HandlerResult,
    InvalidSpec, ManagerError, ManagerResult, NegotiationError, PaginationError,
};
pub use handler::{RequestContext, ResourceHandler};
pub use manager::{
    DEFAULT_BODY_LIMIT, IdGenerator, Manager, ManagerConfig, ResourceManager, RouteSpec,
    UpdateIdPolicy,
};
pub use operation::Operation;
pub use pagination::Pagination;
pub use resource::{Id, Resource, ResourceList, ResourceSpec, Values};

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, StatusCode},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Creates the Axum application serving every manager plus the health
/// endpoints.
///
/// # Errors
///
/// Returns a [`ConfigurationError`] when a manager's path prefix is one of
/// the health paths, or when two managers share a prefix. Nothing is mounted
/// in that case.
///
/// # Example
///
/// ```rust,ignore
/// let managers: Vec<Arc<dyn ResourceManager>> = vec![Arc::new(widgets), Arc::new(gadgets)];
/// let app = create_app(managers, &ServerConfig::default())?;
/// ```
pub fn create_app(
    managers: Vec<Arc<dyn ResourceManager>>,
    config: &ServerConfig,
) -> Result<Router, ConfigurationError> {
    let mut mounted = Vec::with_capacity(managers.len());
    let mut prefixes = HashSet::with_capacity(managers.len());

    for manager in &managers {
        let plural = manager.resource_type_plural().to_lowercase();
        let prefix = format!("/{plural}");
        let fail = |issue| ConfigurationError {
            resource_type: manager.resource_type().to_string(),
            issue,
        };

        if health::RESERVED_PATHS.contains(&prefix.as_str()) {
            return Err(fail(ConfigurationIssue::ReservedPath(prefix)));
        }
        if !prefixes.insert(prefix.clone()) {
            return Err(fail(ConfigurationIssue::DuplicatePath(prefix)));
        }
        mounted.push(plural);
    }

    let mut router = Router::new();
    for manager in managers {
        info!(
            resource_type = manager.resource_type(),
            operations = manager.enabled_operations().len(),
            "Mounting resource manager"
        );
        router = manager.mount(router);
    }

    let router = router.merge(health::routes(mounted));

    let router = if config.enable_request_id {
        router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    } else {
        router
    };

    let router = if config.enable_cors {
        router.layer(build_cors_layer(config))
    } else {
        router
    };

    Ok(router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(config.request_timeout),
            )),
    ))
}

/// Builds the CORS layer; `*` allows anything, otherwise a comma-separated
/// list whose unparsable entries are skipped.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let mut cors = CorsLayer::new();

    cors = match config.cors_origins.as_str() {
        "*" => cors.allow_origin(Any),
        list => cors.allow_origin(parse_list::<HeaderValue>(list)),
    };
    cors = match config.cors_methods.as_str() {
        "*" => cors.allow_methods(Any),
        list => cors.allow_methods(parse_list::<Method>(list)),
    };
    cors = match config.cors_headers.as_str() {
        "*" => cors.allow_headers(Any),
        list => cors.allow_headers(parse_list::<HeaderName>(list)),
    };

    cors
}

fn parse_list<T: FromStr>(list: &str) -> Vec<T> {
    list.split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect()
}

/// Initializes the tracing subscriber.
///
/// Call once at startup. `RUST_LOG` overrides `level` when set.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "resource_manager={level},resource_server={level},tower_http=debug"
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
