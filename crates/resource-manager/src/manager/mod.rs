//! The generic resource dispatcher.
//!
//! A [`Manager`] binds one resource type's [`ResourceHandler`], its
//! [`ManagerConfig`] and the configured encoders into HTTP handlers for the
//! enabled operations. It holds no per-request state and is never mutated
//! after construction, so a single instance serves every request behind an
//! `Arc`.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use resource_manager::{Manager, ManagerConfig};
//!
//! let widgets = Arc::new(Manager::new("widget", "widgets", WidgetStore::default(), ManagerConfig::default())?);
//! let app = widgets.register_routes(axum::Router::new());
//! ```

mod config;
mod handlers;
mod routes;

pub use config::{DEFAULT_BODY_LIMIT, IdGenerator, ManagerConfig, UpdateIdPolicy};
pub use routes::RouteSpec;

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;

use crate::error::{ConfigurationError, ConfigurationIssue, ManagerResult};
use crate::handler::{RequestContext, ResourceHandler};
use crate::operation::Operation;
use crate::resource::{ResourceSpec, Values};

/// Dispatcher for one resource type.
pub struct Manager<T, H> {
    resource_type_singular: String,
    resource_type_plural: String,
    handler: H,
    config: ManagerConfig,
    _spec: PhantomData<fn() -> T>,
}

impl<T, H> Manager<T, H>
where
    T: ResourceSpec,
    H: ResourceHandler<T>,
{
    /// Creates a manager.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if a resource type name is empty or
    /// not usable as a path segment, or if `config` does not validate. The
    /// resource type must not be served in that case.
    pub fn new(
        resource_type_singular: impl Into<String>,
        resource_type_plural: impl Into<String>,
        handler: H,
        mut config: ManagerConfig,
    ) -> Result<Self, ConfigurationError> {
        let resource_type_singular = resource_type_singular.into();
        let resource_type_plural = resource_type_plural.into();

        let fail = |issue| ConfigurationError {
            resource_type: resource_type_singular.clone(),
            issue,
        };

        check_name("singular", &resource_type_singular).map_err(fail)?;
        check_name("plural", &resource_type_plural).map_err(fail)?;
        config.validate().map_err(fail)?;
        config.dedup_operations();

        Ok(Self {
            resource_type_singular,
            resource_type_plural,
            handler,
            config,
            _spec: PhantomData,
        })
    }

    /// Enabled operations, in configuration order.
    pub fn enabled_operations(&self) -> &[Operation] {
        &self.config.operations
    }

    /// The bound resource handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// The manager's configuration.
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Singular resource type name, as written into envelopes.
    pub fn resource_type(&self) -> &str {
        &self.resource_type_singular
    }

    /// Plural resource type name, as used for the path prefix.
    pub fn resource_type_plural(&self) -> &str {
        &self.resource_type_plural
    }
}

fn check_name(kind: &'static str, name: &str) -> Result<(), ConfigurationIssue> {
    if name.is_empty() {
        return Err(ConfigurationIssue::EmptyName(kind));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigurationIssue::InvalidName(name.to_string()));
    }

    Ok(())
}

/// Type-erased view of a [`Manager`], for mounting several resource types
/// on one router.
#[async_trait]
pub trait ResourceManager: Send + Sync {
    /// Singular resource type name.
    fn resource_type(&self) -> &str;

    /// Plural resource type name.
    fn resource_type_plural(&self) -> &str;

    /// Enabled operations.
    fn enabled_operations(&self) -> &[Operation];

    /// Routes the manager registers.
    fn routes(&self) -> Vec<RouteSpec>;

    /// Registers the manager's routes on `router`.
    fn mount(self: Arc<Self>, router: Router) -> Router;

    /// Stores a resource from envelope values without an HTTP request and
    /// returns the stored resource's envelope.
    async fn provision(&self, ctx: &RequestContext, values: Values) -> ManagerResult<Values>;
}

#[async_trait]
impl<T, H> ResourceManager for Manager<T, H>
where
    T: ResourceSpec,
    H: ResourceHandler<T>,
{
    fn resource_type(&self) -> &str {
        &self.resource_type_singular
    }

    fn resource_type_plural(&self) -> &str {
        &self.resource_type_plural
    }

    fn enabled_operations(&self) -> &[Operation] {
        &self.config.operations
    }

    fn routes(&self) -> Vec<RouteSpec> {
        Manager::routes(self)
    }

    fn mount(self: Arc<Self>, router: Router) -> Router {
        self.register_routes(router)
    }

    async fn provision(&self, ctx: &RequestContext, values: Values) -> ManagerResult<Values> {
        let stored = Manager::provision(self, ctx, values).await?;
        self.wrap(stored)
    }
}
