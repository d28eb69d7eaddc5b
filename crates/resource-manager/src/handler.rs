//! The storage capability a resource type owner implements.
//!
//! The dispatcher never touches storage directly. Everything it needs from a
//! resource type is expressed by [`ResourceHandler`]; a handler that does not
//! provide every method does not compile, so there is no way to construct a
//! manager over an incomplete handler.
//!
//! Handlers are shared across all concurrent requests and must do their own
//! synchronization.
//!
//! # Example
//!
//! ```rust,ignore
//! use resource_manager::{HandlerError, HandlerResult, Id, Pagination, RequestContext, ResourceHandler};
//!
//! #[async_trait::async_trait]
//! impl ResourceHandler<Widget> for WidgetStore {
//!     async fn get(&self, _ctx: &RequestContext, id: &Id) -> HandlerResult<Widget> {
//!         self.widgets.read().get(id).cloned().ok_or(HandlerError::NotFound)
//!     }
//!     // ...
//! }
//! ```

use async_trait::async_trait;

use crate::error::HandlerResult;
use crate::operation::Operation;
use crate::pagination::Pagination;
use crate::resource::{Id, ResourceSpec};

/// Request-scoped data passed to every handler call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    operation: Operation,
    resource_type: String,
    request_id: Option<String>,
}

impl RequestContext {
    /// Creates a context for one request.
    pub fn new(
        operation: Operation,
        resource_type: impl Into<String>,
        request_id: Option<String>,
    ) -> Self {
        Self {
            operation,
            resource_type: resource_type.into(),
            request_id,
        }
    }

    /// The operation being served.
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Singular resource type name.
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Value of the `x-request-id` header, if the request carried one.
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }
}

/// Storage operations for one resource type.
#[async_trait]
pub trait ResourceHandler<T: ResourceSpec>: Send + Sync + 'static {
    /// Number of records matching `query`, ignoring pagination.
    async fn count(&self, ctx: &RequestContext, query: &str) -> HandlerResult<usize>;

    /// One page of records matching the pagination's query, in its sort order.
    async fn list(&self, ctx: &RequestContext, pagination: &Pagination) -> HandlerResult<Vec<T>>;

    /// Fetches a record; fails with `NotFound` when absent.
    async fn get(&self, ctx: &RequestContext, id: &Id) -> HandlerResult<T>;

    /// Stores a new record and returns what was stored.
    async fn create(&self, ctx: &RequestContext, spec: T) -> HandlerResult<T>;

    /// Replaces a record; fails with `NotFound` when its identity is unknown.
    async fn update(&self, ctx: &RequestContext, spec: T) -> HandlerResult<T>;

    /// Removes a record; fails with `NotFound` when absent.
    async fn delete(&self, ctx: &RequestContext, id: &Id) -> HandlerResult<()>;

    /// Returns `spec` with its identity set to `id`.
    fn set_id(&self, spec: T, id: Id) -> T;

    /// Field names a list request may sort by.
    fn sorting_fields(&self) -> &[&'static str];
}
