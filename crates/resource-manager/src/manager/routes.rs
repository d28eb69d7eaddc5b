//! Route registration.
//!
//! Routes live under `/{plural}` with the plural name lower-cased:
//!
//! | Operation | Method | Path |
//! |-----------|--------|------|
//! | List | GET | `/{plural}` |
//! | Create | POST | `/{plural}` |
//! | Get | GET | `/{plural}/{id}` |
//! | Update | PUT | `/{plural}/{id}` |
//! | Delete | DELETE | `/{plural}/{id}` |
//!
//! Only enabled operations are registered. A path with no enabled operation
//! is not registered at all (404); a registered path answers 405 for the
//! methods of disabled operations.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Request},
    http::Method,
    routing::{MethodRouter, delete, get, post, put},
};
use tracing::info;

use super::Manager;
use crate::handler::ResourceHandler;
use crate::operation::Operation;
use crate::resource::ResourceSpec;

/// Description of one registered route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSpec {
    /// The operation served.
    pub operation: Operation,
    /// HTTP method.
    pub method: Method,
    /// Path pattern, e.g. `/widgets/{id}`.
    pub path: String,
    /// Route name, e.g. `widgets.Update`.
    pub name: String,
}

impl<T, H> Manager<T, H>
where
    T: ResourceSpec,
    H: ResourceHandler<T>,
{
    /// Path prefix of every route: `/` followed by the lower-cased plural name.
    pub fn path_prefix(&self) -> String {
        format!("/{}", self.resource_type_plural.to_lowercase())
    }

    /// Routes for the enabled operations, in configuration order.
    pub fn routes(&self) -> Vec<RouteSpec> {
        let prefix = self.path_prefix();
        self.enabled_operations()
            .iter()
            .map(|&operation| RouteSpec {
                operation,
                method: operation.method(),
                path: if operation.targets_item() {
                    format!("{}/{{id}}", prefix)
                } else {
                    prefix.clone()
                },
                name: format!("{}.{}", self.resource_type_plural, operation),
            })
            .collect()
    }

    /// Registers one handler per enabled operation on `router`.
    pub fn register_routes<S>(self: Arc<Self>, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let mut collection: Option<MethodRouter<S>> = None;
        let mut item: Option<MethodRouter<S>> = None;

        for route in self.routes() {
            info!(
                route = %route.name,
                method = %route.method,
                path = %route.path,
                "Registering route"
            );

            let slot = if route.operation.targets_item() {
                &mut item
            } else {
                &mut collection
            };
            let handler = method_route(Arc::clone(&self), route.operation);
            *slot = Some(match slot.take() {
                Some(existing) => existing.merge(handler),
                None => handler,
            });
        }

        let prefix = self.path_prefix();
        let mut router = router;
        if let Some(collection) = collection {
            router = router.route(&prefix, collection);
        }
        if let Some(item) = item {
            router = router.route(&format!("{}/{{id}}", prefix), item);
        }
        router
    }
}

fn method_route<T, H, S>(manager: Arc<Manager<T, H>>, operation: Operation) -> MethodRouter<S>
where
    T: ResourceSpec,
    H: ResourceHandler<T>,
    S: Clone + Send + Sync + 'static,
{
    match operation {
        Operation::List => get(move |request: Request| async move { manager.list(request).await }),
        Operation::Create => {
            post(move |request: Request| async move { manager.create(request).await })
        }
        Operation::Get => get(move |Path(id): Path<String>, request: Request| async move {
            manager.get(id, request).await
        }),
        Operation::Update => put(move |Path(id): Path<String>, request: Request| async move {
            manager.update(id, request).await
        }),
        Operation::Delete => delete(move |Path(id): Path<String>, request: Request| async move {
            manager.delete(id, request).await
        }),
    }
}
