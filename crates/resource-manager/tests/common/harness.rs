//! Test servers around a widget manager.

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use resource_manager::{
    Manager, ManagerConfig, Operation, ResourceHandler, ResourceManager, ServerConfig, create_app,
};

use super::fixtures::{FailingStore, Widget, WidgetStore};

/// A test server serving `widget`/`widgets` from a shared [`WidgetStore`].
///
/// # Example
///
/// ```rust,ignore
/// let harness = WidgetHarness::new();
/// harness.store.seed(five_widgets());
/// let response = harness.server.get("/widgets/w-1").await;
/// response.assert_status_ok();
/// ```
pub struct WidgetHarness {
    /// The test server instance.
    pub server: TestServer,

    /// The store behind the manager; clones share state.
    pub store: WidgetStore,
}

impl WidgetHarness {
    /// All operations, default configuration.
    pub fn new() -> Self {
        Self::with_config(ManagerConfig::default())
    }

    /// Only the given operations enabled.
    pub fn with_operations(operations: &[Operation]) -> Self {
        Self::with_config(ManagerConfig::default().with_operations(operations.iter().copied()))
    }

    /// Custom manager configuration.
    pub fn with_config(config: ManagerConfig) -> Self {
        let store = WidgetStore::default();
        let server = server_for(store.clone(), config);
        Self { server, store }
    }
}

/// A test server whose handler fails every call.
pub fn failing_server() -> TestServer {
    server_for(FailingStore, ManagerConfig::default())
}

/// A test server built with [`create_app`], including health routes and the
/// middleware stack.
pub fn app_server(store: WidgetStore, config: &ServerConfig) -> TestServer {
    let manager = Manager::new("widget", "widgets", store, config.manager_config())
        .expect("Failed to create widget manager");
    let managers: Vec<Arc<dyn ResourceManager>> = vec![Arc::new(manager)];
    let app = create_app(managers, config).expect("Failed to create app");
    TestServer::new(app).expect("Failed to create test server")
}

fn server_for<H>(handler: H, config: ManagerConfig) -> TestServer
where
    H: ResourceHandler<Widget>,
{
    let manager = Manager::new("widget", "widgets", handler, config)
        .expect("Failed to create widget manager");
    let router = Arc::new(manager).register_routes(Router::new());
    TestServer::new(router).expect("Failed to create test server")
}
