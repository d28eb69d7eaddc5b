//! Resource server
//!
//! Serves an in-memory `widget` resource through the generic dispatcher.

mod widgets;

use std::sync::Arc;

use clap::Parser;
use resource_manager::{Manager, ResourceManager, ServerConfig, create_app, init_logging};
use tracing::info;

use widgets::{Widget, WidgetStore};

/// Starts the Axum HTTP server.
async fn serve(app: axum::Router, config: &ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr();
    info!(address = %addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    info!(
        port = config.port,
        host = %config.host,
        max_body_size = config.max_body_size,
        "Starting resource server"
    );

    let widgets: Manager<Widget, WidgetStore> = Manager::new(
        "widget",
        "widgets",
        WidgetStore::default(),
        config.manager_config(),
    )?;

    let managers: Vec<Arc<dyn ResourceManager>> = vec![Arc::new(widgets)];
    let app = create_app(managers, &config)?;
    serve(app, &config).await
}
