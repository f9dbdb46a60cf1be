use std::io;
use std::sync::Arc;

use crate::data::registry::AtlasContext;

pub mod api;
pub mod routes;

/// Blocking entry point for the CLI: owns a tokio runtime for the server's lifetime.
pub fn run_server(bind_addr: &str, context: Arc<AtlasContext>) -> io::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(bind_addr, context))
}

pub async fn serve(bind_addr: &str, context: Arc<AtlasContext>) -> io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!(
        target: "camp_atlas::server",
        bind = %bind_addr,
        camps = context.camps.len(),
        "camp_atlas server listening on http://{bind_addr}"
    );
    axum::serve(listener, routes::router(context)).await
}
