//! datechat-web - Server-rendered dating-chat assistant.
//!
//! A user supplies their own OpenAI key, picks a chat goal, and then pastes
//! in the other person's messages; the service replies in character.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod api_key;
pub mod completion;
pub mod error;
pub mod flow;
pub mod goal;
pub mod routes;
pub mod session;
pub mod templates;

pub use api_key::ApiKey;
pub use completion::{CompletionError, CompletionService, OpenAICompletion};
pub use error::WebError;
pub use flow::{FlowController, StepResult, View};
pub use goal::ChatGoal;
pub use routes::{build_router, AppState};
pub use session::{CookieSettings, InMemorySessionStore, SessionContext, SessionStore};
pub use templates::TemplateRenderer;

use datechat_common::config::Config;

/// Start the HTTP server and serve until Ctrl-C.
pub async fn start_server(config: &Config) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;
    let purge = session::spawn_purge_task(
        state.sessions.clone(),
        config.session.purge_interval_secs,
    );

    let router = build_router(state);
    let addr = config.listen_address();

    tracing::info!(
        model = %config.llm.model,
        base_url = %config.llm.base_url,
        "Starting DateChat on {}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    purge.abort();
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
