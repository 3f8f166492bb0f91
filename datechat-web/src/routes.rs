//! HTTP routes.
//!
//! Handlers only translate between HTTP and [`FlowController`] steps: they
//! resolve the session cookie, run one step, and turn the [`StepResult`]
//! into an HTML page or a `302 Found`.

use crate::completion::{CompletionService, OpenAICompletion};
use crate::error::WebError;
use crate::flow::{FlowController, StepResult, PATH_ENTRY};
use crate::session::{CookieSettings, InMemorySessionStore, SessionContext, SessionStore};
use crate::templates::TemplateRenderer;
use axum::{
    extract::State,
    http::{
        header::{LOCATION, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use datechat_common::config::Config;
use serde::Deserialize;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<dyn SessionStore>,
    pub flow: Arc<FlowController>,
    pub renderer: Arc<TemplateRenderer>,
    pub cookies: CookieSettings,
    pub body_limit_bytes: usize,
}

impl AppState {
    /// State wired to the configured OpenAI-compatible backend.
    pub fn from_config(config: &Config) -> Result<Self, WebError> {
        let sessions: Arc<dyn SessionStore> =
            Arc::new(InMemorySessionStore::new(config.session.ttl_secs));
        let completion = OpenAICompletion::new(&config.llm)
            .map_err(|e| WebError::Internal(e.to_string()))?;
        let completion: Arc<dyn CompletionService> = Arc::new(completion);
        let cookies = CookieSettings {
            name: config.session.cookie_name.clone(),
            max_age_secs: config.session.cookie_max_age_secs,
        };

        let mut state = Self::new(sessions, completion, cookies)?;
        state.body_limit_bytes = config.server.body_limit_bytes;
        Ok(state)
    }

    pub fn new(
        sessions: Arc<dyn SessionStore>,
        completion: Arc<dyn CompletionService>,
        cookies: CookieSettings,
    ) -> Result<Self, WebError> {
        Ok(Self {
            sessions,
            flow: Arc::new(FlowController::new(completion)),
            renderer: Arc::new(TemplateRenderer::new()?),
            cookies,
            body_limit_bytes: 64 * 1024,
        })
    }

    fn session(&self, headers: &HeaderMap) -> SessionContext {
        SessionContext::new(self.sessions.clone(), self.cookies.read(headers))
    }

    /// Turn a step result into a response, attaching a cookie for a new session.
    fn respond(&self, session: &SessionContext, result: StepResult) -> Result<Response, WebError> {
        let mut response = match result {
            StepResult::Render(view) => Html(self.renderer.render(&view)?).into_response(),
            StepResult::Redirect(path) => found(path),
        };

        if let Some(id) = session.issued_id() {
            if let Some(cookie) = self.cookies.issue(id) {
                response.headers_mut().append(SET_COOKIE, cookie);
            }
        }

        Ok(response)
    }
}

fn found(path: &'static str) -> Response {
    (StatusCode::FOUND, [(LOCATION, HeaderValue::from_static(path))]).into_response()
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.body_limit_bytes;

    Router::new()
        // Health check
        .route("/health", get(health_check))
        .route("/", get(|| async { found(PATH_ENTRY) }))
        // Conversation flow
        .route("/openAIChat", get(start))
        .route("/apiKey", get(api_key_get).post(api_key_post))
        .route("/chatGoalDefinition", post(chat_goal_definition))
        .route("/chatting", get(chatting_get).post(chatting_post))
        .route("/reset", post(reset))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state(state)
}

// ============ Health Check ============

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "datechat-web",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": state.sessions.len().await,
    }))
}

// ============ Forms ============

#[derive(Debug, Deserialize)]
struct ApiKeyForm {
    #[serde(default)]
    key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoalForm {
    #[serde(default)]
    goal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatMessageForm {
    #[serde(default, rename = "otherMessage")]
    other_message: Option<String>,
}

// ============ Flow ============

async fn start(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, WebError> {
    let session = state.session(&headers);
    let result = state.flow.start(&session).await;
    state.respond(&session, result)
}

async fn api_key_get(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, WebError> {
    let session = state.session(&headers);
    let result = state.flow.api_key_form();
    state.respond(&session, result)
}

async fn api_key_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ApiKeyForm>,
) -> Result<Response, WebError> {
    let mut session = state.session(&headers);
    let result = state.flow.submit_api_key(&mut session, form.key).await;
    state.respond(&session, result)
}

async fn chat_goal_definition(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<GoalForm>,
) -> Result<Response, WebError> {
    let mut session = state.session(&headers);
    let result = state.flow.define_goal(&mut session, form.goal).await;
    state.respond(&session, result)
}

async fn chatting_get(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, WebError> {
    let mut session = state.session(&headers);
    let result = state.flow.show_chat(&mut session).await;
    state.respond(&session, result)
}

async fn chatting_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ChatMessageForm>,
) -> Result<Response, WebError> {
    let mut session = state.session(&headers);
    let result = state.flow.submit_message(&mut session, form.other_message).await;
    state.respond(&session, result)
}

async fn reset(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, WebError> {
    let mut session = state.session(&headers);
    let result = state.flow.reset(&mut session).await;
    let mut response = state.respond(&session, result)?;
    if let Some(cookie) = state.cookies.expire() {
        response.headers_mut().append(SET_COOKIE, cookie);
    }
    Ok(response)
}
