//! Conversation flow: API key → chat goal → chatting.
//!
//! Every step returns a [`StepResult`]. A missing precondition sends the
//! user back to the step that provides it; validation failures and failed
//! completion calls are rendered into the current page.

use crate::api_key::ApiKey;
use crate::completion::CompletionService;
use crate::goal::{ChatGoal, OPENING_LINE};
use crate::session::SessionContext;
use datechat_common::logging::short_id;
use datechat_common::util::{mask_middle, truncate_with_ellipsis};
use serde::Serialize;
use std::sync::Arc;

pub const PATH_API_KEY: &str = "/apiKey";
pub const PATH_ENTRY: &str = "/openAIChat";
pub const PATH_CHATTING: &str = "/chatting";

/// Minimum length of a partner message after trimming.
pub const MIN_MESSAGE_CHARS: usize = 5;

pub const MESSAGE_TOO_SHORT: &str =
    "Please enter the last message of you chat partner above. Needs to be >= 5 characters!";
pub const GOAL_REQUIRED: &str = "Please choose a chat goal before chatting.";
const COMPLETION_FAILED: &str = "OpenAI API returns with an error: ";

/// Outcome of one flow step.
#[derive(Debug)]
pub enum StepResult {
    Render(View),
    Redirect(&'static str),
}

/// Page plus the data bound into it.
#[derive(Debug)]
pub enum View {
    ApiKey(ApiKeyPage),
    Chat(ChatPage),
}

impl View {
    pub fn template_name(&self) -> &'static str {
        match self {
            View::ApiKey(_) => "api_key",
            View::Chat(_) => "chat",
        }
    }
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyPage {
    pub key: Option<String>,
    pub api_key_errors: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPage {
    /// Masked, never the full key.
    pub api_key: String,
    pub chat_goal: Option<String>,
    pub goals: Vec<GoalOption>,
    pub chat_list: Vec<ChatEntry>,
    pub last_message: Option<String>,
    pub form_errors: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GoalOption {
    pub name: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct ChatEntry {
    pub author: &'static str,
    pub text: String,
}

impl ChatPage {
    fn new(api_key: &str, goal: Option<ChatGoal>, history: &[String]) -> Self {
        Self {
            api_key: mask_middle(api_key),
            chat_goal: goal.map(ChatGoal::display_name),
            goals: goal_options(goal),
            chat_list: chat_entries(history),
            last_message: None,
            form_errors: None,
        }
    }

    fn with_error(mut self, error: impl Into<String>) -> Self {
        self.form_errors = Some(error.into());
        self
    }

    /// Raw history texts, in order.
    pub fn history(&self) -> Vec<&str> {
        self.chat_list.iter().map(|e| e.text.as_str()).collect()
    }
}

fn goal_options(current: Option<ChatGoal>) -> Vec<GoalOption> {
    ChatGoal::ALL
        .into_iter()
        .map(|goal| GoalOption {
            name: goal.name(),
            label: goal.description(),
            selected: current == Some(goal),
        })
        .collect()
}

/// Stored history always ends with a persona turn (the seed or a reply).
fn chat_entries(history: &[String]) -> Vec<ChatEntry> {
    let len = history.len();
    history
        .iter()
        .enumerate()
        .map(|(i, text)| ChatEntry {
            author: if (len - 1 - i) % 2 == 0 { "assistant" } else { "partner" },
            text: text.clone(),
        })
        .collect()
}

fn session_tag(session: &SessionContext) -> &str {
    session.session_id().map(short_id).unwrap_or("-")
}

/// Drives one request through the conversation steps.
pub struct FlowController {
    completion: Arc<dyn CompletionService>,
}

impl FlowController {
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self { completion }
    }

    /// `GET /openAIChat`: goal selection with the masked key.
    pub async fn start(&self, session: &SessionContext) -> StepResult {
        let Some(api_key) = self.require_api_key(session).await else {
            return StepResult::Redirect(PATH_API_KEY);
        };
        let goal = session.chat_goal().await;

        let mut page = ChatPage::new(&api_key, None, &[]);
        page.goals = goal_options(goal);
        StepResult::Render(View::Chat(page))
    }

    /// `GET /apiKey`
    pub fn api_key_form(&self) -> StepResult {
        StepResult::Render(View::ApiKey(ApiKeyPage::default()))
    }

    /// `POST /apiKey`
    pub async fn submit_api_key(
        &self,
        session: &mut SessionContext,
        key: Option<String>,
    ) -> StepResult {
        let submitted = key.unwrap_or_default();
        let api_key = ApiKey::new(&submitted);
        let violations = api_key.validate();

        if !violations.is_empty() {
            tracing::warn!(?violations, "API key validation failed");
            return StepResult::Render(View::ApiKey(ApiKeyPage {
                key: Some(submitted),
                api_key_errors: Some(violations.join(" AND ")),
            }));
        }

        session.set_api_key(api_key.into_value()).await;
        tracing::info!(session = session_tag(session), "Stored API key");
        StepResult::Redirect(PATH_ENTRY)
    }

    /// `POST /chatGoalDefinition`
    pub async fn define_goal(
        &self,
        session: &mut SessionContext,
        goal: Option<String>,
    ) -> StepResult {
        let Some(api_key) = self.require_api_key(session).await else {
            return StepResult::Redirect(PATH_API_KEY);
        };

        let goal = match goal.unwrap_or_default().parse::<ChatGoal>() {
            Ok(goal) => goal,
            Err(err) => {
                tracing::warn!(value = %err.0, "Rejected unknown chat goal");
                let current = session.chat_goal().await;
                let mut page = ChatPage::new(&api_key, None, &[]).with_error(err.to_string());
                page.goals = goal_options(current);
                return StepResult::Render(View::Chat(page));
            }
        };

        session.set_chat_goal(goal).await;
        tracing::info!(session = session_tag(session), %goal, "Chat goal set");
        StepResult::Redirect(PATH_CHATTING)
    }

    /// `GET /chatting`: seeds the opening line on first entry.
    pub async fn show_chat(&self, session: &mut SessionContext) -> StepResult {
        let Some(api_key) = self.require_api_key(session).await else {
            return StepResult::Redirect(PATH_API_KEY);
        };
        let Some(goal) = session.chat_goal().await else {
            return StepResult::Redirect(PATH_ENTRY);
        };

        let history = match session.chat_history().await {
            Some(history) => history,
            None => {
                tracing::debug!(session = session_tag(session), "Seeding opening line");
                session.seed_history(OPENING_LINE.to_string()).await
            }
        };

        StepResult::Render(View::Chat(ChatPage::new(&api_key, Some(goal), &history)))
    }

    /// `POST /chatting`: one partner message, one completion call.
    pub async fn submit_message(
        &self,
        session: &mut SessionContext,
        message: Option<String>,
    ) -> StepResult {
        let Some(api_key) = self.require_api_key(session).await else {
            return StepResult::Redirect(PATH_API_KEY);
        };
        let goal = session.chat_goal().await;
        let history = session.chat_history().await.unwrap_or_default();

        let message = message.unwrap_or_default().trim().to_string();
        if message.chars().count() < MIN_MESSAGE_CHARS {
            let page = ChatPage::new(&api_key, goal, &history).with_error(MESSAGE_TOO_SHORT);
            return StepResult::Render(View::Chat(page));
        }

        let Some(goal) = goal else {
            tracing::warn!(session = session_tag(session), "Message submitted without a chat goal");
            let mut page = ChatPage::new(&api_key, None, &[]).with_error(GOAL_REQUIRED);
            page.last_message = Some(message);
            return StepResult::Render(View::Chat(page));
        };

        tracing::debug!(
            session = session_tag(session),
            message = %truncate_with_ellipsis(&message, 40),
            "Partner message received"
        );
        let history = session.push_message(message.clone()).await;
        let appended_at = history.len().saturating_sub(1);

        let instruction = goal.instruction();
        match self
            .completion
            .request_reply(&instruction, &history, &api_key)
            .await
        {
            Ok(reply) => {
                session.push_message(reply).await;
                tracing::info!(
                    session = session_tag(session),
                    backend = self.completion.name(),
                    turns = history.len() + 1,
                    "Reply stored"
                );
                StepResult::Redirect(PATH_CHATTING)
            }
            Err(err) => {
                tracing::error!(
                    session = session_tag(session),
                    backend = self.completion.name(),
                    error = %err,
                    "Completion failed, rolling back partner message"
                );
                if !session.remove_message(appended_at, &message).await {
                    tracing::warn!(
                        session = session_tag(session),
                        "Partner message already gone from history"
                    );
                }
                let history = session.chat_history().await.unwrap_or_default();

                let mut page = ChatPage::new(&api_key, Some(goal), &history)
                    .with_error(format!("{COMPLETION_FAILED}{err}"));
                page.last_message = Some(message);
                StepResult::Render(View::Chat(page))
            }
        }
    }

    /// `POST /reset`: forget the session and start over.
    pub async fn reset(&self, session: &mut SessionContext) -> StepResult {
        if session.clear().await {
            tracing::info!("Session cleared");
        }
        StepResult::Redirect(PATH_API_KEY)
    }

    async fn require_api_key(&self, session: &SessionContext) -> Option<String> {
        let key = session.api_key().await;
        if key.is_none() {
            tracing::info!(session = session_tag(session), "No API key in session");
        }
        key
    }
}
