//! Chat with the backend assistant.
//!
//! A `ChatSession` holds the transcript, the server-assigned conversation id and
//! a loading flag. Sending is split in two so the dashboard can run the network
//! round-trip on a worker thread: `begin` records the user message and returns the
//! request, `finish` folds the outcome back in. `send` does both, blocking.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::error::ApiError;

pub const GREETING: &str = "Hello! I'm your TaskFlow AI assistant. How can I help you manage your tasks today? You can say things like 'Add a task to record a demo' or 'What are my pending tasks?'";
pub const ERROR_TOAST: &str = "Failed to get response from AI assistant";
pub const ERROR_REPLY: &str = "I'm sorry, I encountered an error processing your request. Please check if the backend is running and you are logged in.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    fn assistant(content: impl Into<String>) -> Self {
        ChatMessage { role: Role::Assistant, content: content.into() }
    }
}

/// Body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub conversation_id: Option<String>,
}

/// Successful `POST /chat` response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatReply {
    pub response: String,
    pub conversation_id: String,
}

#[derive(Debug)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    conversation_id: Option<String>,
    loading: bool,
    toast: Option<String>,
}

impl Default for ChatSession {
    fn default() -> Self {
        ChatSession {
            messages: vec![ChatMessage::assistant(GREETING)],
            conversation_id: None,
            loading: false,
            toast: None,
        }
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Error notice from the last failed round-trip, cleared on the next send.
    pub fn toast(&self) -> Option<&str> {
        self.toast.as_deref()
    }

    pub fn dismiss_toast(&mut self) {
        self.toast = None;
    }

    /// Record the user's message and mark the session loading. Returns `None`
    /// for blank input or while a request is already in flight.
    pub fn begin(&mut self, input: &str) -> Option<ChatRequest> {
        let text = input.trim();
        if text.is_empty() || self.loading {
            return None;
        }
        self.messages.push(ChatMessage { role: Role::User, content: text.to_string() });
        self.loading = true;
        self.toast = None;
        Some(ChatRequest {
            message: text.to_string(),
            conversation_id: self.conversation_id.clone(),
        })
    }

    /// Fold a round-trip outcome into the transcript and clear the loading flag.
    pub fn finish(&mut self, outcome: Result<ChatReply, ApiError>) {
        match outcome {
            Ok(reply) => {
                debug!(conversation_id = %reply.conversation_id, "chat reply received");
                self.messages.push(ChatMessage::assistant(reply.response));
                self.conversation_id = Some(reply.conversation_id);
            }
            Err(e) => {
                let (method, path) = e.context();
                warn!(method, path, error = %e, "chat request failed");
                self.record_failure();
            }
        }
        self.loading = false;
    }

    /// End an in-flight request that will never report back, e.g. because the
    /// worker carrying it died. Treated like a failed round-trip.
    pub fn abandon(&mut self) {
        if self.loading {
            warn!("chat request abandoned");
            self.record_failure();
            self.loading = false;
        }
    }

    fn record_failure(&mut self) {
        self.toast = Some(ERROR_TOAST.to_string());
        self.messages.push(ChatMessage::assistant(ERROR_REPLY));
    }

    /// Send one message and wait for the reply. Returns `false` if the input
    /// was ignored.
    pub fn send(&mut self, client: &ApiClient, input: &str) -> bool {
        let Some(request) = self.begin(input) else {
            return false;
        };
        let outcome = post_chat(client, &request);
        self.finish(outcome);
        true
    }
}

/// `POST /chat`.
pub fn post_chat(client: &ApiClient, request: &ChatRequest) -> Result<ChatReply, ApiError> {
    client.post_as("/chat", request)
}
