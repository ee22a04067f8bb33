use serde::Serialize;

#[derive(Serialize, Clone, Debug)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Body of `POST /api/chat/stream`: the full ordered conversation plus the
/// model that should answer it. The gateway replies with a chunked
/// `text/plain` stream, not JSON.
#[derive(Serialize, Debug)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub model: String,
}

pub mod models;
