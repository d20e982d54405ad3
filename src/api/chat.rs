//! REST API endpoints for the assessment assistant

use actix_web::{get, post, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::client::ChatMessage;
use crate::service::{AssessmentAssistant, LanguagePreference, SessionStore};

/// `POST /v1/chat` request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub language: LanguagePreference,
}

/// `POST /v1/chat` response
#[derive(Debug, Serialize, ToSchema)]
pub struct ChatResponse {
    pub reply: String,
    /// Titles of the knowledge entries that grounded the reply
    pub sources: Vec<String>,
}

/// `GET /v1/chat/history` response
#[derive(Debug, Serialize, ToSchema)]
pub struct ChatHistoryResponse {
    pub messages: Vec<ChatMessage>,
}

/// Answer one user message with knowledge-grounded context
#[utoipa::path(
    post,
    path = "/v1/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatResponse)
    ),
    tag = "chat"
)]
#[post("/v1/chat")]
pub async fn chat(
    assistant: web::Data<AssessmentAssistant>,
    sessions: web::Data<SessionStore>,
    body: web::Json<ChatRequest>,
) -> impl Responder {
    let history = sessions.history();
    let analysis = sessions.latest();
    let disaster_type = sessions.active_disaster();

    let reply = assistant
        .respond(
            &body.message,
            &history,
            disaster_type,
            analysis.as_ref(),
            body.language,
        )
        .await;

    sessions.push_history(ChatMessage::user(body.message.clone()));
    sessions.push_history(ChatMessage::assistant(reply.text.clone()));

    HttpResponse::Ok().json(ChatResponse {
        reply: reply.text,
        sources: reply.sources,
    })
}

/// Full conversation history of the session
#[utoipa::path(
    get,
    path = "/v1/chat/history",
    responses(
        (status = 200, description = "Conversation history", body = ChatHistoryResponse)
    ),
    tag = "chat"
)]
#[get("/v1/chat/history")]
pub async fn chat_history(sessions: web::Data<SessionStore>) -> impl Responder {
    HttpResponse::Ok().json(ChatHistoryResponse {
        messages: sessions.history(),
    })
}

/// Clear the conversation history
#[utoipa::path(
    post,
    path = "/v1/chat/clear",
    responses(
        (status = 204, description = "History cleared")
    ),
    tag = "chat"
)]
#[post("/v1/chat/clear")]
pub async fn clear_chat(sessions: web::Data<SessionStore>) -> impl Responder {
    sessions.clear_history();
    tracing::info!("Chat history cleared");
    HttpResponse::NoContent().finish()
}

/// Configure chat routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(chat).service(chat_history).service(clear_chat);
}
