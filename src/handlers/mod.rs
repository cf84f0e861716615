pub mod chat_handler;
pub mod conversation_handler;
pub mod settings_handler;

use actix_web::HttpResponse;
use log::error;
use serde_json::json;
use crate::services::chat_service::ChatError;
use crate::services::ollama_client::OllamaError;
use crate::store::conversation_store::StoreError;

/// Maps controller errors onto status codes with a JSON `{"error": ...}` body.
pub fn error_response(e: &ChatError) -> HttpResponse {
    let body = json!({ "error": e.to_string() });
    match e {
        ChatError::Busy | ChatError::Store(StoreError::DuplicateConversation(_)) => {
            HttpResponse::Conflict().json(body)
        }
        ChatError::Store(StoreError::UnknownConversation(_)) => HttpResponse::NotFound().json(body),
        ChatError::Ollama(OllamaError::InvalidUrl(_)) => HttpResponse::BadRequest().json(body),
        _ => {
            error!("Request failed: {}", e);
            HttpResponse::InternalServerError().json(body)
        }
    }
}
