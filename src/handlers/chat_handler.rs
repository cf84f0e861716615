use actix_web::{web, HttpResponse};
use log::info;
use serde::Deserialize;
use serde_json::json;
use crate::routes::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct PromptRequest {
    #[serde(default)]
    pub prompt: String,
}

pub async fn handle_prompt(data: web::Data<AppState>, req_body: web::Json<PromptRequest>) -> HttpResponse {
    info!("Prompt received ({} chars)", req_body.prompt.len());
    let outcome = data.chat.submit_prompt(&req_body.prompt).await;
    HttpResponse::Ok().json(json!({
        "result": outcome,
        "focus_prompt": outcome.focus_prompt(),
        "state": data.chat.view(),
    }))
}

/// Runs on every page open: either asks for the intro card or probes Ollama.
pub async fn handle_page_load(data: web::Data<AppState>) -> HttpResponse {
    let page = data.chat.init_page_load().await;
    HttpResponse::Ok().json(json!({
        "show_intro": page.show_intro,
        "state": data.chat.view(),
    }))
}

pub async fn handle_state(data: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(data.chat.view())
}

pub async fn handle_notifications(data: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(data.chat.take_notifications())
}
