use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use crate::handlers::error_response;
use crate::routes::app_state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CreateConversation {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SelectConversation {
    pub id: String,
}

pub async fn create(data: web::Data<AppState>, req_body: Option<web::Json<CreateConversation>>) -> HttpResponse {
    let id = req_body.and_then(|body| body.into_inner().id);
    match data.chat.create_conversation(id) {
        Ok(id) => HttpResponse::Created().json(json!({ "id": id, "state": data.chat.view() })),
        Err(e) => error_response(&e),
    }
}

pub async fn select(data: web::Data<AppState>, req_body: web::Json<SelectConversation>) -> HttpResponse {
    match data.chat.select_conversation(&req_body.id) {
        Ok(()) => HttpResponse::Ok().json(data.chat.view()),
        Err(e) => error_response(&e),
    }
}

pub async fn delete(data: web::Data<AppState>, id: String) -> HttpResponse {
    match data.chat.delete_conversation(&id) {
        Ok(next) => HttpResponse::Ok().json(json!({ "current_conversation": next, "state": data.chat.view() })),
        Err(e) => error_response(&e),
    }
}
