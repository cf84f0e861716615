use actix_web::{web, HttpResponse};
use serde::Deserialize;
use crate::handlers::error_response;
use crate::routes::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct ModelRequest {
    pub model: String,
}

#[derive(Debug, Deserialize)]
pub struct LocalApiRequest {
    pub url: String,
}

pub async fn set_model(data: web::Data<AppState>, req_body: web::Json<ModelRequest>) -> HttpResponse {
    match data.chat.set_model(&req_body.model) {
        Ok(()) => HttpResponse::Ok().json(data.chat.view()),
        Err(e) => error_response(&e),
    }
}

pub async fn set_local_api(data: web::Data<AppState>, req_body: web::Json<LocalApiRequest>) -> HttpResponse {
    match data.chat.set_local_api(&req_body.url).await {
        Ok(()) => HttpResponse::Ok().json(data.chat.view()),
        Err(e) => error_response(&e),
    }
}

/// The intro card was dismissed with consent.
pub async fn mark_visited(data: web::Data<AppState>) -> HttpResponse {
    match data.chat.mark_visited() {
        Ok(()) => {
            data.chat.get_available_models().await;
            HttpResponse::Ok().json(data.chat.view())
        }
        Err(e) => error_response(&e),
    }
}

pub async fn refresh_models(data: web::Data<AppState>) -> HttpResponse {
    data.chat.get_available_models().await;
    HttpResponse::Ok().json(data.chat.view())
}
