use actix_web::{get, post, web, Responder};
use crate::handlers::chat_handler::{self, PromptRequest};
use crate::routes::app_state::AppState;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(submit_prompt)
        .service(page_load)
        .service(state)
        .service(notifications);
}

#[post("/api/prompt")]
async fn submit_prompt(data: web::Data<AppState>, req_body: web::Json<PromptRequest>) -> impl Responder {
    chat_handler::handle_prompt(data, req_body).await
}

#[post("/api/page-load")]
async fn page_load(data: web::Data<AppState>) -> impl Responder {
    chat_handler::handle_page_load(data).await
}

#[get("/api/state")]
async fn state(data: web::Data<AppState>) -> impl Responder {
    chat_handler::handle_state(data).await
}

#[get("/api/notifications")]
async fn notifications(data: web::Data<AppState>) -> impl Responder {
    chat_handler::handle_notifications(data).await
}
