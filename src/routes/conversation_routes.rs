use actix_web::{delete, post, put, web, Responder};
use crate::handlers::conversation_handler::{self, CreateConversation, SelectConversation};
use crate::routes::app_state::AppState;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_conversation)
        .service(select_conversation)
        .service(delete_conversation);
}

#[post("/api/conversations")]
async fn create_conversation(
    data: web::Data<AppState>,
    req_body: Option<web::Json<CreateConversation>>,
) -> impl Responder {
    conversation_handler::create(data, req_body).await
}

#[put("/api/conversations/current")]
async fn select_conversation(
    data: web::Data<AppState>,
    req_body: web::Json<SelectConversation>,
) -> impl Responder {
    conversation_handler::select(data, req_body).await
}

#[delete("/api/conversations/{id}")]
async fn delete_conversation(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    conversation_handler::delete(data, path.into_inner()).await
}
