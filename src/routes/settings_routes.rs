use actix_web::{post, put, web, Responder};
use crate::handlers::settings_handler::{self, LocalApiRequest, ModelRequest};
use crate::routes::app_state::AppState;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(set_model)
        .service(set_local_api)
        .service(mark_visited)
        .service(refresh_models);
}

#[put("/api/model")]
async fn set_model(data: web::Data<AppState>, req_body: web::Json<ModelRequest>) -> impl Responder {
    settings_handler::set_model(data, req_body).await
}

#[put("/api/local-api")]
async fn set_local_api(data: web::Data<AppState>, req_body: web::Json<LocalApiRequest>) -> impl Responder {
    settings_handler::set_local_api(data, req_body).await
}

#[post("/api/visited")]
async fn mark_visited(data: web::Data<AppState>) -> impl Responder {
    settings_handler::mark_visited(data).await
}

#[post("/api/models/refresh")]
async fn refresh_models(data: web::Data<AppState>) -> impl Responder {
    settings_handler::refresh_models(data).await
}
