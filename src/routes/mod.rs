pub mod app_state;
pub mod chat_routes;
pub mod conversation_routes;
pub mod settings_routes;

use actix_web::web;

/// Every JSON endpoint of the page.
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(chat_routes::init_routes)
        .configure(conversation_routes::init_routes)
        .configure(settings_routes::init_routes);
}
