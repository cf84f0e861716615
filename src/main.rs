use std::sync::Arc;
use actix_files::Files;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use log::info;
use ollama_chat::config::{self, Settings};
use ollama_chat::routes::{self, app_state::AppState};
use ollama_chat::services::chat_service::ChatController;
use ollama_chat::services::ollama_client::OllamaClient;
use ollama_chat::store::state_file::{self, PersistedState, StateFile};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env();
    config::init_logging();

    let saved = state_file::load_or_default(
        &settings.state_path,
        PersistedState::new(&settings.model, &settings.ollama_api_url),
    );
    let client = OllamaClient::new(&saved.local_api)
        .with_context(|| format!("invalid Ollama URL {:?}", saved.local_api))?;
    let state_file = Arc::new(StateFile::new(settings.state_path.clone(), saved));
    let chat = Arc::new(ChatController::new(Arc::new(client), state_file));

    let restored = chat.view();
    info!(
        "Restored {} conversation(s), Ollama at {}",
        restored.conversations.len(),
        restored.local_api
    );
    if !restored.visited {
        info!("No visit recorded yet, the page will show the intro card");
    }

    let state = AppState { chat };
    let static_dir = settings.static_dir.clone();

    info!("Starting server on http://{}:{}", settings.bind_host, settings.bind_port);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(routes::init_routes)
            .service(Files::new("/", &static_dir).index_file("index.html"))
    })
        .bind((settings.bind_host.as_str(), settings.bind_port))?
        .run()
        .await?;
    Ok(())
}
