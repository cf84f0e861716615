use std::sync::Arc;
use crate::services::chat_service::ChatController;

#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatController>,
}
