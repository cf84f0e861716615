pub mod conversation;
pub mod notification;
pub mod ollama;
