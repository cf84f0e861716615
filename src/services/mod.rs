pub mod chat_service;
pub mod code_blocks;
pub mod ndjson;
pub mod ollama_client;
