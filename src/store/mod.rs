pub mod conversation_store;
pub mod state_file;
