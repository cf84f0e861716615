use std::env;
use std::path::PathBuf;

pub fn init_logging() {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
}

pub const MODEL_NAME: &str = "llama3.2";
pub const SESSION_CONVERSATION: &str = "session";

const OLLAMA_API_URL: &str = "http://127.0.0.1:11434";
const STATE_PATH: &str = "chat_state.json";
const BIND_HOST: &str = "127.0.0.1";
const BIND_PORT: u16 = 8080;
const STATIC_DIR: &str = "./static";

pub fn ollama_api_url() -> String {
    env::var("OLLAMA_API_URL").unwrap_or_else(|_| OLLAMA_API_URL.to_string())
}

pub fn model_name() -> String {
    env::var("OLLAMA_MODEL").unwrap_or_else(|_| MODEL_NAME.to_string())
}

pub fn state_path() -> PathBuf {
    PathBuf::from(env::var("CHAT_STATE_PATH").unwrap_or_else(|_| STATE_PATH.to_string()))
}

pub fn bind_host() -> String {
    env::var("CHAT_BIND_HOST").unwrap_or_else(|_| BIND_HOST.to_string())
}

/// Falls back to the default port when `CHAT_PORT` is missing or not a number.
pub fn bind_port() -> u16 {
    env::var("CHAT_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(BIND_PORT)
}

pub fn static_dir() -> String {
    env::var("CHAT_STATIC_DIR").unwrap_or_else(|_| STATIC_DIR.to_string())
}

/// Everything the binary needs to boot, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub ollama_api_url: String,
    pub model: String,
    pub state_path: PathBuf,
    pub bind_host: String,
    pub bind_port: u16,
    pub static_dir: String,
}

impl Settings {
    /// Reads `.env` (if any) and the process environment.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Settings {
            ollama_api_url: ollama_api_url(),
            model: model_name(),
            state_path: state_path(),
            bind_host: bind_host(),
            bind_port: bind_port(),
            static_dir: static_dir(),
        }
    }
}
