use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use tempfile::TempDir;
use tokio::sync::Notify;
use ollama_chat::models::ollama::InstalledModel;
use ollama_chat::services::chat_service::ChatController;
use ollama_chat::services::ollama_client::{OllamaApi, OllamaError};
use ollama_chat::store::state_file::{PersistedState, StateFile};

/// Builds an NDJSON body the way Ollama streams it: one record per fragment,
/// then a terminal record carrying `context`.
pub fn ndjson_reply(fragments: &[&str], context: &[i64]) -> String {
    let mut body = String::new();
    for fragment in fragments {
        body.push_str(&serde_json::json!({ "model": "llama3.2", "response": fragment, "done": false }).to_string());
        body.push('\n');
    }
    body.push_str(
        &serde_json::json!({ "model": "llama3.2", "response": "", "done": true, "context": context }).to_string(),
    );
    body.push('\n');
    body
}

/// Stand-in Ollama server with canned answers.
#[derive(Default)]
pub struct FakeOllama {
    pub reply: Mutex<Option<String>>,
    pub models: Vec<InstalledModel>,
    pub reachable: bool,
    pub generate_calls: AtomicUsize,
    pub prompts: Mutex<Vec<(String, Vec<i64>)>>,
    pub gate: Option<Arc<Notify>>,
}

impl FakeOllama {
    pub fn answering(reply: String) -> Self {
        FakeOllama {
            reply: Mutex::new(Some(reply)),
            models: vec![InstalledModel { name: "llama3.2".into(), modified_at: None, size: None }],
            reachable: true,
            ..FakeOllama::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OllamaApi for FakeOllama {
    fn set_base_url(&self, base: &str) -> Result<(), OllamaError> {
        url::Url::parse(base)?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), OllamaError> {
        if self.reachable {
            Ok(())
        } else {
            Err(OllamaError::Status { status: 503, body: "down".into() })
        }
    }

    async fn list_models(&self) -> Result<Vec<InstalledModel>, OllamaError> {
        Ok(self.models.clone())
    }

    async fn generate(&self, prompt: &str, _model: &str, context: &[i64]) -> Result<String, OllamaError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push((prompt.to_string(), context.to_vec()));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match self.reply.lock().unwrap().clone() {
            Some(reply) => Ok(reply),
            None => Err(OllamaError::Status { status: 500, body: "model crashed".into() }),
        }
    }
}

pub fn controller(fake: Arc<FakeOllama>) -> (Arc<ChatController>, TempDir) {
    controller_with_visit(fake, true)
}

/// A controller whose state file has never seen the intro card accepted.
pub fn first_visit_controller(fake: Arc<FakeOllama>) -> (Arc<ChatController>, TempDir) {
    controller_with_visit(fake, false)
}

fn controller_with_visit(fake: Arc<FakeOllama>, visited: bool) -> (Arc<ChatController>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let mut initial = PersistedState::new("llama3.2", "http://127.0.0.1:11434");
    initial.visited = visited;
    let state_file = Arc::new(StateFile::new(dir.path().join("state.json"), initial));
    (Arc::new(ChatController::new(fake, state_file)), dir)
}
