use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use log::{error, info, warn};
use serde::Serialize;
use uuid::Uuid;
use crate::models::conversation::{Conversations, Message, Segment};
use crate::models::notification::Notification;
use crate::models::ollama::InstalledModel;
use crate::services::code_blocks::{extract_text_and_code_blocks, FENCE};
use crate::services::ndjson::{assemble_response, final_context, parse_ndjson};
use crate::services::ollama_client::{OllamaApi, OllamaError};
use crate::store::conversation_store::{ConversationStore, StoreError};
use crate::store::state_file::{StateFile, StateFileError};

const SUBMIT_FAILED: &str = "Something went wrong sending the prompt, Check Info & Help";
const NOT_RUNNING: &str =
    "Your ollama is not running, please start your ollama server and refresh the page";
const NO_MODELS: &str = "No models has been found";

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("A prompt is already being answered")]
    Busy,

    #[error(transparent)]
    Ollama(#[from] OllamaError),

    #[error("Ollama returned no readable records")]
    EmptyResponse,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    StateFile(#[from] StateFileError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    Busy,
    EmptyPrompt,
}

/// Result of one submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitOutcome {
    Ignored { reason: IgnoreReason },
    Answered { message: Message },
    Failed { notification: Notification },
}

impl SubmitOutcome {
    /// True when the controller went back to idle and the prompt input
    /// should take focus again.
    pub fn focus_prompt(&self) -> bool {
        !matches!(self, SubmitOutcome::Ignored { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageLoad {
    pub show_intro: bool,
}

/// Everything the page renders, in one serialisable piece.
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub visited: bool,
    pub model: String,
    #[serde(rename = "localAPI")]
    pub local_api: String,
    pub server_connected: bool,
    pub loading: bool,
    pub installed_models: Vec<InstalledModel>,
    pub conversations: Conversations,
    pub current_conversation: String,
}

/// Holds `loading` for the lifetime of one submission.
struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| LoadingGuard(flag))
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The chat page: conversations, connectivity and the one in-flight prompt.
pub struct ChatController {
    client: Arc<dyn OllamaApi>,
    store: Mutex<ConversationStore>,
    state_file: Arc<StateFile>,
    loading: AtomicBool,
    server_connected: AtomicBool,
    installed_models: Mutex<Vec<InstalledModel>>,
    notifications: Mutex<Vec<Notification>>,
}

impl ChatController {
    /// Restores conversations from `state_file` and keeps it updated.
    pub fn new(client: Arc<dyn OllamaApi>, state_file: Arc<StateFile>) -> Self {
        let saved = state_file.current();
        let mut store =
            ConversationStore::restore(saved.conversations, &saved.current_conversation, &saved.model);
        store.subscribe(state_file.clone());

        ChatController {
            client,
            store: Mutex::new(store),
            state_file,
            loading: AtomicBool::new(false),
            server_connected: AtomicBool::new(false),
            installed_models: Mutex::new(Vec::new()),
            notifications: Mutex::new(Vec::new()),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub fn is_server_connected(&self) -> bool {
        self.server_connected.load(Ordering::Acquire)
    }

    pub fn model(&self) -> String {
        self.state_file.current().model
    }

    pub fn view(&self) -> PageView {
        let prefs = self.state_file.current();
        let snapshot = self.store.lock().unwrap().snapshot();
        PageView {
            visited: prefs.visited,
            model: prefs.model,
            local_api: prefs.local_api,
            server_connected: self.is_server_connected(),
            loading: self.is_loading(),
            installed_models: self.installed_models.lock().unwrap().clone(),
            conversations: snapshot.conversations,
            current_conversation: snapshot.current_conversation,
        }
    }

    pub fn take_notifications(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.notifications.lock().unwrap())
    }

    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }

    fn ensure_idle(&self) -> Result<(), ChatError> {
        if self.is_loading() {
            return Err(ChatError::Busy);
        }
        Ok(())
    }

    /// Locks the store for a user-driven change. `loading` is read under the
    /// lock, and a submission raises it before touching the store, so no
    /// change can land between its guard and its user message.
    fn idle_store(&self) -> Result<MutexGuard<'_, ConversationStore>, ChatError> {
        let store = self.store.lock().unwrap();
        self.ensure_idle()?;
        Ok(store)
    }

    /// Sends `prompt` in the current conversation and records the reply.
    ///
    /// Ignored while another prompt is in flight or when `prompt` is blank.
    /// The user message is committed before the network call; on failure no
    /// assistant message is added and a notification is queued instead.
    pub async fn submit_prompt(&self, prompt: &str) -> SubmitOutcome {
        if prompt.trim().is_empty() {
            return SubmitOutcome::Ignored { reason: IgnoreReason::EmptyPrompt };
        }
        let Some(_loading) = LoadingGuard::acquire(&self.loading) else {
            info!("Prompt ignored, another one is still being answered");
            return SubmitOutcome::Ignored { reason: IgnoreReason::Busy };
        };

        let (conversation_id, model, ctx) = self.append_user_message(prompt);
        info!("Submitting prompt to {} in conversation {}", model, conversation_id);

        match self.request_reply(prompt, &conversation_id, &model, &ctx).await {
            Ok(message) => SubmitOutcome::Answered { message },
            Err(e) => {
                error!("Prompt in conversation {} failed: {}", conversation_id, e);
                let notification = Notification::failure(SUBMIT_FAILED);
                self.notify(notification.clone());
                SubmitOutcome::Failed { notification }
            }
        }
    }

    fn append_user_message(&self, prompt: &str) -> (String, String, Vec<i64>) {
        let model = self.model();
        let mut store = self.store.lock().unwrap();
        let conversation_id = store.current_id().to_string();
        let mut record = store.current().clone();
        record.chat_history.push(Message::from_me(prompt));
        let ctx = record.ctx.clone();
        store.update_piece(&conversation_id, record);
        (conversation_id, model, ctx)
    }

    async fn request_reply(
        &self,
        prompt: &str,
        conversation_id: &str,
        model: &str,
        ctx: &[i64],
    ) -> Result<Message, ChatError> {
        let body = self.client.generate(prompt, model, ctx).await?;

        let records = parse_ndjson(&body);
        if records.is_empty() {
            return Err(ChatError::EmptyResponse);
        }
        let reply = assemble_response(&records);
        let context = final_context(&records).unwrap_or_else(|| {
            warn!("Reply in conversation {} carried no context", conversation_id);
            Vec::new()
        });

        let segments = if reply.contains(FENCE) {
            extract_text_and_code_blocks(&reply)
        } else {
            vec![Segment::Text(reply)]
        };
        let message = Message::from_assistant(segments);

        let mut store = self.store.lock().unwrap();
        let mut record = store
            .get(conversation_id)
            .cloned()
            .ok_or_else(|| StoreError::UnknownConversation(conversation_id.to_string()))?;
        record.chat_history.push(message.clone());
        record.model = model.to_string();
        record.ctx = context;
        store.update_piece(conversation_id, record);
        Ok(message)
    }

    /// Starts an empty conversation and switches to it.
    pub fn create_conversation(&self, id: Option<String>) -> Result<String, ChatError> {
        let id = id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let model = self.model();
        let mut store = self.idle_store()?;
        store.create(&id, &model)?;
        store.select(&id)?;
        info!("Created conversation {}", id);
        Ok(id)
    }

    pub fn select_conversation(&self, id: &str) -> Result<(), ChatError> {
        self.idle_store()?.select(id)?;
        Ok(())
    }

    /// Deletes (or, for `"session"`, clears) a conversation and returns the
    /// id selected afterwards.
    pub fn delete_conversation(&self, id: &str) -> Result<String, ChatError> {
        let model = self.model();
        let next = self.idle_store()?.delete(id, &model)?;
        info!("Deleted conversation {}, now on {}", id, next);
        Ok(next)
    }

    pub fn set_model(&self, model: &str) -> Result<(), ChatError> {
        self.ensure_idle()?;
        self.state_file.update(|state| state.model = model.trim().to_string())?;
        info!("Model set to {}", model);
        Ok(())
    }

    pub fn mark_visited(&self) -> Result<(), ChatError> {
        self.state_file.update(|state| state.visited = true)?;
        Ok(())
    }

    /// Points the client at another server and probes it right away.
    pub async fn set_local_api(&self, url: &str) -> Result<(), ChatError> {
        self.ensure_idle()?;
        self.client.set_base_url(url)?;
        self.state_file.update(|state| state.local_api = url.trim().to_string())?;
        self.get_available_models().await;
        Ok(())
    }

    /// First call after the page opens.
    pub async fn init_page_load(&self) -> PageLoad {
        if !self.state_file.current().visited {
            return PageLoad { show_intro: true };
        }
        self.get_available_models().await;
        PageLoad { show_intro: false }
    }

    pub async fn check_is_running(&self) -> Result<(), OllamaError> {
        match self.client.ping().await {
            Ok(()) => {
                self.server_connected.store(true, Ordering::Release);
                Ok(())
            }
            Err(e) => {
                self.server_connected.store(false, Ordering::Release);
                Err(e)
            }
        }
    }

    /// Refreshes the installed model list, reporting the outcome as a
    /// notification.
    pub async fn get_available_models(&self) {
        let result = match self.check_is_running().await {
            Ok(()) => self.client.list_models().await,
            Err(e) => Err(e),
        };

        match result {
            Ok(models) if !models.is_empty() => {
                info!("Ollama reachable with {} model(s)", models.len());
                *self.installed_models.lock().unwrap() = models;
                self.notify(Notification::info("Connected", "Connection has been established"));
            }
            Ok(_) => {
                warn!("Ollama reachable but has no models installed");
                self.notify(Notification::failure(NO_MODELS));
            }
            Err(e) => {
                warn!("Ollama is not reachable: {}", e);
                self.notify(Notification::failure(NOT_RUNNING));
            }
        }
    }
}
