use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use crate::config::SESSION_CONVERSATION;
use crate::models::conversation::Conversations;
use crate::store::conversation_store::{StoreEvent, StoreObserver, StoreSnapshot};

#[derive(Debug, thiserror::Error)]
pub enum StateFileError {
    #[error("State file I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("State file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The key-value blob the page keeps between visits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub visited: bool,
    #[serde(default)]
    pub model: String,
    #[serde(rename = "localAPI", default)]
    pub local_api: String,
    #[serde(default)]
    pub conversations: Conversations,
    #[serde(default = "default_conversation")]
    pub current_conversation: String,
}

fn default_conversation() -> String {
    SESSION_CONVERSATION.to_string()
}

impl PersistedState {
    pub fn new(model: &str, local_api: &str) -> Self {
        PersistedState {
            visited: false,
            model: model.to_string(),
            local_api: local_api.to_string(),
            conversations: Conversations::new(),
            current_conversation: default_conversation(),
        }
    }
}

/// Reads the blob at `path`.
///
/// A missing file yields `defaults`; so does a corrupt one, after a warning.
/// Blank `model`/`localAPI` values are filled from `defaults`.
pub fn load_or_default(path: &Path, defaults: PersistedState) -> PersistedState {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("No saved state at {}, starting fresh", path.display());
            return defaults;
        }
        Err(e) => {
            warn!("Could not read saved state {}: {}", path.display(), e);
            return defaults;
        }
    };

    match serde_json::from_str::<PersistedState>(&contents) {
        Ok(mut state) => {
            if state.model.trim().is_empty() {
                state.model = defaults.model;
            }
            if state.local_api.trim().is_empty() {
                state.local_api = defaults.local_api;
            }
            info!(
                "Restored {} conversation(s) from {}",
                state.conversations.len(),
                path.display()
            );
            state
        }
        Err(e) => {
            warn!("Ignoring corrupt state file {}: {}", path.display(), e);
            defaults
        }
    }
}

/// Keeps the on-disk blob in step with the application state.
pub struct StateFile {
    path: PathBuf,
    state: Mutex<PersistedState>,
}

impl StateFile {
    pub fn new(path: PathBuf, initial: PersistedState) -> Self {
        StateFile {
            path,
            state: Mutex::new(initial),
        }
    }

    pub fn current(&self) -> PersistedState {
        self.state.lock().unwrap().clone()
    }

    /// Applies `change` to the preferences part of the blob and writes it out.
    pub fn update<F>(&self, change: F) -> Result<(), StateFileError>
    where
        F: FnOnce(&mut PersistedState),
    {
        let mut state = self.state.lock().unwrap();
        change(&mut state);
        write_state(&self.path, &state)
    }
}

impl StoreObserver for StateFile {
    fn store_changed(&self, _event: &StoreEvent, snapshot: &StoreSnapshot) {
        let result = self.update(|state| {
            state.conversations = snapshot.conversations.clone();
            state.current_conversation = snapshot.current_conversation.clone();
        });
        if let Err(e) = result {
            error!("Failed to persist conversations to {}: {}", self.path.display(), e);
        }
    }
}

fn write_state(path: &Path, state: &PersistedState) -> Result<(), StateFileError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    fs::write(path, json)?;
    Ok(())
}
