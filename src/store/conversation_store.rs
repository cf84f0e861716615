use std::sync::Arc;
use log::debug;
use serde::Serialize;
use crate::config::SESSION_CONVERSATION;
use crate::models::conversation::{ConversationRecord, Conversations};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Conversation \"{0}\" does not exist")]
    UnknownConversation(String),

    #[error("Conversation \"{0}\" already exists")]
    DuplicateConversation(String),
}

/// What changed in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Replaced,
    Updated(String),
    Deleted(String),
    Cleared(String),
    Selected(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreSnapshot {
    pub conversations: Conversations,
    pub current_conversation: String,
}

/// Anything that re-renders or persists after the store changes.
pub trait StoreObserver: Send + Sync {
    fn store_changed(&self, event: &StoreEvent, snapshot: &StoreSnapshot);
}

/// The conversations and which one is on screen.
///
/// The `"session"` conversation always exists. Every mutation notifies all
/// subscribed observers with the resulting state.
pub struct ConversationStore {
    conversations: Conversations,
    current: String,
    observers: Vec<Arc<dyn StoreObserver>>,
}

impl ConversationStore {
    pub fn new(model: &str) -> Self {
        let mut conversations = Conversations::new();
        conversations.insert(SESSION_CONVERSATION.to_string(), ConversationRecord::empty(model));
        ConversationStore {
            conversations,
            current: SESSION_CONVERSATION.to_string(),
            observers: Vec::new(),
        }
    }

    /// Rebuilds a store from persisted state, without notifying anyone.
    pub fn restore(mut conversations: Conversations, current: &str, model: &str) -> Self {
        conversations
            .entry(SESSION_CONVERSATION.to_string())
            .or_insert_with(|| ConversationRecord::empty(model));
        let current = if conversations.contains_key(current) {
            current.to_string()
        } else {
            session_or_first_key(&conversations)
        };
        ConversationStore {
            conversations,
            current,
            observers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, observer: Arc<dyn StoreObserver>) {
        self.observers.push(observer);
    }

    pub fn get(&self, id: &str) -> Option<&ConversationRecord> {
        self.conversations.get(id)
    }

    pub fn current_id(&self) -> &str {
        &self.current
    }

    pub fn current(&self) -> &ConversationRecord {
        // `current` always names an existing key; see `restore`, `set` and `delete`.
        &self.conversations[&self.current]
    }

    pub fn conversations(&self) -> &Conversations {
        &self.conversations
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            conversations: self.conversations.clone(),
            current_conversation: self.current.clone(),
        }
    }

    /// Replaces the whole mapping.
    pub fn set(&mut self, mut conversations: Conversations) {
        let model = self.current().model.clone();
        conversations
            .entry(SESSION_CONVERSATION.to_string())
            .or_insert_with(|| ConversationRecord::empty(&model));
        self.conversations = conversations;
        if !self.conversations.contains_key(&self.current) {
            self.current = session_or_first_key(&self.conversations);
        }
        self.notify(StoreEvent::Replaced);
    }

    /// Inserts or wholesale replaces one conversation.
    pub fn update_piece(&mut self, id: &str, record: ConversationRecord) {
        self.conversations.insert(id.to_string(), record);
        self.notify(StoreEvent::Updated(id.to_string()));
    }

    pub fn create(&mut self, id: &str, model: &str) -> Result<(), StoreError> {
        if self.conversations.contains_key(id) {
            return Err(StoreError::DuplicateConversation(id.to_string()));
        }
        self.update_piece(id, ConversationRecord::empty(model));
        Ok(())
    }

    pub fn select(&mut self, id: &str) -> Result<(), StoreError> {
        if !self.conversations.contains_key(id) {
            return Err(StoreError::UnknownConversation(id.to_string()));
        }
        self.current = id.to_string();
        self.notify(StoreEvent::Selected(id.to_string()));
        Ok(())
    }

    /// Removes a conversation, or empties `"session"` in place, then selects
    /// the next one. Returns the newly selected id.
    pub fn delete(&mut self, id: &str, model: &str) -> Result<String, StoreError> {
        if id == SESSION_CONVERSATION {
            self.conversations
                .insert(SESSION_CONVERSATION.to_string(), ConversationRecord::empty(model));
            self.notify(StoreEvent::Cleared(id.to_string()));
        } else if self.conversations.remove(id).is_some() {
            self.notify(StoreEvent::Deleted(id.to_string()));
        } else {
            return Err(StoreError::UnknownConversation(id.to_string()));
        }
        Ok(self.select_next())
    }

    /// Selects `"session"`, or the first remaining id if it is somehow gone.
    pub fn select_next(&mut self) -> String {
        let next = session_or_first_key(&self.conversations);
        self.current = next.clone();
        self.notify(StoreEvent::Selected(next.clone()));
        next
    }

    fn notify(&self, event: StoreEvent) {
        debug!("Conversation store changed: {:?}", event);
        if self.observers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for observer in &self.observers {
            observer.store_changed(&event, &snapshot);
        }
    }
}

fn session_or_first_key(conversations: &Conversations) -> String {
    if conversations.contains_key(SESSION_CONVERSATION) {
        return SESSION_CONVERSATION.to_string();
    }
    conversations
        .keys()
        .next()
        .cloned()
        .unwrap_or_else(|| SESSION_CONVERSATION.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use crate::models::conversation::Message;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<StoreEvent>>,
    }

    impl StoreObserver for Recorder {
        fn store_changed(&self, event: &StoreEvent, _snapshot: &StoreSnapshot) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    fn with_history(model: &str, prompt: &str) -> ConversationRecord {
        ConversationRecord {
            model: model.to_string(),
            chat_history: vec![Message::from_me(prompt)],
            ctx: vec![42],
        }
    }

    #[test]
    fn new_store_starts_on_an_empty_session() {
        let store = ConversationStore::new("llama3.2");
        assert_eq!(store.current_id(), "session");
        assert!(store.current().chat_history.is_empty());
        assert_eq!(store.current().model, "llama3.2");
    }

    #[test]
    fn deleting_session_clears_it_in_place() {
        let mut store = ConversationStore::new("llama3.2");
        store.update_piece("session", with_history("llama3.2", "hello"));

        let next = store.delete("session", "mistral").unwrap();

        assert_eq!(next, "session");
        let session = store.get("session").unwrap();
        assert!(session.chat_history.is_empty());
        assert!(session.ctx.is_empty());
        assert_eq!(session.model, "mistral");
    }

    #[test]
    fn deleting_another_conversation_returns_to_session() {
        let mut store = ConversationStore::new("llama3.2");
        store.update_piece("work", with_history("llama3.2", "a"));
        store.update_piece("alpha", with_history("llama3.2", "b"));
        store.select("work").unwrap();

        let next = store.delete("work", "llama3.2").unwrap();

        assert!(store.get("work").is_none());
        assert!(store.get("alpha").is_some());
        assert_eq!(next, "session");
        assert_eq!(store.current_id(), "session");
    }

    #[test]
    fn clearing_session_stays_on_it_when_smaller_ids_exist() {
        let mut store = ConversationStore::new("llama3.2");
        store.create("alpha", "llama3.2").unwrap();
        store.update_piece("session", with_history("llama3.2", "old"));
        store.select("session").unwrap();

        assert_eq!(store.delete("session", "llama3.2").unwrap(), "session");
        assert_eq!(store.current_id(), "session");
        assert!(store.current().chat_history.is_empty());
    }

    #[test]
    fn deleting_the_last_extra_conversation_falls_back_to_session() {
        let mut store = ConversationStore::new("llama3.2");
        store.create("notes", "llama3.2").unwrap();
        store.select("notes").unwrap();

        assert_eq!(store.delete("notes", "llama3.2").unwrap(), "session");
        assert_eq!(store.conversations().len(), 1);
    }

    #[test]
    fn deleting_an_unknown_id_is_an_error() {
        let mut store = ConversationStore::new("llama3.2");
        assert_eq!(
            store.delete("nope", "llama3.2"),
            Err(StoreError::UnknownConversation("nope".into()))
        );
    }

    #[test]
    fn create_rejects_duplicates_and_select_rejects_unknown_ids() {
        let mut store = ConversationStore::new("llama3.2");
        assert!(store.create("session", "llama3.2").is_err());
        assert!(store.select("missing").is_err());
        assert_eq!(store.current_id(), "session");
    }

    #[test]
    fn set_keeps_session_and_repairs_the_selection() {
        let mut store = ConversationStore::new("llama3.2");
        store.create("old", "llama3.2").unwrap();
        store.select("old").unwrap();

        let mut replacement = Conversations::new();
        replacement.insert("fresh".into(), ConversationRecord::empty("llama3.2"));
        store.set(replacement);

        assert!(store.get("session").is_some());
        assert!(store.get("old").is_none());
        assert!(store.get("fresh").is_some());
        assert_eq!(store.current_id(), "session");
    }

    #[test]
    fn update_piece_replaces_the_record_wholesale() {
        let mut store = ConversationStore::new("llama3.2");
        store.update_piece("session", with_history("llama3.2", "first"));
        store.update_piece("session", ConversationRecord::empty("phi3"));
        assert_eq!(store.current(), &ConversationRecord::empty("phi3"));
    }

    #[test]
    fn restore_falls_back_when_current_is_gone() {
        let mut conversations = Conversations::new();
        conversations.insert("b".into(), ConversationRecord::empty("m"));
        let store = ConversationStore::restore(conversations, "zzz", "m");
        assert!(store.get("session").is_some());
        assert_eq!(store.current_id(), "session");
    }

    #[test]
    fn every_mutation_notifies_observers() {
        let recorder = Arc::new(Recorder::default());
        let mut store = ConversationStore::new("llama3.2");
        store.subscribe(recorder.clone());

        store.create("x", "llama3.2").unwrap();
        store.select("x").unwrap();
        store.delete("x", "llama3.2").unwrap();

        let events = recorder.events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                StoreEvent::Updated("x".into()),
                StoreEvent::Selected("x".into()),
                StoreEvent::Deleted("x".into()),
                StoreEvent::Selected("session".into()),
            ]
        );
    }
}
