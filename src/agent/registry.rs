use crate::agent::{ChatProvider, ProviderError, Turn, AGENT_UNAVAILABLE};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Mutex as AsyncMutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionHandle(u64);

impl std::fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One ongoing exchange with the provider, bound to a single conversation.
pub struct ChatSession {
    handle: SessionHandle,
    conversation_id: String,
    history: AsyncMutex<Vec<Turn>>,
}

impl ChatSession {
    #[cfg(test)]
    pub fn handle(&self) -> SessionHandle {
        self.handle
    }

    #[cfg(test)]
    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    #[cfg(test)]
    pub async fn history(&self) -> Vec<Turn> {
        self.history.lock().await.clone()
    }

    /// Sends `text` with the accumulated history. The history only grows when
    /// the provider answers; concurrent sends on one session run one at a time.
    async fn exchange(&self, provider: &dyn ChatProvider, text: &str) -> Result<String, ProviderError> {
        let mut history = self.history.lock().await;
        let mut request = history.clone();
        request.push(Turn::user(text));
        tracing::debug!(
            conversation_id = %self.conversation_id,
            turns = request.len(),
            "sending to agent"
        );

        let reply = provider.generate(&request).await?;
        history.push(Turn::user(text));
        history.push(Turn::model(reply.clone()));
        Ok(reply)
    }
}

/// Decides which sessions to drop after a new one is registered.
pub trait EvictionPolicy: Send + Sync {
    /// `creation_order` lists live conversation ids, oldest first.
    fn select_evictions(&self, creation_order: &[String]) -> Vec<String>;
}

/// Keeps every session for the lifetime of the process.
pub struct Unbounded;

impl EvictionPolicy for Unbounded {
    fn select_evictions(&self, _creation_order: &[String]) -> Vec<String> {
        Vec::new()
    }
}

/// Keeps at most `n` sessions, dropping the oldest-created first.
pub struct Capacity(pub usize);

impl EvictionPolicy for Capacity {
    fn select_evictions(&self, creation_order: &[String]) -> Vec<String> {
        let excess = creation_order.len().saturating_sub(self.0);
        creation_order[..excess].to_vec()
    }
}

#[derive(Default)]
struct Sessions {
    by_id: HashMap<String, Arc<ChatSession>>,
    creation_order: Vec<String>,
}

/// Conversation id -> chat session map. At most one session exists per id;
/// it is created on first use and reused until the eviction policy drops it.
pub struct SessionRegistry {
    provider: Arc<dyn ChatProvider>,
    eviction: Box<dyn EvictionPolicy>,
    sessions: Mutex<Sessions>,
    next_handle: AtomicU64,
}

impl SessionRegistry {
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self::with_eviction(provider, Box::new(Unbounded))
    }

    pub fn with_eviction(provider: Arc<dyn ChatProvider>, eviction: Box<dyn EvictionPolicy>) -> Self {
        Self {
            provider,
            eviction,
            sessions: Mutex::new(Sessions::default()),
            next_handle: AtomicU64::new(1),
        }
    }

    pub fn get_or_create(&self, conversation_id: &str) -> Arc<ChatSession> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(session) = sessions.by_id.get(conversation_id) {
            return Arc::clone(session);
        }

        let session = Arc::new(ChatSession {
            handle: SessionHandle(self.next_handle.fetch_add(1, Ordering::Relaxed)),
            conversation_id: conversation_id.to_string(),
            history: AsyncMutex::new(Vec::new()),
        });
        sessions
            .by_id
            .insert(conversation_id.to_string(), Arc::clone(&session));
        sessions.creation_order.push(conversation_id.to_string());
        tracing::info!(
            conversation_id,
            handle = ?session.handle,
            "chat session created"
        );

        let evicted = self.eviction.select_evictions(&sessions.creation_order);
        for id in &evicted {
            sessions.by_id.remove(id);
            tracing::debug!(conversation_id = %id, "chat session evicted");
        }
        sessions
            .creation_order
            .retain(|id| !evicted.contains(id));

        session
    }

    /// Sends one message on the conversation's session and returns the reply.
    /// Provider failures come back as [`AGENT_UNAVAILABLE`] and are not retried.
    pub async fn send(&self, conversation_id: &str, text: &str) -> String {
        let session = self.get_or_create(conversation_id);
        match session.exchange(self.provider.as_ref(), text).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(
                    conversation_id,
                    handle = ?session.handle,
                    error = %err,
                    "agent request failed"
                );
                AGENT_UNAVAILABLE.to_string()
            }
        }
    }

    pub fn contains(&self, conversation_id: &str) -> bool {
        let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.by_id.contains_key(conversation_id)
    }

    pub fn handle_of(&self, conversation_id: &str) -> Option<SessionHandle> {
        let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions
            .by_id
            .get(conversation_id)
            .map(|session| session.handle)
    }

    pub fn len(&self) -> usize {
        let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.by_id.len()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;

    /// Replays canned results and records every request it receives.
    #[derive(Default)]
    pub(crate) struct ScriptedProvider {
        replies: Mutex<VecDeque<Result<String, ProviderError>>>,
        requests: Mutex<Vec<Vec<Turn>>>,
    }

    impl ScriptedProvider {
        pub(crate) fn replying(replies: Vec<Result<String, ProviderError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn requests(&self) -> Vec<Vec<Turn>> {
            self.requests.lock().expect("requests lock").clone()
        }
    }

    #[async_trait]
    impl ChatProvider for ScriptedProvider {
        async fn generate(&self, history: &[Turn]) -> Result<String, ProviderError> {
            self.requests
                .lock()
                .expect("requests lock")
                .push(history.to_vec());
            self.replies
                .lock()
                .expect("replies lock")
                .pop_front()
                .unwrap_or(Err(ProviderError::EmptyReply))
        }
    }

    #[test]
    fn same_id_returns_same_session() {
        let registry = SessionRegistry::new(ScriptedProvider::replying(Vec::new()));
        let first = registry.get_or_create("x");
        let second = registry.get_or_create("x");
        let other = registry.get_or_create("y");

        assert_eq!(first.handle(), second.handle());
        assert!(Arc::ptr_eq(&first, &second));
        assert_ne!(first.handle(), other.handle());
        assert_eq!(first.conversation_id(), "x");
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn second_send_reuses_session_history() {
        let provider = ScriptedProvider::replying(vec![
            Ok("hi there".to_string()),
            Ok("sure".to_string()),
        ]);
        let registry = SessionRegistry::new(provider.clone());

        assert_eq!(registry.send("x", "hello").await, "hi there");
        let handle = registry.handle_of("x");
        assert_eq!(registry.send("x", "more").await, "sure");
        assert_eq!(registry.handle_of("x"), handle);
        assert_eq!(registry.len(), 1);

        let requests = provider.requests();
        assert_eq!(requests[0], vec![Turn::user("hello")]);
        assert_eq!(
            requests[1],
            vec![Turn::user("hello"), Turn::model("hi there"), Turn::user("more")]
        );
    }

    #[tokio::test]
    async fn failed_send_returns_placeholder_and_keeps_session() {
        let provider = ScriptedProvider::replying(vec![Err(ProviderError::Api {
            status: 500,
            message: "boom".to_string(),
        })]);
        let registry = SessionRegistry::new(provider.clone());

        assert_eq!(registry.send("x", "hello").await, AGENT_UNAVAILABLE);
        assert!(registry.handle_of("x").is_some());
        assert!(registry.get_or_create("x").history().await.is_empty());
    }

    #[tokio::test]
    async fn sessions_are_isolated_per_conversation() {
        let provider = ScriptedProvider::replying(vec![
            Ok("one".to_string()),
            Ok("two".to_string()),
        ]);
        let registry = SessionRegistry::new(provider.clone());

        registry.send("a", "first").await;
        registry.send("b", "second").await;

        assert_eq!(provider.requests()[1], vec![Turn::user("second")]);
        assert_ne!(registry.handle_of("a"), registry.handle_of("b"));
    }

    #[tokio::test]
    async fn first_send_activates_session_even_on_failure() {
        let registry = SessionRegistry::new(ScriptedProvider::replying(vec![Err(
            ProviderError::MissingApiKey,
        )]));
        assert!(!registry.contains("x"));
        assert!(registry.handle_of("x").is_none());

        assert_eq!(registry.send("x", "hello").await, AGENT_UNAVAILABLE);
        assert!(registry.contains("x"));
        assert!(!registry.contains("y"));
        assert!(registry.handle_of("x").is_some());
    }

    #[test]
    fn capacity_policy_drops_oldest_session() {
        let registry = SessionRegistry::with_eviction(
            ScriptedProvider::replying(Vec::new()),
            Box::new(Capacity(2)),
        );
        let first = registry.get_or_create("a").handle();
        registry.get_or_create("b");
        registry.get_or_create("c");

        assert_eq!(registry.len(), 2);
        assert!(registry.handle_of("a").is_none());
        assert!(registry.handle_of("b").is_some());
        assert_ne!(registry.get_or_create("a").handle(), first);
        assert!(registry.handle_of("b").is_none());
    }

    #[test]
    fn unbounded_policy_never_evicts() {
        let order: Vec<String> = (0..100).map(|i| i.to_string()).collect();
        assert!(Unbounded.select_evictions(&order).is_empty());
    }
}
