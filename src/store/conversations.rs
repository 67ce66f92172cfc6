use crate::ids::time_derived_id;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub last_message: String,
    pub timestamp: i64,
}

/// Conversation summaries, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationStore {
    conversations: Vec<Conversation>,
}

impl ConversationStore {
    pub fn new(conversations: Vec<Conversation>) -> Self {
        Self { conversations }
    }

    pub fn sample(now_ms: i64) -> Self {
        Self::new(vec![
            Conversation {
                id: "1".to_string(),
                title: "Refactoring Utils".to_string(),
                last_message: "Done.".to_string(),
                timestamp: now_ms,
            },
            Conversation {
                id: "2".to_string(),
                title: "React Hooks Help".to_string(),
                last_message: "Thanks!".to_string(),
                timestamp: now_ms - 100_000,
            },
            Conversation {
                id: "3".to_string(),
                title: "CSS Grid Layout".to_string(),
                last_message: "How do I center...".to_string(),
                timestamp: now_ms - 200_000,
            },
        ])
    }

    pub fn all(&self) -> &[Conversation] {
        &self.conversations
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|conversation| conversation.id == id)
    }

    /// Prepends a fresh "New Chat" entry and returns the new store with its id.
    pub fn create(&self, now_ms: i64) -> (ConversationStore, String) {
        let id = time_derived_id(now_ms, |candidate| self.get(candidate).is_some());
        let conversation = Conversation {
            id: id.clone(),
            title: "New Chat".to_string(),
            last_message: String::new(),
            timestamp: now_ms,
        };

        let mut conversations = Vec::with_capacity(self.conversations.len() + 1);
        conversations.push(conversation);
        conversations.extend(self.conversations.iter().cloned());
        (ConversationStore { conversations }, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_prepends_default_conversation() {
        let store = ConversationStore::sample(1_000_000);
        let (next, id) = store.create(2_000_000);

        assert_eq!(next.len(), store.len() + 1);
        assert_eq!(next.all()[0].id, id);
        assert_eq!(next.all()[0].title, "New Chat");
        assert!(next.all()[0].last_message.is_empty());
        assert_eq!(next.all()[0].timestamp, 2_000_000);
        assert_eq!(&next.all()[1..], store.all());
    }

    #[test]
    fn create_never_reuses_an_existing_id() {
        let store = ConversationStore::new(vec![Conversation {
            id: "500".to_string(),
            title: "Existing".to_string(),
            last_message: String::new(),
            timestamp: 0,
        }]);
        let (_, id) = store.create(500);
        assert_eq!(id, "501");
    }
}
