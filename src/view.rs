use crate::agent::Role;
use crate::event::AgentReply;
use crate::ids::time_derived_id;
use crate::store::automations::{Automation, AutomationStore};
use crate::store::conversations::ConversationStore;
use crate::store::runs::{Run, RunStore};
use crate::workspace::file_tree::FileTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Files,
    Automations,
    Runs,
    Settings,
}

impl Feature {
    pub fn label(self) -> &'static str {
        match self {
            Self::Files => "Files",
            Self::Automations => "Automations",
            Self::Runs => "Runs",
            Self::Settings => "Settings",
        }
    }
}

/// Discrete user actions. Each one is a synchronous state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    NewChat,
    SelectChat(Option<String>),
    ChangeFeature(Feature),
    OpenWorkspace,
    ToggleFolder(String),
    AddFolder,
    NewAutomation,
    SelectAutomationForRuns(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub text: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingRequest {
    request_id: u64,
    conversation_id: String,
}

/// A user message that has been added to the transcript and now needs to go
/// to the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub request_id: u64,
    pub conversation_id: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyOutcome {
    Applied,
    Stale,
}

#[derive(Debug, Default)]
struct ChatView {
    messages: Vec<Message>,
    input: String,
    pending: Option<PendingRequest>,
}

/// Top-level UI state. Stores are replaced wholesale on every change.
pub struct ViewState {
    conversations: ConversationStore,
    current_chat_id: Option<String>,
    active_feature: Feature,
    chat: ChatView,
    files: FileTree,
    automations: AutomationStore,
    runs: RunStore,
    selected_automation_for_runs: Option<String>,
    next_request_id: u64,
}

impl ViewState {
    pub fn new(
        conversations: ConversationStore,
        files: FileTree,
        automations: AutomationStore,
        runs: RunStore,
    ) -> Self {
        Self {
            conversations,
            current_chat_id: None,
            active_feature: Feature::Files,
            chat: ChatView::default(),
            files,
            automations,
            runs,
            selected_automation_for_runs: None,
            next_request_id: 1,
        }
    }

    pub fn sample(now_ms: i64) -> Self {
        Self::new(
            ConversationStore::sample(now_ms),
            FileTree::sample(),
            AutomationStore::sample(now_ms),
            RunStore::sample(now_ms),
        )
    }

    pub fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    pub fn current_chat_id(&self) -> Option<&str> {
        self.current_chat_id.as_deref()
    }

    pub fn active_feature(&self) -> Feature {
        self.active_feature
    }

    pub fn files(&self) -> &FileTree {
        &self.files
    }

    pub fn automations(&self) -> &AutomationStore {
        &self.automations
    }

    pub fn selected_automation_for_runs(&self) -> Option<&str> {
        self.selected_automation_for_runs.as_deref()
    }

    /// Automation behind the runs panel. `None` when nothing is selected or
    /// the selected id no longer exists.
    pub fn selected_automation(&self) -> Option<&Automation> {
        self.selected_automation_for_runs
            .as_deref()
            .and_then(|id| self.automations.get(id))
    }

    pub fn selected_runs(&self) -> Vec<&Run> {
        self.runs
            .runs_for(self.selected_automation_for_runs.as_deref())
    }

    pub fn messages(&self) -> &[Message] {
        &self.chat.messages
    }

    pub fn input_mut(&mut self) -> &mut String {
        &mut self.chat.input
    }

    pub fn can_send(&self) -> bool {
        self.current_chat_id.is_some()
            && self.chat.pending.is_none()
            && !self.chat.input.trim().is_empty()
    }

    pub fn is_waiting_for_reply(&self) -> bool {
        self.chat.pending.is_some()
    }

    pub fn apply(&mut self, action: Action, now_ms: i64) {
        tracing::debug!(?action, "view action");
        match action {
            Action::NewChat => {
                let (conversations, id) = self.conversations.create(now_ms);
                self.conversations = conversations;
                self.select_chat(Some(id));
            }
            Action::SelectChat(id) => self.select_chat(id),
            Action::ChangeFeature(feature) => self.active_feature = feature,
            Action::OpenWorkspace => self.active_feature = Feature::Files,
            Action::ToggleFolder(node_id) => self.files = self.files.toggle(&node_id),
            Action::AddFolder => {
                let name = self.files.next_folder_name();
                self.files = self.files.add_root_folder(name, now_ms);
            }
            Action::NewAutomation => {
                let (automations, _) = self.automations.create(now_ms);
                self.automations = automations;
            }
            Action::SelectAutomationForRuns(id) => self.selected_automation_for_runs = Some(id),
        }
    }

    /// Switching conversations discards the transcript and forgets any reply
    /// still in flight.
    fn select_chat(&mut self, id: Option<String>) {
        if self.current_chat_id == id {
            return;
        }
        self.current_chat_id = id;
        self.chat = ChatView::default();
    }

    /// Moves the input into the transcript and marks a request as pending.
    /// Returns `None` for blank input, when no conversation is open, or while
    /// a reply is outstanding.
    pub fn begin_send(&mut self, now_ms: i64) -> Option<OutboundMessage> {
        if !self.can_send() {
            return None;
        }
        let conversation_id = self.current_chat_id.clone()?;
        let text = std::mem::take(&mut self.chat.input);

        self.push_message(Role::User, text.clone(), now_ms);
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.chat.pending = Some(PendingRequest {
            request_id,
            conversation_id: conversation_id.clone(),
        });

        Some(OutboundMessage {
            request_id,
            conversation_id,
            text,
        })
    }

    /// Appends the agent's reply if it answers the pending request of the
    /// conversation currently on screen; anything else is dropped.
    pub fn complete_send(&mut self, reply: AgentReply, now_ms: i64) -> ReplyOutcome {
        let matches_pending = self.chat.pending.as_ref().is_some_and(|pending| {
            pending.request_id == reply.request_id
                && pending.conversation_id == reply.conversation_id
        });
        let still_active = self.current_chat_id.as_deref() == Some(reply.conversation_id.as_str());
        if !(matches_pending && still_active) {
            tracing::warn!(
                conversation_id = %reply.conversation_id,
                request_id = reply.request_id,
                "dropping stale agent reply"
            );
            return ReplyOutcome::Stale;
        }

        self.chat.pending = None;
        self.push_message(Role::Model, reply.text, now_ms);
        ReplyOutcome::Applied
    }

    fn push_message(&mut self, role: Role, text: String, now_ms: i64) {
        let messages = &self.chat.messages;
        let id = time_derived_id(now_ms, |candidate| {
            messages.iter().any(|message| message.id == candidate)
        });
        self.chat.messages.push(Message {
            id,
            role,
            text,
            timestamp: now_ms,
        });
    }
}
