/// Messages posted from runtime tasks to the UI thread.
#[derive(Debug, Clone)]
pub enum AppEvent {
    AgentReply(AgentReply),
}

/// Reply to one outbound chat message, tagged with where it came from so the
/// view can tell whether it still applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentReply {
    pub request_id: u64,
    pub conversation_id: String,
    pub text: String,
}
