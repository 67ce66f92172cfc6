pub mod automations;
pub mod conversations;
pub mod runs;
