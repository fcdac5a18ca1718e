pub mod chat;
pub mod credentials;
pub mod documents;
pub mod metrics;
pub mod prompt;
pub mod providers;

pub use chat::{ChatError, ChatService};
pub use documents::SubsidyDocuments;
pub use prompt::PromptBuilder;
