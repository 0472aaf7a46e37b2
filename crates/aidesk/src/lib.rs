pub mod agents;
pub mod chat;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod llm;
pub mod processing;
pub mod response;
pub mod retrieval;
pub mod session;
pub mod templates;
pub mod types;
pub mod wikipedia;

// Re-export primary types for convenience
pub use agents::{analyze_table, answer_document_question, chat_reply, generate_script};
pub use config::ToolkitConfig;
pub use error::LlmError;
pub use response::{interpret, render, RenderedOutput, ResponseEnvelope};
pub use session::Session;
pub use types::DataTable;

// Re-export common types
pub use anyhow::{Error, Result};
pub use uuid::Uuid;
