//! The user-facing tools: table analysis, document QA, free chat and the
//! video-script writer. Each one composes the prompt for its task, calls the
//! chat provider through the retry wrapper and shapes the reply for the UI.

pub mod chat;
pub mod doc_qa;
pub mod script;
pub mod tabular;

pub use chat::chat_reply;
pub use doc_qa::{answer_document_question, QaOutcome};
pub use script::{generate_script, VideoScript};
pub use tabular::analyze_table;
