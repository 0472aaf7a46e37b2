//! Free-form chat: the running memory replayed ahead of each new message.

use crate::chat::ChatMemory;
use crate::llm::{with_retry, ChatProvider, ChatTurn, GenerationConfig, RetryPolicy};

/// One chat exchange. Never fails: a failed call returns the error as the
/// displayed reply and leaves the memory untouched, so the user can simply
/// send again.
pub async fn chat_reply(
    model: &dyn ChatProvider,
    policy: &RetryPolicy,
    memory: &mut ChatMemory,
    message: &str,
) -> String {
    let mut turns = memory.to_chat_turns();
    turns.push(ChatTurn::user(message));

    let generation = GenerationConfig::default();
    match with_retry(policy, "chat", || model.complete(&turns, &generation)).await {
        Ok(reply) => {
            memory.add_user(message);
            memory.add_assistant(&reply);
            reply
        }
        Err(err) => {
            tracing::error!(error = %err, "Chat request failed");
            format!("The chat request failed: {}", err)
        }
    }
}
