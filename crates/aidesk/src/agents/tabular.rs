//! Table analysis: the user's question plus a snapshot of the uploaded
//! table, answered in the strict JSON format the interpreter expects.

use crate::llm::{with_retry, ChatProvider, ChatTurn, GenerationConfig, RetryPolicy};
use crate::response::{interpret, ResponseEnvelope};
use crate::templates::ANALYSIS_PROMPT;
use crate::types::DataTable;

/// Rows of the table sampled verbatim into the prompt.
const SNAPSHOT_ROWS: usize = 5;

/// Ask the model about `table`. Never fails: transport errors after the
/// retry budget come back as an envelope whose answer names the failure,
/// and unparseable replies fall through the interpreter to its fallback.
pub async fn analyze_table(
    model: &dyn ChatProvider,
    policy: &RetryPolicy,
    table: &DataTable,
    query: &str,
) -> ResponseEnvelope {
    let prompt = format!(
        "{}{}{}",
        ANALYSIS_PROMPT,
        query,
        table.prompt_snapshot(SNAPSHOT_ROWS)
    );
    let turns = vec![ChatTurn::user(prompt)];
    let config = GenerationConfig::deterministic();

    match with_retry(policy, "table analysis", || model.complete(&turns, &config)).await {
        Ok(raw) => {
            tracing::debug!(chars = raw.len(), "Analysis reply received");
            interpret(&raw)
        }
        Err(err) => {
            tracing::error!(error = %err, "Table analysis request failed");
            ResponseEnvelope::answer(format!("The analysis request failed: {}", err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::testing::{fast_policy, transient_error, ScriptedModel};
    use crate::llm::ChatRole;

    fn sample_table() -> DataTable {
        DataTable::new(
            vec!["occupation".into(), "income".into()],
            vec![
                vec!["engineer".into(), "120000".into()],
                vec!["teacher".into(), "60000".into()],
            ],
        )
    }

    #[tokio::test]
    async fn strict_json_reply_becomes_an_answer() {
        let model = ScriptedModel::replying(r#"{"answer": "Two occupations are present"}"#);
        let envelope =
            analyze_table(&model, &fast_policy(), &sample_table(), "how many jobs?").await;
        assert_eq!(envelope.answer.as_deref(), Some("Two occupations are present"));
    }

    #[tokio::test]
    async fn prompt_carries_query_and_table_snapshot() {
        let model = ScriptedModel::replying(r#"{"answer": "ok"}"#);
        analyze_table(&model, &fast_policy(), &sample_table(), "what is the mean income?").await;

        let turns = model.last_turns.lock().unwrap();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role, ChatRole::User);
        assert!(turns[0].content.contains("what is the mean income?"));
        assert!(turns[0].content.contains("Sample rows:"));
        assert!(turns[0].content.contains("engineer"));
        assert!(turns[0].content.contains("Summary statistics:"));
    }

    #[tokio::test]
    async fn recovers_after_transient_failures() {
        let model = ScriptedModel::new(vec![
            Err(transient_error()),
            Err(transient_error()),
            Ok(r#"{"bar": {"columns": ["a", "b"], "data": [1, 2]}}"#.into()),
        ]);
        let envelope = analyze_table(&model, &fast_policy(), &sample_table(), "chart it").await;
        assert!(envelope.bar.is_some());
    }

    #[tokio::test]
    async fn exhausted_retries_surface_as_answer_text() {
        let model = ScriptedModel::new(vec![
            Err(transient_error()),
            Err(transient_error()),
            Err(transient_error()),
        ]);
        let envelope = analyze_table(&model, &fast_policy(), &sample_table(), "anything").await;
        let answer = envelope.answer.unwrap();
        assert!(answer.contains("The analysis request failed"));
    }
}
