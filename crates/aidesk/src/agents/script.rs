//! Video-script writer: a title for the subject, then an encyclopedia
//! lookup, then the script over both.

use crate::error::LlmError;
use crate::llm::{with_retry, ChatProvider, ChatTurn, GenerationConfig, RetryPolicy};
use crate::templates::{script_prompt, title_prompt};
use crate::wikipedia::WikipediaClient;

/// The three artifacts the tool displays: the reference digest, the
/// generated title and the script body.
#[derive(Debug, Clone)]
pub struct VideoScript {
    pub wiki_digest: String,
    pub title: String,
    pub script: String,
}

/// Generate a script for `subject`. Never fails: when any stage errors out
/// after the retry budget, all three fields carry the failure message so
/// the UI shows it wherever it would have shown content.
pub async fn generate_script(
    model: &dyn ChatProvider,
    wiki: &WikipediaClient,
    policy: &RetryPolicy,
    subject: &str,
    video_minutes: f32,
    creativity: f32,
) -> VideoScript {
    let title = match generate_title(model, policy, subject, creativity).await {
        Ok(title) => title,
        Err(err) => {
            tracing::error!(error = %err, "Title generation failed");
            return failure(&err);
        }
    };

    let digest = match with_retry(policy, "encyclopedia search", || {
        wiki.search_digest(subject)
    })
    .await
    {
        Ok(digest) => digest,
        Err(err) => {
            tracing::error!(error = %err, "Encyclopedia lookup failed");
            return failure(&err);
        }
    };

    match write_script(model, policy, &title, video_minutes, &digest, creativity).await {
        Ok(script) => VideoScript {
            wiki_digest: digest,
            title,
            script,
        },
        Err(err) => {
            tracing::error!(error = %err, "Script generation failed");
            failure(&err)
        }
    }
}

/// A catchy title for the subject, stripped of the quotes models like to
/// wrap titles in.
pub async fn generate_title(
    model: &dyn ChatProvider,
    policy: &RetryPolicy,
    subject: &str,
    creativity: f32,
) -> Result<String, LlmError> {
    let generation = GenerationConfig::with_temperature(creativity);
    let turns = vec![ChatTurn::user(title_prompt(subject))];
    let title = with_retry(policy, "video title", || model.complete(&turns, &generation)).await?;
    Ok(title.trim().trim_matches('"').to_string())
}

/// The script body for an already-chosen title and reference digest.
pub async fn write_script(
    model: &dyn ChatProvider,
    policy: &RetryPolicy,
    title: &str,
    video_minutes: f32,
    wiki_digest: &str,
    creativity: f32,
) -> Result<String, LlmError> {
    let generation = GenerationConfig::with_temperature(creativity);
    let turns = vec![ChatTurn::user(script_prompt(title, video_minutes, wiki_digest))];
    with_retry(policy, "video script", || model.complete(&turns, &generation)).await
}

fn failure(err: &LlmError) -> VideoScript {
    let message = format!("Script generation failed: {}", err);
    VideoScript {
        wiki_digest: message.clone(),
        title: message.clone(),
        script: message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::testing::{fast_policy, transient_error, ScriptedModel};

    #[tokio::test]
    async fn title_is_trimmed_and_unquoted() {
        let model = ScriptedModel::replying("\"Rust in Three Minutes\"\n");
        let title = generate_title(&model, &fast_policy(), "the Rust language", 0.8)
            .await
            .unwrap();
        assert_eq!(title, "Rust in Three Minutes");
    }

    #[tokio::test]
    async fn script_prompt_embeds_title_length_and_digest() {
        let model = ScriptedModel::replying("[opening] ... [middle] ... [ending] ...");
        let script = write_script(
            &model,
            &fast_policy(),
            "Rust in Three Minutes",
            3.0,
            "Page: Rust\nSummary: a systems language",
            0.8,
        )
        .await
        .unwrap();

        assert!(script.contains("[opening]"));
        let turns = model.last_turns.lock().unwrap();
        assert!(turns[0].content.contains("Rust in Three Minutes"));
        assert!(turns[0].content.contains("3 minutes"));
        assert!(turns[0].content.contains("Page: Rust"));
    }

    #[tokio::test]
    async fn transient_failures_are_retried_within_a_stage() {
        let model = ScriptedModel::new(vec![
            Err(transient_error()),
            Err(transient_error()),
            Ok("A Title".into()),
        ]);
        let title = generate_title(&model, &fast_policy(), "subject", 0.5)
            .await
            .unwrap();
        assert_eq!(title, "A Title");
    }

    #[tokio::test]
    async fn exhausted_retries_error_out() {
        let model = ScriptedModel::new(vec![
            Err(transient_error()),
            Err(transient_error()),
            Err(transient_error()),
        ]);
        let result = generate_title(&model, &fast_policy(), "subject", 0.5).await;
        assert!(result.is_err());
    }
}
