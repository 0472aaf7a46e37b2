//! Document QA: spill the upload to a temp file, extract and chunk the
//! text, embed and index the chunks, then answer with the top-k chunks as
//! context and the running conversation as history.

use anyhow::{bail, Context, Result};

use crate::chat::ChatMemory;
use crate::config::ToolkitConfig;
use crate::embeddings::EmbeddingProvider;
use crate::llm::{with_retry, ChatProvider, ChatTurn, GenerationConfig};
use crate::processing::chunker::TextChunker;
use crate::processing::{extract_pdf_text, TempUpload};
use crate::retrieval::{RetrievedChunk, VectorIndex};
use crate::templates::doc_qa_system;

/// The answer together with the chunks it was grounded on.
#[derive(Debug, Clone)]
pub struct QaOutcome {
    pub answer: String,
    pub sources: Vec<RetrievedChunk>,
}

/// Answer `question` from an uploaded PDF. The temp file is removed on
/// every exit path; the memory records the exchange only when the model
/// call succeeds.
pub async fn answer_document_question(
    model: &dyn ChatProvider,
    embedder: &dyn EmbeddingProvider,
    config: &ToolkitConfig,
    memory: &mut ChatMemory,
    pdf_bytes: &[u8],
    question: &str,
) -> Result<QaOutcome> {
    let upload = TempUpload::write("pdf", pdf_bytes)?;
    let text = extract_pdf_text(upload.path())?;
    answer_from_text(model, embedder, config, memory, &text, question).await
}

/// The retrieval and answering pipeline over already-extracted text.
pub async fn answer_from_text(
    model: &dyn ChatProvider,
    embedder: &dyn EmbeddingProvider,
    config: &ToolkitConfig,
    memory: &mut ChatMemory,
    text: &str,
    question: &str,
) -> Result<QaOutcome> {
    let chunks = TextChunker::from_config(&config.chunking).chunk(text);
    if chunks.is_empty() {
        bail!("Document text is too short to index");
    }
    tracing::info!(chunks = chunks.len(), "Indexing document for QA");

    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let policy = config.retry.to_policy();

    let vectors = with_retry(&policy, "document embedding", || embedder.embed(&texts))
        .await
        .context("Failed to embed document chunks")?;

    let mut index = VectorIndex::new();
    for (chunk, vector) in chunks.iter().zip(vectors) {
        index.insert(chunk.index, chunk.text.clone(), vector);
    }

    let question_batch = vec![question.to_string()];
    let query_vector = with_retry(&policy, "question embedding", || {
        embedder.embed(&question_batch)
    })
    .await
    .context("Failed to embed the question")?
    .into_iter()
    .next()
    .context("Embeddings API returned no vector for the question")?;

    let sources = index.search(&query_vector, config.retrieval.top_k);
    let context: String = sources
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut turns = vec![ChatTurn::system(doc_qa_system(&context))];
    turns.extend(memory.to_chat_turns());
    turns.push(ChatTurn::user(question));

    let generation = GenerationConfig::default();
    let answer = with_retry(&policy, "document QA", || {
        model.complete(&turns, &generation)
    })
    .await
    .context("Document QA request failed")?;

    memory.add_user(question);
    memory.add_assistant(&answer);

    Ok(QaOutcome { answer, sources })
}
