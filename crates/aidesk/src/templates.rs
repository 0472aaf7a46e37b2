//! Prompt templates for the tools.

/// Instruction template for the data-analysis tool. The model must answer
/// with exactly one strict JSON object keyed by output kind; the response
/// interpreter still assumes it often will not.
pub const ANALYSIS_PROMPT: &str = r#"You are a data analysis assistant. Your reply depends on the user's request and must strictly follow the JSON formats below.

Important: return ONLY the raw JSON object. No explanations, no prefix or suffix text, no ```json fences or any other markup.

1. For a plain text answer, reply in this format:
   {"answer": "<your answer here>"}
Example:
   {"answer": "The product with the highest order count is 'MNWC3-067'"}

2. If the user asks for a table, reply in this format:
   {"table": {"columns": ["column1", "column2", ...], "data": [[value1, value2, ...], [value1, value2, ...], ...]}}

3. If the request suits a bar chart, reply in this format:
   {"bar": {"columns": ["A", "B", "C", ...], "data": [34, 21, 91, ...]}}

4. If the request suits a line chart, reply in this format:
   {"line": {"columns": ["A", "B", "C", ...], "data": [34, 21, 91, ...]}}

5. If the request suits a scatter chart, reply in this format:
   {"scatter": {"columns": ["A", "B", "C", ...], "data": [34, 21, 91, ...]}}
Note: only three chart types are supported: "bar", "line" and "scatter".

Make sure that:
1. You return one pure JSON object and nothing else
2. All strings use double quotes, never single quotes
3. No explanatory text appears before or after the JSON
4. The reply parses directly as JSON

The user request to handle follows:
"#;

/// System prompt for the document QA tool, with retrieved context inlined.
pub fn doc_qa_system(context: &str) -> String {
    format!(
        "You are a document question-answering assistant. Answer the user's \
         question from the context below and the conversation history. If the \
         context does not contain the answer, say so.\n\nContext:\n{}",
        context
    )
}

pub fn title_prompt(subject: &str) -> String {
    format!(
        "Come up with one catchy title for a video about '{}'. Reply with the title only.",
        subject
    )
}

pub fn script_prompt(title: &str, video_minutes: f32, wiki_digest: &str) -> String {
    format!(
        "You are a short-video creator. Using the title and reference material \
         below, write a script for a short video.\n\
         Video title: {title}. Video length: {video_minutes} minutes; keep the \
         script length in line with the video length.\n\
         Hook the viewer in the opening, deliver substance in the middle, and \
         end with a surprise. Structure the script with [opening, middle, \
         ending] sections.\n\
         Keep the tone light and fun, aimed at a young audience.\n\
         You may draw on the following encyclopedia search results, but only \
         where relevant; ignore anything unrelated:\n```{wiki_digest}```"
    )
}
