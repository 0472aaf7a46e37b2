//! Response interpretation for structured model output.
//!
//! The analysis prompt instructs the model to reply with one strict JSON
//! object keyed by output kind. Models routinely wrap that object in prose,
//! code fences or stray tokens, so `interpret` walks a ladder of parse
//! strategies, strict first, progressively looser, and never fails: the
//! worst case is the constant fallback answer.

pub mod charts;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::DataTable;
use charts::{reshape, ChartKind, ChartView};

/// Answer substituted when no strategy can salvage anything usable.
pub const FALLBACK_ANSWER: &str =
    "Unable to parse the model's reply. Please rephrase or simplify your question.";

/// `columns` + `data` payload carried by `table` and the three chart keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPayload {
    pub columns: Vec<String>,
    pub data: Value,
}

/// The recognized keys of a model reply. Unrecognized keys are dropped at
/// parse time; only the keys present here get rendered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<SeriesPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar: Option<SeriesPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<SeriesPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scatter: Option<SeriesPayload>,
}

impl ResponseEnvelope {
    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            answer: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn fallback() -> Self {
        Self::answer(FALLBACK_ANSWER)
    }

    pub fn is_empty(&self) -> bool {
        self.answer.is_none()
            && self.table.is_none()
            && self.bar.is_none()
            && self.line.is_none()
            && self.scatter.is_none()
    }

    fn or_fallback(self) -> Self {
        if self.is_empty() {
            Self::fallback()
        } else {
            self
        }
    }

    fn from_object(map: &Map<String, Value>) -> Self {
        let answer = map.get("answer").map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });
        let payload = |key: &str| {
            map.get(key)
                .and_then(|v| serde_json::from_value::<SeriesPayload>(v.clone()).ok())
        };

        Self {
            answer,
            table: payload("table"),
            bar: payload("bar"),
            line: payload("line"),
            scatter: payload("scatter"),
        }
    }
}

static ANSWER_LITERAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{"answer"\s*:\s*"([^"]+)"\}"#).expect("answer literal regex is valid")
});

// Progressively looser brace-delimited candidates, tried in order.
static LOOSE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // Up to an "Invalid Format" marker or end of text
        Regex::new(r"(?s)(\{.*?\})(?:Invalid Format|\z)").expect("loose regex 1 is valid"),
        // A complete object followed by a non-brace character or end
        Regex::new(r"(?s)(\{.*?\})(?:[^{]|$)").expect("loose regex 2 is valid"),
        // Smallest brace-delimited span
        Regex::new(r"(?s)(\{.+?\})").expect("loose regex 3 is valid"),
    ]
});

// Sentence templates the analysis prompt is known to produce when the model
// drops the JSON wrapper. Both the zh phrasing the deployed prompt emitted
// and the en equivalent are recognized.
static SALVAGE_RES: LazyLock<Vec<(Regex, &'static str, &'static str)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(r"人数最多的职业是(\w+)").expect("salvage regex is valid"),
            "人数最多的职业是",
            "",
        ),
        (
            Regex::new(r"年收入的平均值是([\d\.]+)美元").expect("salvage regex is valid"),
            "年收入的平均值是",
            "美元",
        ),
        (
            Regex::new(r"(?i)the most common occupation is (\w+)").expect("salvage regex is valid"),
            "The most common occupation is ",
            "",
        ),
        (
            Regex::new(r"(?i)the average annual income is \$?([\d\.]+)")
                .expect("salvage regex is valid"),
            "The average annual income is ",
            " dollars",
        ),
    ]
});

/// Interpret raw model output as a [`ResponseEnvelope`]. First strategy to
/// produce something usable wins; the ladder bottoms out at the constant
/// fallback answer, so this never fails.
pub fn interpret(raw: &str) -> ResponseEnvelope {
    let text = strip_fences(raw);
    let text = text.trim();

    // 1. Strict parse of the whole string
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(text) {
        return ResponseEnvelope::from_object(&map).or_fallback();
    }

    // 2. The narrow {"answer": "..."} literal embedded anywhere
    if let Some(caps) = ANSWER_LITERAL_RE.captures(text) {
        return ResponseEnvelope::answer(&caps[1]);
    }

    // 3. Looser brace-delimited candidates, each tried as JSON
    for re in LOOSE_RES.iter() {
        for caps in re.captures_iter(text) {
            if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&caps[1]) {
                let envelope = ResponseEnvelope::from_object(&map);
                if !envelope.is_empty() {
                    return envelope;
                }
            }
        }
    }

    // 4. Brace-depth scan anchored at the "answer" key, for replies like
    //    `Healthcare{"answer": "The most common occupation is Healthcare"}`
    //    where the object is glued to leading garbage
    if let Some(envelope) = scan_anchored_object(text) {
        return envelope;
    }

    // 5. Known sentence templates
    for (re, prefix, suffix) in SALVAGE_RES.iter() {
        if let Some(caps) = re.captures(text) {
            return ResponseEnvelope::answer(format!("{}{}{}", prefix, &caps[1], suffix));
        }
    }

    // 6. Nothing usable
    tracing::debug!(chars = raw.len(), "No parse strategy matched, using fallback answer");
    ResponseEnvelope::fallback()
}

/// Remove markdown code fences the model was told not to emit but often does.
fn strip_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "")
}

fn scan_anchored_object(text: &str) -> Option<ResponseEnvelope> {
    let anchor = text.find("\"answer\"")?;
    let brace = text[..anchor].rfind('{')?;
    let candidate = extract_json_object(&text[brace..])?;
    match serde_json::from_str::<Value>(&candidate) {
        Ok(Value::Object(map)) => {
            let envelope = ResponseEnvelope::from_object(&map);
            (!envelope.is_empty()).then_some(envelope)
        }
        _ => None,
    }
}

/// Extract a complete brace-balanced object starting at the leading `{`,
/// ignoring braces inside string literals.
fn extract_json_object(text: &str) -> Option<String> {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in text.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(text[..i + ch.len_utf8()].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

/// One displayable piece of a tool reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RenderedOutput {
    Answer { text: String },
    Table { table: DataTable },
    Chart { chart: ChartView },
    Error { message: String },
}

/// Map an envelope onto the ordered list of outputs the UI shows. Malformed
/// table/chart payloads become visible error entries instead of panics; an
/// envelope with nothing recognized renders the fallback answer.
pub fn render(envelope: &ResponseEnvelope) -> Vec<RenderedOutput> {
    let mut outputs = Vec::new();

    if let Some(ref answer) = envelope.answer {
        outputs.push(RenderedOutput::Answer {
            text: answer.clone(),
        });
    }
    if let Some(ref payload) = envelope.table {
        match table_from_payload(payload) {
            Ok(table) => outputs.push(RenderedOutput::Table { table }),
            Err(e) => outputs.push(RenderedOutput::Error {
                message: format!("Could not display table: {}", e),
            }),
        }
    }
    for (kind, payload) in [
        (ChartKind::Bar, &envelope.bar),
        (ChartKind::Line, &envelope.line),
        (ChartKind::Scatter, &envelope.scatter),
    ] {
        if let Some(payload) = payload {
            match reshape(kind, payload) {
                Ok(chart) => outputs.push(RenderedOutput::Chart { chart }),
                Err(e) => outputs.push(RenderedOutput::Error {
                    message: format!("Could not display {} chart: {}", kind.as_str(), e),
                }),
            }
        }
    }

    if outputs.is_empty() {
        outputs.push(RenderedOutput::Answer {
            text: FALLBACK_ANSWER.to_string(),
        });
    }
    outputs
}

/// Build a table from a `table` payload: row-major `data` whose rows match
/// `columns`, or a single flat row of matching width.
pub fn table_from_payload(payload: &SeriesPayload) -> Result<DataTable, charts::ChartError> {
    use charts::ChartError;

    if payload.columns.is_empty() {
        return Err(ChartError::EmptyColumns);
    }
    let Some(items) = payload.data.as_array() else {
        return Err(ChartError::NotAnArray);
    };
    if items.is_empty() {
        return Err(ChartError::EmptyData);
    }

    let width = payload.columns.len();
    let mut rows = Vec::with_capacity(items.len());

    if items.iter().all(|v| v.is_array()) {
        for item in items {
            let cells = item.as_array().expect("checked above");
            if cells.len() != width {
                return Err(ChartError::ShapeMismatch {
                    columns: width,
                    values: cells.len(),
                });
            }
            rows.push(cells.iter().map(charts::cell_to_string).collect());
        }
    } else if items.len() == width {
        rows.push(items.iter().map(charts::cell_to_string).collect());
    } else {
        return Err(ChartError::ShapeMismatch {
            columns: width,
            values: items.len(),
        });
    }

    Ok(DataTable::new(payload.columns.clone(), rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strict_json_with_recognized_key_is_returned_unchanged() {
        let envelope = interpret(r#"{"answer": "The top product is MNWC3-067"}"#);
        assert_eq!(envelope.answer.as_deref(), Some("The top product is MNWC3-067"));
        assert!(envelope.table.is_none());
    }

    #[test]
    fn strict_json_chart_payload_roundtrips() {
        let envelope = interpret(r#"{"bar": {"columns": ["A", "B"], "data": [34, 21]}}"#);
        let bar = envelope.bar.expect("bar payload");
        assert_eq!(bar.columns, vec!["A", "B"]);
        assert_eq!(bar.data, json!([34, 21]));
    }

    #[test]
    fn unrecognized_keys_are_ignored() {
        let envelope = interpret(r#"{"answer": "ok", "reasoning": "because"}"#);
        assert_eq!(envelope.answer.as_deref(), Some("ok"));
    }

    #[test]
    fn object_without_recognized_keys_falls_back() {
        let envelope = interpret(r#"{"reasoning": "no idea"}"#);
        assert_eq!(envelope.answer.as_deref(), Some(FALLBACK_ANSWER));
    }

    #[test]
    fn fenced_json_is_unwrapped() {
        let envelope = interpret("```json\n{\"answer\": \"fenced\"}\n```");
        assert_eq!(envelope.answer.as_deref(), Some("fenced"));
    }

    #[test]
    fn answer_literal_embedded_in_prose_is_extracted_verbatim() {
        let raw = "Sure! Here is the result you asked for: {\"answer\": \"42 orders\"} hope that helps.";
        assert_eq!(interpret(raw).answer.as_deref(), Some("42 orders"));
    }

    #[test]
    fn loose_candidate_before_invalid_format_marker() {
        let raw = "{\"answer\": \"value A\", \"table\": {\"columns\": [\"x\"], \"data\": [[1]]}}Invalid Format";
        let envelope = interpret(raw);
        assert_eq!(envelope.answer.as_deref(), Some("value A"));
        assert!(envelope.table.is_some());
    }

    #[test]
    fn object_glued_to_leading_garbage_is_recovered() {
        let raw = "Healthcare{\"answer\": \"The most common occupation is Healthcare\", \"note\": \"x\"}";
        let envelope = interpret(raw);
        assert_eq!(
            envelope.answer.as_deref(),
            Some("The most common occupation is Healthcare")
        );
    }

    #[test]
    fn anchored_brace_scan_handles_braces_inside_strings() {
        // Loose regexes trip over the brace in the string value; the
        // string-aware depth scan anchored at "answer" does not.
        let raw = "x{\"answer\": \"a {b}\", \"extra\": 1} y";
        let envelope = interpret(raw);
        assert_eq!(envelope.answer.as_deref(), Some("a {b}"));
    }

    #[test]
    fn salvages_known_sentence_templates() {
        let envelope = interpret("经分析，年收入的平均值是52143.75美元，供参考。");
        assert_eq!(envelope.answer.as_deref(), Some("年收入的平均值是52143.75美元"));

        let envelope = interpret("Based on the data, the average annual income is $52143.75.");
        assert_eq!(
            envelope.answer.as_deref(),
            Some("The average annual income is 52143.75 dollars")
        );
    }

    #[test]
    fn garbage_yields_constant_fallback() {
        let envelope = interpret("I'm sorry, I could not work that out at all.");
        assert_eq!(envelope.answer.as_deref(), Some(FALLBACK_ANSWER));
    }

    #[test]
    fn non_string_answer_is_stringified() {
        let envelope = interpret(r#"{"answer": 17}"#);
        assert_eq!(envelope.answer.as_deref(), Some("17"));
    }

    #[test]
    fn extract_json_object_ignores_braces_in_strings() {
        let text = r#"{"answer": "set {x} and {y}"} tail"#;
        let extracted = extract_json_object(text).unwrap();
        assert_eq!(extracted, r#"{"answer": "set {x} and {y}"}"#);
    }

    #[test]
    fn render_orders_outputs_and_reports_bad_shapes() {
        let envelope = ResponseEnvelope {
            answer: Some("summary".into()),
            table: Some(SeriesPayload {
                columns: vec!["a".into(), "b".into()],
                data: json!([[1, 2], [3, 4]]),
            }),
            bar: Some(SeriesPayload {
                columns: vec!["a".into(), "b".into()],
                data: json!([1, 2, 3]),
            }),
            line: None,
            scatter: None,
        };

        let outputs = render(&envelope);
        assert_eq!(outputs.len(), 3);
        assert!(matches!(outputs[0], RenderedOutput::Answer { .. }));
        assert!(matches!(outputs[1], RenderedOutput::Table { .. }));
        assert!(matches!(outputs[2], RenderedOutput::Error { .. }));
    }

    #[test]
    fn render_empty_envelope_substitutes_fallback() {
        let outputs = render(&ResponseEnvelope::default());
        assert_eq!(
            outputs,
            vec![RenderedOutput::Answer {
                text: FALLBACK_ANSWER.to_string()
            }]
        );
    }

    #[test]
    fn table_payload_with_flat_row_is_accepted() {
        let payload = SeriesPayload {
            columns: vec!["name".into(), "count".into()],
            data: json!(["widgets", 12]),
        };
        let table = table_from_payload(&payload).unwrap();
        assert_eq!(table.rows, vec![vec!["widgets".to_string(), "12".to_string()]]);
    }
}
