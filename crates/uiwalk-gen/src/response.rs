//! Parsing, repair and validation of model responses.

use serde_json::Value;
use uiwalk_core::case::labels;
use uiwalk_core::{DesignPrinciple, Priority, TestCase};
use uiwalk_parser::AnalyzedModule;

/// A response body that could not be read as JSON, even after repair.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct MalformedPayload(pub String);

/// A decoded response payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    pub value: Value,
    /// Whether the control-character repair pass was needed.
    pub repaired: bool,
}

/// Why a generated record was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DropReason {
    #[error("record is not an object")]
    NotAnObject,
    #[error("missing or empty field '{0}'")]
    MissingField(&'static str),
    #[error("unknown priority '{0}'")]
    UnknownPriority(String),
    #[error("unknown design principle '{0}'")]
    UnknownPrinciple(String),
}

/// Strip `<think>...</think>` blocks that some models (qwen3, deepseek) emit.
pub fn strip_think_blocks(text: &str) -> String {
    let mut result = text.to_string();
    while let Some(start) = result.find("<think>") {
        if let Some(end_offset) = result[start..].find("</think>") {
            let end = start + end_offset + "</think>".len();
            result = format!("{}{}", &result[..start], &result[end..]);
        } else {
            // Unclosed think block: nothing after it is usable
            result.truncate(start);
            break;
        }
    }
    result
}

/// Locate the JSON object inside a model reply: bare, fenced, or embedded in
/// prose on either side. A reply opening with `{` is never searched for fences.
fn json_region(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with('{') {
        for fence in ["```json", "```"] {
            if let Some(start) = trimmed.find(fence) {
                let after = &trimmed[start + fence.len()..];
                if let Some(end) = after.find("```") {
                    return after[..end].trim();
                }
            }
        }
    }
    outer_braces(trimmed)
}

/// From the first `{` to the last `}`, or the whole text when there is no pair.
fn outer_braces(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

/// Escape raw control characters that appear inside JSON string literals.
/// Structural whitespace between tokens is left alone.
pub fn escape_control_chars_in_strings(json: &str) -> String {
    let mut out = String::with_capacity(json.len() + 16);
    let mut in_string = false;
    let mut escaped = false;
    for c in json.chars() {
        if !in_string {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
            continue;
        }
        if escaped {
            escaped = false;
            out.push(c);
            continue;
        }
        match c {
            '\\' => {
                escaped = true;
                out.push(c);
            }
            '"' => {
                in_string = false;
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if u32::from(c) < 0x20 => out.push_str(&format!("\\u{:04x}", u32::from(c))),
            c => out.push(c),
        }
    }
    out
}

/// Parse a model reply into JSON, with one repair pass for unescaped
/// control characters.
pub fn parse_payload(text: &str) -> Result<Payload, MalformedPayload> {
    let stripped = strip_think_blocks(text);
    let region = json_region(&stripped);

    match serde_json::from_str::<Value>(region) {
        Ok(value) => Ok(Payload {
            value,
            repaired: false,
        }),
        Err(first) => {
            let repaired = escape_control_chars_in_strings(region);
            serde_json::from_str::<Value>(&repaired)
                .map(|value| Payload {
                    value,
                    repaired: true,
                })
                .map_err(|second| {
                    MalformedPayload(format!("{first}; after repair: {second}"))
                })
        }
    }
}

/// The raw `cases` records of a payload; empty when the key is absent or not an array.
pub fn raw_cases(payload: &Value) -> &[Value] {
    payload
        .get("cases")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Render a scalar field to text. Null, arrays and objects count as missing.
pub fn coerce_field(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn required_text(record: &Value, field: &'static str) -> Result<String, DropReason> {
    record
        .get(field)
        .and_then(coerce_field)
        .map(|s| uiwalk_core::case::flatten_line(&s))
        .filter(|s| !s.is_empty())
        .ok_or(DropReason::MissingField(field))
}

/// Validate one generated record and attach it to `module_name`.
pub fn validate_record(record: &Value, module_name: &str) -> Result<TestCase, DropReason> {
    if !record.is_object() {
        return Err(DropReason::NotAnObject);
    }
    let check_point = required_text(record, labels::CHECK_POINT)?;
    let principle = required_text(record, labels::PRINCIPLE)?;
    let check_item = required_text(record, labels::CHECK_ITEM)?;
    let priority = required_text(record, labels::PRIORITY)?;
    let expected = required_text(record, labels::EXPECTED)?;

    let priority: Priority = priority
        .parse()
        .map_err(|_| DropReason::UnknownPriority(priority.clone()))?;
    let principle: DesignPrinciple = principle
        .parse()
        .map_err(|_| DropReason::UnknownPrinciple(principle.clone()))?;

    Ok(TestCase::new(
        module_name,
        check_point,
        principle,
        check_item,
        priority,
        expected,
    ))
}

/// Module entries of an analysis payload. Entries that are not objects are skipped.
pub fn analyzed_modules(payload: &Value) -> Vec<AnalyzedModule> {
    let Some(entries) = payload.get("modules").and_then(Value::as_array) else {
        return Vec::new();
    };
    entries
        .iter()
        .filter(|e| e.is_object())
        .map(|e| {
            let text = |key: &str| e.get(key).and_then(coerce_field).unwrap_or_default();
            AnalyzedModule {
                name: text("name"),
                description: text("description"),
                page_type: text("type"),
            }
        })
        .collect()
}
