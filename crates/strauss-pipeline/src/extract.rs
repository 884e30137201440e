//! Coerce raw model replies into JSON
//!
//! Models wrap JSON in code fences, prepend prose, leave trailing commas,
//! and embed control characters. `extract_json` peels all of that off in
//! a fixed sequence of cheap text repairs before giving up.

use serde_json::Value;

use crate::error::PipelineError;

/// Extract a JSON value from a raw model reply.
///
/// The function is pure and idempotent: feeding it the serialization of
/// its own output yields the same value.
pub fn extract_json(raw: &str) -> Result<Value, PipelineError> {
    let mut s = raw.trim();

    // Strip markdown code fences. The language tag goes with the first
    // line; a fence without a newline is left for the span slice below.
    if s.starts_with("```") {
        if let Some(newline) = s.find('\n') {
            s = &s[newline + 1..];
            if let Some(stripped) = s.strip_suffix("\n```") {
                s = stripped;
            }
        }
    }

    // Slice from the earliest opening brace or bracket to the latest
    // closing one. These delimiters are ASCII, so byte indices stay on
    // character boundaries.
    let start = match (s.find('{'), s.find('[')) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    };
    let end = match (s.rfind('}'), s.rfind(']')) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    };
    if let (Some(start), Some(end)) = (start, end) {
        if end > start {
            s = &s[start..=end];
        }
    }

    if let Ok(value) = serde_json::from_str(s) {
        return Ok(value);
    }

    let repaired = replace_control_chars(&strip_trailing_commas(s));
    serde_json::from_str(&repaired).map_err(|_| PipelineError::UnparsableOutput {
        excerpt: reply_excerpt(raw),
    })
}

/// First 800 characters of a reply, for error context.
pub(crate) fn reply_excerpt(raw: &str) -> String {
    raw.chars().take(800).collect()
}

/// Drop any comma whose next non-whitespace character closes a
/// container. The scan is not string-aware: a comma directly before a
/// closing bracket inside a string literal is dropped as well.
fn strip_trailing_commas(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    for (i, &c) in chars.iter().enumerate() {
        if c == ',' {
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            if j < chars.len() && (chars[j] == '}' || chars[j] == ']') {
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Replace every control character with a space.
fn replace_control_chars(s: &str) -> String {
    s.chars()
        .map(|c| if (c as u32) < 0x20 { ' ' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_json_object() {
        let value = extract_json(r#"{"key": "value"}"#).unwrap();
        assert_eq!(value, json!({"key": "value"}));
    }

    #[test]
    fn test_plain_json_array() {
        let value = extract_json(r#"[1, 2, 3]"#).unwrap();
        assert_eq!(value, json!([1, 2, 3]));
    }

    #[test]
    fn test_fenced_json_with_language_tag() {
        let raw = "```json\n{\"a\": 1}\n```";
        assert_eq!(extract_json(raw).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_fenced_json_without_language_tag() {
        let raw = "```\n[true]\n```";
        assert_eq!(extract_json(raw).unwrap(), json!([true]));
    }

    #[test]
    fn test_single_line_fence_rescued_by_span_slice() {
        let raw = "```{\"a\": 1}```";
        assert_eq!(extract_json(raw).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_prose_around_json() {
        let raw = "Here is the result:\n{\"codes\": []}\nHope that helps!";
        assert_eq!(extract_json(raw).unwrap(), json!({"codes": []}));
    }

    #[test]
    fn test_fenced_with_trailing_comma() {
        let raw = "```json\n{\"a\": 1,}\n```";
        assert_eq!(extract_json(raw).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_trailing_comma_in_nested_array() {
        let raw = r#"{"items": [{"x": 1}, {"y": 2},]}"#;
        assert_eq!(
            extract_json(raw).unwrap(),
            json!({"items": [{"x": 1}, {"y": 2}]})
        );
    }

    #[test]
    fn test_control_characters_replaced() {
        let raw = "{\"memo\": \"line one\", \"n\": 1\u{0001}}";
        assert_eq!(extract_json(raw).unwrap(), json!({"memo": "line one", "n": 1}));
    }

    #[test]
    fn test_unparsable_reply_carries_excerpt() {
        let raw = "I could not produce JSON for this request.";
        let err = extract_json(raw).unwrap_err();
        match err {
            PipelineError::UnparsableOutput { excerpt } => {
                assert_eq!(excerpt, raw);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_excerpt_caps_at_800_chars() {
        let raw = "x".repeat(2000);
        let err = extract_json(&raw).unwrap_err();
        match err {
            PipelineError::UnparsableOutput { excerpt } => {
                assert_eq!(excerpt.chars().count(), 800);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        let raw = "错".repeat(900);
        let err = extract_json(&raw).unwrap_err();
        match err {
            PipelineError::UnparsableOutput { excerpt } => {
                assert_eq!(excerpt.chars().count(), 800);
                assert!(excerpt.chars().all(|c| c == '错'));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_idempotent_on_clean_output() {
        let raw = "```json\n{\"entries\": [{\"code\": \"checking\"},]}\n```";
        let first = extract_json(raw).unwrap();
        let second = extract_json(&first.to_string()).unwrap();
        assert_eq!(first, second);
    }
}
