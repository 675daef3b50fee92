//! Defensive JSON extraction from LLM output.
//!
//! Models wrap JSON in ```json fences, prepend prose, or return it bare.
//! `safe_json_value` tolerates all three; `None` means the caller should take
//! its fallback path, not crash.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Extracts a JSON value from raw LLM output.
///
/// Order of attempts:
/// 1. strip ```json / ``` fences and parse the remainder
/// 2. parse the trimmed text as-is
/// 3. extract the first balanced `{...}` from surrounding prose
pub fn safe_json_value(text: &str) -> Option<Value> {
    let stripped = strip_json_fences(text);

    if let Ok(value) = serde_json::from_str::<Value>(stripped) {
        return Some(value);
    }

    extract_first_object(stripped).and_then(|candidate| serde_json::from_str(candidate).ok())
}

/// Typed variant of `safe_json_value`. Shape mismatches also return `None`.
pub fn safe_json_parse<T: DeserializeOwned>(text: &str) -> Option<T> {
    safe_json_value(text).and_then(|v| serde_json::from_value(v).ok())
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Returns the first balanced top-level `{...}` slice, respecting strings
/// and escape sequences so braces inside string values do not confuse depth
/// tracking.
fn extract_first_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fenced_json_parses() {
        let input = "```json\n{\"a\":1}\n```";
        assert_eq!(safe_json_value(input), Some(json!({"a": 1})));
    }

    #[test]
    fn test_bare_fence_parses() {
        let input = "```\n{\"a\":1}\n```";
        assert_eq!(safe_json_value(input), Some(json!({"a": 1})));
    }

    #[test]
    fn test_bare_json_parses() {
        assert_eq!(safe_json_value("{\"a\":1}"), Some(json!({"a": 1})));
    }

    #[test]
    fn test_json_embedded_in_prose() {
        let input = "noise {\"a\":1} noise";
        assert_eq!(safe_json_value(input), Some(json!({"a": 1})));
    }

    #[test]
    fn test_not_json_returns_none() {
        assert_eq!(safe_json_value("not json"), None);
    }

    #[test]
    fn test_nested_objects_extract_whole() {
        let input = "Here you go: {\"outer\": {\"inner\": 2}} hope that helps";
        assert_eq!(
            safe_json_value(input),
            Some(json!({"outer": {"inner": 2}}))
        );
    }

    #[test]
    fn test_braces_inside_strings_do_not_break_extraction() {
        let input = "prefix {\"msg\": \"a } inside\"} suffix";
        assert_eq!(safe_json_value(input), Some(json!({"msg": "a } inside"})));
    }

    #[test]
    fn test_escaped_quotes_inside_strings() {
        let input = "x {\"msg\": \"she said \\\"}\\\" ok\"} y";
        let value = safe_json_value(input).unwrap();
        assert_eq!(value["msg"], json!("she said \"}\" ok"));
    }

    #[test]
    fn test_unbalanced_braces_return_none() {
        assert_eq!(safe_json_value("start { \"a\": 1 "), None);
    }

    #[test]
    fn test_typed_parse() {
        #[derive(serde::Deserialize, PartialEq, Debug)]
        struct Small {
            a: u32,
        }
        assert_eq!(
            safe_json_parse::<Small>("```json\n{\"a\": 7}\n```"),
            Some(Small { a: 7 })
        );
        assert_eq!(safe_json_parse::<Small>("{\"b\": 7}"), None);
    }

    #[test]
    fn test_bare_array_parses() {
        assert_eq!(safe_json_value("[1,2]"), Some(json!([1, 2])));
    }
}
