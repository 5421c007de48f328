//! Response Extractor — isolates the JSON object in a raw model response.
//!
//! Providers wrap JSON inconsistently: in markdown fences, in prose, or not at
//! all. Extraction is best-effort and never fails; if nothing looks like JSON
//! the trimmed text is returned and the parse step reports the problem.

const FENCE: &str = "```";

/// Returns the most likely JSON payload inside `raw`.
///
/// Priority:
/// 1. the trimmed inner content of the first fenced block (optionally tagged `json`)
/// 2. the span from the first `{` to the last `}`
/// 3. the trimmed text unchanged
pub fn extract_json(raw: &str) -> &str {
    let text = raw.trim();

    if let Some(inner) = fenced_block(text) {
        return inner;
    }

    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

/// Inner content of the first closed ``` fence, with an optional `json` tag removed.
fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find(FENCE)?;
    let after_open = &text[open + FENCE.len()..];
    let close = after_open.find(FENCE)?;
    let inner = &after_open[..close];
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    Some(inner.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_json_is_returned_trimmed() {
        let json = r#"{"title":"Engineer","skills":["Go"]}"#;
        assert_eq!(extract_json(json), json);
        assert_eq!(extract_json(&format!("\n  {json}\n\n")), json);
    }

    #[test]
    fn test_json_tagged_fence_is_stripped() {
        assert_eq!(extract_json("```json\n{\"a\":1}\n```"), r#"{"a":1}"#);
    }

    #[test]
    fn test_untagged_fence_is_stripped() {
        assert_eq!(extract_json("```\n{\"a\":1}\n```"), r#"{"a":1}"#);
    }

    #[test]
    fn test_fence_inside_prose_is_found() {
        let raw = "Here is your tailored resume:\n```json\n{\"a\":1}\n```\nGood luck!";
        assert_eq!(extract_json(raw), r#"{"a":1}"#);
    }

    #[test]
    fn test_first_fenced_block_wins() {
        let raw = "```json\n{\"a\":1}\n```\nand also\n```json\n{\"b\":2}\n```";
        assert_eq!(extract_json(raw), r#"{"a":1}"#);
    }

    #[test]
    fn test_brace_scan_fallback() {
        assert_eq!(
            extract_json("Sure! {\"a\":1} hope that helps"),
            r#"{"a":1}"#
        );
    }

    #[test]
    fn test_brace_scan_spans_nested_objects() {
        let raw = "Result: {\"a\":{\"b\":[1,2]}} -- done";
        assert_eq!(extract_json(raw), r#"{"a":{"b":[1,2]}}"#);
    }

    #[test]
    fn test_unclosed_fence_falls_back_to_braces() {
        assert_eq!(extract_json("```json\n{\"a\":1}"), r#"{"a":1}"#);
    }

    #[test]
    fn test_no_json_returns_trimmed_text() {
        assert_eq!(extract_json("  I cannot help with that.  "), "I cannot help with that.");
    }

    #[test]
    fn test_reversed_braces_return_trimmed_text() {
        assert_eq!(extract_json("} oops {"), "} oops {");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(extract_json("   "), "");
    }
}
