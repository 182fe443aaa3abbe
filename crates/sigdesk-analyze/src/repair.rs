//! Deterministic JSON extraction and repair for model output.
//!
//! The model is instructed to reply with a single JSON object, but long
//! responses are occasionally cut off mid-string or mid-array by the token
//! limit. Rather than burning another API call, we repair the truncation
//! mechanically: close the open string, then the open arrays, then the open
//! objects. Anything that still fails after that is genuinely malformed.

use crate::error::AnalyzeError;

/// Extracts and parses the first JSON object found in `text`.
///
/// # Errors
///
/// Returns [`AnalyzeError::MalformedResponse`] when no object can be
/// recovered even after repair.
pub fn parse_json_block(text: &str) -> Result<serde_json::Value, AnalyzeError> {
    let start = text
        .find('{')
        .ok_or_else(|| AnalyzeError::MalformedResponse("no JSON object in response".to_string()))?;
    let end = text
        .rfind('}')
        .map_or(text.len(), |i| i + 1)
        .max(start + 1);
    let block = strip_control_chars(&text[start..end]);

    if let Ok(value) = serde_json::from_str(&block) {
        return Ok(value);
    }

    let repaired = repair_truncated_json(&block);
    serde_json::from_str(&repaired).map_err(|e| {
        AnalyzeError::MalformedResponse(format!("unparseable even after repair: {e}"))
    })
}

/// Removes C0 control characters and DEL, which the model sometimes leaks
/// into string values and which strict JSON parsing rejects.
fn strip_control_chars(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// Closes an open string, then open arrays, then open objects, in that order.
#[must_use]
pub fn repair_truncated_json(block: &str) -> String {
    let mut in_string = false;
    let mut escaped = false;
    let mut open_braces = 0i64;
    let mut open_brackets = 0i64;

    for c in block.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => open_braces += 1,
            '}' if !in_string => open_braces -= 1,
            '[' if !in_string => open_brackets += 1,
            ']' if !in_string => open_brackets -= 1,
            _ => {}
        }
    }

    let mut repaired = block.to_string();
    if in_string {
        repaired.push('"');
    }
    for _ in 0..open_brackets.max(0) {
        repaired.push(']');
    }
    for _ in 0..open_braces.max(0) {
        repaired.push('}');
    }
    repaired
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_object_embedded_in_prose() {
        let text = "Here is the analysis you asked for:\n{\"a\": 1}\nLet me know!";
        let value = parse_json_block(text).expect("should parse");
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn strips_control_characters_from_strings() {
        let text = "{\"a\": \"hel\u{0008}lo\"}";
        let value = parse_json_block(text).expect("should parse after stripping");
        assert_eq!(value["a"], "hello");
    }

    #[test]
    fn repairs_truncated_string_and_object() {
        let text = "{\"signal\": {\"headline\": \"Acme launche";
        let value = parse_json_block(text).expect("should parse after repair");
        assert_eq!(value["signal"]["headline"], "Acme launche");
    }

    #[test]
    fn repairs_truncated_array() {
        let text = "{\"people\": [{\"name\": \"Grace Hopper\"}, {\"name\": \"Ada";
        let value = parse_json_block(text).expect("should parse after repair");
        assert_eq!(value["people"][1]["name"], "Ada");
    }

    #[test]
    fn brackets_inside_strings_do_not_confuse_the_counter() {
        let text = "{\"a\": \"list: [1, 2\", \"b\": 3}";
        let value = parse_json_block(text).expect("balanced input should parse as-is");
        assert_eq!(value["b"], 3);
    }

    #[test]
    fn missing_object_is_an_error() {
        let err = parse_json_block("no json here at all").unwrap_err();
        assert!(matches!(err, AnalyzeError::MalformedResponse(_)));
    }

    #[test]
    fn garbage_after_repair_is_an_error() {
        let err = parse_json_block("{:::").unwrap_err();
        assert!(matches!(err, AnalyzeError::MalformedResponse(_)));
    }
}
