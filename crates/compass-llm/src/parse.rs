use serde::de::DeserializeOwned;

use compass_core::error::{CompassError, Result};

/// Extract structured JSON from completion text.
///
/// Models frequently wrap JSON in markdown code fences; those are stripped
/// before parsing. If the cleaned text still fails to parse, the outermost
/// object or array span is tried once more. Anything else is a
/// `ResponseParse` carrying the (truncated) offending text.
pub fn extract_json<T: DeserializeOwned>(raw: &str) -> Result<T> {
    if raw.trim().is_empty() {
        return Err(CompassError::response_parse("empty response", raw));
    }

    let cleaned = strip_fences(raw);

    match serde_json::from_str(cleaned) {
        Ok(value) => Ok(value),
        Err(first_err) => {
            if let Some(span) = json_span(cleaned) {
                if let Ok(value) = serde_json::from_str(span) {
                    return Ok(value);
                }
            }
            Err(CompassError::response_parse(first_err.to_string(), raw))
        }
    }
}

/// Remove markdown code-fence markers (```json ... ``` or plain ```).
fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag on the opening fence line, if any.
    let rest = match rest.split_once('\n') {
        Some((_tag, body)) => body,
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// The outermost `{..}` or `[..]` span within the text, if any.
fn json_span(text: &str) -> Option<&str> {
    let obj = text.find('{').and_then(|start| {
        text.rfind('}')
            .filter(|end| *end > start)
            .map(|end| &text[start..=end])
    });
    if obj.is_some() {
        return obj;
    }
    text.find('[').and_then(|start| {
        text.rfind(']')
            .filter(|end| *end > start)
            .map(|end| &text[start..=end])
    })
}
