//! Best-effort JSON recovery from raw model replies.
//!
//! Model output is never trusted to be valid JSON. Recovery layers, in
//! order: strip markdown code fences, slice from the first `{` to the last
//! `}`, attempt a json5 repair parse (tolerates trailing commas, unquoted
//! keys, single quotes), then fall back to a strict parse of the same
//! substring. Total failure yields `None`, never an error.

/// Extract a JSON object from a raw model reply, or `None` if nothing
/// recoverable is present.
pub fn extract_json_value(raw: &str) -> Option<serde_json::Value> {
    let defenced = strip_code_fences(raw);

    let first = defenced.find('{')?;
    let last = defenced.rfind('}')?;
    if last < first {
        return None;
    }
    let body = &defenced[first..=last];

    match json5::from_str::<serde_json::Value>(body) {
        Ok(value) => Some(value),
        Err(repair_err) => {
            tracing::warn!(error = %repair_err, "json5 repair parse failed, falling back to strict parse");
            match serde_json::from_str(body) {
                Ok(value) => Some(value),
                Err(parse_err) => {
                    tracing::warn!(error = %parse_err, "strict JSON parse failed, giving up on this reply");
                    None
                }
            }
        }
    }
}

/// If the reply wraps its payload in a markdown code fence, return the
/// fenced body; otherwise return the reply unchanged.
fn strip_code_fences(raw: &str) -> &str {
    for fence in ["```json", "```"] {
        if let Some(rest) = raw.split_once(fence).map(|(_, r)| r) {
            if let Some((body, _)) = rest.split_once("```") {
                return body;
            }
        }
    }
    raw
}
