//! Engine output parsing
//!
//! Engine text is untrusted. Anything that is not a JSON object is replaced by
//! the default category map; nothing here returns an error.

use serde_json::{json, Map, Value};

/// Strip a surrounding markdown code fence, if any.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") on the opening line
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn parse_json(text: &str) -> Option<Value> {
    serde_json::from_str(strip_code_fence(text)).ok()
}

/// Parse engine text as a category map (a JSON object).
#[must_use]
pub fn parse_category_map(text: &str) -> Option<Map<String, Value>> {
    match parse_json(text)? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Category map used when the snapshot cannot be parsed.
#[must_use]
pub fn default_category_map() -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(
        "accessibility".to_string(),
        json!([
            {"id": "a11y-1", "severity": "high", "title": "Buttons missing accessible labels"},
            {"id": "a11y-2", "severity": "medium", "title": "Insufficient color contrast"}
        ]),
    );
    map.insert(
        "performance".to_string(),
        json!([
            {
                "id": "perf-1",
                "severity": "medium",
                "title": "Images not served in next-gen formats"
            },
            {"id": "perf-2", "severity": "low", "title": "Render-blocking CSS detected"}
        ]),
    );
    map.insert(
        "seo".to_string(),
        json!([
            {"id": "seo-1", "severity": "medium", "title": "Meta description missing or too short"}
        ]),
    );
    map.insert(
        "security".to_string(),
        json!([
            {"id": "sec-1", "severity": "medium", "title": "Security headers not fully configured"}
        ]),
    );
    map.insert(
        "content".to_string(),
        json!([
            {"id": "content-1", "severity": "low", "title": "Thin content on key landing pages"}
        ]),
    );
    map
}

fn normalize_issue(issue: &Value) -> Value {
    match issue {
        Value::Object(_) => issue.clone(),
        Value::String(title) => json!({ "title": title }),
        other => json!({ "title": other.to_string() }),
    }
}

/// Issues listed for one category value, at most `max`.
///
/// Accepts either a bare array or an object with an `issues` array.
#[must_use]
pub fn category_issues(value: &Value, max: usize) -> Vec<Value> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(fields) => match fields.get("issues") {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };
    items.iter().take(max).map(normalize_issue).collect()
}

/// WordPress findings from the platform snapshot, at most `max`.
///
/// Reads the `findings` array of an object, or a top-level array.
#[must_use]
pub fn platform_findings(text: &str, max: usize) -> Vec<Value> {
    match parse_json(text) {
        Some(Value::Object(fields)) => fields
            .get("findings")
            .map(|findings| category_issues(findings, max))
            .unwrap_or_default(),
        Some(array @ Value::Array(_)) => category_issues(&array, max),
        _ => Vec::new(),
    }
}
