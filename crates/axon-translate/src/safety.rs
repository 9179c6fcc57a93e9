//! Default safety settings attachment
//!
//! Applied to the serialized target request as a final post-processing
//! step, so the payload shape stays a pure concern of the wire types.

use serde_json::{Value, json};

/// The five standard harm categories, all disabled
fn default_safety_settings() -> Value {
    json!([
        { "category": "HARM_CATEGORY_HARASSMENT", "threshold": "OFF" },
        { "category": "HARM_CATEGORY_HATE_SPEECH", "threshold": "OFF" },
        { "category": "HARM_CATEGORY_SEXUALLY_EXPLICIT", "threshold": "OFF" },
        { "category": "HARM_CATEGORY_DANGEROUS_CONTENT", "threshold": "OFF" },
        { "category": "HARM_CATEGORY_CIVIC_INTEGRITY", "threshold": "OFF" },
    ])
}

/// Insert default safety settings at a dotted path in a serialized request
///
/// Intermediate objects are created as needed. The payload is returned
/// unchanged when it does not parse or the path runs through a non-object.
pub fn attach_default_safety_settings(payload: Vec<u8>, path: &str) -> Vec<u8> {
    let Ok(mut root) = serde_json::from_slice::<Value>(&payload) else {
        return payload;
    };

    let (parents, leaf) = path.rsplit_once('.').map_or(("", path), |(p, l)| (p, l));

    let mut node = &mut root;
    for segment in parents.split('.').filter(|segment| !segment.is_empty()) {
        let Value::Object(map) = node else {
            return payload;
        };
        node = map.entry(segment.to_owned()).or_insert_with(|| json!({}));
    }

    let Value::Object(map) = node else {
        return payload;
    };
    map.insert(leaf.to_owned(), default_safety_settings());

    serde_json::to_vec(&root).unwrap_or(payload)
}
