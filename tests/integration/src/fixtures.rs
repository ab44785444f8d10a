//! Test fixtures and data generators
//!
//! JSON builders for snapshot bodies and stream frames.

use serde_json::{json, Value};

/// A root comment payload
pub fn root_comment(id: i64, content: &str) -> Value {
    json!({
        "id": id,
        "parent": null,
        "user": {"id": 1, "full_name": "Fixture User"},
        "content": content,
        "created_at": "2026-03-01T09:30:00Z",
        "edited": false,
        "documents": [],
        "ratings": [],
        "replies": []
    })
}

/// A reply payload
pub fn reply_comment(id: i64, parent: i64, content: &str) -> Value {
    let mut comment = root_comment(id, content);
    comment["parent"] = json!(parent);
    comment
}

/// A comment payload carrying reactions
pub fn rated_comment(id: i64, ratings: Value) -> Value {
    let mut comment = root_comment(id, "rated");
    comment["ratings"] = ratings;
    comment
}

/// A paginated snapshot envelope
pub fn envelope(results: Vec<Value>, count: u64) -> Value {
    json!({
        "results": results,
        "count": count,
        "next": null,
        "previous": null
    })
}

/// A `comment_update` stream frame
pub fn frame(action: &str, comment: Value) -> String {
    json!({
        "type": "comment_update",
        "action": action,
        "comment": comment
    })
    .to_string()
}
