use anyhow::{Context, Result};
use itertools::Itertools;
use serde_json::Value;
use tracing::info;

fn str_field<'a>(post: &'a Value, key: &str) -> &'a str {
    post.get(key).and_then(Value::as_str).unwrap_or("")
}

/// Posts sharing status id, raw time and the first 80 chars of text are the same post.
fn post_key(post: &Value) -> String {
    let head: String = str_field(post, "text").chars().take(80).collect();
    format!(
        "{}|{}|{}",
        str_field(post, "status_id"),
        str_field(post, "created_at_raw"),
        head
    )
}

/// Drop later repeats of a post within one document, keeping page order.
///
/// Works on the raw JSON so the rest of the document, including fields this
/// crate does not model, is written back untouched.
pub fn dedupe_posts(doc: &mut Value) -> Result<usize> {
    let posts = doc
        .get_mut("posts")
        .and_then(Value::as_array_mut)
        .context("document has no posts array")?;
    let before = posts.len();
    *posts = std::mem::take(posts).into_iter().unique_by(post_key).collect();
    let removed = before - posts.len();
    info!(before, removed, "deduplicated posts");
    Ok(removed)
}
