use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::NamedTempFile;

pub const DEFAULT_NOTE: &str =
    "数据来自agent-browser可访问性树快照；created_at_local_guess仅基于fetched_at做相对时间推断（未做微博时区校准）。";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdolProfile {
    pub uid: String,
    pub name: Option<String>,
    pub followers_raw: Option<String>,
    pub following_raw: Option<String>,
    pub verified_raw: Option<String>,
    pub followers: Option<i64>,
    pub following: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub reposts_raw: Option<String>,
    pub comments_raw: Option<String>,
    pub likes_raw: Option<String>,
    pub reposts: Option<i64>,
    pub comments: Option<i64>,
    pub likes: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub text: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Media {
    Video {
        url: String,
    },
    Live {
        url: String,
    },
    VideoMeta {
        play_count_raw: String,
        play_count: Option<i64>,
        duration: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub is_pinned: bool,
    pub author: Option<String>,
    pub created_at_raw: Option<String>,
    pub created_at_local_guess: Option<String>,
    pub source_raw: Option<String>,
    pub text: String,
    pub emojis: Vec<String>,
    pub links: Vec<Link>,
    pub media: Vec<Media>,
    pub stats: Stats,
    pub status_id: Option<String>,
    pub status_url: Option<String>,
}

impl Post {
    pub fn has_video(&self) -> bool {
        self.media.iter().any(|m| matches!(m, Media::Video { .. }))
    }

    pub fn has_live(&self) -> bool {
        self.media.iter().any(|m| matches!(m, Media::Live { .. }))
    }
}

/// The published document: one idol, their posts in page order, and run metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub source_url: String,
    pub fetched_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub idol: IdolProfile,
    #[serde(default)]
    pub posts: Vec<Post>,
}

impl Document {
    pub fn assemble(
        source_url: String,
        fetched_at: DateTime<Utc>,
        note: Option<String>,
        idol: IdolProfile,
        posts: Vec<Post>,
    ) -> Self {
        Document {
            source_url,
            fetched_at,
            note,
            idol,
            posts,
        }
    }
}

pub fn read_document(path: &Path) -> Result<Document> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not a posts document", path.display()))
}

/// The document as plain JSON, for rewrites that must keep every field.
pub fn read_json(path: &Path) -> Result<Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not JSON", path.display()))
}

/// Pretty JSON with a trailing newline.
pub fn write_document<T: Serialize>(path: &Path, doc: &T) -> Result<()> {
    let mut json = serde_json::to_string_pretty(doc).context("failed to serialize document")?;
    json.push('\n');
    write_atomic(path, json.as_bytes())
}

/// Write to a sibling temp file then rename, so readers never see half a file.
/// The temp file is removed if anything fails before the rename lands.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent().filter(|d| !d.as_os_str().is_empty()) {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
            dir
        }
        None => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
    tmp.write_all(bytes)
        .with_context(|| format!("failed to write {}", tmp.path().display()))?;
    tmp.persist(path)
        .with_context(|| format!("failed to move {} into place", path.display()))?;
    Ok(())
}
