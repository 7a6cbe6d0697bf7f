use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::document::DEFAULT_NOTE;

/// Fallback account when neither a uid nor a profile url is given.
pub const DEFAULT_UID: &str = "7449968177";
/// Screen name the profile scan looks for on the tracked account's page.
pub const DEFAULT_ANCHOR_NAME: &str = "TOP登陆少年-苏新皓";

static PATH_UID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/u/(\d+)").unwrap());
static QUERY_UID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[?&]uid=(\d+)").unwrap());

/// Values read from `WEIBO_*` environment variables.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct EnvSettings {
    pub uid: Option<String>,
    pub source_url: Option<String>,
    pub anchor_name: Option<String>,
    pub note: Option<String>,
}

impl EnvSettings {
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix("WEIBO"))
            .build()?;
        let env: EnvSettings = settings.try_deserialize()?;
        debug!(?env, "loaded environment settings");
        Ok(env)
    }
}

/// Resolved per-run settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub uid: String,
    pub source_url: String,
    pub anchor_name: String,
    pub note: Option<String>,
}

impl RunSettings {
    /// CLI flags win over the environment; the uid falls back to whatever the
    /// source url carries, then to [`DEFAULT_UID`].
    pub fn resolve(cli_uid: Option<String>, cli_source_url: Option<String>, env: EnvSettings) -> Self {
        let uid_flag = non_blank(cli_uid).or_else(|| non_blank(env.uid));
        let source_flag = non_blank(cli_source_url).or_else(|| non_blank(env.source_url));

        let uid = uid_flag
            .or_else(|| source_flag.as_deref().and_then(uid_from_url))
            .unwrap_or_else(|| DEFAULT_UID.to_string());
        let source_url = source_flag.unwrap_or_else(|| format!("https://m.weibo.cn/u/{uid}"));
        let anchor_name = non_blank(env.anchor_name).unwrap_or_else(|| DEFAULT_ANCHOR_NAME.to_string());
        let note = Some(non_blank(env.note).unwrap_or_else(|| DEFAULT_NOTE.to_string()));

        RunSettings {
            uid,
            source_url,
            anchor_name,
            note,
        }
    }
}

/// "https://m.weibo.cn/u/123" or "...?uid=123" -> "123".
pub fn uid_from_url(url: &str) -> Option<String> {
    PATH_UID_RE
        .captures(url)
        .or_else(|| QUERY_UID_RE.captures(url))
        .map(|c| c[1].to_string())
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
