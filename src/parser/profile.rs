use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::lines::{classify_line, LineKind};
use crate::document::IdolProfile;
use crate::normalize::parse_count;

static FOLLOW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"text:\s*关注([^\s]+)\s*粉丝([^\s]+)").unwrap());

const VERIFIED_PREFIX: &str = "微博认证：";

/// Fields the profile header scan can discover. The uid is never among them.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProfileScan {
    pub name: Option<String>,
    pub following_raw: Option<String>,
    pub followers_raw: Option<String>,
    pub verified_raw: Option<String>,
}

impl ProfileScan {
    fn is_complete(&self) -> bool {
        self.name.is_some() && self.followers_raw.is_some() && self.verified_raw.is_some()
    }

    pub fn into_profile(self, uid: String) -> IdolProfile {
        IdolProfile {
            uid,
            followers: parse_count(self.followers_raw.as_deref()),
            following: parse_count(self.following_raw.as_deref()),
            name: self.name,
            followers_raw: self.followers_raw,
            following_raw: self.following_raw,
            verified_raw: self.verified_raw,
        }
    }
}

/// "- text: 关注123 粉丝45.6万" -> ("123", "45.6万").
pub fn follow_counts(line: &str) -> Option<(String, String)> {
    if !line.contains("text: 关注") || !line.contains("粉丝") {
        return None;
    }
    let caps = FOLLOW_RE.captures(line)?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

/// "- paragraph: 微博认证：歌手" -> "微博认证：歌手".
pub fn verification(line: &str) -> Option<String> {
    match classify_line(line).kind {
        LineKind::Paragraph(text) if text.starts_with(VERIFIED_PREFIX) => Some(text),
        _ => None,
    }
}

pub fn has_anchor_name(line: &str, anchor: &str) -> bool {
    !anchor.is_empty() && line.contains(&format!("text: {anchor}"))
}

/// One forward pass over the whole snapshot, independent of post parsing.
/// First match wins per field; stops once name, followers and verification
/// are all known.
pub fn scan_profile(text: &str, anchor: &str) -> ProfileScan {
    let mut scan = ProfileScan::default();

    for line in text.lines() {
        if scan.following_raw.is_none() {
            if let Some((following, followers)) = follow_counts(line) {
                scan.following_raw = Some(following);
                scan.followers_raw = Some(followers);
            }
        }
        if scan.verified_raw.is_none() {
            scan.verified_raw = verification(line);
        }
        if scan.name.is_none() && has_anchor_name(line, anchor) {
            scan.name = Some(anchor.to_string());
        }
        if scan.is_complete() {
            debug!("profile scan complete early");
            break;
        }
    }

    scan
}
