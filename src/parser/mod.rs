pub mod lines;
pub mod machine;
pub mod post;
pub mod profile;
pub mod shapes;

use chrono::{DateTime, TimeZone};
use tracing::{info, warn};

use crate::document::Post;
use machine::PostMachine;
use profile::ProfileScan;

pub struct ParsedFeed {
    pub profile: ProfileScan,
    pub posts: Vec<Post>,
}

/// Two independent passes over the flat snapshot text: the profile header
/// scan, then lines → post state machine → finalized posts.
///
/// `reference` is the capture time used to resolve relative post dates.
pub fn parse_snapshot_text<Tz: TimeZone>(
    text: &str,
    reference: &DateTime<Tz>,
    anchor_name: &str,
) -> ParsedFeed {
    let profile = profile::scan_profile(text, anchor_name);
    if profile.name.is_none() || profile.followers_raw.is_none() {
        warn!(
            name = ?profile.name,
            followers = ?profile.followers_raw,
            "profile header only partially found"
        );
    }

    let lines = lines::classify_lines(text);
    let posts = PostMachine::new(profile.name.clone(), reference).run(&lines);
    info!(lines = lines.len(), posts = posts.len(), "parsed snapshot");

    ParsedFeed { profile, posts }
}

// ── Tests ──
