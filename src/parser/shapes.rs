//! Line-shape matchers used by the per-section extractors.
//!
//! Each matcher looks at exactly one classified line (or one captured string)
//! and says whether it has the shape a given field comes from.

use std::sync::LazyLock;

use regex::Regex;

use super::lines::{Line, LineKind, NESTED_DEPTH, URL_DEPTH};
use crate::document::Media;
use crate::normalize::parse_count;

pub const MOBILE_ORIGIN: &str = "https://m.weibo.cn";
pub const STATUS_PREFIX: &str = "/status/";
pub const VIDEO_HOST: &str = "https://video.weibo.com/";
pub const LIVE_PATH: &str = "/wblive/";
pub const NOOP_HREF: &str = "javascript:;";
pub const READ_MORE: &str = "全文";

static SOURCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"来自\s*(.+)$").unwrap());
static PLAYS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9.]+[万亿]?)次播放\s+([0-9]{1,2}:[0-9]{2}(?::[0-9]{2})?)$").unwrap()
});
static CAPTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"微博(直播|视频)").unwrap());

/// Banner child `- heading "<time> 来自 <source>" ... [level=4]`.
pub fn time_heading(line: &Line) -> Option<&str> {
    match &line.kind {
        LineKind::Heading { text, level: Some(4) } if line.depth == NESTED_DEPTH => Some(text.as_str()),
        _ => None,
    }
}

/// "昨天 10:30 来自 iPhone 15 Pro" -> "iPhone 15 Pro".
pub fn source_label(raw_time: &str) -> Option<String> {
    SOURCE_RE
        .captures(raw_time)
        .map(|c| c[1].trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn article_text(line: &Line) -> Option<&str> {
    match &line.kind {
        LineKind::Text(v) if line.depth == NESTED_DEPTH => Some(v.as_str()),
        _ => None,
    }
}

/// Video caption "3.2万次播放 01:05" -> video-meta media entry.
pub fn play_caption(text: &str) -> Option<Media> {
    let caps = PLAYS_RE.captures(text)?;
    Some(Media::VideoMeta {
        play_count_raw: caps[1].to_string(),
        play_count: parse_count(Some(&caps[1])),
        duration: caps[2].to_string(),
    })
}

pub fn article_emoji(line: &Line) -> Option<&str> {
    match &line.kind {
        LineKind::Img(Some(alt)) if line.depth == NESTED_DEPTH => Some(alt.as_str()),
        _ => None,
    }
}

/// `Some(label)` for a nested link line; the label itself may be absent.
pub fn article_link(line: &Line) -> Option<Option<&str>> {
    match &line.kind {
        LineKind::Link(label) if line.depth == NESTED_DEPTH => Some(label.as_deref()),
        _ => None,
    }
}

pub fn link_url(line: &Line) -> Option<&str> {
    match &line.kind {
        LineKind::Url(u) if line.depth == URL_DEPTH && !u.is_empty() => Some(u.as_str()),
        _ => None,
    }
}

/// Contentinfo child heading holding one of the repost/comment/like counts.
pub fn stat_heading(line: &Line) -> Option<&str> {
    match &line.kind {
        LineKind::Heading { text, .. } if line.depth == NESTED_DEPTH => Some(text.as_str()),
        _ => None,
    }
}

pub fn absolute_url(url: &str) -> String {
    if url.starts_with('/') {
        format!("{MOBILE_ORIGIN}{url}")
    } else {
        url.to_string()
    }
}

/// "/status/5012345678901234" -> "5012345678901234".
pub fn status_id(url: &str) -> Option<&str> {
    url.strip_prefix(STATUS_PREFIX).map(str::trim)
}

/// Media implied by a resolved link target. Free text never produces these.
pub fn media_for_url(full: &str) -> Vec<Media> {
    let mut media = Vec::new();
    if full.starts_with(VIDEO_HOST) {
        media.push(Media::Video { url: full.to_string() });
    }
    if full.contains(LIVE_PATH) {
        media.push(Media::Live { url: full.to_string() });
    }
    media
}

pub fn is_live_or_video_caption(label: &str) -> bool {
    CAPTION_RE.is_match(label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lines::classify_line;

    #[test]
    fn time_heading_needs_level_four_at_nested_depth() {
        let l = classify_line("    - heading \"昨天 10:30 来自 iPhone\" [ref=e7] [level=4]");
        assert_eq!(time_heading(&l), Some("昨天 10:30 来自 iPhone"));

        let l = classify_line("    - heading \"TOP登陆少年-苏新皓\" [level=3]");
        assert_eq!(time_heading(&l), None);

        let l = classify_line("      - heading \"5-1 09:15\" [level=4]");
        assert_eq!(time_heading(&l), None);
    }

    #[test]
    fn source_from_time_heading() {
        assert_eq!(source_label("昨天 10:30 来自 iPhone 15 Pro").as_deref(), Some("iPhone 15 Pro"));
        assert_eq!(source_label("5-1 09:15 来自微博网页版").as_deref(), Some("微博网页版"));
        assert_eq!(source_label("5-1 09:15"), None);
    }

    #[test]
    fn play_caption_shapes() {
        assert_eq!(
            play_caption("3.2万次播放 01:05"),
            Some(Media::VideoMeta {
                play_count_raw: "3.2万".into(),
                play_count: Some(32000),
                duration: "01:05".into(),
            })
        );
        assert!(matches!(
            play_caption("1200次播放  1:02:33"),
            Some(Media::VideoMeta { ref duration, play_count: Some(1200), .. }) if duration == "1:02:33"
        ));
        assert_eq!(play_caption("3.2万次播放"), None);
        assert_eq!(play_caption("看了3.2万次播放 01:05"), None);
    }

    #[test]
    fn nested_article_shapes() {
        assert_eq!(article_text(&classify_line("    - text: hello")), Some("hello"));
        assert_eq!(article_text(&classify_line("      - text: aria noise")), None);
        assert_eq!(article_emoji(&classify_line("    - img \"[哈哈]\"")), Some("哈哈"));
        assert_eq!(article_emoji(&classify_line("    - img \"头像\"")), None);
        assert_eq!(article_link(&classify_line("    - link \"全文\":")), Some(Some("全文")));
        assert_eq!(article_link(&classify_line("    - link:")), Some(None));
        assert_eq!(article_link(&classify_line("      - link \"x\":")), None);
        assert_eq!(link_url(&classify_line("      - /url: /status/1")), Some("/status/1"));
        assert_eq!(link_url(&classify_line("        - /url: /status/1")), None);
        assert_eq!(link_url(&classify_line("      - /url:")), None);
    }

    #[test]
    fn stat_heading_any_level() {
        assert_eq!(stat_heading(&classify_line("    - heading \"20万\" [level=4]")), Some("20万"));
        assert_eq!(stat_heading(&classify_line("    - heading \"转发\"")), Some("转发"));
        assert_eq!(stat_heading(&classify_line("    - text: 10")), None);
    }

    #[test]
    fn urls() {
        assert_eq!(absolute_url("/status/9"), "https://m.weibo.cn/status/9");
        assert_eq!(absolute_url("https://example.com/a"), "https://example.com/a");
        assert_eq!(status_id("/status/ 9 "), Some("9"));
        assert_eq!(status_id("/detail/9"), None);
    }

    #[test]
    fn media_only_from_matching_urls() {
        assert_eq!(
            media_for_url("https://video.weibo.com/show?fid=1034:5"),
            vec![Media::Video { url: "https://video.weibo.com/show?fid=1034:5".into() }]
        );
        assert_eq!(
            media_for_url("https://weibo.com/l/wblive/p/show/1022:2321"),
            vec![Media::Live { url: "https://weibo.com/l/wblive/p/show/1022:2321".into() }]
        );
        assert!(media_for_url("https://m.weibo.cn/status/1").is_empty());
        assert!(media_for_url("https://example.com/video.weibo.com/").is_empty());
    }

    #[test]
    fn captions() {
        assert!(is_live_or_video_caption("苏新皓的微博直播"));
        assert!(is_live_or_video_caption("TOP登陆少年的微博视频"));
        assert!(!is_live_or_video_caption("网页链接"));
    }
}
