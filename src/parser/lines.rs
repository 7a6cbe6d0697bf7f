use std::sync::LazyLock;

use regex::Regex;

/// Depth of the banner/article/contentinfo siblings that make up one post.
pub const POST_ROOT_DEPTH: usize = 2;
/// Direct children of a post section.
pub const NESTED_DEPTH: usize = 4;
/// `/url:` property lines hanging under a nested link.
pub const URL_DEPTH: usize = 6;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^- heading "([^"]+)"(.*)$"#).unwrap());
static LEVEL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[level=(\d+)\]").unwrap());
static LINK_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^- link\s+"([^"]+)""#).unwrap());
static ALT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]+)\]").unwrap());

#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    Banner,
    Article,
    ContentInfo,
    PinMarker,
    Heading { text: String, level: Option<u8> },
    Text(String),
    /// Image with its bracketed alt text, when it carries one.
    Img(Option<String>),
    Link(Option<String>),
    Url(String),
    Paragraph(String),
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub depth: usize,
    pub kind: LineKind,
}

/// Width of the leading whitespace.
pub fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Structural kinds (section starts, the pin marker) are only recognised at
/// post-root depth; the same text deeper down is ordinary content.
pub fn classify_line(raw: &str) -> Line {
    let depth = indent_of(raw);
    let t = raw.trim();
    let kind = if depth == POST_ROOT_DEPTH {
        classify_structural(t).unwrap_or_else(|| classify_content(t))
    } else {
        classify_content(t)
    };
    Line { depth, kind }
}

pub fn classify_lines(text: &str) -> Vec<Line> {
    text.lines().map(classify_line).collect()
}

fn classify_structural(t: &str) -> Option<LineKind> {
    match t {
        "- banner:" => Some(LineKind::Banner),
        "- article:" => Some(LineKind::Article),
        "- contentinfo:" => Some(LineKind::ContentInfo),
        _ if t.starts_with("- heading \"置顶\"") => Some(LineKind::PinMarker),
        _ => None,
    }
}

fn classify_content(t: &str) -> LineKind {
    if let Some(caps) = HEADING_RE.captures(t) {
        let level = LEVEL_RE
            .captures(&caps[2])
            .and_then(|c| c[1].parse::<u8>().ok());
        return LineKind::Heading {
            text: caps[1].to_string(),
            level,
        };
    }

    if let Some(rest) = t.strip_prefix("- text:") {
        return LineKind::Text(rest.trim().to_string());
    }

    if t.starts_with("- img") {
        let alt = ALT_RE.captures(t).map(|c| c[1].to_string());
        return LineKind::Img(alt);
    }

    if t.starts_with("- link ") || t == "- link" || t == "- link:" {
        let label = LINK_LABEL_RE.captures(t).map(|c| c[1].to_string());
        return LineKind::Link(label);
    }

    if let Some(rest) = t.strip_prefix("- /url:") {
        return LineKind::Url(rest.trim().to_string());
    }

    if let Some(rest) = t.strip_prefix("- paragraph:") {
        return LineKind::Paragraph(rest.trim().to_string());
    }

    LineKind::Other
}

// ── Tests ──
