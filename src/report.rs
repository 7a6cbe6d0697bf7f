use std::fmt::Write;

use itertools::Itertools;

use crate::document::{Document, Post};

const MISSING: &str = "—";

fn excerpt(s: &str, n: usize) -> String {
    let s = s.trim().replace('\n', " ");
    if s.chars().count() <= n {
        s
    } else {
        let cut: String = s.chars().take(n - 1).collect();
        format!("{cut}…")
    }
}

/// Counts shown in the report header and by `stats`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub posts: usize,
    pub pinned: usize,
    pub videos: usize,
    pub lives: usize,
    pub missing_stats: usize,
}

impl Summary {
    pub fn of(doc: &Document) -> Self {
        Summary {
            posts: doc.posts.len(),
            pinned: doc.posts.iter().filter(|p| p.is_pinned).count(),
            videos: doc.posts.iter().filter(|p| p.has_video()).count(),
            lives: doc.posts.iter().filter(|p| p.has_live()).count(),
            missing_stats: doc
                .posts
                .iter()
                .filter(|p| p.stats.likes.is_none() && p.stats.comments.is_none() && p.stats.reposts.is_none())
                .count(),
        }
    }
}

fn post_heading(i: usize, p: &Post) -> String {
    let mut parts = vec![p.created_at_raw.clone().unwrap_or_else(|| MISSING.into())];
    if let Some(src) = &p.source_raw {
        parts.push(src.clone());
    }
    let raw = |v: &Option<String>| v.clone().unwrap_or_else(|| MISSING.into());
    parts.push(format!("赞 {}", raw(&p.stats.likes_raw)));
    parts.push(format!("评 {}", raw(&p.stats.comments_raw)));
    parts.push(format!("转 {}", raw(&p.stats.reposts_raw)));
    if p.is_pinned {
        parts.push("[置顶]".into());
    }
    if p.has_video() {
        parts.push("[视频]".into());
    }
    if p.has_live() {
        parts.push("[直播]".into());
    }
    format!("### {}. {}", i, parts.iter().join(" · "))
}

/// Markdown daily digest of one document.
pub fn render_report(doc: &Document) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_report(&mut out, doc);
    format!("{}\n", out.trim())
}

fn write_report(out: &mut String, doc: &Document) -> std::fmt::Result {
    let summary = Summary::of(doc);
    let name = doc
        .idol
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .or(Some(doc.idol.uid.as_str()).filter(|u| !u.is_empty()))
        .unwrap_or("Weibo");

    writeln!(out, "# {name} · 动态日报")?;
    writeln!(out)?;
    writeln!(out, "- 抓取时间：{}", doc.fetched_at.format("%Y-%m-%d %H:%M:%S%:z"))?;
    writeln!(
        out,
        "- 动态条数：{}（置顶 {} / 视频 {} / 直播 {}）",
        summary.posts, summary.pinned, summary.videos, summary.lives
    )?;
    let source = if doc.source_url.is_empty() { MISSING } else { doc.source_url.as_str() };
    writeln!(out, "- 来源：{source}")?;
    if let Some(note) = doc.note.as_deref().filter(|n| !n.is_empty()) {
        writeln!(out, "- 备注：{note}")?;
    }
    writeln!(out)?;
    writeln!(out, "## 列表")?;
    writeln!(out)?;

    for (i, p) in doc.posts.iter().enumerate() {
        writeln!(out, "{}", post_heading(i + 1, p))?;
        writeln!(out)?;
        writeln!(out, "{}", excerpt(&p.text, 140))?;
        let url = p
            .status_url
            .as_deref()
            .or_else(|| p.links.first().map(|l| l.url.as_str()));
        if let Some(url) = url {
            writeln!(out)?;
            writeln!(out, "- 链接：{url}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}
