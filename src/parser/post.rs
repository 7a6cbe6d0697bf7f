use chrono::{DateTime, TimeZone};
use itertools::Itertools;

use super::lines::Line;
use super::shapes;
use crate::document::{Link, Post, Stats};
use crate::normalize::{guess_created_at_local, parse_count};

/// A link whose `/url:` line may not have arrived yet.
#[derive(Debug, Clone, Default)]
struct PendingLink {
    text: Option<String>,
    url: Option<String>,
}

/// Accumulates one post while it is open. Consumed by [`PostBuilder::finish`].
#[derive(Debug, Default)]
pub struct PostBuilder {
    post: Post,
    text_parts: Vec<String>,
    links: Vec<PendingLink>,
    /// Index into `links` of the link still waiting for its url.
    last_link: Option<usize>,
    stat_headings: Vec<String>,
}

impl PostBuilder {
    pub fn new(is_pinned: bool, author: Option<String>) -> Self {
        PostBuilder {
            post: Post {
                is_pinned,
                author,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn banner_line<Tz: TimeZone>(&mut self, line: &Line, reference: &DateTime<Tz>) {
        if self.post.created_at_raw.is_some() {
            return;
        }
        let Some(raw) = shapes::time_heading(line) else {
            return;
        };
        self.post.created_at_local_guess = guess_created_at_local(raw, reference);
        self.post.source_raw = shapes::source_label(raw);
        self.post.created_at_raw = Some(raw.to_string());
    }

    /// Entering (or re-entering) a section forgets any link awaiting a url.
    pub fn enter_section(&mut self) {
        self.last_link = None;
    }

    pub fn article_line(&mut self, line: &Line) {
        if let Some(text) = shapes::article_text(line) {
            if let Some(media) = shapes::play_caption(text) {
                self.post.media.push(media);
            }
            self.text_parts.push(text.to_string());
            return;
        }

        if let Some(alt) = shapes::article_emoji(line) {
            self.post.emojis.push(alt.to_string());
            return;
        }

        if let Some(label) = shapes::article_link(line) {
            self.links.push(PendingLink {
                text: label.map(str::to_string),
                url: None,
            });
            self.last_link = Some(self.links.len() - 1);
            return;
        }

        if let Some(url) = shapes::link_url(line) {
            self.attach_url(url);
        }
    }

    fn attach_url(&mut self, url: &str) {
        let Some(link) = self.last_link.and_then(|i| self.links.get_mut(i)) else {
            return;
        };
        link.url = Some(url.to_string());

        if let Some(id) = shapes::status_id(url) {
            self.post.status_id = Some(id.to_string());
            self.post.status_url = Some(shapes::absolute_url(url));
        }
        let full = shapes::absolute_url(url);
        self.post.media.extend(shapes::media_for_url(&full));
    }

    pub fn start_stats(&mut self) {
        self.stat_headings.clear();
        self.last_link = None;
    }

    pub fn contentinfo_line(&mut self, line: &Line) {
        if self.stat_headings.len() >= 3 {
            return;
        }
        if let Some(h) = shapes::stat_heading(line) {
            self.stat_headings.push(h.to_string());
        }
    }

    /// Positional: [reposts, comments, likes]. The capture format carries no labels.
    pub fn flush_stats(&mut self) {
        let mut headings = std::mem::take(&mut self.stat_headings).into_iter();
        let reposts_raw = headings.next();
        let comments_raw = headings.next();
        let likes_raw = headings.next();
        self.post.stats = Stats {
            reposts: parse_count(reposts_raw.as_deref()),
            comments: parse_count(comments_raw.as_deref()),
            likes: parse_count(likes_raw.as_deref()),
            reposts_raw,
            comments_raw,
            likes_raw,
        };
    }

    pub fn flush_text(&mut self) {
        let joined: String = self.text_parts.drain(..).collect();
        self.post.text = joined.trim().to_string();
    }

    /// Finalize: dedupe emojis, clean up links, fall back to a caption for empty bodies.
    pub fn finish(self) -> Post {
        let mut post = self.post;

        post.emojis = post.emojis.into_iter().unique().collect();

        post.links = self
            .links
            .into_iter()
            .filter_map(|l| {
                let url = l.url.filter(|u| !u.is_empty() && u != shapes::NOOP_HREF)?;
                Some(Link {
                    text: l.text,
                    url: shapes::absolute_url(&url),
                })
            })
            .collect();

        if let Some(status_url) = post.status_url.as_deref() {
            post.links
                .retain(|l| !(l.text.as_deref() == Some(shapes::READ_MORE) && l.url == status_url));
        }

        if post.text.is_empty() {
            if let Some(caption) = post
                .links
                .iter()
                .filter_map(|l| l.text.as_deref())
                .find(|t| shapes::is_live_or_video_caption(t))
            {
                post.text = caption.to_string();
            }
        }

        post
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Media;
    use crate::parser::lines::classify_line;
    use chrono::Utc;

    fn feed_article(b: &mut PostBuilder, lines: &[&str]) {
        b.enter_section();
        for l in lines {
            b.article_line(&classify_line(l));
        }
    }

    #[test]
    fn banner_keeps_first_time_heading() {
        let reference: DateTime<Utc> = "2024-05-10T08:00:00Z".parse().unwrap();
        let mut b = PostBuilder::new(false, None);
        b.banner_line(&classify_line("    - heading \"昨天 10:30 来自 iPhone\" [level=4]"), &reference);
        b.banner_line(&classify_line("    - heading \"5-1 09:15\" [level=4]"), &reference);
        let p = b.finish();
        assert_eq!(p.created_at_raw.as_deref(), Some("昨天 10:30 来自 iPhone"));
        assert_eq!(p.created_at_local_guess.as_deref(), Some("2024-05-09 10:30"));
        assert_eq!(p.source_raw.as_deref(), Some("iPhone"));
    }

    #[test]
    fn noop_and_missing_urls_dropped() {
        let mut b = PostBuilder::new(false, None);
        feed_article(
            &mut b,
            &[
                "    - link \"展开\":",
                "      - /url: javascript:;",
                "    - link \"没有地址\":",
                "    - link \"网页链接\":",
                "      - /url: /p/100",
            ],
        );
        let p = b.finish();
        assert_eq!(
            p.links,
            vec![Link {
                text: Some("网页链接".into()),
                url: "https://m.weibo.cn/p/100".into()
            }]
        );
    }

    #[test]
    fn read_more_to_own_status_removed_but_elsewhere_kept() {
        let mut b = PostBuilder::new(false, None);
        feed_article(
            &mut b,
            &[
                "    - text: body",
                "    - link \"全文\":",
                "      - /url: /status/42",
                "    - link \"全文\":",
                "      - /url: /status/43",
            ],
        );
        let p = b.finish();
        assert_eq!(p.status_id.as_deref(), Some("43"));
        assert_eq!(p.status_url.as_deref(), Some("https://m.weibo.cn/status/43"));
        assert_eq!(
            p.links,
            vec![Link {
                text: Some("全文".into()),
                url: "https://m.weibo.cn/status/42".into()
            }]
        );
    }

    #[test]
    fn url_attaches_only_to_pending_link_at_url_depth() {
        let mut b = PostBuilder::new(false, None);
        feed_article(
            &mut b,
            &[
                "      - /url: /status/1",
                "    - link \"a\":",
                "        - /url: /status/2",
                "        - text: deep aria noise",
            ],
        );
        b.flush_text();
        let p = b.finish();
        assert_eq!(p.status_id, None);
        assert!(p.links.is_empty());
        assert_eq!(p.text, "");
    }

    #[test]
    fn text_emojis_and_video_meta() {
        let mut b = PostBuilder::new(true, Some("idol".into()));
        feed_article(
            &mut b,
            &[
                "    - text: 你好",
                "    - img \"[心]\"",
                "    - text: 世界",
                "    - img \"[心]\"",
                "    - img \"[哈哈]\"",
                "    - text: 3.2万次播放 01:05",
                "    - link \"TOP登陆少年的微博视频\":",
                "      - /url: https://video.weibo.com/show?fid=1034:5",
            ],
        );
        b.flush_text();
        let p = b.finish();
        assert!(p.is_pinned);
        assert_eq!(p.author.as_deref(), Some("idol"));
        assert_eq!(p.text, "你好世界3.2万次播放 01:05");
        assert_eq!(p.emojis, vec!["心".to_string(), "哈哈".to_string()]);
        assert!(p.media.iter().any(|m| matches!(m, Media::VideoMeta { .. })));
        assert!(p.has_video());
        assert!(!p.has_live());
    }

    #[test]
    fn empty_body_falls_back_to_caption() {
        let mut b = PostBuilder::new(false, None);
        feed_article(
            &mut b,
            &[
                "    - link \"网页链接\":",
                "      - /url: https://example.com",
                "    - link \"苏新皓的微博直播\":",
                "      - /url: https://weibo.com/l/wblive/p/show/1022:1",
            ],
        );
        b.flush_text();
        let p = b.finish();
        assert_eq!(p.text, "苏新皓的微博直播");
        assert!(p.has_live());
    }

    #[test]
    fn stats_positional_up_to_three() {
        let mut b = PostBuilder::new(false, None);
        b.start_stats();
        for l in [
            "    - heading \"10\"",
            "      - heading \"nested\"",
            "    - heading \"20万\"",
            "    - heading \"3\"",
            "    - heading \"999\"",
        ] {
            b.contentinfo_line(&classify_line(l));
        }
        b.flush_stats();
        let s = b.finish().stats;
        assert_eq!(s.reposts, Some(10));
        assert_eq!(s.comments, Some(200000));
        assert_eq!(s.likes, Some(3));
        assert_eq!(s.likes_raw.as_deref(), Some("3"));
    }

    #[test]
    fn label_stats_parse_to_null() {
        let mut b = PostBuilder::new(false, None);
        b.start_stats();
        b.contentinfo_line(&classify_line("    - heading \"转发\""));
        b.flush_stats();
        let s = b.finish().stats;
        assert_eq!(s.reposts_raw.as_deref(), Some("转发"));
        assert_eq!(s.reposts, None);
        assert_eq!(s.comments_raw, None);
    }

    #[test]
    fn media_urls_in_free_text_are_not_media() {
        let mut b = PostBuilder::new(false, None);
        feed_article(
            &mut b,
            &[
                "    - text: https://video.weibo.com/show?fid=1",
                "    - text: 看直播 https://weibo.com/l/wblive/p/show/1022:2321",
                "      - /url: https://video.weibo.com/show?fid=2",
                "    - /url: /l/wblive/p/show/1022:3",
            ],
        );
        b.flush_text();
        let p = b.finish();
        assert!(p.media.is_empty());
        assert!(p.links.is_empty());
        assert!(p.text.contains("video.weibo.com"));
    }
}
