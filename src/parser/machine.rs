use chrono::{DateTime, TimeZone};
use tracing::debug;

use super::lines::{Line, LineKind, POST_ROOT_DEPTH};
use super::post::PostBuilder;
use crate::document::Post;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    None,
    Banner,
    Article,
    ContentInfo,
}

/// What a single line did to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Line consumed; move to the next one.
    Advance,
    /// Contentinfo just closed; feed the same line again.
    Reprocess,
}

/// Splits the snapshot's post-root siblings into posts.
///
/// A post is `banner` → `article` → `contentinfo` at post-root depth; a
/// `heading "置顶"` sibling just before the banner marks it pinned.
pub struct PostMachine<'a, Tz: TimeZone> {
    section: Section,
    pending_pinned: bool,
    current: Option<PostBuilder>,
    posts: Vec<Post>,
    author: Option<String>,
    reference: &'a DateTime<Tz>,
}

impl<'a, Tz: TimeZone> PostMachine<'a, Tz> {
    pub fn new(author: Option<String>, reference: &'a DateTime<Tz>) -> Self {
        PostMachine {
            section: Section::None,
            pending_pinned: false,
            current: None,
            posts: Vec::new(),
            author,
            reference,
        }
    }

    pub fn run(mut self, lines: &[Line]) -> Vec<Post> {
        let mut i = 0;
        while i < lines.len() {
            match self.step(&lines[i]) {
                Step::Advance => i += 1,
                Step::Reprocess => debug!(line = i, "contentinfo closed, re-reading line"),
            }
        }
        self.finish()
    }

    fn step(&mut self, line: &Line) -> Step {
        if line.kind == LineKind::PinMarker {
            self.pending_pinned = true;
            return Step::Advance;
        }

        if self.section == Section::ContentInfo
            && line.depth == POST_ROOT_DEPTH
            && line.kind != LineKind::ContentInfo
        {
            if let Some(post) = self.current.as_mut() {
                post.flush_stats();
            }
            self.section = Section::None;
            return Step::Reprocess;
        }

        match (&line.kind, self.section) {
            (LineKind::Banner, _) => {
                self.close_post();
                self.current = Some(PostBuilder::new(
                    std::mem::take(&mut self.pending_pinned),
                    self.author.clone(),
                ));
                self.section = Section::Banner;
                debug!(posts = self.posts.len(), "post opened");
            }
            (LineKind::Article, Section::Banner) => {
                self.enter(Section::Article);
            }
            (LineKind::ContentInfo, Section::Banner | Section::Article | Section::ContentInfo) => {
                self.enter(Section::ContentInfo);
                if let Some(post) = self.current.as_mut() {
                    post.start_stats();
                }
            }
            _ => self.dispatch(line),
        }
        Step::Advance
    }

    fn enter(&mut self, section: Section) {
        self.section = section;
        if let Some(post) = self.current.as_mut() {
            post.enter_section();
        }
    }

    fn dispatch(&mut self, line: &Line) {
        let Some(post) = self.current.as_mut() else {
            return;
        };
        match self.section {
            Section::None => {}
            Section::Banner => post.banner_line(line, self.reference),
            Section::Article => post.article_line(line),
            Section::ContentInfo => post.contentinfo_line(line),
        }
    }

    /// Close the open post, if any, and append it.
    fn close_post(&mut self) {
        let Some(mut post) = self.current.take() else {
            return;
        };
        if self.section == Section::ContentInfo {
            post.flush_stats();
        }
        post.flush_text();
        self.posts.push(post.finish());
        self.section = Section::None;
    }

    fn finish(mut self) -> Vec<Post> {
        self.close_post();
        self.posts
    }
}
