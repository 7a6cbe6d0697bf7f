mod dedupe;
mod document;
mod error;
mod normalize;
mod parser;
mod report;
mod settings;
mod snapshot;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use chrono::{DateTime, Local, Utc};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use document::Document;
use settings::{EnvSettings, RunSettings};

#[derive(Parser)]
#[command(name = "idol_feed", about = "Turn weibo accessibility-tree snapshots into a posts document")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a snapshot capture into the posts document (+ flat text for audit)
    Parse {
        /// Capture document with the snapshot at data.snapshot
        #[arg(default_value = "weibo_snapshot.json")]
        snapshot_json: PathBuf,
        /// Where to write the reconstructed flat text
        #[arg(default_value = "weibo_snapshot.txt")]
        snapshot_txt: PathBuf,
        /// Where to write the posts document
        #[arg(default_value = "idol_weibo_posts.json")]
        out_json: PathBuf,
        /// Account uid (default: $WEIBO_UID, then inferred from --source-url)
        #[arg(long)]
        uid: Option<String>,
        /// Profile url recorded in the document (default: $WEIBO_SOURCE_URL)
        #[arg(long)]
        source_url: Option<String>,
    },
    /// Drop repeated posts within one document
    Dedupe {
        #[arg(long, default_value = "idol_weibo_posts.json")]
        in_json: PathBuf,
        #[arg(long, default_value = "idol_weibo_posts.json")]
        out_json: PathBuf,
    },
    /// Render a markdown digest of a document
    Report {
        #[arg(long, default_value = "idol_weibo_posts.json")]
        in_json: PathBuf,
        #[arg(long, default_value = "report.md")]
        out_md: PathBuf,
    },
    /// Show post counts for a document
    Stats {
        #[arg(long, default_value = "idol_weibo_posts.json")]
        in_json: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse {
            snapshot_json,
            snapshot_txt,
            out_json,
            uid,
            source_url,
        } => {
            let settings = RunSettings::resolve(uid, source_url, EnvSettings::load()?);
            let doc = collect(&snapshot_json, &snapshot_txt, &out_json, &settings, Utc::now())?;
            println!("ok posts={} -> {}", doc.posts.len(), out_json.display());
            Ok(())
        }
        Commands::Dedupe { in_json, out_json } => {
            let (kept, removed) = dedupe_file(&in_json, &out_json)?;
            println!(
                "Kept {} posts ({} duplicates removed) -> {}",
                kept,
                removed,
                out_json.display()
            );
            Ok(())
        }
        Commands::Report { in_json, out_md } => {
            let doc = document::read_document(&in_json)?;
            let md = report::render_report(&doc);
            document::write_atomic(&out_md, md.as_bytes())?;
            println!("Wrote report for {} posts -> {}", doc.posts.len(), out_md.display());
            Ok(())
        }
        Commands::Stats { in_json } => {
            let doc = document::read_document(&in_json)?;
            let s = report::Summary::of(&doc);
            println!("Idol:      {}", doc.idol.name.as_deref().unwrap_or(&doc.idol.uid));
            println!("Fetched:   {}", doc.fetched_at);
            println!("Posts:     {}", s.posts);
            println!("Pinned:    {}", s.pinned);
            println!("Video:     {}", s.videos);
            println!("Live:      {}", s.lives);
            println!("No stats:  {}", s.missing_stats);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}

/// Snapshot → flat text (audit copy) → parsed posts → document on disk.
///
/// A fatal snapshot error leaves both outputs untouched.
fn collect(
    snapshot_json: &Path,
    snapshot_txt: &Path,
    out_json: &Path,
    settings: &RunSettings,
    fetched_at: DateTime<Utc>,
) -> anyhow::Result<Document> {
    let text = snapshot::load_snapshot_text(snapshot_json)
        .with_context(|| format!("cannot use snapshot {}", snapshot_json.display()))?;
    document::write_atomic(snapshot_txt, text.as_bytes())?;
    info!(chars = text.chars().count(), path = %snapshot_txt.display(), "reconstructed snapshot text");

    // Relative dates are read in the capture machine's local time, as shown on the page.
    let reference = fetched_at.with_timezone(&Local);
    let parsed = parser::parse_snapshot_text(&text, &reference, &settings.anchor_name);
    if parsed.posts.is_empty() {
        warn!("no posts found in snapshot");
    }

    let doc = Document::assemble(
        settings.source_url.clone(),
        fetched_at,
        settings.note.clone(),
        parsed.profile.into_profile(settings.uid.clone()),
        parsed.posts,
    );
    document::write_document(out_json, &doc)?;
    info!(posts = doc.posts.len(), path = %out_json.display(), "wrote posts document");
    Ok(doc)
}

/// Rewrites only the posts array; returns (kept, removed).
fn dedupe_file(in_json: &Path, out_json: &Path) -> anyhow::Result<(usize, usize)> {
    let mut doc = document::read_json(in_json)?;
    let removed = dedupe::dedupe_posts(&mut doc)
        .with_context(|| format!("cannot dedupe {}", in_json.display()))?;
    let kept = doc["posts"].as_array().map_or(0, Vec::len);
    document::write_document(out_json, &doc)?;
    Ok((kept, removed))
}
