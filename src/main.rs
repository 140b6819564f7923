use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use console::Emoji;

use opmlpull::{
    ArchiveOptions, NoopReporter, ProgressEvent, ProgressReporter, ReqwestClient,
    SharedProgressReporter, archive_export,
};

// Emoji with fallback for terminals without Unicode support
static MICROPHONE: Emoji<'_, '_> = Emoji("🎙️  ", "");
static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "[~] ");
static HEADPHONES: Emoji<'_, '_> = Emoji("🎧 ", "[i] ");
static DOWNLOAD: Emoji<'_, '_> = Emoji("📥 ", "[v] ");
static SKIP: Emoji<'_, '_> = Emoji("⏭  ", "[-] ");
static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "[+] ");
static FAILURE: Emoji<'_, '_> = Emoji("❌ ", "[!] ");
static PARTY: Emoji<'_, '_> = Emoji("🎉 ", "[*] ");
static FOLDER: Emoji<'_, '_> = Emoji("📁 ", "");
static CROSS: Emoji<'_, '_> = Emoji("✗ ", "x ");

/// Download podcast episodes from an Overcast OPML export
#[derive(Parser, Debug)]
#[command(name = "opmlpull")]
#[command(about = "Download podcast episodes from an Overcast OPML export")]
#[command(version)]
struct Args {
    /// Path to the OPML export downloaded from https://overcast.fm/account
    #[arg(default_value = "overcast.opml")]
    export: PathBuf,

    /// Directory to create the per-podcast folders in
    #[arg(short = 'd', long, default_value = ".")]
    download_dir: PathBuf,

    /// Also download episodes the export marks as played
    #[arg(long)]
    include_played: bool,

    /// Maximum number of episodes to download
    #[arg(short, long)]
    limit: Option<usize>,

    /// Quiet mode - suppress progress output
    #[arg(short, long)]
    quiet: bool,
}

/// Progress reporter printing one line per episode
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::ParsingExport { path } => {
                println!(
                    "{SEARCH}Parsing export: {}",
                    path.display().to_string().cyan()
                );
            }

            ProgressEvent::ExportParsed {
                podcast_count,
                episode_count,
            } => {
                println!(
                    "{HEADPHONES}{} podcasts, {} episodes in export\n",
                    podcast_count.to_string().cyan(),
                    episode_count.to_string().cyan()
                );
            }

            ProgressEvent::EpisodeSkipped {
                podcast_title,
                episode_title,
                reason,
            } => {
                println!(
                    "{SKIP}{} • {} ({})",
                    podcast_title.dimmed(),
                    episode_title.dimmed(),
                    reason.to_string().yellow()
                );
            }

            ProgressEvent::DownloadStarting { episode_title, .. } => {
                println!("{DOWNLOAD}{}", truncate_title(&episode_title, 60));
            }

            // Per-chunk updates are too noisy for line-based output
            ProgressEvent::DownloadProgress { .. } => {}

            ProgressEvent::DownloadCompleted { episode_title, .. } => {
                println!("{SUCCESS}{}", truncate_title(&episode_title, 60).green());
            }

            ProgressEvent::DownloadFailed {
                podcast_title,
                episode_title,
                error,
            } => {
                println!(
                    "{FAILURE}{} • {} - {}",
                    podcast_title.red(),
                    truncate_title(&episode_title, 40).red(),
                    error.red()
                );
            }

            ProgressEvent::FeedSnapshotSaved { podcast_title } => {
                println!(
                    "{DOWNLOAD}{}",
                    format!("RSS feed for {podcast_title}").dimmed()
                );
            }

            ProgressEvent::FeedSnapshotFailed {
                podcast_title,
                error,
            } => {
                println!(
                    "{FAILURE}{} - {}",
                    format!("RSS feed for {podcast_title}").red(),
                    error.red()
                );
            }

            ProgressEvent::ArchiveCompleted {
                downloaded_count,
                skipped_played_count,
                skipped_existing_count,
                failed_count,
            } => {
                println!(
                    "\n{PARTY}{} {} downloaded, {} played skipped, {} already on disk, {} failed",
                    "Archive complete:".bold().green(),
                    downloaded_count.to_string().green().bold(),
                    skipped_played_count.to_string().yellow(),
                    skipped_existing_count.to_string().yellow(),
                    if failed_count > 0 {
                        failed_count.to_string().red().bold()
                    } else {
                        failed_count.to_string().green()
                    }
                );
            }
        }
    }
}

fn truncate_title(title: &str, max_len: usize) -> String {
    if title.chars().count() <= max_len {
        title.to_string()
    } else {
        let truncated: String = title.chars().take(max_len.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    if !args.quiet {
        println!(
            "\n{}{} {}\n",
            MICROPHONE,
            "opmlpull".bold().magenta(),
            "- Overcast Export Archiver".dimmed()
        );
    }

    let client = ReqwestClient::new();

    let options = ArchiveOptions {
        include_played: args.include_played,
        limit: args.limit,
    };

    let reporter: SharedProgressReporter = if args.quiet {
        NoopReporter::shared()
    } else {
        Arc::new(ConsoleReporter)
    };

    let result = archive_export(
        &client,
        &args.export,
        &args.download_dir,
        &options,
        reporter,
    )
    .await
    .context("Failed to archive podcast export")?;

    if !args.quiet && !result.failed_episodes.is_empty() {
        println!("\n{}", "Failed episodes:".red().bold());
        for (title, error) in &result.failed_episodes {
            println!(
                "  {}{} - {}",
                CROSS,
                title.yellow(),
                error.to_string().dimmed()
            );
        }
    }

    if !args.quiet {
        println!(
            "\n{FOLDER}Output: {}\n",
            args.download_dir.display().to_string().cyan()
        );
    }

    // Per-episode failures are tolerated; only a bad export is fatal
    Ok(())
}
