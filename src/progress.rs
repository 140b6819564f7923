use std::path::PathBuf;
use std::sync::Arc;

/// Why an episode was skipped without a download attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The export marks the episode as played
    AlreadyPlayed,
    /// The destination file already exists on disk
    AlreadyDownloaded,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::AlreadyPlayed => write!(f, "already played"),
            SkipReason::AlreadyDownloaded => write!(f, "already downloaded"),
        }
    }
}

/// Events emitted while archiving an export for progress reporting
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// The OPML export is being parsed
    ParsingExport { path: PathBuf },

    /// The export has been parsed successfully
    ExportParsed {
        podcast_count: usize,
        episode_count: usize,
    },

    /// An episode was skipped without a download attempt
    EpisodeSkipped {
        podcast_title: String,
        episode_title: String,
        reason: SkipReason,
    },

    /// A download is starting
    DownloadStarting {
        episode_title: String,
        /// Expected content length in bytes, if known
        content_length: Option<u64>,
    },

    /// Download progress update
    DownloadProgress {
        episode_title: String,
        bytes_downloaded: u64,
        total_bytes: Option<u64>,
    },

    /// A download completed successfully
    DownloadCompleted {
        episode_title: String,
        bytes_downloaded: u64,
    },

    /// A download failed; the run continues with the next episode
    DownloadFailed {
        podcast_title: String,
        episode_title: String,
        error: String,
    },

    /// A dated feed snapshot was written into the podcast folder
    FeedSnapshotSaved { podcast_title: String },

    /// Fetching or writing a feed snapshot failed; the run continues
    FeedSnapshotFailed {
        podcast_title: String,
        error: String,
    },

    /// The whole run completed
    ArchiveCompleted {
        downloaded_count: usize,
        skipped_played_count: usize,
        skipped_existing_count: usize,
        failed_count: usize,
    },
}

/// Trait for reporting progress events during a run.
///
/// Implementations can use this to print log lines, display progress,
/// or collect statistics.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress event
    fn report(&self, event: ProgressEvent);
}

/// A shared reference to a progress reporter
pub type SharedProgressReporter = Arc<dyn ProgressReporter>;

/// A no-op progress reporter that silently ignores all events.
/// Useful for tests or quiet mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _event: ProgressEvent) {
        // Intentionally empty
    }
}

impl NoopReporter {
    /// Create a new NoopReporter wrapped in an Arc
    pub fn shared() -> SharedProgressReporter {
        Arc::new(Self)
    }
}
