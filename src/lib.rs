pub mod archive;
pub mod episode;
pub mod error;
pub mod http;
pub mod metadata;
pub mod opml;
pub mod progress;
pub mod state;

// Re-export main types for convenience
pub use archive::{ArchiveOptions, ArchiveResult, archive_export};
pub use episode::{generate_filename, get_audio_extension, metadata_filename, sanitize_component};
pub use error::{DownloadError, MetadataError, OpmlError};
pub use http::{HttpClient, HttpResponse, ReqwestClient};
pub use metadata::{EpisodeMetadata, read_episode_metadata, write_episode_metadata};
pub use opml::{Episode, Podcast, parse_export, parse_export_file};
pub use progress::{
    NoopReporter, ProgressEvent, ProgressReporter, SharedProgressReporter, SkipReason,
};
pub use state::{already_downloaded, episode_destination, podcast_dir};
