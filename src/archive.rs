// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::Path;

use chrono::Utc;

use crate::episode::{download_episode, generate_filename};
use crate::error::{DownloadError, OpmlError};
use crate::http::HttpClient;
use crate::metadata::write_episode_metadata;
use crate::opml::{Podcast, parse_export_file};
use crate::progress::{ProgressEvent, SharedProgressReporter, SkipReason};
use crate::state::{already_downloaded, episode_destination, metadata_destination, podcast_dir};

/// Options for an archive run
#[derive(Debug, Clone, Default)]
pub struct ArchiveOptions {
    /// Also download episodes the export marks as played
    pub include_played: bool,
    /// Maximum number of download attempts per run (None = all)
    pub limit: Option<usize>,
}

/// Result of an archive run
#[derive(Debug, Clone, Default)]
pub struct ArchiveResult {
    /// Number of episodes successfully downloaded
    pub downloaded: usize,
    /// Number of episodes skipped because the export marks them played
    pub skipped_played: usize,
    /// Number of episodes skipped because the file already exists
    pub skipped_existing: usize,
    /// Number of episodes that failed to download
    pub failed: usize,
    /// Details of failed episodes (title, error message)
    pub failed_episodes: Vec<(String, String)>,
}

impl ArchiveResult {
    fn attempted(&self) -> usize {
        self.downloaded + self.failed
    }
}

/// Archive a podcast OPML export into a local directory.
///
/// This is the main entry point for the library. It:
/// 1. Parses the export (fatal on failure)
/// 2. Walks podcasts and episodes in export order
/// 3. Skips episodes marked played and episodes already on disk
/// 4. Downloads the rest sequentially, one folder per podcast,
///    writing a JSON sidecar next to each audio file
///
/// Individual download failures are reported and counted but never
/// abort the run.
pub async fn archive_export<C: HttpClient>(
    client: &C,
    opml_path: &Path,
    download_dir: &Path,
    options: &ArchiveOptions,
    reporter: SharedProgressReporter,
) -> Result<ArchiveResult, OpmlError> {
    reporter.report(ProgressEvent::ParsingExport {
        path: opml_path.to_path_buf(),
    });

    let podcasts = parse_export_file(opml_path)?;

    reporter.report(ProgressEvent::ExportParsed {
        podcast_count: podcasts.len(),
        episode_count: podcasts.iter().map(|p| p.episodes.len()).sum(),
    });

    let mut result = ArchiveResult::default();

    'podcasts: for podcast in &podcasts {
        let mut feed_snapshot_attempted = false;

        for episode in &podcast.episodes {
            if options
                .limit
                .is_some_and(|limit| result.attempted() >= limit)
            {
                break 'podcasts;
            }

            if episode.played && !options.include_played {
                result.skipped_played += 1;
                reporter.report(ProgressEvent::EpisodeSkipped {
                    podcast_title: podcast.title.clone(),
                    episode_title: episode.title.clone(),
                    reason: SkipReason::AlreadyPlayed,
                });
                continue;
            }

            let destination = episode_destination(download_dir, &podcast.title, episode);
            if already_downloaded(&destination) {
                result.skipped_existing += 1;
                reporter.report(ProgressEvent::EpisodeSkipped {
                    podcast_title: podcast.title.clone(),
                    episode_title: episode.title.clone(),
                    reason: SkipReason::AlreadyDownloaded,
                });
                continue;
            }

            match download_episode(client, episode, &destination, &reporter).await {
                Ok(_bytes) => {
                    let metadata_path =
                        metadata_destination(download_dir, &podcast.title, episode);
                    let filename = generate_filename(episode);

                    if let Err(e) =
                        write_episode_metadata(podcast, episode, &filename, &metadata_path)
                    {
                        reporter.report(ProgressEvent::DownloadFailed {
                            podcast_title: podcast.title.clone(),
                            episode_title: episode.title.clone(),
                            error: format!("Failed to write metadata: {e}"),
                        });
                        result.failed += 1;
                        result
                            .failed_episodes
                            .push((episode.title.clone(), e.to_string()));
                    } else {
                        result.downloaded += 1;

                        if !feed_snapshot_attempted {
                            feed_snapshot_attempted = true;
                            match save_feed_snapshot(client, podcast, download_dir).await {
                                Ok(true) => {
                                    reporter.report(ProgressEvent::FeedSnapshotSaved {
                                        podcast_title: podcast.title.clone(),
                                    });
                                }
                                Ok(false) => {}
                                Err(e) => {
                                    reporter.report(ProgressEvent::FeedSnapshotFailed {
                                        podcast_title: podcast.title.clone(),
                                        error: e.to_string(),
                                    });
                                }
                            }
                        }
                    }
                }
                Err(e) => {
                    reporter.report(ProgressEvent::DownloadFailed {
                        podcast_title: podcast.title.clone(),
                        episode_title: episode.title.clone(),
                        error: e.to_string(),
                    });
                    result.failed += 1;
                    result
                        .failed_episodes
                        .push((episode.title.clone(), e.to_string()));
                }
            }
        }
    }

    reporter.report(ProgressEvent::ArchiveCompleted {
        downloaded_count: result.downloaded,
        skipped_played_count: result.skipped_played,
        skipped_existing_count: result.skipped_existing,
        failed_count: result.failed,
    });

    Ok(result)
}

/// Save a dated snapshot of the podcast's RSS feed into its folder.
///
/// Attempted on the first successful download of a podcast, at most once
/// per run. Returns true if a snapshot was written; false if the podcast
/// has no feed URL or today's snapshot already exists. Failures are
/// recoverable, like any other per-episode error.
async fn save_feed_snapshot<C: HttpClient>(
    client: &C,
    podcast: &Podcast,
    download_dir: &Path,
) -> Result<bool, DownloadError> {
    let Some(feed_url) = podcast.feed_url.as_ref() else {
        return Ok(false);
    };

    let date = Utc::now().format("%Y-%m-%d");
    let path = podcast_dir(download_dir, &podcast.title).join(format!("feed.{date}.xml"));
    if path.is_file() {
        return Ok(false);
    }

    let bytes = client
        .get_bytes(feed_url.as_str())
        .await
        .map_err(|e| DownloadError::HttpFailed {
            url: feed_url.to_string(),
            source: e,
        })?;

    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| DownloadError::FileWriteFailed {
            path: path.clone(),
            source: e,
        })?;

    Ok(true)
}
