use std::path::{Path, PathBuf};

use futures::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::error::DownloadError;
use crate::http::HttpClient;
use crate::opml::Episode;
use crate::progress::{ProgressEvent, SharedProgressReporter};

/// Download an episode's audio file to the specified output path.
///
/// The body is streamed to `<output_path>.partial` and renamed into place on
/// success, so an interrupted download never looks like a finished one.
/// Parent directories are created as needed. Returns the number of bytes
/// downloaded.
pub async fn download_episode<C: HttpClient>(
    client: &C,
    episode: &Episode,
    output_path: &Path,
    reporter: &SharedProgressReporter,
) -> Result<u64, DownloadError> {
    let url = episode.enclosure_url.as_str();

    let response = client
        .get_stream(url)
        .await
        .map_err(|e| DownloadError::HttpFailed {
            url: url.to_string(),
            source: e,
        })?;

    if response.status >= 400 {
        return Err(DownloadError::HttpStatus {
            url: url.to_string(),
            status: response.status,
        });
    }

    if let Some(parent) = output_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| DownloadError::DirectoryCreateFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
    }

    reporter.report(ProgressEvent::DownloadStarting {
        episode_title: episode.title.clone(),
        content_length: response.content_length,
    });

    let partial = partial_path(output_path);

    let result = stream_to_file(
        response.body,
        response.content_length,
        url,
        &partial,
        &episode.title,
        reporter,
    )
    .await;

    let bytes_downloaded = match result {
        Ok(bytes) => bytes,
        Err(e) => {
            // Best effort: do not leave a truncated file behind
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }
    };

    tokio::fs::rename(&partial, output_path)
        .await
        .map_err(|e| DownloadError::RenameFailed {
            path: output_path.to_path_buf(),
            source: e,
        })?;

    reporter.report(ProgressEvent::DownloadCompleted {
        episode_title: episode.title.clone(),
        bytes_downloaded,
    });

    Ok(bytes_downloaded)
}

/// Path of the in-flight download next to its final destination
fn partial_path(output_path: &Path) -> PathBuf {
    let mut partial = output_path.as_os_str().to_owned();
    partial.push(".partial");
    PathBuf::from(partial)
}

async fn stream_to_file(
    mut body: crate::http::ByteStream,
    content_length: Option<u64>,
    url: &str,
    path: &Path,
    episode_title: &str,
    reporter: &SharedProgressReporter,
) -> Result<u64, DownloadError> {
    let mut file = File::create(path)
        .await
        .map_err(|e| DownloadError::FileCreateFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    let mut bytes_downloaded: u64 = 0;

    while let Some(chunk_result) = body.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::StreamFailed {
            url: url.to_string(),
            source: e,
        })?;

        file.write_all(&chunk)
            .await
            .map_err(|e| DownloadError::FileWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;

        bytes_downloaded += chunk.len() as u64;

        reporter.report(ProgressEvent::DownloadProgress {
            episode_title: episode_title.to_string(),
            bytes_downloaded,
            total_bytes: content_length,
        });
    }

    file.flush()
        .await
        .map_err(|e| DownloadError::FileWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(bytes_downloaded)
}
