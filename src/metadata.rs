use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::MetadataError;
use crate::opml::{Episode, Podcast};

/// Serializable sidecar metadata for a downloaded episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeMetadata {
    pub podcast_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed_url: Option<Url>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<String>,
    pub enclosure_url: Url,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overcast_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overcast_url: Option<String>,
    pub audio_filename: String,
    pub downloaded_at: String,
}

impl EpisodeMetadata {
    /// Create metadata for an episode downloaded from the given podcast
    pub fn from_episode(podcast: &Podcast, episode: &Episode, audio_filename: &str) -> Self {
        Self {
            podcast_title: podcast.title.clone(),
            feed_url: podcast.feed_url.clone(),
            title: episode.title.clone(),
            pub_date: episode.pub_date.map(|dt| dt.to_rfc3339()),
            enclosure_url: episode.enclosure_url.clone(),
            overcast_id: episode.overcast_id.clone(),
            overcast_url: episode.overcast_url.clone(),
            audio_filename: audio_filename.to_string(),
            downloaded_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Write episode metadata to a JSON file next to the audio file
pub fn write_episode_metadata(
    podcast: &Podcast,
    episode: &Episode,
    audio_filename: &str,
    path: &Path,
) -> Result<(), MetadataError> {
    let metadata = EpisodeMetadata::from_episode(podcast, episode, audio_filename);
    let json = serde_json::to_string_pretty(&metadata)?;
    std::fs::write(path, json).map_err(|e| MetadataError::WriteFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Read episode metadata from a JSON file
pub fn read_episode_metadata(path: &Path) -> Result<EpisodeMetadata, MetadataError> {
    let content = std::fs::read_to_string(path).map_err(|e| MetadataError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_json::from_str(&content).map_err(|e| MetadataError::JsonParseFailed {
        path: path.to_path_buf(),
        source: e,
    })
}
