use std::path::{Path, PathBuf};

use crate::episode::{generate_filename, metadata_filename, sanitize_component};
use crate::opml::Episode;

/// Folder for a podcast inside the download directory
pub fn podcast_dir(download_dir: &Path, podcast_title: &str) -> PathBuf {
    download_dir.join(sanitize_component(podcast_title))
}

/// Destination path for an episode's audio file
pub fn episode_destination(
    download_dir: &Path,
    podcast_title: &str,
    episode: &Episode,
) -> PathBuf {
    podcast_dir(download_dir, podcast_title).join(generate_filename(episode))
}

/// Destination path for an episode's metadata sidecar
pub fn metadata_destination(
    download_dir: &Path,
    podcast_title: &str,
    episode: &Episode,
) -> PathBuf {
    podcast_dir(download_dir, podcast_title).join(metadata_filename(episode))
}

/// Whether an episode has already been downloaded to this path.
///
/// The existing file is the only record of a previous run; the
/// check-then-write sequence is not atomic, which is fine for a
/// single-user tool.
pub fn already_downloaded(destination: &Path) -> bool {
    destination.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use url::Url;

    fn make_episode(title: &str, url: &str) -> Episode {
        Episode {
            title: title.to_string(),
            pub_date: None,
            enclosure_url: Url::parse(url).unwrap(),
            played: false,
            overcast_id: None,
            overcast_url: None,
        }
    }

    #[test]
    fn episode_destination_is_inside_podcast_folder() {
        let episode = make_episode("Pilot", "https://example.com/pilot.mp3");
        let dest = episode_destination(Path::new("."), "Test Show", &episode);

        assert_eq!(dest, PathBuf::from("./Test Show/Pilot.mp3"));
    }

    #[test]
    fn podcast_folder_name_is_sanitized() {
        let dir = podcast_dir(Path::new("."), "Accidental Tech: The Podcast");
        assert_eq!(dir, PathBuf::from("./Accidental Tech- The Podcast"));
    }

    #[test]
    fn distinct_podcast_titles_get_distinct_folders() {
        let a = podcast_dir(Path::new("."), "Show One");
        let b = podcast_dir(Path::new("."), "Show Two");
        assert_ne!(a, b);
    }

    #[test]
    fn already_downloaded_detects_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("episode.mp3");

        assert!(!already_downloaded(&path));

        std::fs::write(&path, b"audio").unwrap();
        assert!(already_downloaded(&path));
    }

    #[test]
    fn a_directory_does_not_count_as_downloaded() {
        let dir = tempdir().unwrap();
        assert!(!already_downloaded(dir.path()));
    }
}
