use url::Url;

use crate::opml::Episode;

/// Maximum length for a sanitized path component
const MAX_COMPONENT_LENGTH: usize = 120;

/// Check if a character must not appear in a path component
fn is_illegal_path_char(c: char) -> bool {
    matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || c.is_control()
}

/// Sanitize a podcast or episode title for use as a path component.
///
/// Illegal characters are replaced with `-` so that distinct titles stay
/// distinct wherever possible; the title is otherwise kept verbatim.
pub fn sanitize_component(title: &str) -> String {
    let replaced: String = title
        .chars()
        .map(|c| if is_illegal_path_char(c) { '-' } else { c })
        .collect();

    // Trailing dots and surrounding whitespace are not portable
    let trimmed = replaced.trim().trim_end_matches('.').trim_end();

    let limited: String = trimmed.chars().take(MAX_COMPONENT_LENGTH).collect();

    if limited.is_empty() {
        "untitled".to_string()
    } else {
        limited
    }
}

/// Get the audio file extension from an enclosure URL
///
/// Extracted from the URL path, defaults to "mp3"
pub fn get_audio_extension(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|filename| filename.rsplit_once('.').map(|(_, ext)| ext))
        .filter(|ext| is_valid_audio_extension(ext))
        .map(|ext| ext.to_lowercase())
        .unwrap_or_else(|| "mp3".to_string())
}

/// Generate the audio filename for an episode (sanitized title + extension)
pub fn generate_filename(episode: &Episode) -> String {
    format!(
        "{}.{}",
        sanitize_component(&episode.title),
        get_audio_extension(&episode.enclosure_url)
    )
}

/// Generate the metadata sidecar filename for an episode
pub fn metadata_filename(episode: &Episode) -> String {
    format!("{}.json", sanitize_component(&episode.title))
}

/// Check if a string is a valid audio file extension
fn is_valid_audio_extension(ext: &str) -> bool {
    matches!(
        ext.to_lowercase().as_str(),
        "mp3" | "m4a" | "mp4" | "aac" | "ogg" | "opus" | "wav" | "flac"
    )
}
