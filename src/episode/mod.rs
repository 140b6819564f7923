mod download;
mod filename;

pub use download::download_episode;
pub use filename::{generate_filename, get_audio_extension, metadata_filename, sanitize_component};
