mod parse;

pub use parse::{Episode, Podcast, parse_export};

use std::path::Path;

use crate::error::OpmlError;

/// Parse an OPML export from a local file
pub fn parse_export_file(path: &Path) -> Result<Vec<Podcast>, OpmlError> {
    let xml = std::fs::read_to_string(path).map_err(|e| OpmlError::FileReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_export(&xml)
}
