use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when reading or parsing an OPML export
#[derive(Error, Debug)]
pub enum OpmlError {
    #[error("Failed to read export file {path}: {source}")]
    FileReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse OPML export: {0}")]
    XmlFailed(#[from] quick_xml::Error),

    #[error("Malformed outline attribute: {0}")]
    InvalidAttribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("Outline for '{outline}' is missing the '{attribute}' attribute")]
    MissingAttribute {
        outline: String,
        attribute: &'static str,
    },

    #[error("Episode '{title}' has an invalid enclosure URL '{url}': {source}")]
    InvalidEnclosureUrl {
        title: String,
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Errors that can occur during episode downloads
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("HTTP request failed for {url}: {source}")]
    HttpFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to create directory {path}: {source}")]
    DirectoryCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create file {path}: {source}")]
    FileCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write to file {path}: {source}")]
    FileWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to finalize download at {path}: {source}")]
    RenameFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Stream error while downloading {url}: {source}")]
    StreamFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Errors that can occur when reading or writing episode sidecar metadata
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Failed to read metadata file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write metadata file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse metadata JSON in {path}: {source}")]
    JsonParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize metadata: {0}")]
    JsonSerializeFailed(#[from] serde_json::Error),
}
