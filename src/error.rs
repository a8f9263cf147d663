//! Error types for catalog ingestion, asset access, media playback and settings.

use std::io::Error as IoError;

use {serde_json::Error as JsonError, thiserror::Error};

/// Failures while resolving or fetching an asset.
#[derive(Error, Debug)]
pub enum AssetError {
    /// The reference cannot be turned into a location under the asset base.
    #[error("Unresolvable asset reference: {reference:?}")]
    Unresolvable { reference: String },
    /// Reading a local asset failed.
    #[error("IO error: {0}")]
    Io(#[from] IoError),
    /// Fetching a remote asset failed.
    #[error("HTTP error: {0}")]
    Http(String),
}

impl From<ureq::Error> for AssetError {
    fn from(err: ureq::Error) -> Self {
        AssetError::Http(err.to_string())
    }
}

/// Failures while loading the instrument catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The catalog document could not be fetched.
    #[error("Catalog fetch failed: {0}")]
    Fetch(#[from] AssetError),
    /// The catalog document is not valid catalog JSON.
    #[error("Catalog parse failed: {0}")]
    Parse(#[from] JsonError),
}

/// Failures reported by a media backend.
#[derive(Error, Debug)]
pub enum MediaError {
    /// No audio output device could be opened.
    #[error("Audio output error: {0}")]
    Output(String),
    /// The audio bytes could not be fetched.
    #[error("Audio fetch failed: {0}")]
    Fetch(#[from] AssetError),
    /// The audio bytes could not be decoded.
    #[error("Audio decode failed: {0}")]
    Decode(String),
    /// A transport command arrived before any media was installed.
    #[error("No media loaded")]
    NotLoaded,
    /// The host refused to start playback.
    #[error("Playback blocked: {0}")]
    Blocked(String),
}

/// Failures while reading or writing settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to read or write the settings file.
    #[error("IO error: {0}")]
    Io(#[from] IoError),
    /// Failed to serialize or deserialize settings.
    #[error("Serialization error: {0}")]
    Serialization(#[from] JsonError),
}

#[cfg(test)]
mod tests {
    use super::{AssetError, MediaError};

    #[test]
    fn asset_error_display_names_the_reference() {
        let err = AssetError::Unresolvable {
            reference: "../secret".to_string(),
        };
        assert_eq!(err.to_string(), "Unresolvable asset reference: \"../secret\"");
    }

    #[test]
    fn media_error_display() {
        assert_eq!(MediaError::NotLoaded.to_string(), "No media loaded");
        let wrapped = MediaError::from(AssetError::Http("status code 404".to_string()));
        assert_eq!(
            wrapped.to_string(),
            "Audio fetch failed: HTTP error: status code 404"
        );
    }
}
