//! The media primitive the playback controller drives.

use std::{fmt, time::Duration};

use crate::{assets::AssetLocator, error::MediaError};

/// Identifies one `load` issued to a backend.
///
/// The controller bumps the generation on every select and close; events
/// tagged with an older generation belong to a superseded session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MediaEventKind {
    /// The media is decoded far enough to know its length and is ready to play.
    MetadataReady { duration: Option<Duration> },
    /// Current playback position.
    TimeUpdate(Duration),
    /// Playback ran off the end of the media.
    Ended,
    LoadError(String),
    PlaybackError(String),
}

/// An asynchronous notification from a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaEvent {
    pub generation: Generation,
    pub kind: MediaEventKind,
}

impl MediaEvent {
    pub fn new(generation: Generation, kind: MediaEventKind) -> Self {
        Self { generation, kind }
    }
}

/// A single shared playback element.
///
/// Only `load` starts asynchronous work; its outcome arrives later through
/// `poll_events`, tagged with the generation passed to `load`.
pub trait MediaBackend {
    /// Drops whatever is loaded and starts loading `locator`.
    fn load(&mut self, generation: Generation, locator: &AssetLocator);
    fn play(&mut self) -> Result<(), MediaError>;
    fn pause(&mut self);
    fn seek(&mut self, position: Duration) -> Result<(), MediaError>;
    /// Stops playback and releases the loaded media.
    fn stop(&mut self);
    fn poll_events(&mut self) -> Vec<MediaEvent>;
}

impl<B: MediaBackend + ?Sized> MediaBackend for Box<B> {
    fn load(&mut self, generation: Generation, locator: &AssetLocator) {
        (**self).load(generation, locator)
    }

    fn play(&mut self) -> Result<(), MediaError> {
        (**self).play()
    }

    fn pause(&mut self) {
        (**self).pause()
    }

    fn seek(&mut self, position: Duration) -> Result<(), MediaError> {
        (**self).seek(position)
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn poll_events(&mut self) -> Vec<MediaEvent> {
        (**self).poll_events()
    }
}

/// Backend for hosts without an audio device: every load fails.
#[derive(Debug, Default)]
pub struct NullBackend {
    pending: Vec<MediaEvent>,
}

impl NullBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MediaBackend for NullBackend {
    fn load(&mut self, generation: Generation, _locator: &AssetLocator) {
        self.pending.push(MediaEvent::new(
            generation,
            MediaEventKind::LoadError("audio output unavailable".to_string()),
        ));
    }

    fn play(&mut self) -> Result<(), MediaError> {
        Err(MediaError::NotLoaded)
    }

    fn pause(&mut self) {}

    fn seek(&mut self, _position: Duration) -> Result<(), MediaError> {
        Err(MediaError::NotLoaded)
    }

    fn stop(&mut self) {
        self.pending.clear();
    }

    fn poll_events(&mut self) -> Vec<MediaEvent> {
        std::mem::take(&mut self.pending)
    }
}
