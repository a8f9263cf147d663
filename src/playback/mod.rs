//! Audio playback: the media primitive and the single-slot controller over it.

pub mod backend;
pub mod controller;
pub mod output;

pub use {
    backend::{Generation, MediaBackend, MediaEvent, MediaEventKind, NullBackend},
    controller::{Phase, PhaseChange, PlaybackController, PlaybackSession},
    output::RodioBackend,
};
