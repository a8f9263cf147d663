//! Muzigim: a children's musical-instrument catalog for the terminal.
//!
//! The catalog is browsed as a grid of cards, narrowed by a live search,
//! and each instrument's sound samples play through a single playback slot.

pub mod app;
pub mod assets;
pub mod catalog;
pub mod config;
pub mod error;
pub mod filter;
pub mod locale;
pub mod navigation;
pub mod playback;
pub mod ui;
