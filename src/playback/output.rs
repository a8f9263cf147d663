//! `rodio` implementation of the media primitive.

use std::{
    io::Cursor,
    path::Path,
    sync::{
        Arc,
        mpsc::{self, Receiver, Sender},
    },
    thread,
    time::Duration,
};

use {
    rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source},
    symphonia::core::{
        formats::FormatOptions, io::MediaSourceStream, meta::MetadataOptions, probe::Hint,
    },
    tracing::debug,
};

use super::backend::{Generation, MediaBackend, MediaEvent, MediaEventKind};
use crate::{
    assets::{AssetLocator, fetch_bytes},
    error::MediaError,
};

type AudioBytes = Arc<[u8]>;

struct LoadedMedia {
    bytes: AudioBytes,
    duration: Option<Duration>,
}

struct LoadOutcome {
    generation: Generation,
    result: Result<LoadedMedia, MediaError>,
}

fn extension(locator: &AssetLocator) -> Option<String> {
    let name = match locator {
        AssetLocator::File(path) => path.file_name()?.to_str()?.to_string(),
        AssetLocator::Url(url) => url.rsplit('/').next()?.to_string(),
    };
    Path::new(&name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

fn probe_duration(bytes: &AudioBytes, extension: Option<&str>) -> Option<Duration> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(Arc::clone(bytes))), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .ok()?;

    let reader = probed.format;
    let track = reader.default_track()?;
    let time_base = track.codec_params.time_base?;
    let n_frames = track.codec_params.n_frames?;
    let time = time_base.calc_time(n_frames);

    Some(Duration::from_secs_f64(time.seconds as f64 + time.frac))
}

fn decode(bytes: &AudioBytes) -> Result<Decoder<Cursor<AudioBytes>>, MediaError> {
    Decoder::new(Cursor::new(Arc::clone(bytes))).map_err(|e| MediaError::Decode(e.to_string()))
}

/// Fetches, decodes and measures one clip. Runs on a worker thread.
fn load_media(locator: &AssetLocator) -> Result<LoadedMedia, MediaError> {
    let bytes: AudioBytes = fetch_bytes(locator)?.into();
    let decoder = decode(&bytes)?;
    let duration =
        probe_duration(&bytes, extension(locator).as_deref()).or_else(|| decoder.total_duration());
    Ok(LoadedMedia { bytes, duration })
}

/// Decodes `bytes` starting at `start`. A decoder that cannot seek is an
/// error, so the reported position never runs ahead of what is audible.
fn positioned_source(
    bytes: &AudioBytes,
    start: Duration,
) -> Result<Decoder<Cursor<AudioBytes>>, MediaError> {
    let mut source = decode(bytes)?;
    if !start.is_zero() {
        source
            .try_seek(start)
            .map_err(|e| MediaError::Decode(format!("seek to {start:?} failed: {e}")))?;
    }
    Ok(source)
}

/// Builds a sink positioned at `start`. The decoder is rebuilt from the
/// in-memory bytes rather than seeking the old sink in place.
fn build_sink(
    stream: &OutputStream,
    bytes: &AudioBytes,
    start: Duration,
    paused: bool,
) -> Result<Sink, MediaError> {
    let source = positioned_source(bytes, start)?;
    let sink = Sink::connect_new(stream.mixer());
    if paused {
        sink.pause();
    }
    sink.append(source);
    Ok(sink)
}

/// Splits a finished load into media worth installing (it belongs to the
/// current load) or an event to forward as-is.
fn route_outcome(
    current: Option<Generation>,
    outcome: LoadOutcome,
) -> Result<LoadedMedia, MediaEventKind> {
    let LoadOutcome { generation, result } = outcome;
    match result {
        Ok(media) if current == Some(generation) => Ok(media),
        Ok(media) => {
            debug!("Dropping media loaded for superseded {generation}");
            Err(MediaEventKind::MetadataReady {
                duration: media.duration,
            })
        }
        Err(e) => Err(MediaEventKind::LoadError(e.to_string())),
    }
}

/// Event for one poll of a live sink. `Ended` is latched through `ended`.
fn sink_event(
    paused: bool,
    empty: bool,
    ended: &mut bool,
    position: Duration,
) -> Option<MediaEventKind> {
    if paused || *ended {
        return None;
    }
    if empty {
        *ended = true;
        Some(MediaEventKind::Ended)
    } else {
        Some(MediaEventKind::TimeUpdate(position))
    }
}

/// Plays clips through the default audio device.
pub struct RodioBackend {
    stream: OutputStream,
    sink: Option<Sink>,
    media: Option<LoadedMedia>,
    current: Option<Generation>,
    seek_base: Duration,
    ended: bool,
    tx: Sender<LoadOutcome>,
    rx: Receiver<LoadOutcome>,
}

impl RodioBackend {
    pub fn open() -> Result<Self, MediaError> {
        let stream = OutputStreamBuilder::from_default_device()
            .map_err(|e| MediaError::Output(e.to_string()))?
            .open_stream_or_fallback()
            .map_err(|e| MediaError::Output(e.to_string()))?;
        let (tx, rx) = mpsc::channel();
        Ok(Self {
            stream,
            sink: None,
            media: None,
            current: None,
            seek_base: Duration::ZERO,
            ended: false,
            tx,
            rx,
        })
    }

    fn position(&self) -> Duration {
        self.seek_base + self.sink.as_ref().map_or(Duration::ZERO, Sink::get_pos)
    }

    fn install(&mut self, media: LoadedMedia) -> Result<Option<Duration>, MediaError> {
        let sink = build_sink(&self.stream, &media.bytes, Duration::ZERO, true)?;
        let duration = media.duration;
        self.sink = Some(sink);
        self.media = Some(media);
        self.seek_base = Duration::ZERO;
        self.ended = false;
        Ok(duration)
    }
}

impl MediaBackend for RodioBackend {
    fn load(&mut self, generation: Generation, locator: &AssetLocator) {
        self.stop();
        self.current = Some(generation);

        let tx = self.tx.clone();
        let locator = locator.clone();
        thread::spawn(move || {
            let result = load_media(&locator);
            let _ = tx.send(LoadOutcome { generation, result });
        });
    }

    fn play(&mut self) -> Result<(), MediaError> {
        self.sink.as_ref().ok_or(MediaError::NotLoaded)?.play();
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn seek(&mut self, position: Duration) -> Result<(), MediaError> {
        let media = self.media.as_ref().ok_or(MediaError::NotLoaded)?;
        let paused = self.sink.as_ref().is_none_or(Sink::is_paused);
        let sink = build_sink(&self.stream, &media.bytes, position, paused)?;
        if let Some(old) = self.sink.replace(sink) {
            old.stop();
        }
        self.seek_base = position;
        self.ended = false;
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.media = None;
        self.current = None;
        self.seek_base = Duration::ZERO;
        self.ended = false;
    }

    fn poll_events(&mut self) -> Vec<MediaEvent> {
        let mut events = Vec::new();

        while let Ok(outcome) = self.rx.try_recv() {
            let generation = outcome.generation;
            let kind = match route_outcome(self.current, outcome) {
                Ok(media) => match self.install(media) {
                    Ok(duration) => MediaEventKind::MetadataReady { duration },
                    Err(e) => MediaEventKind::LoadError(e.to_string()),
                },
                Err(kind) => kind,
            };
            events.push(MediaEvent::new(generation, kind));
        }

        let position = self.position();
        if let (Some(generation), Some(sink)) = (self.current, self.sink.as_ref()) {
            if let Some(kind) = sink_event(sink.is_paused(), sink.empty(), &mut self.ended, position) {
                events.push(MediaEvent::new(generation, kind));
            }
        }

        events
    }
}
