//! Single-slot playback state machine over a [`MediaBackend`].

use std::time::Duration;

use tracing::{debug, info, warn};

use super::backend::{Generation, MediaBackend, MediaEvent, MediaEventKind};
use crate::{assets::AssetResolver, catalog::SongRecord};

/// Discrete state of the playback slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Playing,
    Paused,
    /// Reported when media runs out; the slot itself returns to `Idle`.
    Ended,
    Errored,
}

/// An observable transition of the playback slot.
///
/// `from` is the slot's previous phase, which may belong to a different
/// song when a selection replaced the active one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseChange {
    pub song_id: String,
    pub from: Phase,
    pub to: Phase,
}

/// State of the one live playable item.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    item: SongRecord,
    phase: Phase,
    position: f64,
    duration: Option<f64>,
    error: Option<String>,
}

impl PlaybackSession {
    fn new(item: SongRecord, phase: Phase) -> Self {
        Self {
            item,
            phase,
            position: 0.0,
            duration: None,
            error: None,
        }
    }

    pub fn item(&self) -> &SongRecord {
        &self.item
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn position_seconds(&self) -> f64 {
        self.position
    }

    pub fn duration_seconds(&self) -> Option<f64> {
        self.duration
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Owns the shared media backend and serializes every playback intent
/// into at most one active session.
#[derive(Debug)]
pub struct PlaybackController<B> {
    backend: B,
    resolver: AssetResolver,
    autoplay: bool,
    generation: Generation,
    session: Option<PlaybackSession>,
}

impl<B: MediaBackend> PlaybackController<B> {
    pub fn new(backend: B, resolver: AssetResolver, autoplay: bool) -> Self {
        Self {
            backend,
            resolver,
            autoplay,
            generation: Generation::default(),
            session: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.session.as_ref().map_or(Phase::Idle, |s| s.phase)
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    pub fn active_item(&self) -> Option<&SongRecord> {
        self.session.as_ref().map(|s| &s.item)
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn position_seconds(&self) -> f64 {
        self.session.as_ref().map_or(0.0, |s| s.position)
    }

    pub fn duration_seconds(&self) -> Option<f64> {
        self.session.as_ref().and_then(|s| s.duration)
    }

    /// Fraction of the media played, 0 when the length is unknown or zero.
    pub fn progress_ratio(&self) -> f64 {
        match self.duration_seconds() {
            Some(d) if d > 0.0 => (self.position_seconds() / d).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }

    /// Moves the slot to `to`, reporting the change if there was one.
    fn transition(&mut self, to: Phase) -> Option<PhaseChange> {
        let session = self.session.as_mut()?;
        let from = session.phase;
        if from == to {
            return None;
        }
        session.phase = to;
        debug!("{} {:?} -> {:?}", session.item.id, from, to);
        Some(PhaseChange {
            song_id: session.item.id.clone(),
            from,
            to,
        })
    }

    fn fail(&mut self, reason: String) -> Option<PhaseChange> {
        let session = self.session.as_mut()?;
        warn!("Playback of {} failed: {reason}", session.item.id);
        session.error = Some(reason);
        self.backend.stop();
        self.transition(Phase::Errored)
    }

    /// Replaces whatever is active with `item` and starts loading it.
    ///
    /// Ignored while the slot is `Errored`; the user has to close it first.
    pub fn select(&mut self, item: &SongRecord) -> Option<PhaseChange> {
        let from = self.phase();
        if from == Phase::Errored {
            debug!("Ignoring selection of {} while errored", item.id);
            return None;
        }
        if self.session.is_some() {
            self.backend.stop();
        }
        self.generation = self.generation.next();

        match self.resolver.resolve(&item.audio_ref) {
            Ok(locator) => {
                info!("Loading {} from {locator} ({})", item.id, self.generation);
                self.session = Some(PlaybackSession::new(item.clone(), Phase::Loading));
                self.backend.load(self.generation, &locator);
                Some(PhaseChange {
                    song_id: item.id.clone(),
                    from,
                    to: Phase::Loading,
                })
            }
            Err(e) => {
                warn!("Cannot play {}: {e}", item.id);
                let mut session = PlaybackSession::new(item.clone(), Phase::Errored);
                session.error = Some(e.to_string());
                self.session = Some(session);
                Some(PhaseChange {
                    song_id: item.id.clone(),
                    from,
                    to: Phase::Errored,
                })
            }
        }
    }

    pub fn pause(&mut self) -> Option<PhaseChange> {
        if self.phase() != Phase::Playing {
            return None;
        }
        self.backend.pause();
        self.transition(Phase::Paused)
    }

    pub fn resume(&mut self) -> Option<PhaseChange> {
        if self.phase() != Phase::Paused {
            return None;
        }
        match self.backend.play() {
            Ok(()) => self.transition(Phase::Playing),
            Err(e) => self.fail(e.to_string()),
        }
    }

    pub fn toggle_play_pause(&mut self) -> Option<PhaseChange> {
        match self.phase() {
            Phase::Playing => self.pause(),
            Phase::Paused => self.resume(),
            _ => None,
        }
    }

    /// Moves to `target_seconds`, clamped to the media length.
    ///
    /// No-op until the length is known.
    pub fn seek(&mut self, target_seconds: f64) -> Option<PhaseChange> {
        if !matches!(self.phase(), Phase::Playing | Phase::Paused) {
            return None;
        }
        let duration = self.duration_seconds()?;
        let target = if target_seconds.is_nan() {
            0.0
        } else {
            target_seconds.clamp(0.0, duration)
        };
        if let Err(e) = self.backend.seek(Duration::from_secs_f64(target)) {
            return self.fail(e.to_string());
        }
        if let Some(session) = self.session.as_mut() {
            session.position = target;
        }
        None
    }

    pub fn seek_by(&mut self, delta_seconds: f64) -> Option<PhaseChange> {
        self.seek(self.position_seconds() + delta_seconds)
    }

    /// Rewinds to the start, resuming if paused.
    pub fn restart(&mut self) -> Option<PhaseChange> {
        let phase = self.phase();
        if !matches!(phase, Phase::Playing | Phase::Paused) {
            return None;
        }
        if let Err(e) = self.backend.seek(Duration::ZERO) {
            return self.fail(e.to_string());
        }
        if let Some(session) = self.session.as_mut() {
            session.position = 0.0;
        }
        if phase == Phase::Paused {
            self.resume()
        } else {
            None
        }
    }

    /// Stops and releases the media. Safe to call in any phase.
    pub fn close(&mut self) -> Option<PhaseChange> {
        self.generation = self.generation.next();
        self.backend.stop();
        let session = self.session.take()?;
        info!("Closed {}", session.item.id);
        Some(PhaseChange {
            song_id: session.item.id,
            from: session.phase,
            to: Phase::Idle,
        })
    }

    /// Applies one backend event, discarding it if it belongs to a superseded load.
    pub fn handle_event(&mut self, event: MediaEvent) -> Option<PhaseChange> {
        if event.generation != self.generation {
            debug!(
                "Discarding stale {:?} from {} (current {})",
                event.kind, event.generation, self.generation
            );
            return None;
        }

        let phase = self.phase();
        match (phase, event.kind) {
            (Phase::Loading, MediaEventKind::MetadataReady { duration }) => {
                if let Some(session) = self.session.as_mut() {
                    session.duration = duration.map(|d| d.as_secs_f64());
                    session.position = 0.0;
                }
                if !self.autoplay {
                    return self.transition(Phase::Paused);
                }
                match self.backend.play() {
                    Ok(()) => self.transition(Phase::Playing),
                    Err(e) => {
                        warn!("Auto-play failed: {e}");
                        self.transition(Phase::Paused)
                    }
                }
            }
            (Phase::Loading, MediaEventKind::LoadError(reason)) => self.fail(reason),
            (
                Phase::Loading | Phase::Playing | Phase::Paused,
                MediaEventKind::PlaybackError(reason),
            ) => self.fail(reason),
            (Phase::Playing | Phase::Paused, MediaEventKind::TimeUpdate(position)) => {
                if let Some(session) = self.session.as_mut() {
                    let secs = position.as_secs_f64();
                    session.position = session.duration.map_or(secs, |d| secs.min(d));
                }
                None
            }
            (Phase::Playing, MediaEventKind::Ended) => {
                let session = self.session.take()?;
                self.backend.stop();
                info!("Finished {}", session.item.id);
                Some(PhaseChange {
                    song_id: session.item.id,
                    from: Phase::Playing,
                    to: Phase::Ended,
                })
            }
            (phase, kind) => {
                debug!("Ignoring {kind:?} while {phase:?}");
                None
            }
        }
    }

    /// Drains pending backend events and applies them in arrival order.
    pub fn pump(&mut self) -> Vec<PhaseChange> {
        let events = self.backend.poll_events();
        events
            .into_iter()
            .filter_map(|event| self.handle_event(event))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::VecDeque, time::Duration};

    use super::{Phase, PhaseChange, PlaybackController};
    use crate::{
        assets::{AssetLocator, AssetResolver},
        catalog::{SongRecord, SongRole},
        error::MediaError,
        playback::backend::{Generation, MediaBackend, MediaEvent, MediaEventKind},
    };

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Load(Generation, AssetLocator),
        Play,
        Pause,
        Seek(Duration),
        Stop,
    }

    #[derive(Debug, Default)]
    struct ScriptedBackend {
        calls: Vec<Call>,
        pending: VecDeque<MediaEvent>,
        reject_play: bool,
        reject_seek: bool,
    }

    impl MediaBackend for ScriptedBackend {
        fn load(&mut self, generation: Generation, locator: &AssetLocator) {
            self.calls.push(Call::Load(generation, locator.clone()));
        }

        fn play(&mut self) -> Result<(), MediaError> {
            self.calls.push(Call::Play);
            if self.reject_play {
                Err(MediaError::Blocked("user gesture required".to_string()))
            } else {
                Ok(())
            }
        }

        fn pause(&mut self) {
            self.calls.push(Call::Pause);
        }

        fn seek(&mut self, position: Duration) -> Result<(), MediaError> {
            self.calls.push(Call::Seek(position));
            if self.reject_seek {
                Err(MediaError::Decode("corrupt frame".to_string()))
            } else {
                Ok(())
            }
        }

        fn stop(&mut self) {
            self.calls.push(Call::Stop);
        }

        fn poll_events(&mut self) -> Vec<MediaEvent> {
            self.pending.drain(..).collect()
        }
    }

    fn song(id: &str, role: SongRole) -> SongRecord {
        SongRecord {
            id: id.to_string(),
            name: id.to_uppercase(),
            performer: None,
            audio_ref: format!("sounds/{id}.mp3"),
            role,
        }
    }

    fn controller() -> PlaybackController<ScriptedBackend> {
        PlaybackController::new(ScriptedBackend::default(), AssetResolver::new("assets"), true)
    }

    fn ready(generation: Generation, secs: u64) -> MediaEvent {
        MediaEvent::new(
            generation,
            MediaEventKind::MetadataReady {
                duration: Some(Duration::from_secs(secs)),
            },
        )
    }

    /// Selects `item` and delivers its metadata so it is playing.
    fn start(c: &mut PlaybackController<ScriptedBackend>, item: &SongRecord, secs: u64) {
        c.select(item);
        let generation = c.generation();
        c.handle_event(ready(generation, secs));
        assert_eq!(c.phase(), Phase::Playing);
    }

    #[test]
    fn select_then_metadata_starts_playing_from_zero() {
        let mut c = controller();
        let s1 = song("s1", SongRole::Music);

        let change = c.select(&s1).unwrap();
        assert_eq!(change.to, Phase::Loading);
        assert_eq!(c.phase(), Phase::Loading);

        let change = c.handle_event(ready(c.generation(), 30)).unwrap();
        assert_eq!(
            change,
            PhaseChange {
                song_id: "s1".to_string(),
                from: Phase::Loading,
                to: Phase::Playing,
            }
        );
        assert_eq!(c.position_seconds(), 0.0);
        assert_eq!(c.duration_seconds(), Some(30.0));
    }

    #[test]
    fn seek_clamps_to_duration() {
        let mut c = controller();
        start(&mut c, &song("s1", SongRole::Music), 30);

        c.seek(1000.0);
        assert_eq!(c.position_seconds(), 30.0);
        assert_eq!(c.phase(), Phase::Playing);

        c.seek(-4.0);
        assert_eq!(c.position_seconds(), 0.0);
        assert_eq!(
            c.backend().calls.last(),
            Some(&Call::Seek(Duration::ZERO))
        );
    }

    #[test]
    fn seek_while_paused_keeps_phase() {
        let mut c = controller();
        start(&mut c, &song("s1", SongRole::Music), 30);
        c.pause();

        c.seek(12.5);
        assert_eq!(c.phase(), Phase::Paused);
        assert_eq!(c.position_seconds(), 12.5);
    }

    #[test]
    fn seek_is_noop_while_loading_or_length_unknown() {
        let mut c = controller();
        c.select(&song("s1", SongRole::Music));
        c.seek(5.0);
        assert!(!c.backend().calls.iter().any(|call| matches!(call, Call::Seek(_))));

        let generation = c.generation();
        c.handle_event(MediaEvent::new(
            generation,
            MediaEventKind::MetadataReady { duration: None },
        ));
        assert_eq!(c.phase(), Phase::Playing);
        c.seek(5.0);
        assert_eq!(c.position_seconds(), 0.0);
        assert_eq!(c.progress_ratio(), 0.0);
    }

    #[test]
    fn late_metadata_for_superseded_selection_is_discarded() {
        let mut c = controller();
        c.select(&song("s1", SongRole::Music));
        let stale = c.generation();
        c.select(&song("s2", SongRole::Music));

        assert_eq!(c.handle_event(ready(stale, 10)), None);
        assert_eq!(c.phase(), Phase::Loading);
        assert_eq!(c.active_item().map(|s| s.id.as_str()), Some("s2"));

        c.handle_event(ready(c.generation(), 20));
        assert_eq!(c.phase(), Phase::Playing);
        assert_eq!(c.active_item().map(|s| s.id.as_str()), Some("s2"));
        assert_eq!(c.duration_seconds(), Some(20.0));
    }

    #[test]
    fn selecting_stops_the_active_item_before_loading_the_next() {
        let mut c = controller();
        start(&mut c, &song("music", SongRole::Music), 30);
        let calls_before = c.backend().calls.len();

        let change = c.select(&song("narration", SongRole::Narration)).unwrap();
        assert_eq!(change.from, Phase::Playing);
        assert_eq!(change.to, Phase::Loading);

        let new_calls = &c.backend().calls[calls_before..];
        assert_eq!(new_calls[0], Call::Stop);
        assert!(matches!(new_calls[1], Call::Load(g, _) if g == c.generation()));
        assert_eq!(c.phase(), Phase::Loading);
    }

    #[test]
    fn toggle_is_noop_while_loading() {
        let mut c = controller();
        c.select(&song("s1", SongRole::Music));
        assert_eq!(c.toggle_play_pause(), None);
        assert_eq!(c.phase(), Phase::Loading);
    }

    #[test]
    fn toggle_switches_between_playing_and_paused() {
        let mut c = controller();
        start(&mut c, &song("s1", SongRole::Music), 30);
        assert_eq!(c.toggle_play_pause().map(|ch| ch.to), Some(Phase::Paused));
        assert_eq!(c.toggle_play_pause().map(|ch| ch.to), Some(Phase::Playing));
    }

    #[test]
    fn restart_from_paused_rewinds_and_plays() {
        let mut c = controller();
        start(&mut c, &song("s1", SongRole::Music), 30);
        c.handle_event(MediaEvent::new(
            c.generation(),
            MediaEventKind::TimeUpdate(Duration::from_secs(17)),
        ));
        c.pause();
        let calls_before = c.backend().calls.len();

        assert_eq!(c.restart().map(|ch| ch.to), Some(Phase::Playing));
        assert_eq!(c.position_seconds(), 0.0);
        assert_eq!(
            &c.backend().calls[calls_before..],
            &[Call::Seek(Duration::ZERO), Call::Play]
        );
    }

    #[test]
    fn restart_while_playing_only_rewinds() {
        let mut c = controller();
        start(&mut c, &song("s1", SongRole::Music), 30);
        c.seek(20.0);
        assert_eq!(c.restart(), None);
        assert_eq!(c.position_seconds(), 0.0);
        assert_eq!(c.phase(), Phase::Playing);
    }

    #[test]
    fn time_updates_drive_progress() {
        let mut c = controller();
        start(&mut c, &song("s1", SongRole::Music), 40);
        c.handle_event(MediaEvent::new(
            c.generation(),
            MediaEventKind::TimeUpdate(Duration::from_secs(10)),
        ));
        assert_eq!(c.position_seconds(), 10.0);
        assert!((c.progress_ratio() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn ended_reports_and_returns_to_idle() {
        let mut c = controller();
        start(&mut c, &song("s1", SongRole::Music), 5);
        let generation = c.generation();
        let change = c
            .handle_event(MediaEvent::new(generation, MediaEventKind::Ended))
            .unwrap();
        assert_eq!(change.to, Phase::Ended);
        assert_eq!(c.phase(), Phase::Idle);
        assert!(c.active_item().is_none());
        assert_eq!(c.backend().calls.last(), Some(&Call::Stop));
    }

    #[test]
    fn load_error_is_terminal_until_close() {
        let mut c = controller();
        c.select(&song("s1", SongRole::Music));
        let generation = c.generation();
        let change = c
            .handle_event(MediaEvent::new(
                generation,
                MediaEventKind::LoadError("unsupported format".to_string()),
            ))
            .unwrap();
        assert_eq!(change.to, Phase::Errored);
        assert_eq!(c.session().and_then(|s| s.error()), Some("unsupported format"));

        assert_eq!(c.select(&song("s2", SongRole::Music)), None);
        assert_eq!(c.toggle_play_pause(), None);
        assert_eq!(c.restart(), None);
        assert_eq!(c.phase(), Phase::Errored);

        assert_eq!(c.close().map(|ch| ch.to), Some(Phase::Idle));
        assert_eq!(c.select(&song("s2", SongRole::Music)).map(|ch| ch.to), Some(Phase::Loading));
    }

    #[test]
    fn unresolvable_reference_errors_without_loading() {
        let mut c = controller();
        let mut bad = song("s1", SongRole::Music);
        bad.audio_ref = "../../outside.mp3".to_string();

        assert_eq!(c.select(&bad).map(|ch| ch.to), Some(Phase::Errored));
        assert!(!c.backend().calls.iter().any(|call| matches!(call, Call::Load(..))));
    }

    #[test]
    fn rejected_autoplay_leaves_session_paused() {
        let mut c = controller();
        c.backend.reject_play = true;
        c.select(&song("s1", SongRole::Music));
        let change = c.handle_event(ready(c.generation(), 30)).unwrap();
        assert_eq!(change.to, Phase::Paused);
        assert_eq!(c.duration_seconds(), Some(30.0));

        c.backend.reject_play = false;
        assert_eq!(c.resume().map(|ch| ch.to), Some(Phase::Playing));
    }

    #[test]
    fn autoplay_disabled_lands_paused_without_play() {
        let mut c =
            PlaybackController::new(ScriptedBackend::default(), AssetResolver::new("assets"), false);
        c.select(&song("s1", SongRole::Music));
        c.handle_event(ready(c.generation(), 30));
        assert_eq!(c.phase(), Phase::Paused);
        assert!(!c.backend().calls.contains(&Call::Play));
    }

    #[test]
    fn failed_resume_moves_to_errored() {
        let mut c = controller();
        start(&mut c, &song("s1", SongRole::Music), 30);
        c.pause();
        c.backend.reject_play = true;
        assert_eq!(c.resume().map(|ch| ch.to), Some(Phase::Errored));
    }

    #[test]
    fn failed_seek_moves_to_errored() {
        let mut c = controller();
        start(&mut c, &song("s1", SongRole::Music), 30);
        c.backend.reject_seek = true;
        assert_eq!(c.seek(3.0).map(|ch| ch.to), Some(Phase::Errored));
    }

    #[test]
    fn close_is_idempotent_from_every_phase() {
        let setups: [fn(&mut PlaybackController<ScriptedBackend>); 5] = [
            |_| {},
            |c| {
                c.select(&song("a", SongRole::Music));
            },
            |c| start(c, &song("a", SongRole::Music), 9),
            |c| {
                start(c, &song("a", SongRole::Music), 9);
                c.pause();
            },
            |c| {
                c.select(&song("a", SongRole::Music));
                let generation = c.generation();
                c.handle_event(MediaEvent::new(
                    generation,
                    MediaEventKind::PlaybackError("device lost".to_string()),
                ));
            },
        ];
        for setup in setups {
            let mut c = controller();
            setup(&mut c);
            c.close();
            assert_eq!(c.phase(), Phase::Idle);
            assert_eq!(c.close(), None);
            assert_eq!(c.phase(), Phase::Idle);
        }
    }

    #[test]
    fn close_suppresses_in_flight_load() {
        let mut c = controller();
        c.select(&song("s1", SongRole::Music));
        let stale = c.generation();
        c.close();
        assert_eq!(c.handle_event(ready(stale, 10)), None);
        assert_eq!(c.phase(), Phase::Idle);
    }

    #[test]
    fn pump_applies_events_in_order() {
        let mut c = controller();
        c.select(&song("s1", SongRole::Music));
        let generation = c.generation();
        c.backend.pending.extend([
            ready(generation, 8),
            MediaEvent::new(generation, MediaEventKind::TimeUpdate(Duration::from_secs(8))),
            MediaEvent::new(generation, MediaEventKind::Ended),
        ]);

        let changes: Vec<Phase> = c.pump().into_iter().map(|ch| ch.to).collect();
        assert_eq!(changes, vec![Phase::Playing, Phase::Ended]);
        assert_eq!(c.phase(), Phase::Idle);
    }
}
