//! Session control surface.
//!
//! The controller owns at most one `Session` and wires it to the outside
//! world: the audio service, the display and the track exporter. Every
//! start bumps the session generation; ticks carrying an older generation
//! are ignored, so a tick issued before a stop can never reach the next
//! session.

use crate::logic::audio::AudioService;
use crate::logic::export::TrackExporter;
use crate::logic::session::Session;
use crate::models::engine::Playfield;
use crate::models::lane::Lane;
use crate::models::settings::{Settings, SongEntry};
use crate::models::track::{Track, TrackError};
use crate::shared::snapshot::{DisplaySink, SessionMode};
use std::path::PathBuf;
use std::time::Duration;

/// Where a playback track comes from.
#[derive(Debug, Clone)]
pub enum TrackSource {
    File(PathBuf),
    #[cfg(test)]
    Text(String),
    #[cfg(test)]
    Loaded(Track),
}

impl TrackSource {
    fn load(self) -> Result<Track, TrackError> {
        match self {
            TrackSource::File(path) => Track::load(&path),
            #[cfg(test)]
            TrackSource::Text(text) => Track::parse(&text),
            #[cfg(test)]
            TrackSource::Loaded(track) => Ok(track),
        }
    }
}

pub struct SessionController {
    playfield: Playfield,
    songs: Vec<SongEntry>,
    generation: u64,
    session: Option<Session>,
    audio: Box<dyn AudioService>,
    display: Box<dyn DisplaySink>,
    exporter: Box<dyn TrackExporter>,
}

impl SessionController {
    pub fn new(
        settings: &Settings,
        audio: Box<dyn AudioService>,
        display: Box<dyn DisplaySink>,
        exporter: Box<dyn TrackExporter>,
    ) -> Self {
        Self {
            playfield: settings.playfield,
            songs: settings.songs.clone(),
            generation: 0,
            session: None,
            audio,
            display,
            exporter,
        }
    }

    /// Generation of the current (or last) session.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[cfg(test)]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn mode(&self) -> Option<SessionMode> {
        self.session.as_ref().map(Session::mode)
    }

    pub fn start_recording(&mut self) {
        if let Some(mode) = self.mode() {
            log::debug!("LOGIC: Start recording ignored, {:?} already active", mode);
            return;
        }

        self.generation += 1;
        log::info!("LOGIC: Recording #{} started", self.generation);
        self.session = Some(Session::record(self.generation, self.playfield));

        if let Some(song) = self.songs.first() {
            self.audio.load(&song.audio);
            self.audio.start();
        }
        self.refresh();
    }

    /// Stops recording and exports the captured track.
    pub fn stop_recording(&mut self) {
        if self.mode() != Some(SessionMode::Record) {
            return;
        }
        let Some(mut session) = self.session.take() else {
            return;
        };

        let track = session.finish_recording().unwrap_or_default();
        if track.is_empty() {
            log::warn!("LOGIC: Recording #{} captured no key presses", session.generation());
        }
        log::info!(
            "LOGIC: Recording #{} stopped with {} events",
            session.generation(),
            track.len()
        );
        if let Err(e) = self.exporter.export(&track) {
            log::error!("TRACK: Export failed: {}", e);
        }

        self.audio.stop();
        if let Some(board) = session.take_refresh() {
            self.display.refresh(&board);
        }
    }

    /// Loads a track and starts playing it with the song at `song_index`.
    ///
    /// Does nothing if a session is already active. A track that fails to
    /// parse aborts the start; no session is created.
    pub fn start_playback(
        &mut self,
        source: TrackSource,
        song_index: usize,
    ) -> Result<(), TrackError> {
        if let Some(mode) = self.mode() {
            log::debug!("LOGIC: Start playback ignored, {:?} already active", mode);
            return Ok(());
        }

        let track = source.load().inspect_err(|e| {
            log::error!("LOGIC: Playback aborted, bad track: {}", e);
        })?;

        self.generation += 1;
        log::info!(
            "LOGIC: Playback #{} started ({} events)",
            self.generation,
            track.len()
        );
        self.session = Some(Session::playback(self.generation, track, self.playfield));

        match self.songs.get(song_index) {
            Some(song) => {
                self.audio.load(&song.audio);
                self.audio.start();
            }
            None => log::warn!("LOGIC: No song #{}, playing without audio", song_index),
        }
        self.refresh();
        Ok(())
    }

    /// Plays bundled song `index` with its own track.
    pub fn run_song(&mut self, index: usize) -> Result<(), TrackError> {
        let Some(song) = self.songs.get(index) else {
            log::warn!("LOGIC: No song #{}", index);
            return Ok(());
        };
        log::info!("LOGIC: Running song #{} ({})", index, song.name);
        let source = TrackSource::File(song.track.clone());
        self.start_playback(source, index)
    }

    pub fn stop_playback(&mut self) {
        if self.mode() != Some(SessionMode::Playback) {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            session.stop();
        }
        self.teardown();
    }

    /// Stops whichever session is active.
    pub fn stop(&mut self) {
        match self.mode() {
            Some(SessionMode::Record) => self.stop_recording(),
            Some(SessionMode::Playback) => self.stop_playback(),
            None => {}
        }
    }

    /// Runs one tick of the session started as `generation`.
    ///
    /// Returns whether that session is still active.
    pub fn advance(&mut self, generation: u64, dt: Duration) -> bool {
        if generation != self.generation {
            log::trace!("LOGIC: Dropping tick for stale session #{}", generation);
            return false;
        }
        let Some(session) = self.session.as_mut() else {
            return false;
        };

        let active = session.advance(dt);
        if active {
            self.refresh();
        } else {
            self.teardown();
        }
        active
    }

    pub fn key_down(&mut self, lane: Lane) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.key_down(lane);
        if session.is_active() {
            self.refresh();
        } else {
            self.teardown();
        }
    }

    pub fn key_up(&mut self, lane: Lane) {
        if let Some(session) = self.session.as_mut() {
            session.key_up(lane);
            self.refresh();
        }
    }

    pub fn release_all(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.release_all();
            self.refresh();
        }
    }

    fn refresh(&mut self) {
        if let Some(board) = self.session.as_mut().and_then(Session::take_refresh) {
            self.display.refresh(&board);
        }
    }

    /// Releases a finished playback: audio off, final board, session gone.
    fn teardown(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        self.audio.stop();
        if let Some(board) = session.take_refresh() {
            self.display.refresh(&board);
        }
        let score = session.score();
        log::info!(
            "LOGIC: Session #{} ended after {:.1}s: {} points, {} judged ({}P {}G {}M)",
            session.generation(),
            session.elapsed().as_secs_f32(),
            score.points,
            score.judged(),
            score.perfect,
            score.good,
            score.miss
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::track::TimedKeyEvent;
    use crate::shared::snapshot::Scoreboard;
    use std::cell::RefCell;
    use std::path::Path;
    use std::rc::Rc;

    const DT: Duration = Duration::from_micros(16_667);

    #[derive(Clone, Default)]
    struct Probe {
        audio: Rc<RefCell<Vec<String>>>,
        boards: Rc<RefCell<Vec<Scoreboard>>>,
        exports: Rc<RefCell<Vec<Track>>>,
    }

    impl AudioService for Probe {
        fn load(&mut self, source: &Path) {
            self.audio.borrow_mut().push(format!("load {}", source.display()));
        }
        fn start(&mut self) {
            self.audio.borrow_mut().push("start".into());
        }
        fn stop(&mut self) {
            self.audio.borrow_mut().push("stop".into());
        }
    }

    impl DisplaySink for Probe {
        fn refresh(&mut self, board: &Scoreboard) {
            self.boards.borrow_mut().push(board.clone());
        }
    }

    impl TrackExporter for Probe {
        fn export(&mut self, track: &Track) -> Result<(), TrackError> {
            self.exports.borrow_mut().push(track.clone());
            Ok(())
        }
    }

    fn controller() -> (SessionController, Probe) {
        let probe = Probe::default();
        let mut settings = Settings::default();
        settings.songs.truncate(2);
        let controller = SessionController::new(
            &settings,
            Box::new(probe.clone()),
            Box::new(probe.clone()),
            Box::new(probe.clone()),
        );
        (controller, probe)
    }

    fn text(body: &str) -> TrackSource {
        TrackSource::Text(format!("key,time\n{}", body))
    }

    #[test]
    fn test_double_start_playback_is_noop() {
        let (mut ctl, probe) = controller();
        ctl.start_playback(text("a,0\n"), 1).unwrap();
        let generation = ctl.generation();
        ctl.advance(generation, DT);
        let elapsed = ctl.session().unwrap().elapsed();

        ctl.start_playback(text("s,0\nk,10\n"), 0).unwrap();
        ctl.start_recording();

        assert_eq!(ctl.generation(), generation);
        assert_eq!(ctl.session().unwrap().elapsed(), elapsed);
        assert_eq!(ctl.session().unwrap().notes().len(), 1);
        assert_eq!(
            *probe.audio.borrow(),
            vec!["load assets/night.mp3".to_string(), "start".to_string()]
        );
    }

    #[test]
    fn test_bad_track_aborts_start() {
        let (mut ctl, probe) = controller();
        let err = ctl.start_playback(text("a,0\ns;100\n"), 0).unwrap_err();

        assert!(matches!(err, TrackError::MissingSeparator { line: 3 }));
        assert!(ctl.session().is_none());
        assert_eq!(ctl.generation(), 0);
        assert!(probe.audio.borrow().is_empty());

        ctl.start_playback(text("a,0\n"), 0).unwrap();
        assert_eq!(ctl.mode(), Some(SessionMode::Playback));
    }

    #[test]
    fn test_missing_song_plays_without_audio() {
        let (mut ctl, probe) = controller();
        ctl.start_playback(text("a,0\n"), 9).unwrap();
        assert_eq!(ctl.mode(), Some(SessionMode::Playback));
        assert!(probe.audio.borrow().is_empty());

        // Unknown bundled songs do nothing at all.
        ctl.stop();
        assert!(ctl.run_song(9).is_ok());
        assert!(ctl.session().is_none());
    }

    #[test]
    fn test_run_song_with_missing_track_file() {
        let (mut ctl, _probe) = controller();
        let mut settings = Settings::default();
        settings.songs[0].track = PathBuf::from("/nonexistent/track.csv");
        ctl.songs = settings.songs;

        assert!(matches!(ctl.run_song(0), Err(TrackError::Io { .. })));
        assert!(ctl.session().is_none());
    }

    #[test]
    fn test_stop_inactive_is_noop() {
        let (mut ctl, probe) = controller();
        ctl.stop_playback();
        ctl.stop_recording();
        ctl.stop();

        assert!(probe.audio.borrow().is_empty());
        assert!(probe.boards.borrow().is_empty());
        assert!(probe.exports.borrow().is_empty());
    }

    #[test]
    fn test_stale_tick_is_ignored() {
        let (mut ctl, _probe) = controller();
        ctl.start_playback(text("a,0\n"), 0).unwrap();
        let stale = ctl.generation();
        ctl.stop_playback();

        ctl.start_playback(text("s,0\n"), 0).unwrap();
        assert!(!ctl.advance(stale, DT));
        assert_eq!(ctl.session().unwrap().elapsed(), Duration::ZERO);
        assert!(ctl.session().unwrap().notes().is_empty());

        assert!(ctl.advance(ctl.generation(), DT));
        assert_eq!(ctl.session().unwrap().elapsed(), DT);
    }

    #[test]
    fn test_new_session_gets_fresh_clock() {
        let (mut ctl, probe) = controller();
        ctl.start_recording();
        for _ in 0..30 {
            ctl.advance(ctl.generation(), DT);
        }
        ctl.stop_recording();

        ctl.start_recording();
        assert_eq!(ctl.session().unwrap().elapsed(), Duration::ZERO);
        ctl.advance(ctl.generation(), Duration::from_millis(120));
        ctl.key_down(Lane::A);
        ctl.stop_recording();

        let exports = probe.exports.borrow();
        assert_eq!(exports.len(), 2);
        assert_eq!(exports[1].events(), &[TimedKeyEvent::new(Lane::A, 120)]);
    }

    #[test]
    fn test_playback_end_tears_down() {
        let (mut ctl, probe) = controller();
        ctl.start_playback(TrackSource::Loaded(Track::new()), 0).unwrap();

        assert!(!ctl.advance(ctl.generation(), DT));
        assert!(ctl.session().is_none());
        assert_eq!(probe.audio.borrow().last().map(String::as_str), Some("stop"));

        let boards = probe.boards.borrow();
        let last = boards.last().unwrap();
        assert_eq!(last.mode, None);
        assert_eq!(last.status.as_deref(), Some("Stopped"));
    }

    #[test]
    fn test_final_hit_ends_session() {
        let (mut ctl, probe) = controller();
        ctl.start_playback(text("k,0\n"), 0).unwrap();
        // 61 ticks at 12px: 732px, 2px past the line.
        for _ in 0..61 {
            assert!(ctl.advance(ctl.generation(), DT));
        }
        ctl.key_down(Lane::K);

        assert!(ctl.session().is_none());
        let boards = probe.boards.borrow();
        let last = boards.last().unwrap();
        assert_eq!(last.score.perfect, 1);
        assert_eq!(last.score.points, 100);
    }

    #[test]
    fn test_recording_exports_on_stop() {
        let (mut ctl, probe) = controller();
        ctl.start_recording();
        assert_eq!(ctl.mode(), Some(SessionMode::Record));

        ctl.advance(ctl.generation(), Duration::from_millis(250));
        ctl.key_down(Lane::S);
        ctl.key_up(Lane::S);
        ctl.advance(ctl.generation(), Duration::from_millis(250));
        ctl.key_down(Lane::L);
        ctl.stop_recording();

        assert!(ctl.session().is_none());
        let exports = probe.exports.borrow();
        assert_eq!(exports.len(), 1);
        assert_eq!(exports[0].serialize(), "key,time\ns,250\nl,500\n");
        assert_eq!(
            *probe.audio.borrow(),
            vec![
                "load assets/night.mp3".to_string(),
                "start".to_string(),
                "stop".to_string()
            ]
        );
        let boards = probe.boards.borrow();
        assert_eq!(boards.first().unwrap().status.as_deref(), Some("Recording"));
        assert_eq!(boards.last().unwrap().status.as_deref(), Some("Stopped"));
    }
}
