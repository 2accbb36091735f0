//! Logic thread: session control and the fixed-rate tick loop.
//!
//! Input actions are applied between ticks and run to completion, so a
//! session is only ever touched by this thread.

pub mod audio;
pub mod audio_thread;
pub mod clock;
pub mod controller;
pub mod export;
pub mod scheduler;
pub mod session;

use crate::input::events::GameAction;
use crate::logic::audio::AudioManager;
use crate::logic::controller::{SessionController, TrackSource};
use crate::logic::export::FileExporter;
use crate::models::settings::Settings;
use crate::shared::snapshot::SessionMode;
use crate::system::bus::{HostRequest, SystemBus, SystemEvent};
use crossbeam_channel::Sender;
use std::thread;
use std::time::{Duration, Instant};

/// Upper bound on catch-up ticks per loop iteration.
const MAX_TICKS_PER_FRAME: u32 = 10;

/// Fixed-timestep accumulator.
///
/// Wall time is banked and paid out in whole ticks. A backlog larger than
/// one frame's worth is kept and paid out over the following frames, so
/// the session clock never loses time after a stall.
#[derive(Debug)]
pub struct FixedStep {
    target_dt: Duration,
    accumulator: Duration,
}

impl FixedStep {
    pub fn new(target_dt: Duration) -> Self {
        Self {
            target_dt,
            accumulator: Duration::ZERO,
        }
    }

    pub fn target_dt(&self) -> Duration {
        self.target_dt
    }

    /// Banks `elapsed` and returns how many ticks to run now.
    pub fn ticks_due(&mut self, elapsed: Duration) -> u32 {
        self.accumulator += elapsed;
        let mut loops = 0;
        while self.accumulator >= self.target_dt && loops < MAX_TICKS_PER_FRAME {
            self.accumulator -= self.target_dt;
            loops += 1;
        }
        loops
    }
}

/// Spawns the logic thread that drives sessions at `settings.tick_rate`.
pub fn start_thread(bus: SystemBus, settings: Settings) {
    audio_thread::start_audio_thread(bus.clone());

    thread::Builder::new()
        .name("Logic Thread".to_string())
        .spawn(move || {
            log::info!("LOGIC: Thread started ({} TPS)", settings.tick_rate);

            let mut audio = AudioManager::new(&bus);
            audio.set_volume(settings.master_volume);
            let mut controller = SessionController::new(
                &settings,
                Box::new(audio),
                Box::new(bus.display_tx.clone()),
                Box::new(FileExporter::new(settings.export_path.clone())),
            );

            let mut stepper = FixedStep::new(Duration::from_secs_f64(settings.tick_seconds()));
            let mut last_time = Instant::now();

            loop {
                // Ticks of this frame belong to the session that was
                // current before any input was applied.
                let generation = controller.generation();

                // 1. Process input actions
                while let Ok(action) = bus.action_rx.try_recv() {
                    dispatch(&mut controller, action, &bus.host_tx);
                }

                // 2. Handle system events
                while let Ok(sys_evt) = bus.sys_rx.try_recv() {
                    match sys_evt {
                        SystemEvent::Quit => {
                            log::info!("LOGIC: Quit received...");
                            controller.stop();
                            return;
                        }
                        SystemEvent::FocusLost => controller.release_all(),
                    }
                }

                // 3. Fixed-timestep update loop
                let current_time = Instant::now();
                let loops = stepper.ticks_due(current_time - last_time);
                last_time = current_time;

                for _ in 0..loops {
                    controller.advance(generation, stepper.target_dt());
                }

                if loops == 0 {
                    thread::sleep(Duration::from_millis(1));
                }
            }
        })
        .expect("Failed to spawn Logic thread");
}

/// Applies one input action to the controller.
pub fn dispatch(controller: &mut SessionController, action: GameAction, host: &Sender<HostRequest>) {
    match action {
        GameAction::KeyDown { lane } => controller.key_down(lane),
        GameAction::KeyUp { lane } => controller.key_up(lane),
        GameAction::ToggleRecording => match controller.mode() {
            Some(SessionMode::Record) => controller.stop_recording(),
            Some(SessionMode::Playback) => {}
            None => controller.start_recording(),
        },
        GameAction::TogglePlayback => match controller.mode() {
            Some(SessionMode::Playback) => controller.stop_playback(),
            Some(SessionMode::Record) => {}
            None => {
                if host.send(HostRequest::PickTrack).is_err() {
                    log::warn!("LOGIC: Window is gone, cannot pick a track");
                }
            }
        },
        GameAction::LoadTrack { path } => {
            // Errors are already logged; the loop keeps running.
            let _ = controller.start_playback(TrackSource::File(path), 0);
        }
        GameAction::RunSong(index) => {
            let _ = controller.run_song(index);
        }
        GameAction::Stop => controller.stop(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::audio::AudioService;
    use crate::logic::export::TrackExporter;
    use crate::models::lane::Lane;
    use crate::models::track::{Track, TrackError};
    use crate::shared::snapshot::{DisplaySink, Scoreboard};
    use std::path::Path;

    struct Silent;

    impl AudioService for Silent {
        fn load(&mut self, _source: &Path) {}
        fn start(&mut self) {}
        fn stop(&mut self) {}
    }

    impl DisplaySink for Silent {
        fn refresh(&mut self, _board: &Scoreboard) {}
    }

    impl TrackExporter for Silent {
        fn export(&mut self, _track: &Track) -> Result<(), TrackError> {
            Ok(())
        }
    }

    fn controller() -> SessionController {
        SessionController::new(
            &Settings::default(),
            Box::new(Silent),
            Box::new(Silent),
            Box::new(Silent),
        )
    }

    #[test]
    fn test_stall_backlog_is_paid_out_later() {
        let dt = Duration::from_millis(10);
        let mut stepper = FixedStep::new(dt);

        assert_eq!(stepper.ticks_due(Duration::from_millis(5)), 0);
        assert_eq!(stepper.ticks_due(Duration::from_millis(5)), 1);

        // A 255ms stall: capped per frame, but nothing is dropped.
        let mut total = stepper.ticks_due(Duration::from_millis(255));
        assert_eq!(total, MAX_TICKS_PER_FRAME);
        loop {
            let due = stepper.ticks_due(Duration::ZERO);
            if due == 0 {
                break;
            }
            total += due;
        }
        assert_eq!(total, 25);
        assert_eq!(stepper.ticks_due(Duration::from_millis(5)), 1);
    }

    #[test]
    fn test_toggle_playback_asks_host_for_track() {
        let bus = SystemBus::new();
        let mut ctl = controller();

        dispatch(&mut ctl, GameAction::TogglePlayback, &bus.host_tx);
        assert!(matches!(bus.host_rx.try_recv(), Ok(HostRequest::PickTrack)));
        assert!(ctl.mode().is_none());
    }

    #[test]
    fn test_toggle_recording_round_trip() {
        let bus = SystemBus::new();
        let mut ctl = controller();

        dispatch(&mut ctl, GameAction::ToggleRecording, &bus.host_tx);
        assert_eq!(ctl.mode(), Some(SessionMode::Record));

        // Playback toggles are ignored while recording.
        dispatch(&mut ctl, GameAction::TogglePlayback, &bus.host_tx);
        assert!(bus.host_rx.try_recv().is_err());

        dispatch(&mut ctl, GameAction::KeyDown { lane: Lane::A }, &bus.host_tx);
        dispatch(&mut ctl, GameAction::ToggleRecording, &bus.host_tx);
        assert!(ctl.mode().is_none());
    }

    #[test]
    fn test_load_track_failure_keeps_idle() {
        let bus = SystemBus::new();
        let mut ctl = controller();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.csv");
        std::fs::write(&path, "key,time\na,zero\n").unwrap();

        dispatch(&mut ctl, GameAction::LoadTrack { path: path.clone() }, &bus.host_tx);
        assert!(ctl.mode().is_none());

        std::fs::write(&path, "key,time\na,0\n").unwrap();
        dispatch(&mut ctl, GameAction::LoadTrack { path }, &bus.host_tx);
        assert_eq!(ctl.mode(), Some(SessionMode::Playback));

        dispatch(&mut ctl, GameAction::Stop, &bus.host_tx);
        assert!(ctl.mode().is_none());
    }
}
