//! Application window and event loop handler.
//!
//! The window is the input host: it forwards keyboard and focus events to
//! the input and logic threads, shows the latest scoreboard in its title
//! and serves file-picker requests from the logic thread.

use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::input::events::{GameAction, RawInputEvent};
use crate::system::bus::{HostRequest, SystemBus, SystemEvent};

const TITLE: &str = "keytrack";

/// Title refresh interval while idle.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Main application struct handling window events.
pub struct App {
    bus: SystemBus,
    window: Option<Arc<Window>>,
}

impl App {
    pub fn new(bus: SystemBus) -> Self {
        Self { bus, window: None }
    }

    /// Runs the application event loop (blocking).
    pub fn run(bus: SystemBus) {
        let event_loop = match EventLoop::new() {
            Ok(event_loop) => event_loop,
            Err(e) => {
                log::error!("RENDER: Cannot create event loop: {}", e);
                let _ = bus.sys_tx.send(SystemEvent::Quit);
                return;
            }
        };

        let mut app = App::new(bus);
        if let Err(e) = event_loop.run_app(&mut app) {
            log::error!("RENDER: Event loop failed: {}", e);
            let _ = app.bus.sys_tx.send(SystemEvent::Quit);
        }
    }

    fn pick_track(&self) {
        log::info!("RENDER: Opening track picker");
        let picked = rfd::FileDialog::new()
            .set_title("Load track")
            .add_filter("Track", &["csv"])
            .pick_file();

        match picked {
            Some(path) => {
                let _ = self.bus.action_tx.send(GameAction::LoadTrack { path });
            }
            None => log::info!("RENDER: Track picker cancelled"),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            log::info!("RENDER: Creating window...");
            let win_attr = Window::default_attributes()
                .with_title(TITLE)
                .with_inner_size(winit::dpi::LogicalSize::new(720.0, 120.0));

            match event_loop.create_window(win_attr) {
                Ok(window) => self.window = Some(Arc::new(window)),
                Err(e) => {
                    log::error!("RENDER: Cannot create window: {}", e);
                    let _ = self.bus.sys_tx.send(SystemEvent::Quit);
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(raw_event) = RawInputEvent::from_winit(&event) {
            let _ = self.bus.raw_input_tx.send(raw_event);
            return;
        }

        match event {
            WindowEvent::Focused(false) => {
                let _ = self.bus.sys_tx.send(SystemEvent::FocusLost);
            }
            WindowEvent::CloseRequested => {
                log::info!("RENDER: Close requested");
                let _ = self.bus.sys_tx.send(SystemEvent::Quit);
                event_loop.exit();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(board) = self.bus.display_rx.try_iter().last()
            && let Some(window) = self.window.as_ref()
        {
            window.set_title(&format!("{} | {}", TITLE, board));
        }

        while let Ok(request) = self.bus.host_rx.try_recv() {
            match request {
                HostRequest::PickTrack => self.pick_track(),
            }
        }

        event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + FRAME_INTERVAL));
    }
}
