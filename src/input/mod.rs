//! Input thread bootstrapping and high-level event routing.

pub mod events;
pub mod keycode;
pub mod manager;

use crate::input::manager::InputManager;
use crate::system::bus::SystemBus;
use std::thread;

pub fn start_thread(bus: SystemBus, mut manager: InputManager) {
    thread::Builder::new()
        .name("Input Thread".to_string())
        .spawn(move || {
            log::info!("INPUT: Thread started");

            // Blocking loop: wait for an event, handle it, repeat.
            while let Ok(raw_event) = bus.raw_input_rx.recv() {
                if let Some(action) = manager.process(raw_event)
                    && let Err(e) = bus.action_tx.send(action)
                {
                    log::error!("INPUT: Failed to send action (Logic thread died?): {}", e);
                    break;
                }
            }

            log::info!("INPUT: Thread stopped");
        })
        .expect("Failed to spawn Input thread");
}
