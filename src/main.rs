//! Application entry point and thread bootstrapper.

mod input;
mod logic;
mod models;
mod render;
mod shared;
mod system;

use crate::models::settings::{SETTINGS_PATH, Settings};
use crate::system::bus::SystemBus;
use std::path::{Path, PathBuf};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("MAIN: Booting keytrack...");

    let settings = Settings::load(Path::new(SETTINGS_PATH));
    let bus = SystemBus::new();

    let input_bus = bus.clone();
    let logic_bus = bus.clone();
    let render_bus = bus.clone();

    let input_manager = input::manager::InputManager::new(settings.lane_bindings())
        .persist_to(settings.clone(), PathBuf::from(SETTINGS_PATH));

    input::start_thread(input_bus, input_manager);
    logic::start_thread(logic_bus, settings);

    render::app::App::run(render_bus);
}
