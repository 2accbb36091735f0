pub mod engine;
pub mod lane;
pub mod settings;
pub mod stats;
pub mod track;
