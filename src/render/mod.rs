//! Window host for the game.

pub mod app;
