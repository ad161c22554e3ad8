//! Widgets shared by the Evidence Station desktop app

pub mod components;

pub use components::*;
