pub mod app;
pub mod config;
pub mod input;
pub mod keybinds;
pub mod ui;

pub use config::Config;
