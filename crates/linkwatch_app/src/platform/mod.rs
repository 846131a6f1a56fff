mod app;
mod bridge;
mod configure;
pub mod logging;
mod terminal;

pub use app::{run_app, RunOptions};
pub use configure::{configure, SettingsForm};
