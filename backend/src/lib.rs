pub mod app;
pub mod config;
pub mod console;
pub mod scoreboard;
pub mod setup;
pub mod storage;
pub mod summary;
pub mod ticker;

pub use app::{App, AppError, Screen};
