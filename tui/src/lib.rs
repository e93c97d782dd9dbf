//! Terminal task list backed by the todo API.
//!
//! `App` hosts a `todo_core::TodoController`, executes the calls it hands
//! out on the tokio runtime, and feeds completions back into it between
//! frames.

pub mod app;
pub mod config;
pub mod transport;
pub mod ui;

pub use app::App;
pub use config::Config;
