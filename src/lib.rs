// Library surface for headless/integration tests and reuse.
// The binary only owns the terminal; everything else lives here.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod export;
pub mod format;
pub mod input;
pub mod logging;
pub mod predict;
pub mod runtime;
pub mod scramble;
pub mod session;
pub mod solve;
pub mod stats;
pub mod store;
pub mod time_series;
pub mod timer;
pub mod ui;
pub mod util;

pub use app::App;
