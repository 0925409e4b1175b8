//! Camera Relay Library
//!
//! HTTP front for a locally attached camera. `POST /` takes a gphoto2
//! argument string, forces any `--filename` into the configured base
//! directory, runs gphoto2 once, and returns the captured output.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use camera_relay::{server, AppState, Config};
//!
//! let state = AppState::with_gphoto(Config::default());
//! let app = server::create_router(state);
//! ```

pub mod handlers;
pub mod init;
pub mod rewrite;
pub mod runner;
pub mod server;
pub mod state;
pub mod types;

pub use runner::{CapturedOutput, CommandRunner, GphotoRunner};
pub use state::AppState;
pub use types::{CommandRequest, CommandResult, Config, RelayError};
