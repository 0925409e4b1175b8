//! Type definitions for the camera relay

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::runner::{parse_current_property, parse_saved_files, CapturedOutput};

// ============================================================================
// Configuration Types
// ============================================================================

/// Process-wide configuration, read once at startup
///
/// Every flag falls back to an environment variable so the relay can be
/// configured from a container environment without a command line.
#[derive(Debug, Clone, Parser)]
#[command(name = "camera-relay")]
#[command(about = "Relay gphoto2 commands over HTTP and return their output")]
pub struct Config {
    /// Directory that every `--filename` value is forced into
    #[arg(long, env = "BASE_DIR")]
    pub base_dir: Option<PathBuf>,

    /// HTTP listening port
    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// HTTP listening address
    #[arg(long, env = "HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Camera control executable
    #[arg(long, env = "GPHOTO2_BIN", default_value = "gphoto2")]
    pub gphoto2_bin: PathBuf,

    /// gphoto2 device address passed as `--port` (e.g. `usb:001,004`)
    #[arg(long, env = "CAMERA_PORT")]
    pub camera_port: Option<String>,

    /// Kill the camera command after this many seconds (no limit when unset)
    #[arg(long, env = "COMMAND_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Run at most one camera command at a time
    #[arg(
        long,
        env = "SERIALIZE_INVOCATIONS",
        action = clap::ArgAction::SetTrue,
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub serialize_invocations: bool,
}

impl Config {
    /// Socket address the server binds to
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_dir: None,
            port: 8000,
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            gphoto2_bin: PathBuf::from("gphoto2"),
            camera_port: None,
            timeout_secs: None,
            serialize_invocations: false,
        }
    }
}

// ============================================================================
// Request / Response Types
// ============================================================================

/// Body of `POST /`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRequest {
    /// Arguments for the camera tool, space delimited
    pub arguments: String,

    /// Overrides the configured base directory for this request
    #[serde(default)]
    pub base_dir: Option<PathBuf>,

    /// Extract the `Current:` value that `--get-config` prints
    #[serde(default)]
    pub return_property: bool,

    /// Seconds before the command is killed; overrides the configured limit
    #[serde(default)]
    pub timeout: Option<u64>,
}

impl CommandRequest {
    /// Base directory from the body, ignoring an empty string
    pub fn requested_base_dir(&self) -> Option<&Path> {
        self.base_dir
            .as_deref()
            .filter(|dir| !dir.as_os_str().is_empty())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}

/// Successful response for `POST /`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResult {
    /// stdout followed by stderr, verbatim
    pub output: String,
    pub exit_code: Option<i32>,
    /// Paths reported by `Saving file as ...` lines
    pub files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
}

impl CommandResult {
    pub fn from_captured(captured: CapturedOutput, return_property: bool) -> Self {
        let files = parse_saved_files(&captured.stdout);
        let property = if return_property {
            parse_current_property(&captured.stdout)
        } else {
            None
        };

        Self {
            output: captured.combined(),
            exit_code: captured.exit_code,
            files,
            property,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command timed out after {0}s")]
    Timeout(u64),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
