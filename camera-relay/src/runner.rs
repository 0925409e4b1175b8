//! Camera command execution
//!
//! The [`CommandRunner`] trait is the seam between the HTTP layer and the
//! external tool. [`GphotoRunner`] spawns the real executable; tests swap in
//! their own implementations.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::types::{Config, RelayError};

const SAVED_FILE_PREFIX: &str = "Saving file as ";
const CURRENT_VALUE_PREFIX: &str = "Current: ";

/// Everything captured from one finished tool invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl CapturedOutput {
    /// stdout followed by stderr
    pub fn combined(&self) -> String {
        let mut text = String::with_capacity(self.stdout.len() + self.stderr.len());
        text.push_str(&self.stdout);
        text.push_str(&self.stderr);
        text
    }
}

/// Paths gphoto2 reported writing, in order
pub fn parse_saved_files(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| line.strip_prefix(SAVED_FILE_PREFIX))
        .map(|path| path.trim().to_string())
        .filter(|path| !path.is_empty())
        .collect()
}

/// Value of the first `Current: ...` line (printed by `--get-config`)
pub fn parse_current_property(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .find_map(|line| line.strip_prefix(CURRENT_VALUE_PREFIX))
        .map(|value| value.trim().to_string())
}

/// Runs the camera tool with a list of argument tokens
///
/// `timeout` overrides whatever limit the runner was configured with for
/// this one call.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(
        &self,
        args: &[String],
        timeout: Option<Duration>,
    ) -> Result<CapturedOutput, RelayError>;
}

/// Runs the gphoto2 executable as a child process
#[derive(Debug, Clone)]
pub struct GphotoRunner {
    program: PathBuf,
    camera_port: Option<String>,
    timeout: Option<Duration>,
}

impl GphotoRunner {
    pub fn new(config: &Config) -> Self {
        Self {
            program: config.gphoto2_bin.clone(),
            camera_port: config.camera_port.clone(),
            timeout: config.timeout_secs.map(Duration::from_secs),
        }
    }

    /// Full argument list handed to the executable
    pub fn command_args(&self, args: &[String]) -> Vec<String> {
        let mut full = Vec::with_capacity(args.len() + 2);
        if let Some(port) = &self.camera_port {
            full.push("--port".to_string());
            full.push(port.clone());
        }
        full.extend(args.iter().cloned());
        full
    }
}

#[async_trait]
impl CommandRunner for GphotoRunner {
    async fn run(
        &self,
        args: &[String],
        timeout: Option<Duration>,
    ) -> Result<CapturedOutput, RelayError> {
        let full_args = self.command_args(args);
        tracing::info!("Running {} {:?}", self.program.display(), full_args);

        let mut cmd = Command::new(&self.program);
        cmd.args(&full_args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|source| RelayError::Launch {
            program: self.program.display().to_string(),
            source,
        })?;

        // Dropping the wait future drops the child, which kills it
        let output = match timeout.or(self.timeout) {
            Some(timeout) => tokio::time::timeout(timeout, child.wait_with_output())
                .await
                .map_err(|_elapsed| RelayError::Timeout(timeout.as_secs()))??,
            None => child.wait_with_output().await?,
        };

        let captured = CapturedOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        };

        tracing::info!(
            "{} exited with {:?} ({} bytes stdout, {} bytes stderr)",
            self.program.display(),
            captured.exit_code,
            captured.stdout.len(),
            captured.stderr.len()
        );

        Ok(captured)
    }
}
