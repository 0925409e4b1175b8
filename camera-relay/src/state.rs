//! Shared application state

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::runner::{CapturedOutput, CommandRunner, GphotoRunner};
use crate::types::{Config, RelayError};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Startup configuration, never modified afterwards
    pub config: Arc<Config>,
    /// Executes camera commands
    pub runner: Arc<dyn CommandRunner>,
    /// Held for the duration of each invocation when serialization is enabled
    invocation_lock: Option<Arc<Mutex<()>>>,
}

impl AppState {
    /// Create state with an explicit runner
    pub fn new(config: Config, runner: Arc<dyn CommandRunner>) -> Self {
        let invocation_lock = config
            .serialize_invocations
            .then(|| Arc::new(Mutex::new(())));

        Self {
            config: Arc::new(config),
            runner,
            invocation_lock,
        }
    }

    /// Create state that runs the configured gphoto2 executable
    pub fn with_gphoto(config: Config) -> Self {
        let runner = Arc::new(GphotoRunner::new(&config));
        Self::new(config, runner)
    }

    /// Run one camera command, waiting for the invocation lock if configured
    ///
    /// The timeout only covers the command itself, not time spent queued.
    pub async fn invoke(
        &self,
        args: &[String],
        timeout: Option<Duration>,
    ) -> Result<CapturedOutput, RelayError> {
        let _guard = match &self.invocation_lock {
            Some(lock) => Some(lock.lock().await),
            None => None,
        };

        self.runner.run(args, timeout).await
    }
}
