//! Request handler for `POST /`
//!
//! Tokenizes the caller's arguments, confines `--filename` to the base
//! directory, runs the camera tool once and returns what it printed. A
//! non-zero exit from the tool is still a successful relay.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::rewrite::{rewrite_filename, split_arguments};
use crate::state::AppState;
use crate::types::{CommandRequest, CommandResult, ErrorResponse, RelayError};

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = match &self {
            RelayError::InvalidArguments(_) => StatusCode::BAD_REQUEST,
            RelayError::Launch { .. } | RelayError::Timeout(_) | RelayError::IoError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            tracing::error!("Camera command failed: {}", self);
        } else {
            tracing::warn!("Rejected camera command: {}", self);
        }

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

/// Core relay logic, independent of the HTTP extractor
pub async fn relay(state: &AppState, request: CommandRequest) -> Result<CommandResult, RelayError> {
    let tokens = split_arguments(&request.arguments)?;

    let base_dir = request
        .requested_base_dir()
        .or(state.config.base_dir.as_deref());
    let tokens = rewrite_filename(tokens, base_dir);

    let captured = state.invoke(&tokens, request.timeout()).await?;

    Ok(CommandResult::from_captured(captured, request.return_property))
}

/// `POST /`
pub async fn run_command(
    State(state): State<AppState>,
    Json(request): Json<CommandRequest>,
) -> Result<Json<CommandResult>, RelayError> {
    tracing::debug!("Received arguments: {}", request.arguments);
    relay(&state, request).await.map(Json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{CapturedOutput, CommandRunner};
    use crate::types::Config;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Records every argument list and timeout, answers with canned stdout
    struct RecordingRunner {
        stdout: String,
        calls: Mutex<Vec<Vec<String>>>,
        timeouts: Mutex<Vec<Option<Duration>>>,
    }

    impl RecordingRunner {
        fn new(stdout: &str) -> Arc<Self> {
            Arc::new(Self {
                stdout: stdout.to_string(),
                calls: Mutex::new(Vec::new()),
                timeouts: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandRunner for RecordingRunner {
        async fn run(
            &self,
            args: &[String],
            timeout: Option<Duration>,
        ) -> Result<CapturedOutput, RelayError> {
            self.calls.lock().unwrap().push(args.to_vec());
            self.timeouts.lock().unwrap().push(timeout);
            Ok(CapturedOutput {
                stdout: self.stdout.clone(),
                stderr: String::new(),
                exit_code: Some(0),
            })
        }
    }

    fn request(arguments: &str) -> CommandRequest {
        CommandRequest {
            arguments: arguments.to_string(),
            base_dir: None,
            return_property: false,
            timeout: None,
        }
    }

    fn state_with(base_dir: Option<&str>, runner: Arc<RecordingRunner>) -> AppState {
        let config = Config {
            base_dir: base_dir.map(PathBuf::from),
            ..Config::default()
        };
        AppState::new(config, runner)
    }

    #[tokio::test]
    async fn test_configured_base_dir_applied() {
        let runner = RecordingRunner::new("Saving file as /images/test_image_01.cr2\n");
        let state = state_with(Some("/images"), runner.clone());

        let result = relay(
            &state,
            request("--capture-image-and-download --filename test_image_01.cr2"),
        )
        .await
        .unwrap();

        assert_eq!(
            runner.calls(),
            vec![vec![
                "--capture-image-and-download".to_string(),
                "--filename".to_string(),
                "/images/test_image_01.cr2".to_string(),
            ]]
        );
        assert_eq!(result.files, vec!["/images/test_image_01.cr2"]);
        assert_eq!(result.exit_code, Some(0));
    }

    #[tokio::test]
    async fn test_request_base_dir_overrides_config() {
        let runner = RecordingRunner::new("");
        let state = state_with(Some("/images"), runner.clone());

        let mut req = request("--filename /data/foo.cr2");
        req.base_dir = Some(PathBuf::from("/mnt/night1"));
        relay(&state, req).await.unwrap();

        assert_eq!(runner.calls()[0], vec!["--filename", "/mnt/night1/foo.cr2"]);
    }

    #[tokio::test]
    async fn test_empty_request_base_dir_keeps_configured() {
        let runner = RecordingRunner::new("");
        let state = state_with(Some("/images"), runner.clone());

        let mut req = request("--filename /etc/cron.d/capture");
        req.base_dir = Some(PathBuf::new());
        relay(&state, req).await.unwrap();

        assert_eq!(runner.calls()[0], vec!["--filename", "/images/capture"]);
    }

    #[tokio::test]
    async fn test_request_timeout_passed_to_runner() {
        let runner = RecordingRunner::new("");
        let state = state_with(None, runner.clone());

        relay(&state, request("--summary")).await.unwrap();
        let mut req = request("--wait-event 30s");
        req.timeout = Some(45);
        relay(&state, req).await.unwrap();

        assert_eq!(
            *runner.timeouts.lock().unwrap(),
            vec![None, Some(Duration::from_secs(45))]
        );
    }

    #[tokio::test]
    async fn test_unbalanced_quote_never_runs_tool() {
        let runner = RecordingRunner::new("");
        let state = state_with(None, runner.clone());

        let err = relay(&state, request("--set-config 'artist=Me"))
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::InvalidArguments(_)));
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_property_returned_on_request() {
        let runner = RecordingRunner::new("Label: ISO Speed\nCurrent: 1600\n");
        let state = state_with(None, runner);

        let mut req = request("--get-config iso");
        req.return_property = true;
        let result = relay(&state, req).await.unwrap();

        assert_eq!(result.property.as_deref(), Some("1600"));
        assert_eq!(result.output, "Label: ISO Speed\nCurrent: 1600\n");
    }

    #[test]
    fn test_error_status_mapping() {
        let bad = RelayError::InvalidArguments("missing closing quote".into()).into_response();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        let launch = RelayError::Launch {
            program: "gphoto2".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        }
        .into_response();
        assert_eq!(launch.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let timeout = RelayError::Timeout(300).into_response();
        assert_eq!(timeout.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
