//! # Handlers HTTP para Jobs
//! src/jobs/handlers.rs
//!
//! Implementa los endpoints del sistema de jobs:
//! - `POST /run`
//! - `GET /results`

use crate::error::RunRequestError;
use crate::http::{Request, Response, StatusCode};
use crate::jobs::manager::{JobManager, SubmitOutcome};
use serde_json::Value;

/// Extrae `flags` del body JSON de `POST /run`
pub fn parse_flags(body: &[u8]) -> Result<String, RunRequestError> {
    let parsed: Value =
        serde_json::from_slice(body).map_err(|_| RunRequestError::InvalidJson)?;

    parsed
        .get("flags")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(RunRequestError::MissingFlags)
}

/// Handler para `POST /run` con body `{"flags": "..."}`
///
/// Arma `programa + " " + flags` y lo envía al manager.
///
/// # Respuestas
/// - 202 si el job fue admitido
/// - 400 si el body no es JSON o no trae `flags`
/// - 429 si se alcanzó el máximo de jobs concurrentes
/// - 503 si el servidor se está apagando
pub fn run_handler(req: &Request, job_manager: &JobManager) -> Response {
    let flags = match parse_flags(req.body()) {
        Ok(flags) => flags,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected /run body");
            return Response::text(StatusCode::BadRequest, &format!("{}\n", e));
        }
    };

    let command = job_manager.command_for(&flags);
    match job_manager.submit(command) {
        SubmitOutcome::Accepted { .. } => {
            Response::text(StatusCode::Accepted, "Command is running\n")
        }
        SubmitOutcome::Rejected { .. } => {
            Response::text(StatusCode::TooManyRequests, "Too many concurrent jobs\n")
        }
        SubmitOutcome::ShuttingDown => {
            Response::text(StatusCode::ServiceUnavailable, "Server is shutting down\n")
        }
    }
}

/// Handler para `GET /results`
pub fn results_handler(_req: &Request, job_manager: &JobManager) -> Response {
    Response::text(StatusCode::Ok, &job_manager.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::manager::JobManagerConfig;
    use crate::jobs::report::NO_JOB_MESSAGE;

    fn post_run(body: &str) -> Request {
        let raw = format!(
            "POST /run HTTP/1.0\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        Request::parse(raw.as_bytes()).unwrap()
    }

    fn manager(max: usize) -> JobManager {
        JobManager::new(JobManagerConfig {
            program: "echo".to_string(),
            max_concurrent_jobs: max,
            ..JobManagerConfig::default()
        })
    }

    #[test]
    fn test_parse_flags_ok() {
        assert_eq!(parse_flags(br#"{"flags": "--cpu 2"}"#), Ok("--cpu 2".to_string()));
    }

    #[test]
    fn test_parse_flags_invalid_json() {
        assert_eq!(parse_flags(b"not json"), Err(RunRequestError::InvalidJson));
        assert_eq!(parse_flags(b""), Err(RunRequestError::InvalidJson));
    }

    #[test]
    fn test_parse_flags_missing_or_wrong_type() {
        assert_eq!(parse_flags(b"{}"), Err(RunRequestError::MissingFlags));
        assert_eq!(parse_flags(br#"{"flags": 3}"#), Err(RunRequestError::MissingFlags));
        assert_eq!(parse_flags(br#"["--cpu 2"]"#), Err(RunRequestError::MissingFlags));
    }

    #[test]
    fn test_run_handler_invalid_json() {
        let manager = manager(1);
        let response = run_handler(&post_run("{oops"), &manager);

        assert_eq!(response.status(), StatusCode::BadRequest);
        assert_eq!(response.body(), b"Invalid JSON\n");
        assert_eq!(manager.stats().tracked, 0);
    }

    #[test]
    fn test_run_handler_missing_flags() {
        let manager = manager(1);
        let response = run_handler(&post_run(r#"{"other": "x"}"#), &manager);

        assert_eq!(response.status(), StatusCode::BadRequest);
        assert_eq!(manager.stats().tracked, 0);
    }

    #[test]
    fn test_run_handler_accepts_then_rejects() {
        let manager = manager(1);

        let first = run_handler(&post_run(r#"{"flags": "hi; sleep 1"}"#), &manager);
        assert_eq!(first.status(), StatusCode::Accepted);
        assert_eq!(first.body(), b"Command is running\n");

        let second = run_handler(&post_run(r#"{"flags": "again"}"#), &manager);
        assert_eq!(second.status(), StatusCode::TooManyRequests);
        assert_eq!(second.body(), b"Too many concurrent jobs\n");

        manager.drain();
    }

    #[test]
    fn test_run_handler_during_shutdown() {
        let manager = manager(1);
        manager.begin_shutdown();

        let response = run_handler(&post_run(r#"{"flags": "late"}"#), &manager);
        assert_eq!(response.status(), StatusCode::ServiceUnavailable);
    }

    #[test]
    fn test_results_handler_empty() {
        let manager = manager(1);
        let raw = b"GET /results HTTP/1.0\r\n\r\n";
        let response = results_handler(&Request::parse(raw).unwrap(), &manager);

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.body(), NO_JOB_MESSAGE.as_bytes());
    }
}
