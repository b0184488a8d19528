//! JSON result envelope.
//!
//! Results are rendered straight to a string so host results keep their
//! resolution order.

use crate::error::AppError;
use serde::Serialize;
use vsr_reconcile::EntityResults;

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILED: i32 = 1;

#[derive(Serialize)]
struct FailureReport<'a> {
    failed: bool,
    changed: bool,
    msg: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<&'a EntityResults>,
}

/// What a run prints and how the process exits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub body: String,
    pub exit_code: i32,
}

impl RunOutcome {
    pub fn success<T: Serialize>(report: &T) -> Self {
        match serde_json::to_string(report) {
            Ok(body) => Self { body, exit_code: EXIT_OK },
            Err(e) => Self::failure(&format!("Failed to serialise result: {e}"), None, EXIT_FAILED),
        }
    }

    /// `{"failed": true, "changed": false, "msg": ..., "results"?: ...}`
    pub fn failure(msg: &str, results: Option<&EntityResults>, exit_code: i32) -> Self {
        let report = FailureReport {
            failed: true,
            changed: false,
            msg,
            results: results.filter(|r| !r.is_empty()),
        };
        let body = serde_json::to_string(&report).unwrap_or_else(|_| {
            format!(r#"{{"failed":true,"changed":false,"msg":{:?}}}"#, msg)
        });
        Self { body, exit_code }
    }

    pub fn from_app_error(e: &AppError) -> Self {
        Self::failure(&e.to_string(), None, e.exit_code())
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == EXIT_OK
    }
}
