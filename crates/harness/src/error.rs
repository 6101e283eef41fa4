//! Error types for the webcheck harness

use thiserror::Error;

/// Result type alias using the harness Error
pub type Result<T> = std::result::Result<T, Error>;

/// Harness error taxonomy
///
/// `ElementNotReady` and `AssertionFailed` are scoped to one scenario row;
/// the sweep continues with the next data-provider row. `Session` and
/// `DataProvider` abort the enclosing sweep.
#[derive(Error, Debug)]
pub enum Error {
    #[error("element not ready: {locator} never became {state} within {waited_ms} ms")]
    ElementNotReady {
        locator: String,
        state: String,
        waited_ms: u64,
    },

    #[error("assertion failed:\n{0}")]
    AssertionFailed(String),

    #[error("session error: {0}")]
    Session(String),

    #[error("data provider error: {0}")]
    DataProvider(String),

    #[error("driver failed to start: {0}")]
    DriverStartup(String),

    #[error("driver health check failed after {0} attempts")]
    DriverHealthCheck(usize),

    #[error("timeout waiting for: {0}")]
    Timeout(String),

    #[error("unexpected WebDriver response: {0}")]
    Protocol(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),
}

impl Error {
    /// Whether this failure is confined to the current data-provider row.
    ///
    /// Row-scoped failures fail the row and let the sweep continue; anything
    /// else (lost session, broken provider, transport trouble) aborts it.
    pub fn is_row_scoped(&self) -> bool {
        matches!(
            self,
            Error::ElementNotReady { .. } | Error::AssertionFailed(_) | Error::Timeout(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_not_ready_names_locator_and_state() {
        let err = Error::ElementNotReady {
            locator: "id=name".into(),
            state: "visible".into(),
            waited_ms: 5000,
        };
        let msg = err.to_string();
        assert!(msg.contains("id=name"));
        assert!(msg.contains("visible"));
        assert!(err.is_row_scoped());
    }

    #[test]
    fn session_errors_abort_the_sweep() {
        assert!(!Error::Session("login failed".into()).is_row_scoped());
        assert!(!Error::DataProvider("missing outcome".into()).is_row_scoped());
    }
}
