//! Exit codes and structured error output.

use serde::Serialize;

use crate::duplicates::FinderError;

/// Process exit codes.
///
/// - 0: Scan completed and the report was written, duplicates or not
/// - 1: Fatal error (invalid root or config, report write failure)
/// - 130: Interrupted by Ctrl+C; no report written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Scan completed and the report was written.
    Success = 0,
    /// A fatal error stopped the run.
    GeneralError = 1,
    /// The scan was interrupted by the user.
    Interrupted = 130,
}

impl ExitCode {
    /// Numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DL000",
            Self::GeneralError => "DL001",
            Self::Interrupted => "DL130",
        }
    }

    /// Exit code for an error returned by the application.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        let interrupted = err
            .chain()
            .any(|cause| matches!(cause.downcast_ref::<FinderError>(), Some(FinderError::Interrupted)));
        if interrupted {
            Self::Interrupted
        } else {
            Self::GeneralError
        }
    }
}

/// Error printed with `--json-errors`.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// Code prefix, e.g. "DL001"
    pub code: String,
    /// Numeric exit code
    pub exit_code: i32,
    /// Error message including its causes
    pub message: String,
    /// Whether the run was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Build from an application error and its exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
