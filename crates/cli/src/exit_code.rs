//! Process exit codes
//!
//! Scripts can branch on these values; they are stable across releases.

/// Exit status of an `s3c` invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Operation completed successfully
    Success = 0,
    /// Unclassified failure, including non-2xx responses without a specific code
    GeneralError = 1,
    /// Invalid arguments or configuration
    UsageError = 2,
    /// No response was received (connection failure or timeout)
    NetworkError = 3,
    /// The API rejected the key (401/403)
    AuthError = 4,
    /// The object does not exist (404)
    NotFound = 5,
}

impl ExitCode {
    /// Classify the status code of an API envelope
    pub fn from_status(status_code: u16) -> Self {
        match status_code {
            0 => ExitCode::NetworkError,
            200..=299 => ExitCode::Success,
            401 | 403 => ExitCode::AuthError,
            404 => ExitCode::NotFound,
            _ => ExitCode::GeneralError,
        }
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert_eq!(ExitCode::from_status(0), ExitCode::NetworkError);
        assert_eq!(ExitCode::from_status(200), ExitCode::Success);
        assert_eq!(ExitCode::from_status(201), ExitCode::Success);
        assert_eq!(ExitCode::from_status(401), ExitCode::AuthError);
        assert_eq!(ExitCode::from_status(403), ExitCode::AuthError);
        assert_eq!(ExitCode::from_status(404), ExitCode::NotFound);
        assert_eq!(ExitCode::from_status(422), ExitCode::GeneralError);
        assert_eq!(ExitCode::from_status(500), ExitCode::GeneralError);
    }

    #[test]
    fn test_numeric_values() {
        assert_eq!(ExitCode::Success as u8, 0);
        assert_eq!(ExitCode::UsageError as u8, 2);
        assert_eq!(ExitCode::NotFound as u8, 5);
    }
}
