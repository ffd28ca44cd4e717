//! Unified error codes
//!
//! Error codes are organized by range:
//! - 0xxx: General errors
//! - 6xxx: Analysis errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error codes for the analysis engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Validation failed
    ValidationFailed = 2,

    // ==================== 6xxx: Analysis ====================
    /// Analysis result has not been computed for these parameters
    AnalysisNotGenerated = 6001,
    /// Analysis computation failed
    AnalysisFailed = 6002,
    /// Cache document could not be persisted
    CacheWriteFailed = 6003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the default message for this error code
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::Success => "Success",
            ErrorCode::ValidationFailed => "Validation failed",

            ErrorCode::AnalysisNotGenerated => {
                "Analysis data has not been generated. Please click the refresh button to calculate the data."
            }
            ErrorCode::AnalysisFailed => "Analysis calculation failed",
            ErrorCode::CacheWriteFailed => "Failed to save analysis cache",

            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code as u16
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ErrorCode::Success),
            2 => Ok(ErrorCode::ValidationFailed),

            6001 => Ok(ErrorCode::AnalysisNotGenerated),
            6002 => Ok(ErrorCode::AnalysisFailed),
            6003 => Ok(ErrorCode::CacheWriteFailed),

            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::AnalysisNotGenerated.code(), 6001);
        assert_eq!(ErrorCode::CacheWriteFailed.code(), 6003);
        assert_eq!(ErrorCode::DatabaseError.code(), 9002);
    }

    #[test]
    fn test_try_from_roundtrips_every_code() {
        let all = [
            ErrorCode::Success,
            ErrorCode::ValidationFailed,
            ErrorCode::AnalysisNotGenerated,
            ErrorCode::AnalysisFailed,
            ErrorCode::CacheWriteFailed,
            ErrorCode::InternalError,
            ErrorCode::DatabaseError,
        ];
        for code in all {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
        assert_eq!(ErrorCode::try_from(4242), Err(InvalidErrorCode(4242)));
        assert_eq!(ErrorCode::try_from(1), Err(InvalidErrorCode(1)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::AnalysisNotGenerated).unwrap();
        assert_eq!(json, "6001");
        let code: ErrorCode = serde_json::from_str("9002").unwrap();
        assert_eq!(code, ErrorCode::DatabaseError);
    }
}
