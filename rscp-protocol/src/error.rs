//! Codec error types and protocol result/error codes.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Structural errors raised while encoding or decoding.
///
/// Type mismatches on typed reads are never errors; they surface as `None`
/// or as a default value.
#[derive(Debug, Error)]
pub enum RscpError {
    #[error("buffer underflow at offset {offset}: need {needed} bytes, {remaining} remaining")]
    BufferUnderflow {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("invalid magic bytes: expected [e3, dc], got {0:02x?}")]
    InvalidMagic([u8; 2]),

    #[error("checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("checksum trailer missing: need {needed} more bytes")]
    MissingChecksum { needed: usize },

    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("data section too large: {size} bytes (max {max})")]
    DataSectionTooLarge { size: usize, max: usize },

    #[error("timestamp out of range: {seconds}s {nanos}ns")]
    InvalidTimestamp { seconds: i64, nanos: i32 },
}

impl RscpError {
    /// Whether the bytes arrived intact but failed the integrity check.
    ///
    /// Integrity failures call for a retransmit; everything else points at
    /// malformed framing.
    pub fn is_integrity_failure(&self) -> bool {
        matches!(self, RscpError::ChecksumMismatch { .. })
    }
}

/// Outcome reported by setter responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultCode {
    Success,
    AdjustedToLimit,
    Failure,
    NotAllowed,
    Unknown,
}

impl ResultCode {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => ResultCode::Success,
            1 => ResultCode::AdjustedToLimit,
            -1 => ResultCode::Failure,
            -2 => ResultCode::NotAllowed,
            _ => ResultCode::Unknown,
        }
    }

    /// Wire value, `None` for [`ResultCode::Unknown`].
    pub fn code(&self) -> Option<i32> {
        match self {
            ResultCode::Success => Some(0),
            ResultCode::AdjustedToLimit => Some(1),
            ResultCode::Failure => Some(-1),
            ResultCode::NotAllowed => Some(-2),
            ResultCode::Unknown => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResultCode::Success | ResultCode::AdjustedToLimit)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultCode::Success => write!(f, "SUCCESS"),
            ResultCode::AdjustedToLimit => write!(f, "ADJUSTED_TO_LIMIT"),
            ResultCode::Failure => write!(f, "FAILURE"),
            ResultCode::NotAllowed => write!(f, "NOT_ALLOWED"),
            ResultCode::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Error codes reported in integer fields of device answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotHandled,
    AccessDenied,
    Format,
    Again,
    OutOfBounds,
    NotAvailable,
    UnknownTag,
    AlreadyInUse,
    Unknown,
}

impl ErrorCode {
    pub fn from_code(code: i32) -> Self {
        match code {
            0x01 => ErrorCode::NotHandled,
            0x02 => ErrorCode::AccessDenied,
            0x03 => ErrorCode::Format,
            0x04 => ErrorCode::Again,
            0x05 => ErrorCode::OutOfBounds,
            0x06 => ErrorCode::NotAvailable,
            0x07 => ErrorCode::UnknownTag,
            0x08 => ErrorCode::AlreadyInUse,
            _ => ErrorCode::Unknown,
        }
    }

    /// Whether repeating the request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCode::Again | ErrorCode::AlreadyInUse)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::NotHandled => write!(f, "ERR_NOT_HANDLED"),
            ErrorCode::AccessDenied => write!(f, "ERR_ACCESS_DENIED"),
            ErrorCode::Format => write!(f, "ERR_FORMAT"),
            ErrorCode::Again => write!(f, "ERR_AGAIN"),
            ErrorCode::OutOfBounds => write!(f, "ERR_OUT_OF_BOUNDS"),
            ErrorCode::NotAvailable => write!(f, "ERR_NOT_AVAILABLE"),
            ErrorCode::UnknownTag => write!(f, "ERR_UNKNOWN_TAG"),
            ErrorCode::AlreadyInUse => write!(f, "ERR_ALREADY_IN_USE"),
            ErrorCode::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_code_lookup() {
        assert_eq!(ResultCode::from_code(0), ResultCode::Success);
        assert_eq!(ResultCode::from_code(1), ResultCode::AdjustedToLimit);
        assert_eq!(ResultCode::from_code(-1), ResultCode::Failure);
        assert_eq!(ResultCode::from_code(-2), ResultCode::NotAllowed);
        assert_eq!(ResultCode::from_code(99), ResultCode::Unknown);
        assert_eq!(ResultCode::Failure.code(), Some(-1));
        assert_eq!(ResultCode::Unknown.code(), None);
        assert!(ResultCode::AdjustedToLimit.is_success());
        assert!(!ResultCode::Unknown.is_success());
    }

    #[test]
    fn test_error_code_lookup() {
        assert_eq!(ErrorCode::from_code(0x01), ErrorCode::NotHandled);
        assert_eq!(ErrorCode::from_code(0x07), ErrorCode::UnknownTag);
        assert_eq!(ErrorCode::from_code(0), ErrorCode::Unknown);
        assert_eq!(ErrorCode::from_code(-5), ErrorCode::Unknown);
        assert!(ErrorCode::Again.is_retryable());
        assert!(!ErrorCode::AccessDenied.is_retryable());
    }

    #[test]
    fn test_code_display() {
        assert_eq!(ErrorCode::AccessDenied.to_string(), "ERR_ACCESS_DENIED");
        assert_eq!(ResultCode::NotAllowed.to_string(), "NOT_ALLOWED");
    }

    #[test]
    fn test_code_serialization() {
        let json = serde_json::to_string(&ErrorCode::OutOfBounds).unwrap();
        assert_eq!(json, "\"OUT_OF_BOUNDS\"");

        let parsed: ResultCode = serde_json::from_str("\"SUCCESS\"").unwrap();
        assert_eq!(parsed, ResultCode::Success);
    }

    #[test]
    fn test_rscp_error_display() {
        let err = RscpError::BufferUnderflow {
            offset: 3,
            needed: 7,
            remaining: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("offset 3"));
        assert!(msg.contains("need 7"));

        let err = RscpError::InvalidMagic([0xAB, 0xCD]);
        assert!(err.to_string().contains("ab"));

        let err = RscpError::ChecksumMismatch {
            expected: 0xDEAD_BEEF,
            actual: 0x1,
        };
        assert!(err.to_string().contains("0xdeadbeef"));
        assert!(err.is_integrity_failure());

        let err = RscpError::PayloadTooLarge {
            size: 70000,
            max: 65535,
        };
        assert!(err.to_string().contains("70000"));
        assert!(!err.is_integrity_failure());
    }
}
