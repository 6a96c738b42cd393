//! Errors surfaced by the command-line tool.

use crate::config::ConfigError;
use rscp_protocol::RscpError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("protocol error: {0}")]
    Protocol(#[from] RscpError),

    #[error("invalid hex input: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown tag '{0}'")]
    UnknownTag(String),

    #[error("invalid element {tag}: {reason}")]
    InvalidElement { tag: String, reason: String },

    #[error("no input: pass a hex string or --file")]
    MissingInput,
}

impl CliError {
    pub(crate) fn invalid(tag: impl Into<String>, reason: impl Into<String>) -> Self {
        CliError::InvalidElement {
            tag: tag.into(),
            reason: reason.into(),
        }
    }
}
