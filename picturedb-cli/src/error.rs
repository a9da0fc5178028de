//! Error types emitted by the PictureDB CLI.

use std::sync::Arc;

use picturedb_core::{DialectError, PictureStoreError};
use thiserror::Error;

/// Errors emitted by the PictureDB CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument { field: &'static str, env: String },
    /// The delimiter or date format would produce unreadable rows.
    #[error("invalid --delimiter/--date-format: {0}")]
    InvalidDialect(#[source] DialectError),
    /// A date argument does not match the configured format.
    #[error("date {value:?} does not match format {format:?}: {source}")]
    InvalidDate {
        value: String,
        format: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A URL argument is malformed.
    #[error("invalid url {value:?}: {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    /// The picture store rejected the operation.
    #[error(transparent)]
    Store(#[from] PictureStoreError),
    /// Serializing command output failed.
    #[error("failed to serialize output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
