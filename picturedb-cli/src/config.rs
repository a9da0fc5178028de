//! Resolution of merged command arguments into store settings and values.

use camino::Utf8PathBuf;
use chrono::NaiveDateTime;
use picturedb_core::{CsvDialect, DEFAULT_DATE_FORMAT, DEFAULT_DELIMITER};
use url::Url;

use crate::{ARG_DB, CliError, ENV_PREFIX};

/// Store location and row layout shared by every subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StoreConfig {
    /// Path to the picture file.
    pub(crate) db: Utf8PathBuf,
    /// Delimiter and date format of the file.
    pub(crate) dialect: CsvDialect,
}

impl StoreConfig {
    /// Build the store settings for `command` from its merged options.
    pub(crate) fn resolve(
        command: &'static str,
        db: Option<Utf8PathBuf>,
        delimiter: Option<char>,
        date_format: Option<String>,
    ) -> Result<Self, CliError> {
        let db = db.ok_or_else(|| missing(command, ARG_DB))?;
        let dialect = CsvDialect {
            delimiter: delimiter.unwrap_or(DEFAULT_DELIMITER),
            date_format: date_format.unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_owned()),
        };
        dialect.check().map_err(CliError::InvalidDialect)?;
        Ok(Self { db, dialect })
    }

    /// Parse a `--date` value with the configured format.
    pub(crate) fn parse_date(&self, value: &str) -> Result<NaiveDateTime, CliError> {
        NaiveDateTime::parse_from_str(value, &self.dialect.date_format).map_err(|source| {
            CliError::InvalidDate {
                value: value.to_owned(),
                format: self.dialect.date_format.clone(),
                source,
            }
        })
    }
}

/// Environment variable that supplies `field` for `command`.
pub(crate) fn env_var(command: &str, field: &str) -> String {
    format!(
        "{ENV_PREFIX}_CMDS_{}_{}",
        command.to_uppercase(),
        field.to_uppercase().replace('-', "_")
    )
}

/// Error for an option that is still unset after merging.
pub(crate) fn missing(command: &'static str, field: &'static str) -> CliError {
    CliError::MissingArgument {
        field,
        env: env_var(command, field),
    }
}

/// Unwrap a merged option or report it as missing.
pub(crate) fn require<T>(
    value: Option<T>,
    command: &'static str,
    field: &'static str,
) -> Result<T, CliError> {
    value.ok_or_else(|| missing(command, field))
}

pub(crate) fn parse_url(value: &str) -> Result<Url, CliError> {
    Url::parse(value).map_err(|source| CliError::InvalidUrl {
        value: value.to_owned(),
        source,
    })
}
