//! Text layout of the picture file: delimiter, date format and columns.

use std::fmt::{self, Write as _};

use chrono::{
    NaiveDate, NaiveDateTime,
    format::{Item, StrftimeItems},
};
use thiserror::Error;

/// Field separator used when none is configured.
pub const DEFAULT_DELIMITER: char = ';';

/// `chrono` format string for the `date` column when none is configured.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Semantic columns every picture file must declare in its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    /// Store-assigned identifier.
    Id,
    /// Timestamp, formatted with the dialect's date format.
    Date,
    /// Longitude in degrees.
    Longitude,
    /// Latitude in degrees.
    Latitude,
    /// Free-text caption.
    Title,
    /// Image location.
    Url,
}

impl Column {
    /// Required columns in the order a freshly created file lists them.
    pub const ALL: [Self; 6] = [
        Self::Id,
        Self::Date,
        Self::Longitude,
        Self::Latitude,
        Self::Title,
        Self::Url,
    ];

    /// Header name of the column.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Date => "date",
            Self::Longitude => "longitude",
            Self::Latitude => "latitude",
            Self::Title => "title",
            Self::Url => "url",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error raised when a dialect would write rows it cannot read back.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DialectError {
    /// The delimiter would end the line instead of the field.
    #[error("{delimiter:?} is a line break and cannot separate fields")]
    LineBreakDelimiter {
        /// Rejected delimiter.
        delimiter: char,
    },
    /// The delimiter occurs in rendered identifiers or coordinates.
    #[error("{delimiter:?} occurs in numeric fields and cannot separate them")]
    NumericDelimiter {
        /// Rejected delimiter.
        delimiter: char,
    },
    /// The delimiter occurs inside a column name of the header.
    #[error("{delimiter:?} occurs in the `{column}` column name")]
    DelimiterInColumnName {
        /// Rejected delimiter.
        delimiter: char,
        /// Column whose name contains it.
        column: Column,
    },
    /// The date format contains an invalid or unrenderable specifier.
    #[error("date format {format:?} cannot render a date")]
    InvalidDateFormat {
        /// Offending format string.
        format: String,
    },
    /// Rendered dates contain the delimiter.
    #[error("date format {format:?} renders the delimiter {delimiter:?}")]
    DelimiterInDate {
        /// Offending format string.
        format: String,
        /// Delimiter found in the rendered date.
        delimiter: char,
    },
    /// Rendered dates cannot be parsed back into the same date and time.
    #[error("date format {format:?} does not read back what it writes (rendered {rendered:?})")]
    LossyDateFormat {
        /// Offending format string.
        format: String,
        /// Sample date as rendered by the format.
        rendered: String,
    },
}

/// Delimiter and date format shared by every line of a picture file.
///
/// No quoting or escaping is applied, so the delimiter must never occur
/// inside a field value.
///
/// # Examples
/// ```
/// use picturedb_core::CsvDialect;
///
/// let dialect = CsvDialect::default();
/// assert_eq!(dialect.delimiter, ';');
/// assert_eq!(dialect.header_line(), "id;date;longitude;latitude;title;url");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvDialect {
    /// Character separating fields on a line.
    pub delimiter: char,
    /// `chrono` format string used to read and write the `date` column.
    pub date_format: String,
}

impl Default for CsvDialect {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            date_format: DEFAULT_DATE_FORMAT.to_owned(),
        }
    }
}

impl CsvDialect {
    /// Header written into a newly created file.
    #[must_use]
    pub fn header_line(&self) -> String {
        let mut buffer = [0_u8; 4];
        let separator = self.delimiter.encode_utf8(&mut buffer);
        Column::ALL
            .iter()
            .map(|column| column.name())
            .collect::<Vec<_>>()
            .join(&*separator)
    }

    /// Confirm that rows written with this dialect can be read back.
    ///
    /// The header must split into the column names again and a rendered
    /// date must parse back to the value it was rendered from, truncated to
    /// the precision of the format.
    ///
    /// # Examples
    /// ```
    /// use picturedb_core::{CsvDialect, DialectError};
    ///
    /// assert!(CsvDialect::default().check().is_ok());
    /// let date_only = CsvDialect {
    ///     date_format: String::from("%Y-%m-%d"),
    ///     ..CsvDialect::default()
    /// };
    /// assert!(matches!(
    ///     date_only.check(),
    ///     Err(DialectError::LossyDateFormat { .. })
    /// ));
    /// ```
    pub fn check(&self) -> Result<(), DialectError> {
        let delimiter = self.delimiter;
        if matches!(delimiter, '\n' | '\r') {
            return Err(DialectError::LineBreakDelimiter { delimiter });
        }
        if delimiter.is_ascii_digit() || matches!(delimiter, '.' | '-' | '+') {
            return Err(DialectError::NumericDelimiter { delimiter });
        }
        if let Some(column) = Column::ALL
            .into_iter()
            .find(|column| column.name().contains(delimiter))
        {
            return Err(DialectError::DelimiterInColumnName { delimiter, column });
        }
        self.check_date_format()
    }

    fn check_date_format(&self) -> Result<(), DialectError> {
        let format = self.date_format.as_str();
        let invalid = || DialectError::InvalidDateFormat {
            format: format.to_owned(),
        };
        if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            return Err(invalid());
        }

        // Every component differs, so a format that drops or swaps one shows up.
        let sample = NaiveDate::from_ymd_opt(2001, 2, 3)
            .and_then(|day| day.and_hms_opt(4, 5, 6))
            .ok_or_else(invalid)?;
        let render = |date: NaiveDateTime| {
            let mut text = String::new();
            write!(text, "{}", date.format(format)).map(|()| text)
        };
        let rendered = render(sample).map_err(|_| invalid())?;
        if rendered.contains(self.delimiter) {
            return Err(DialectError::DelimiterInDate {
                format: format.to_owned(),
                delimiter: self.delimiter,
            });
        }

        let lossy = || DialectError::LossyDateFormat {
            format: format.to_owned(),
            rendered: rendered.clone(),
        };
        let parsed = NaiveDateTime::parse_from_str(&rendered, format).map_err(|_| lossy())?;
        if render(parsed).ok().as_deref() != Some(rendered.as_str()) {
            return Err(lossy());
        }
        Ok(())
    }
}
