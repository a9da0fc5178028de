//! Typed view over the raw text fields of one picture row.
//!
//! A [`Projection`] is built once per operation from the file header and
//! maps each semantic [`Column`] to its position. Every line scanned from the
//! file is then bound into a fresh [`Row`], whose accessors parse the field at
//! that position and whose mutators write a [`Picture`] back as text.

use std::fmt::Write as _;
use std::num::{ParseFloatError, ParseIntError};

use chrono::NaiveDateTime;
use chrono::format::{Item, StrftimeItems};
use geo::Coord;
use thiserror::Error;
use url::Url;

use crate::{Column, Picture};

/// Error raised when a header cannot describe a picture row.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProjectionError {
    /// A required column name is absent from the header.
    #[error("header is missing required column `{column}`")]
    MissingColumn {
        /// Column that could not be located.
        column: Column,
    },
    /// The configured date format contains an invalid specifier.
    #[error("date format {format:?} is not a valid strftime pattern")]
    InvalidDateFormat {
        /// Offending format string.
        format: String,
    },
}

/// Error raised when a field cannot be converted to or from its typed form.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FieldError {
    /// The row ends before the column's position.
    #[error("row has no `{column}` field")]
    Missing {
        /// Column whose field is absent.
        column: Column,
    },
    /// The field is not a non-negative integer.
    #[error("invalid {column} {value:?}: {source}")]
    Integer {
        /// Column being parsed.
        column: Column,
        /// Raw field text.
        value: String,
        /// Integer parser failure.
        source: ParseIntError,
    },
    /// The field is not a floating-point number.
    #[error("invalid {column} {value:?}: {source}")]
    Float {
        /// Column being parsed.
        column: Column,
        /// Raw field text.
        value: String,
        /// Float parser failure.
        source: ParseFloatError,
    },
    /// The field does not match the configured date format.
    #[error("invalid {column} {value:?}: {source}")]
    Date {
        /// Column being parsed.
        column: Column,
        /// Raw field text.
        value: String,
        /// `chrono` parser failure.
        source: chrono::ParseError,
    },
    /// The field is not a well-formed URL.
    #[error("invalid {column} {value:?}: {source}")]
    Url {
        /// Column being parsed.
        column: Column,
        /// Raw field text.
        value: String,
        /// URL parser failure.
        source: url::ParseError,
    },
    /// A value could not be rendered with the configured date format.
    #[error("cannot render {column} with format {format:?}")]
    Unformattable {
        /// Column being written.
        column: Column,
        /// Format string that failed.
        format: String,
    },
}

/// Column positions resolved from a header.
///
/// # Examples
/// ```
/// use picturedb_core::{Column, Projection};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let header = ["title", "id", "url", "date", "latitude", "longitude"];
/// let projection = Projection::new("%Y-%m-%d %H:%M:%S", &header)?;
/// let row = projection.split("Harbour;7;https://example.com/h.jpg;2021-06-01 08:00:00;53.5;9.9", ';');
///
/// assert_eq!(projection.offset(Column::Id), 1);
/// assert_eq!(row.id()?, 7);
/// assert_eq!(row.title()?, "Harbour");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    date_format: String,
    width: usize,
    id: usize,
    date: usize,
    longitude: usize,
    latitude: usize,
    title: usize,
    url: usize,
}

impl Projection {
    /// Resolve every required column in `header`.
    ///
    /// Extra columns are allowed; when a name repeats, the first occurrence
    /// is used.
    pub fn new<S: AsRef<str>>(
        date_format: impl Into<String>,
        header: &[S],
    ) -> Result<Self, ProjectionError> {
        let date_format = date_format.into();
        if StrftimeItems::new(&date_format).any(|item| matches!(item, Item::Error)) {
            return Err(ProjectionError::InvalidDateFormat {
                format: date_format,
            });
        }

        let locate = |column: Column| {
            header
                .iter()
                .position(|name| name.as_ref() == column.name())
                .ok_or(ProjectionError::MissingColumn { column })
        };

        Ok(Self {
            id: locate(Column::Id)?,
            date: locate(Column::Date)?,
            longitude: locate(Column::Longitude)?,
            latitude: locate(Column::Latitude)?,
            title: locate(Column::Title)?,
            url: locate(Column::Url)?,
            width: header.len(),
            date_format,
        })
    }

    /// Number of columns declared by the header.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Format string used for the `date` column.
    #[must_use]
    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Position of `column` within a row.
    #[must_use]
    pub const fn offset(&self, column: Column) -> usize {
        match column {
            Column::Id => self.id,
            Column::Date => self.date,
            Column::Longitude => self.longitude,
            Column::Latitude => self.latitude,
            Column::Title => self.title,
            Column::Url => self.url,
        }
    }

    /// Bind already-split fields to this projection.
    #[must_use]
    pub const fn bind(&self, fields: Vec<String>) -> Row<'_> {
        Row {
            projection: self,
            fields,
        }
    }

    /// Split `line` on `delimiter` and bind the resulting fields.
    #[must_use]
    pub fn split(&self, line: &str, delimiter: char) -> Row<'_> {
        self.bind(line.split(delimiter).map(str::to_owned).collect())
    }

    /// A row of empty fields spanning the whole header, used for inserts.
    #[must_use]
    pub fn blank_row(&self) -> Row<'_> {
        self.bind(vec![String::new(); self.width])
    }
}

/// One line of the picture file viewed through a [`Projection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row<'p> {
    projection: &'p Projection,
    fields: Vec<String>,
}

impl Row<'_> {
    /// Raw text fields in file order.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Render the row as a line of text without a terminator.
    #[must_use]
    pub fn join(&self, delimiter: char) -> String {
        let mut line = String::new();
        for (index, field) in self.fields.iter().enumerate() {
            if index > 0 {
                line.push(delimiter);
            }
            line.push_str(field);
        }
        line
    }

    /// Identifier stored in the `id` column.
    pub fn id(&self) -> Result<u64, FieldError> {
        let value = self.raw(Column::Id)?;
        value.parse().map_err(|source| FieldError::Integer {
            column: Column::Id,
            value: value.to_owned(),
            source,
        })
    }

    /// Caption stored in the `title` column.
    pub fn title(&self) -> Result<&str, FieldError> {
        self.raw(Column::Title)
    }

    /// Image location stored in the `url` column.
    pub fn url(&self) -> Result<Url, FieldError> {
        let value = self.raw(Column::Url)?;
        Url::parse(value).map_err(|source| FieldError::Url {
            column: Column::Url,
            value: value.to_owned(),
            source,
        })
    }

    /// Longitude stored in the `longitude` column.
    pub fn longitude(&self) -> Result<f64, FieldError> {
        self.float(Column::Longitude)
    }

    /// Latitude stored in the `latitude` column.
    pub fn latitude(&self) -> Result<f64, FieldError> {
        self.float(Column::Latitude)
    }

    /// Timestamp stored in the `date` column.
    pub fn date(&self) -> Result<NaiveDateTime, FieldError> {
        let value = self.raw(Column::Date)?;
        NaiveDateTime::parse_from_str(value, &self.projection.date_format).map_err(|source| {
            FieldError::Date {
                column: Column::Date,
                value: value.to_owned(),
                source,
            }
        })
    }

    /// Parse every column into a [`Picture`], stopping at the first failure.
    pub fn to_picture(&self) -> Result<Picture, FieldError> {
        Ok(Picture {
            id: self.id()?,
            date: self.date()?,
            location: Coord {
                x: self.longitude()?,
                y: self.latitude()?,
            },
            title: self.title()?.to_owned(),
            url: self.url()?,
        })
    }

    /// Overwrite every column except `id` with the fields of `picture`.
    ///
    /// Columns the header declares beyond the picture's own are left as they
    /// are; a short row is padded to the header's width first.
    pub fn apply(&mut self, picture: &Picture) -> Result<(), FieldError> {
        let mut date = String::new();
        write!(date, "{}", picture.date.format(&self.projection.date_format)).map_err(|_| {
            FieldError::Unformattable {
                column: Column::Date,
                format: self.projection.date_format.clone(),
            }
        })?;

        self.set(Column::Date, date);
        self.set(Column::Longitude, picture.location.x.to_string());
        self.set(Column::Latitude, picture.location.y.to_string());
        self.set(Column::Title, picture.title.clone());
        self.set(Column::Url, picture.url.to_string());
        Ok(())
    }

    /// Write the store-assigned identifier.
    pub(crate) fn assign_id(&mut self, id: u64) {
        self.set(Column::Id, id.to_string());
    }

    fn raw(&self, column: Column) -> Result<&str, FieldError> {
        self.fields
            .get(self.projection.offset(column))
            .map(String::as_str)
            .ok_or(FieldError::Missing { column })
    }

    fn float(&self, column: Column) -> Result<f64, FieldError> {
        let value = self.raw(column)?;
        value.parse().map_err(|source| FieldError::Float {
            column,
            value: value.to_owned(),
            source,
        })
    }

    fn set(&mut self, column: Column, value: String) {
        let offset = self.projection.offset(column);
        let width = self.projection.width.max(offset.saturating_add(1));
        if self.fields.len() < width {
            self.fields.resize(width, String::new());
        }
        if let Some(slot) = self.fields.get_mut(offset) {
            *slot = value;
        }
    }
}
