//! Data access for pictures.
//!
//! The [`PictureStore`] trait is the datasource interface: CRUD plus an
//! axis-aligned spatial query. [`FilePictureStore`] implements it over a
//! delimiter-separated text file.

use std::fmt::Write as _;

use geo::{Coord, Rect};

use crate::{Column, CsvDialect, Picture};

mod error;
mod file;
mod rewrite;
mod scan;

pub use error::PictureStoreError;
pub use file::FilePictureStore;

/// Create, read, update and delete access to stored pictures.
///
/// Identifiers are owned by the store: [`insert`](Self::insert) assigns the
/// next one and writes it back into the caller's picture, while
/// [`update`](Self::update) and [`delete`](Self::delete) address the row by
/// the picture's current `id`.
///
/// # Examples
///
/// ```rust
/// use chrono::NaiveDate;
/// use geo::Coord;
/// use picturedb_core::{FilePictureStore, Picture, PictureStore};
/// use url::Url;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dir = tempfile::tempdir()?;
/// let path = camino::Utf8PathBuf::from_path_buf(dir.path().join("pictures.csv"))
///     .map_err(|_| "non UTF-8 temp dir")?;
/// let mut store = FilePictureStore::open(&path)?;
///
/// let taken = NaiveDate::from_ymd_opt(2023, 8, 4)
///     .and_then(|day| day.and_hms_opt(10, 0, 0))
///     .ok_or("invalid date")?;
/// let mut picture = Picture::new(
///     taken,
///     Coord { x: 7.44, y: 46.95 },
///     "Bern",
///     Url::parse("https://example.com/bern.jpg")?,
/// );
/// store.insert(&mut picture)?;
///
/// assert_eq!(picture.id, 1);
/// assert_eq!(store.find_by_position(7.4, 46.9, 0.1)?, vec![picture]);
/// # Ok(())
/// # }
/// ```
pub trait PictureStore {
    /// Store `picture` under a fresh identifier and return that identifier.
    ///
    /// The identifier is one greater than the largest already stored (`1`
    /// for an empty store); identifiers of deleted pictures below the maximum
    /// are never handed out again.
    fn insert(&mut self, picture: &mut Picture) -> Result<u64, PictureStoreError>;

    /// Replace the stored fields of the picture with `picture.id`.
    fn update(&mut self, picture: &Picture) -> Result<(), PictureStoreError>;

    /// Remove the picture with `picture.id`.
    fn delete(&mut self, picture: &Picture) -> Result<(), PictureStoreError>;

    /// Number of stored pictures.
    fn count(&self) -> Result<usize, PictureStoreError>;

    /// Look up a picture by identifier.
    fn find_by_id(&self, id: u64) -> Result<Option<Picture>, PictureStoreError>;

    /// Every readable picture, in storage order.
    fn find_all(&self) -> Result<Vec<Picture>, PictureStoreError>;

    /// Pictures whose location lies inside `bbox`, boundary included.
    ///
    /// Coordinates use WGS84 with axis order (longitude, latitude). Regions
    /// crossing the antimeridian must be split into two queries.
    fn find_in_bbox(&self, bbox: &Rect<f64>) -> Result<Vec<Picture>, PictureStoreError>;

    /// Pictures within `deviation` degrees of the given position on each axis.
    ///
    /// The region is the square returned by [`bounding_square`], not a
    /// circle.
    fn find_by_position(
        &self,
        longitude: f64,
        latitude: f64,
        deviation: f64,
    ) -> Result<Vec<Picture>, PictureStoreError> {
        self.find_in_bbox(&bounding_square(
            Coord {
                x: longitude,
                y: latitude,
            },
            deviation,
        ))
    }
}

/// Axis-aligned square extending `deviation` from `centre` on both axes.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use picturedb_core::bounding_square;
///
/// let square = bounding_square(Coord { x: 10.0, y: 20.0 }, 0.5);
/// assert_eq!(square.min(), Coord { x: 9.5, y: 19.5 });
/// assert_eq!(square.max(), Coord { x: 10.5, y: 20.5 });
/// ```
#[must_use]
pub fn bounding_square(centre: Coord<f64>, deviation: f64) -> Rect<f64> {
    let reach = deviation.abs();
    Rect::new(
        Coord {
            x: centre.x - reach,
            y: centre.y - reach,
        },
        Coord {
            x: centre.x + reach,
            y: centre.y + reach,
        },
    )
}

/// Reject pictures whose fields would break the row layout.
///
/// Fields are written without quoting, so a delimiter or line break inside a
/// value would split it across columns or lines.
pub(crate) fn ensure_storable(
    picture: &Picture,
    dialect: &CsvDialect,
) -> Result<(), PictureStoreError> {
    let precondition = |field, reason| Err(PictureStoreError::Precondition { field, reason });

    if picture.title.contains(dialect.delimiter) {
        return precondition(Column::Title, "contains the field delimiter");
    }
    if picture.title.contains(['\n', '\r']) {
        return precondition(Column::Title, "contains a line break");
    }
    if picture.url.as_str().contains(dialect.delimiter) {
        return precondition(Column::Url, "contains the field delimiter");
    }
    for (field, value) in [
        (Column::Longitude, picture.location.x),
        (Column::Latitude, picture.location.y),
    ] {
        if value.to_string().contains(dialect.delimiter) {
            return precondition(field, "renders with the field delimiter");
        }
    }
    let mut rendered = String::new();
    if write!(rendered, "{}", picture.date.format(&dialect.date_format)).is_err() {
        return precondition(Column::Date, "cannot be rendered with the configured date format");
    }
    if rendered.contains(dialect.delimiter) {
        return precondition(Column::Date, "renders with the field delimiter");
    }
    Ok(())
}
