use chrono::NaiveDateTime;
use geo::Coord;
use url::Url;

/// A geotagged picture entry.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`. The
/// identifier belongs to the store: callers build pictures with
/// [`Picture::new`], which leaves the id at `0`, and the store writes the
/// assigned value back on insert.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use geo::Coord;
/// use picturedb_core::Picture;
/// use url::Url;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let taken = NaiveDate::from_ymd_opt(2024, 5, 1)
///     .and_then(|day| day.and_hms_opt(12, 30, 0))
///     .ok_or("invalid date")?;
/// let picture = Picture::new(
///     taken,
///     Coord { x: 8.72, y: 47.49 },
///     "Winterthur old town",
///     Url::parse("https://example.com/winterthur.jpg")?,
/// );
///
/// assert_eq!(picture.id, 0);
/// assert_eq!(picture.longitude(), 8.72);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Picture {
    /// Store-assigned identifier; `0` until the picture has been inserted.
    pub id: u64,
    /// Moment the picture was taken.
    pub date: NaiveDateTime,
    /// Geospatial position.
    pub location: Coord<f64>,
    /// Free-text caption.
    pub title: String,
    /// Where the image itself lives.
    pub url: Url,
}

impl Picture {
    /// Construct a picture that has not been stored yet.
    pub fn new(
        date: NaiveDateTime,
        location: Coord<f64>,
        title: impl Into<String>,
        url: Url,
    ) -> Self {
        Self {
            id: 0,
            date,
            location,
            title: title.into(),
            url,
        }
    }

    /// Return the same picture carrying `id`.
    #[must_use]
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.location.x
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.location.y
    }
}
