//! Test-only helpers: an in-memory `PictureStore` and picture file writers
//! used by unit and behaviour tests.

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use geo::{Coord, Intersects, Rect};
use url::Url;

use crate::{CsvDialect, Picture, PictureStore, PictureStoreError};

/// In-memory `PictureStore` implementation used in tests.
///
/// The store performs a linear scan and is intended only for small datasets.
/// Identifiers follow the same `max + 1` rule as the file store.
#[derive(Default, Debug, Clone)]
pub struct MemoryStore {
    pictures: Vec<Picture>,
}

impl MemoryStore {
    /// Create a store from pictures that already carry identifiers.
    pub fn with_pictures<I>(pictures: I) -> Self
    where
        I: IntoIterator<Item = Picture>,
    {
        Self {
            pictures: pictures.into_iter().collect(),
        }
    }

    fn position(&self, id: u64) -> Result<usize, PictureStoreError> {
        self.pictures
            .iter()
            .position(|picture| picture.id == id)
            .ok_or(PictureStoreError::NotFound { id })
    }
}

impl PictureStore for MemoryStore {
    fn insert(&mut self, picture: &mut Picture) -> Result<u64, PictureStoreError> {
        let max = self.pictures.iter().map(|p| p.id).max().unwrap_or(0);
        let id = max
            .checked_add(1)
            .ok_or(PictureStoreError::IdentifiersExhausted { max })?;
        picture.id = id;
        self.pictures.push(picture.clone());
        Ok(id)
    }

    fn update(&mut self, picture: &Picture) -> Result<(), PictureStoreError> {
        let index = self.position(picture.id)?;
        if let Some(slot) = self.pictures.get_mut(index) {
            *slot = picture.clone();
        }
        Ok(())
    }

    fn delete(&mut self, picture: &Picture) -> Result<(), PictureStoreError> {
        let index = self.position(picture.id)?;
        self.pictures.remove(index);
        Ok(())
    }

    fn count(&self) -> Result<usize, PictureStoreError> {
        Ok(self.pictures.len())
    }

    fn find_by_id(&self, id: u64) -> Result<Option<Picture>, PictureStoreError> {
        Ok(self.pictures.iter().find(|p| p.id == id).cloned())
    }

    fn find_all(&self) -> Result<Vec<Picture>, PictureStoreError> {
        Ok(self.pictures.clone())
    }

    fn find_in_bbox(&self, bbox: &Rect<f64>) -> Result<Vec<Picture>, PictureStoreError> {
        Ok(self
            .pictures
            .iter()
            // `Intersects` treats boundary points as inside the rectangle.
            .filter(|p| bbox.intersects(&p.location))
            .cloned()
            .collect())
    }
}

/// Fixed timestamp shared by generated pictures.
#[must_use]
pub fn sample_date() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2021, 9, 18)
        .and_then(|day| day.and_hms_opt(14, 5, 30))
        .unwrap_or_default()
}

/// An unstored picture at (`longitude`, `latitude`).
///
/// # Panics
///
/// Panics if the generated URL does not parse.
#[must_use]
pub fn picture_at(longitude: f64, latitude: f64) -> Picture {
    let url = Url::parse(&format!(
        "https://pictures.example.com/{longitude}/{latitude}.jpg"
    ))
    .expect("generated URL parses");
    Picture::new(
        sample_date(),
        Coord {
            x: longitude,
            y: latitude,
        },
        format!("Taken at {longitude}, {latitude}"),
        url,
    )
}

/// Write a picture file containing the default header followed by `rows`.
///
/// # Panics
///
/// Panics if the file cannot be written.
pub fn write_csv(path: impl AsRef<Path>, rows: &[&str]) {
    let mut text = CsvDialect::default().header_line();
    text.push('\n');
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    std::fs::write(path, text).expect("write picture file");
}
