//! Facade crate for the PictureDB record store.
//!
//! This crate re-exports the picture model, the row projection and the
//! file-backed store from `picturedb-core`.

#![forbid(unsafe_code)]

pub use picturedb_core::{
    Column, CsvDialect, DEFAULT_DATE_FORMAT, DEFAULT_DELIMITER, DialectError, FieldError,
    FilePictureStore, Picture, PictureStore, PictureStoreError, Projection, ProjectionError, Row,
    bounding_square,
};

#[cfg(feature = "test-support")]
pub use picturedb_core::test_support;
