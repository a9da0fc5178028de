//! Core types for the PictureDB record store.
//!
//! Pictures are kept as rows of a single delimiter-separated text file whose
//! first line names the columns. A [`Projection`] maps those names to
//! positions and turns raw rows into typed [`Picture`] values, while
//! [`FilePictureStore`] implements the [`PictureStore`] operations by
//! streaming the file and atomically replacing it on every mutation.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod dialect;
mod picture;
mod projection;
mod store;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use dialect::{Column, CsvDialect, DEFAULT_DATE_FORMAT, DEFAULT_DELIMITER, DialectError};
pub use picture::Picture;
pub use projection::{FieldError, Projection, ProjectionError, Row};
pub use store::{FilePictureStore, PictureStore, PictureStoreError, bounding_square};
