//! Temporary-file lifecycle for whole-file rewrites.
//!
//! The replacement is written next to the store file so the final step is a
//! single same-filesystem rename over the original. Until [`Rewrite::commit`]
//! succeeds the original is never touched; dropping an uncommitted
//! [`Rewrite`] deletes its temporary file.

use std::{fs::File, io::BufWriter};

use camino::Utf8Path;
use log::error;
use tempfile::{NamedTempFile, PersistError};

use super::PictureStoreError;

const TEMP_PREFIX: &str = ".picturedb-";
const TEMP_SUFFIX: &str = ".tmp";

/// A replacement for `target` that is being written.
#[derive(Debug)]
pub(super) struct Rewrite<'a> {
    target: &'a Utf8Path,
    temp: NamedTempFile,
}

impl<'a> Rewrite<'a> {
    /// Create an empty temporary file in the directory of `target`.
    pub(super) fn begin(target: &'a Utf8Path) -> Result<Self, PictureStoreError> {
        let temp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(picturedb_fs::parent_dir(target))
            .map_err(|source| {
                PictureStoreError::io("create temporary file next to", target, source)
            })?;
        Ok(Self { target, temp })
    }

    /// Buffered writer over the temporary file.
    pub(super) fn writer(&self) -> BufWriter<&File> {
        BufWriter::new(self.temp.as_file())
    }

    /// Flush the temporary file to disk and rename it over the target.
    pub(super) fn commit(self) -> Result<(), PictureStoreError> {
        self.temp
            .as_file()
            .sync_all()
            .map_err(|source| PictureStoreError::io("sync replacement for", self.target, source))?;
        match self.temp.persist(self.target) {
            Ok(_) => Ok(()),
            Err(err) => Err(failed_replace(self.target, err)),
        }
    }
}

/// Classify a failed rename.
///
/// While the original still exists the temporary file is simply dropped. If
/// the original is gone the rewritten data is the only copy left, so it is
/// kept on disk and reported.
fn failed_replace(target: &Utf8Path, err: PersistError) -> PictureStoreError {
    let PersistError { error, file } = err;
    match picturedb_fs::file_is_file(target) {
        Err(probe) if probe.kind() == std::io::ErrorKind::NotFound => {
            let recovered = file.keep().map(|(_, path)| path).ok();
            error!("{target} vanished during replace; rewritten data kept at {recovered:?}");
            PictureStoreError::Inconsistent {
                path: target.to_path_buf(),
                recovered,
                source: error,
            }
        }
        _ => PictureStoreError::io("replace", target, error),
    }
}
