//! Picture store backed by a single delimiter-separated text file.
//!
//! The file is the only source of truth: every call opens it, reads the
//! header and streams the data lines. Mutations stream into a replacement
//! file and rename it over the original, so a failed call leaves the store
//! exactly as it was.

use std::io::{self, BufReader, Write};

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::fs_utf8;
use geo::{Intersects, Rect};
use log::{debug, info, warn};

use super::{
    PictureStore, PictureStoreError, ensure_storable,
    rewrite::Rewrite,
    scan::{Header, Match, Scanner, read_header, write_text_line},
};
use crate::{Column, CsvDialect, FieldError, Picture, Projection};

type Reader = BufReader<fs_utf8::File>;

/// [`PictureStore`] persisting pictures as rows of a text file.
///
/// # Examples
///
/// ```rust
/// use picturedb_core::{CsvDialect, FilePictureStore, PictureStore};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dir = tempfile::tempdir()?;
/// let path = camino::Utf8PathBuf::from_path_buf(dir.path().join("albums/pictures.csv"))
///     .map_err(|_| "non UTF-8 temp dir")?;
/// let dialect = CsvDialect {
///     delimiter: '|',
///     ..CsvDialect::default()
/// };
/// let store = FilePictureStore::open_with_dialect(&path, dialect)?;
///
/// assert_eq!(store.count()?, 0);
/// assert_eq!(
///     std::fs::read_to_string(&path)?,
///     "id|date|longitude|latitude|title|url\n"
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FilePictureStore {
    path: Utf8PathBuf,
    dialect: CsvDialect,
}

impl FilePictureStore {
    /// Open the store at `path` using the default dialect.
    ///
    /// See [`open_with_dialect`](Self::open_with_dialect).
    pub fn open(path: impl AsRef<Utf8Path>) -> Result<Self, PictureStoreError> {
        Self::open_with_dialect(path, CsvDialect::default())
    }

    /// Open the store at `path`, reading and writing rows with `dialect`.
    ///
    /// The dialect is checked before the disk is touched. Missing parent
    /// directories and a missing file are created; a file without a header
    /// is given one. An existing header is validated
    /// straight away, so a file lacking a required column is rejected here
    /// rather than on first use.
    pub fn open_with_dialect(
        path: impl AsRef<Utf8Path>,
        dialect: CsvDialect,
    ) -> Result<Self, PictureStoreError> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
            dialect,
        };
        store.prepare()?;
        Ok(store)
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Delimiter and date format used for every row.
    #[must_use]
    pub const fn dialect(&self) -> &CsvDialect {
        &self.dialect
    }

    fn prepare(&self) -> Result<(), PictureStoreError> {
        self.dialect
            .check()
            .map_err(|source| PictureStoreError::Dialect {
                path: self.path.clone(),
                source,
            })?;

        picturedb_fs::ensure_parent_dir(&self.path).map_err(|source| {
            PictureStoreError::io("create parent directory of", &self.path, source)
        })?;

        match picturedb_fs::file_is_file(&self.path) {
            Ok(true) => {}
            Ok(false) => {
                return Err(PictureStoreError::NotAFile {
                    path: self.path.clone(),
                });
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                let contents = format!("{}\n", self.dialect.header_line());
                picturedb_fs::create_new_file(&self.path, contents.as_bytes())
                    .map_err(|source| PictureStoreError::io("create", &self.path, source))?;
                info!("created picture store {}", self.path);
                return Ok(());
            }
            Err(source) => return Err(PictureStoreError::io("inspect", &self.path, source)),
        }

        let header = {
            let mut reader = self.open_reader()?;
            match read_header(&mut reader, self.dialect.delimiter, &self.path) {
                Ok(header) => Some(header),
                Err(PictureStoreError::MissingHeader { .. }) => None,
                Err(err) => return Err(err),
            }
        };
        match header {
            Some(header) => self.projection(&header).map(drop),
            None => self.initialise(),
        }
    }

    /// Give a blank existing file its header.
    fn initialise(&self) -> Result<(), PictureStoreError> {
        let rewrite = Rewrite::begin(&self.path)?;
        {
            let mut writer = rewrite.writer();
            write_text_line(&mut writer, &self.dialect.header_line(), &self.path)?;
            writer.flush().map_err(|source| {
                PictureStoreError::io("write replacement for", &self.path, source)
            })?;
        }
        rewrite.commit()?;
        info!("wrote header into blank picture store {}", self.path);
        Ok(())
    }

    fn open_reader(&self) -> Result<Reader, PictureStoreError> {
        picturedb_fs::open_utf8_file(&self.path)
            .map(BufReader::new)
            .map_err(|source| PictureStoreError::io("open", &self.path, source))
    }

    fn projection(&self, header: &Header) -> Result<Projection, PictureStoreError> {
        Projection::new(self.dialect.date_format.as_str(), &header.columns).map_err(|source| {
            PictureStoreError::Header {
                path: self.path.clone(),
                source,
            }
        })
    }

    /// Run `visit` over the data lines of the file.
    fn read<T>(
        &self,
        visit: impl FnOnce(&mut Scanner<'_, Reader>) -> Result<T, PictureStoreError>,
    ) -> Result<T, PictureStoreError> {
        let mut reader = self.open_reader()?;
        let header = read_header(&mut reader, self.dialect.delimiter, &self.path)?;
        let projection = self.projection(&header)?;
        let mut scanner = Scanner::new(
            reader,
            &projection,
            self.dialect.delimiter,
            &self.path,
            header.line_number,
        );
        visit(&mut scanner)
    }

    /// Stream the file through `edit` into a replacement and swap it in.
    ///
    /// The header is copied before `edit` runs. If `edit` fails nothing is
    /// renamed and the temporary file is removed.
    fn rewrite<T>(
        &self,
        edit: impl FnOnce(&mut Scanner<'_, Reader>, &mut dyn Write) -> Result<T, PictureStoreError>,
    ) -> Result<T, PictureStoreError> {
        let mut reader = self.open_reader()?;
        let header = read_header(&mut reader, self.dialect.delimiter, &self.path)?;
        let projection = self.projection(&header)?;
        let rewrite = Rewrite::begin(&self.path)?;

        let outcome = {
            let mut scanner = Scanner::new(
                reader,
                &projection,
                self.dialect.delimiter,
                &self.path,
                header.line_number,
            );
            let mut writer = rewrite.writer();
            scanner.write_header(&mut writer, &header)?;
            let outcome = edit(&mut scanner, &mut writer)?;
            writer.flush().map_err(|source| {
                PictureStoreError::io("write replacement for", &self.path, source)
            })?;
            outcome
        };

        rewrite.commit()?;
        Ok(outcome)
    }

    /// Collect every readable picture accepted by `keep`.
    fn collect(
        &self,
        mut keep: impl FnMut(&Picture) -> bool,
    ) -> Result<Vec<Picture>, PictureStoreError> {
        self.read(|scanner| {
            let mut pictures = Vec::new();
            while let Some(Match { line, row }) = scanner.next_row()? {
                match row.to_picture() {
                    Ok(picture) if keep(&picture) => pictures.push(picture),
                    Ok(_) => {}
                    Err(err) => warn!("skipping unreadable row at {}:{line}: {err}", self.path),
                }
            }
            Ok(pictures)
        })
    }
}

/// Date rendering is checked up front by [`ensure_storable`]; a late failure
/// is reported the same way.
fn unrenderable(_: FieldError) -> PictureStoreError {
    PictureStoreError::Precondition {
        field: Column::Date,
        reason: "cannot be rendered with the configured date format",
    }
}

impl PictureStore for FilePictureStore {
    fn insert(&mut self, picture: &mut Picture) -> Result<u64, PictureStoreError> {
        ensure_storable(picture, &self.dialect)?;
        let stored: &Picture = picture;
        let id = self.rewrite(|scanner, writer| {
            let mut max = 0_u64;
            scanner.copy_until(writer, |row| {
                max = max.max(row.id()?);
                Ok(false)
            })?;
            let id = max
                .checked_add(1)
                .ok_or(PictureStoreError::IdentifiersExhausted { max })?;

            let mut row = scanner.projection().blank_row();
            row.assign_id(id);
            row.apply(stored).map_err(unrenderable)?;
            scanner.write_row(writer, &row)?;
            Ok(id)
        })?;

        picture.id = id;
        debug!("inserted picture {id} into {}", self.path);
        Ok(id)
    }

    fn update(&mut self, picture: &Picture) -> Result<(), PictureStoreError> {
        ensure_storable(picture, &self.dialect)?;
        let id = picture.id;
        self.rewrite(|scanner, writer| {
            let Some(Match { line, mut row }) =
                scanner.copy_until(writer, |row| Ok(row.id()? == id))?
            else {
                return Err(PictureStoreError::NotFound { id });
            };
            row.to_picture()
                .map_err(|source| scanner.corrupt(line, source))?;
            row.apply(picture).map_err(unrenderable)?;
            scanner.write_row(writer, &row)?;
            scanner.copy_rest(writer)
        })?;
        debug!("updated picture {id} in {}", self.path);
        Ok(())
    }

    fn delete(&mut self, picture: &Picture) -> Result<(), PictureStoreError> {
        let id = picture.id;
        self.rewrite(|scanner, writer| {
            let Some(Match { line, row }) =
                scanner.copy_until(writer, |row| Ok(row.id()? == id))?
            else {
                return Err(PictureStoreError::NotFound { id });
            };
            row.to_picture()
                .map_err(|source| scanner.corrupt(line, source))?;
            scanner.copy_rest(writer)
        })?;
        debug!("deleted picture {id} from {}", self.path);
        Ok(())
    }

    fn count(&self) -> Result<usize, PictureStoreError> {
        self.read(|scanner| {
            let mut rows = 0_usize;
            while scanner.next_row()?.is_some() {
                rows += 1;
            }
            Ok(rows)
        })
    }

    fn find_by_id(&self, id: u64) -> Result<Option<Picture>, PictureStoreError> {
        self.read(|scanner| {
            while let Some(Match { line, row }) = scanner.next_row()? {
                let found = row.id().map_err(|source| scanner.corrupt(line, source))?;
                if found == id {
                    return row
                        .to_picture()
                        .map(Some)
                        .map_err(|source| scanner.corrupt(line, source));
                }
            }
            Ok(None)
        })
    }

    fn find_all(&self) -> Result<Vec<Picture>, PictureStoreError> {
        self.collect(|_| true)
    }

    fn find_in_bbox(&self, bbox: &Rect<f64>) -> Result<Vec<Picture>, PictureStoreError> {
        // `Intersects` treats boundary points as inside the rectangle.
        self.collect(|picture| bbox.intersects(&picture.location))
    }
}
