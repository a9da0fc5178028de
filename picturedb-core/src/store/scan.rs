//! Line-by-line reading of a picture file.
//!
//! Every operation reads the header once, builds a [`Projection`] from it and
//! then walks the data lines with a [`Scanner`]. Mutations use
//! [`Scanner::copy_until`] to stream untouched lines into the replacement file
//! while looking for the row they need.

use std::io::{BufRead, Write};

use camino::Utf8Path;

use crate::{FieldError, Projection, Row};

use super::PictureStoreError;

/// First non-blank line of a picture file.
#[derive(Debug, Clone)]
pub(super) struct Header {
    /// Header text without its line terminator.
    pub(super) line: String,
    /// Column names in file order.
    pub(super) columns: Vec<String>,
    /// One-based line number the header was found on.
    pub(super) line_number: usize,
}

/// Read the header, skipping leading blank lines.
pub(super) fn read_header<R: BufRead>(
    reader: &mut R,
    delimiter: char,
    path: &Utf8Path,
) -> Result<Header, PictureStoreError> {
    let mut line = String::new();
    let mut line_number = 0_usize;
    loop {
        line.clear();
        let read = reader
            .read_line(&mut line)
            .map_err(|source| PictureStoreError::io("read header of", path, source))?;
        if read == 0 {
            return Err(PictureStoreError::MissingHeader {
                path: path.to_path_buf(),
            });
        }
        line_number += 1;
        trim_line_ending(&mut line);
        if !line.trim().is_empty() {
            break;
        }
    }

    let columns = line.split(delimiter).map(str::to_owned).collect();
    Ok(Header {
        line,
        columns,
        line_number,
    })
}

/// A data row together with the line it was read from.
#[derive(Debug)]
pub(super) struct Match<'p> {
    pub(super) line: usize,
    pub(super) row: Row<'p>,
}

/// Cursor over the data lines that follow the header.
pub(super) struct Scanner<'p, R> {
    reader: R,
    projection: &'p Projection,
    delimiter: char,
    path: &'p Utf8Path,
    line: usize,
    buffer: String,
}

impl<'p, R: BufRead> Scanner<'p, R> {
    pub(super) const fn new(
        reader: R,
        projection: &'p Projection,
        delimiter: char,
        path: &'p Utf8Path,
        line: usize,
    ) -> Self {
        Self {
            reader,
            projection,
            delimiter,
            path,
            line,
            buffer: String::new(),
        }
    }

    pub(super) const fn projection(&self) -> &'p Projection {
        self.projection
    }

    /// Next non-blank data row, or `None` at end of file.
    pub(super) fn next_row(&mut self) -> Result<Option<Match<'p>>, PictureStoreError> {
        while self.advance()? {
            if !self.buffer.trim().is_empty() {
                return Ok(Some(Match {
                    line: self.line,
                    row: self.projection.split(&self.buffer, self.delimiter),
                }));
            }
        }
        Ok(None)
    }

    /// Copy lines to `writer` until `matches` accepts a row.
    ///
    /// The accepted row is returned instead of being copied and the reader is
    /// left just after it. Blank lines are copied without being tested. A
    /// predicate failure aborts the scan as a corrupt row.
    pub(super) fn copy_until<F>(
        &mut self,
        writer: &mut dyn Write,
        mut matches: F,
    ) -> Result<Option<Match<'p>>, PictureStoreError>
    where
        F: FnMut(&Row<'p>) -> Result<bool, FieldError>,
    {
        while self.advance()? {
            if !self.buffer.trim().is_empty() {
                let row = self.projection.split(&self.buffer, self.delimiter);
                if matches(&row).map_err(|source| self.corrupt(self.line, source))? {
                    return Ok(Some(Match {
                        line: self.line,
                        row,
                    }));
                }
            }
            write_text_line(writer, &self.buffer, self.path)?;
        }
        Ok(None)
    }

    /// Copy every remaining line to `writer`, terminated with LF.
    pub(super) fn copy_rest(&mut self, writer: &mut dyn Write) -> Result<(), PictureStoreError> {
        while self.advance()? {
            write_text_line(writer, &self.buffer, self.path)?;
        }
        Ok(())
    }

    pub(super) fn write_row(
        &self,
        writer: &mut dyn Write,
        row: &Row<'_>,
    ) -> Result<(), PictureStoreError> {
        write_text_line(writer, &row.join(self.delimiter), self.path)
    }

    pub(super) fn write_header(
        &self,
        writer: &mut dyn Write,
        header: &Header,
    ) -> Result<(), PictureStoreError> {
        write_text_line(writer, &header.line, self.path)
    }

    pub(super) fn corrupt(&self, line: usize, source: FieldError) -> PictureStoreError {
        PictureStoreError::Corrupt {
            path: self.path.to_path_buf(),
            line,
            source,
        }
    }

    fn advance(&mut self) -> Result<bool, PictureStoreError> {
        self.buffer.clear();
        let read = self
            .reader
            .read_line(&mut self.buffer)
            .map_err(|source| PictureStoreError::io("read", self.path, source))?;
        if read == 0 {
            return Ok(false);
        }
        self.line += 1;
        trim_line_ending(&mut self.buffer);
        Ok(true)
    }
}

pub(super) fn write_text_line(
    writer: &mut dyn Write,
    line: &str,
    path: &Utf8Path,
) -> Result<(), PictureStoreError> {
    writer
        .write_all(line.as_bytes())
        .and_then(|()| writer.write_all(b"\n"))
        .map_err(|source| PictureStoreError::io("write replacement for", path, source))
}

fn trim_line_ending(line: &mut String) {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
}
