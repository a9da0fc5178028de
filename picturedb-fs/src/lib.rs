//! Filesystem helpers for the picture store, built on `cap-std` and `camino`.
//!
//! The store addresses its data file by a UTF-8 path supplied by the caller,
//! so every helper here resolves that path against ambient authority and then
//! performs the actual I/O through a capability-scoped directory handle.
#![forbid(unsafe_code)]

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cap_std::fs::OpenOptions;
use cap_std::{ambient_authority, fs_utf8};
use std::io::{self, Write};

/// Open an existing UTF-8 file path for reading using ambient authority.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Return the directory that holds `path`.
///
/// A bare file name such as `pictures.csv` lives in the current directory,
/// which camino reports as an empty parent.
#[must_use]
pub fn parent_dir(path: &Utf8Path) -> &Utf8Path {
    match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    }
}

/// Open the directory containing `path` and return it with the file name.
pub fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} does not name a file")))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent_dir(path), ambient_authority())?;
    Ok((dir, file_name))
}

/// Create every missing directory above `path`.
///
/// `cap-std` refuses absolute paths in `create_dir_all`, so the parent is
/// split into an ambient root (`/`, a drive prefix or `.`) and the relative
/// remainder created beneath it.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() {
        return Ok(());
    }

    let (root, relative) = split_ambient_root(parent);
    if relative.as_str().is_empty() {
        return Ok(());
    }
    let base = fs_utf8::Dir::open_ambient_dir(&root, ambient_authority())?;
    base.create_dir_all(&relative)
}

/// Report whether `path` names a regular file.
///
/// A missing file surfaces as an [`io::ErrorKind::NotFound`] error so callers
/// can tell "absent" apart from "present but not a file".
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_dir_and_file(path)?;
    dir.metadata(name.as_str()).map(|meta| meta.is_file())
}

/// Create `path` with the given contents, failing if it already exists.
///
/// The bytes are flushed to stable storage before returning.
pub fn create_new_file(path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
    let (dir, name) = open_dir_and_file(path)?;
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = dir.open_with(name.as_str(), &options)?;
    file.write_all(contents)?;
    file.sync_all()
}

fn split_ambient_root(parent: &Utf8Path) -> (Utf8PathBuf, Utf8PathBuf) {
    let mut root = Utf8PathBuf::new();
    let mut relative = Utf8PathBuf::new();
    for component in parent.components() {
        match component {
            Utf8Component::Prefix(prefix) => root.push(prefix.as_str()),
            Utf8Component::RootDir => root.push(std::path::MAIN_SEPARATOR_STR),
            other => relative.push(other.as_str()),
        }
    }
    if root.as_str().is_empty() {
        root.push(".");
    }
    (root, relative)
}
