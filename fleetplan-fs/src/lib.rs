//! Capability-based file access for the fleetplan tools.
//!
//! Every helper opens an ambient directory handle for the anchor of a path
//! (the filesystem root, a drive prefix or the working directory) and
//! resolves the remainder relative to it with `cap-std`.
#![forbid(unsafe_code)]

use std::io::{self, Read};

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};

/// Read a whole UTF-8 text file.
///
/// # Errors
///
/// Returns the underlying IO error if the file cannot be opened or is not
/// valid UTF-8.
pub fn read_utf8(path: &Utf8Path) -> io::Result<String> {
    let mut file = fs_utf8::File::open_ambient(path, ambient_authority())?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Write `contents` to `path`, creating missing parent directories.
///
/// # Errors
///
/// Returns the underlying IO error if a directory cannot be created or the
/// file cannot be written.
pub fn write_utf8(path: &Utf8Path, contents: &str) -> io::Result<()> {
    ensure_parent_dir(path)?;
    let (dir, name) = open_parent(path)?;
    dir.write(name, contents)
}

/// Whether the entry at `path` is a regular file.
///
/// # Errors
///
/// Returns [`io::ErrorKind::NotFound`] if the entry or its parent directory
/// is missing, or the underlying IO error if it cannot be inspected.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_parent(path)?;
    dir.metadata(&name).map(|meta| meta.is_file())
}

/// Create every missing directory above `path`.
///
/// # Errors
///
/// Returns the underlying IO error if a directory cannot be created.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    let (base, relative) = anchor(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    base.create_dir_all(&relative)
}

/// Open the directory holding `path` and return it with the file name.
fn open_parent(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{path} does not name a file"),
        )
    })?;
    let parent = path.parent().unwrap_or_else(|| Utf8Path::new(""));
    let (base, relative) = anchor(parent)?;
    let dir = if relative.as_str().is_empty() {
        base
    } else {
        base.open_dir(&relative)?
    };
    Ok((dir, Utf8PathBuf::from(name)))
}

/// Split `path` into an ambient handle on its anchor and the path relative
/// to that anchor.
fn anchor(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let mut rest = path.components();
    let base = match rest.clone().next() {
        Some(Utf8Component::Prefix(prefix)) => {
            rest.next();
            if matches!(rest.clone().next(), Some(Utf8Component::RootDir)) {
                rest.next();
            }
            Utf8PathBuf::from(format!("{}{}", prefix.as_str(), std::path::MAIN_SEPARATOR))
        }
        Some(Utf8Component::RootDir) => {
            rest.next();
            Utf8PathBuf::from(std::path::MAIN_SEPARATOR_STR)
        }
        _ => Utf8PathBuf::from("."),
    };
    let dir = fs_utf8::Dir::open_ambient_dir(&base, ambient_authority())?;
    Ok((dir, rest.as_path().to_path_buf()))
}
