use std::{
    ffi::OsString,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use fs_extra::file::CopyOptions;
use kuchikiki::{traits::*, NodeRef};
use log::info;
use tempfile::NamedTempFile;

use super::InsertError;

/// Reads and parses the document. Non UTF-8 content is a parse error.
pub(super) fn load_document(path: &Path) -> Result<NodeRef, InsertError> {
    if !path.is_file() {
        return Err(InsertError::InputNotFound(path.to_owned()));
    }
    let bytes = fs::read(path).map_err(InsertError::io(format!("Error reading file {path:?}")))?;
    let content = String::from_utf8(bytes)
        .map_err(|e| InsertError::Parse(format!("{path:?} is not valid UTF-8 text: {e}")))?;
    Ok(kuchikiki::parse_html().one(content))
}

/// `index.html` -> `index.html.bak`
pub(crate) fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".bak");
    PathBuf::from(name)
}

/// Backs up `path`, then replaces it with `content` through a rename.
///
/// A failed backup leaves `path` untouched. Returns the backup path.
pub(super) fn save_document(path: &Path, content: &str) -> Result<PathBuf, InsertError> {
    let backup = backup_path(path);
    let mut copy_options = CopyOptions::new();
    copy_options.overwrite = true;
    fs_extra::file::copy(path, &backup, &copy_options).map_err(|e| InsertError::Io {
        context: format!("Error creating backup {backup:?}"),
        source: std::io::Error::other(e),
    })?;
    info!("Backup saved as {backup:?}");

    let write_error = || InsertError::io(format!("Error writing file {path:?}"));
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let permissions = fs::metadata(path).map_err(write_error())?.permissions();
    let mut staged = NamedTempFile::new_in(dir).map_err(write_error())?;
    staged.write_all(content.as_bytes()).map_err(write_error())?;
    staged.as_file().sync_all().map_err(write_error())?;
    staged
        .as_file()
        .set_permissions(permissions)
        .map_err(write_error())?;
    staged
        .persist(path)
        .map_err(|e| write_error()(e.error))?;
    info!("Wrote {path:?}");

    Ok(backup)
}
