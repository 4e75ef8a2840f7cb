use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("{dir:?} is not a usable directory: {source}")]
    Directory {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{0:?} names a directory, not a file")]
    NotAFile(PathBuf),
    #[error("writing {path:?} failed: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Create `dir` if missing, then check a file can be created inside it.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    let unusable = |source| PersistError::Directory {
        dir: dir.to_path_buf(),
        source,
    };
    if dir.exists() && !dir.is_dir() {
        return Err(unusable(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "a file is in the way",
        )));
    }
    fs::create_dir_all(dir).map_err(unusable)?;
    NamedTempFile::new_in(dir).map_err(unusable)?;
    Ok(())
}

/// Replace `path` with `content` via a temp file in the same directory, so
/// readers never see a half-written artifact.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<PathBuf, PersistError> {
    if path.file_name().is_none() {
        return Err(PersistError::NotAFile(path.to_path_buf()));
    }
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    ensure_output_dir(dir)?;

    let failed = |source| PersistError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut staged = NamedTempFile::new_in(dir).map_err(failed)?;
    staged.write_all(content).map_err(failed)?;
    staged.as_file().sync_all().map_err(failed)?;
    staged.persist(path).map_err(|err| failed(err.error))?;
    Ok(path.to_path_buf())
}
