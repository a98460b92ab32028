use std::path::{Path, PathBuf};
use std::{fs, io};

use modcheck_manifest::{DEFAULT_MANIFEST_PATH, ManifestError, ServerManifest};

#[derive(thiserror::Error, Debug)]
#[must_use]
pub enum PersistError {
    #[error("An I/O error occurred, path at fault: {path:?}")]
    Io { source: io::Error, path: PathBuf },

    #[error("The file at {path:?} is not a valid server manifest")]
    Manifest {
        source: ManifestError,
        path: PathBuf,
    },
}

impl PersistError {
    pub const fn io(source: io::Error, path: PathBuf) -> Self {
        Self::Io { source, path }
    }
}

/// A trait that represents an entity (type) that is persisted in a text file.
pub trait PersistedEntity: Sized {
    /// The path where this entity is conventionally persisted.
    const FILE_PATH: &'static str;

    /// Parses an instance of [`Self`] out of the file's contents.
    fn parse(text: &str) -> Result<Self, ManifestError>;

    /// Reads an instance of [`Self`] from `path`.
    ///
    /// # Errors
    ///
    /// This function will return an error if there is an error reading
    /// `path` or its contents don't represent a valid [`Self`].
    fn read_from(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let path = path.as_ref();
        let text = read_text(path)?;
        let entity = Self::parse(&text).map_err(|source| PersistError::Manifest {
            source,
            path: path.to_path_buf(),
        })?;
        Ok(entity)
    }
}

impl PersistedEntity for ServerManifest {
    const FILE_PATH: &'static str = DEFAULT_MANIFEST_PATH;

    fn parse(text: &str) -> Result<Self, ManifestError> {
        Self::from_toml(text)
    }
}

/// Reads `path` into a string, remembering the path on failure.
pub fn read_text(path: impl AsRef<Path>) -> Result<String, PersistError> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|source| PersistError::io(source, path.to_path_buf()))
}

/// Writes `text` to `path`, remembering the path on failure.
pub fn write_text(path: impl AsRef<Path>, text: &str) -> Result<(), PersistError> {
    let path = path.as_ref();
    fs::write(path, text).map_err(|source| PersistError::io(source, path.to_path_buf()))
}
