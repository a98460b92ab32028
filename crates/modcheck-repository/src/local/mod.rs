use std::path::{Path, PathBuf};

use modcheck_manifest::edit::ManifestEditor;
use modcheck_manifest::{ManifestError, ServerManifest};
use persist::PersistedEntity;
use tracing::instrument;

pub mod persist;

/// A `server.toml` on disk, along with its parsed contents.
///
/// All modifications go through a [`ManifestEditor`] applied to whatever is
/// on disk at that moment, so edits made to the file in the meantime and
/// everything an edit doesn't touch (comments, key order, tables this tool
/// doesn't model) survive it byte for byte.
#[derive(Debug, Clone)]
pub struct LocalManifest {
    path: PathBuf,
    pub manifest: ServerManifest,
}

impl LocalManifest {
    /// "Open" the manifest at `path`.
    ///
    /// # Errors
    ///
    /// This function will return an error if the file can't be read or does
    /// not contain a valid [`ServerManifest`].
    #[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, self::Error> {
        let path = path.as_ref().to_path_buf();
        let manifest = ServerManifest::read_from(&path)?;
        tracing::debug!(mods = manifest.mods.len(), "Loaded the server manifest");
        Ok(Self { path, manifest })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pins the mod `id` to `version_id` and saves the file.
    ///
    /// Returns `false` if the manifest has no `version` line for that mod, in
    /// which case nothing is written.
    pub fn set_version(&mut self, id: &str, version_id: &str) -> Result<bool, self::Error> {
        self.edit(|editor| editor.set_version(id, version_id))
    }

    /// Renames the mod `old_id` to `new_id` (usually its slug) and saves the
    /// file.
    ///
    /// Returns `false` if no mod is identified by `old_id`.
    pub fn set_id(&mut self, old_id: &str, new_id: &str) -> Result<bool, self::Error> {
        self.edit(|editor| editor.set_id(old_id, new_id))
    }

    #[instrument(level = "debug", skip_all, fields(path = %self.path.display()))]
    fn edit<F>(&mut self, edit: F) -> Result<bool, self::Error>
    where
        F: FnOnce(&mut ManifestEditor) -> bool,
    {
        let mut editor = ManifestEditor::new(&persist::read_text(&self.path)?);
        if !edit(&mut editor) {
            tracing::debug!("No matching line was found to update");
            return Ok(false);
        }

        let text = editor.into_string();
        // Re-validate before writing, a rename may introduce a duplicate.
        let manifest = ServerManifest::from_toml(&text)?;
        persist::write_text(&self.path, &text)?;
        tracing::debug!("Wrote the updated manifest");

        self.manifest = manifest;
        Ok(true)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to read from or write to the manifest file")]
    Persistence(#[from] persist::PersistError),
    #[error("The edited manifest would no longer be valid")]
    Manifest(#[from] ManifestError),
}
