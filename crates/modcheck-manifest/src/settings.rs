//! Per-server settings stored alongside the mod list.

use std::path::PathBuf;

use serde::Deserialize;

/// The `[markdown]` table: which documents carry the generated tables.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MarkdownSettings {
    #[serde(default = "MarkdownSettings::default_files")]
    pub files: Vec<PathBuf>,
}

impl MarkdownSettings {
    pub const DEFAULT_FILE: &'static str = "README.md";

    fn default_files() -> Vec<PathBuf> {
        vec![PathBuf::from(Self::DEFAULT_FILE)]
    }
}

impl Default for MarkdownSettings {
    fn default() -> Self {
        Self {
            files: Self::default_files(),
        }
    }
}
