//! This crate is a part of **[modcheck]**.
//!
//! It models the `server.toml` manifest of an [mcman]-managed server: the
//! game version, the loader jar, the list of mods and a few per-server
//! settings. Reading is done through [`serde`] and [`toml`], writing is done
//! line-by-line with an [`edit::ManifestEditor`] so that the rest of the file
//! stays exactly as its author left it.
//!
//! [modcheck]: https://github.com/LunchChecker/modcheck
//! [mcman]: https://github.com/ParadigmMC/mcman

use std::collections::HashSet;

use nutype::nutype;
use serde::Deserialize;
use settings::MarkdownSettings;

use crate::instance::version::MinecraftVersion;
use crate::instance::{Loader, Target};

pub mod edit;
pub mod instance;
pub mod settings;

/// The default manifest file name used by mcman.
pub const DEFAULT_MANIFEST_PATH: &str = "server.toml";

/// The top-level **"server manifest" entity**, i.e. a parsed `server.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[must_use]
pub struct ServerManifest {
    pub name: Option<String>,
    pub mc_version: MinecraftVersion,
    #[serde(default)]
    pub jar: Jar,
    #[serde(default)]
    pub mods: Vec<ModEntry>,
    #[serde(default)]
    pub markdown: MarkdownSettings,
}

impl ServerManifest {
    /// Parses a manifest out of its TOML representation.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Toml`] if `text` is not a valid manifest, and
    /// [`ManifestError::DuplicateMod`] if two mods share the same ID.
    pub fn from_toml(text: &str) -> Result<Self, ManifestError> {
        let manifest: Self = toml::from_str(text)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Ensures every mod ID appears at most once in the manifest.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::DuplicateMod`] naming the first repeated ID.
    pub fn validate(&self) -> Result<(), ManifestError> {
        let mut seen = HashSet::<&str>::new();
        for id in self.mods.iter().filter_map(|entry| entry.id.as_ref()) {
            if !seen.insert(id.as_ref()) {
                return Err(ManifestError::DuplicateMod { id: id.to_string() });
            }
        }
        Ok(())
    }

    /// Mods sourced from Modrinth that pin both an ID and a version.
    pub fn modrinth_mods(&self) -> impl Iterator<Item = PinnedMod<'_>> {
        self.mods.iter().filter_map(|entry| match entry {
            ModEntry {
                kind: ModSource::Modrinth,
                id: Some(id),
                version: Some(version),
            } => Some(PinnedMod { id, version }),
            _ => None,
        })
    }

    pub fn target(&self) -> Target {
        Target::new(self.mc_version.clone(), self.jar.kind.clone())
    }
}

/// The `[jar]` table: which server software (and loader) the server runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Jar {
    #[serde(rename = "type", default)]
    pub kind: Loader,
    pub loader: Option<String>,
    pub version: Option<String>,
}

impl Jar {
    /// The loader version, falling back to the jar version for loaders that
    /// only have one of those.
    #[must_use]
    pub fn loader_version(&self) -> Option<&str> {
        self.loader.as_deref().or(self.version.as_deref())
    }
}

/// An identifier of a mod, as written in the manifest.
///
/// For Modrinth mods this is either a project ID (`P7dR8mSH`) or a slug
/// (`fabric-api`). Both are case-sensitive, so only whitespace is trimmed.
#[nutype(
    sanitize(trim),
    validate(not_empty),
    derive(
        TryFrom,
        AsRef,
        Serialize,
        Deserialize,
        PartialEq,
        Eq,
        Hash,
        PartialOrd,
        Ord,
        Display,
        Clone,
        Debug,
    )
)]
pub struct ModId(String);

/// A single `[[mods]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[must_use]
pub struct ModEntry {
    #[serde(rename = "type")]
    pub kind: ModSource,
    pub id: Option<ModId>,
    pub version: Option<String>,
}

/// Where a [`ModEntry`] is downloaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ModSource {
    Modrinth,

    /// CurseForge, plain URLs, GitHub releases, Jenkins... none of which
    /// this tool knows how to check.
    #[serde(other)]
    Other,
}

/// A Modrinth mod with both an ID and a pinned version ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinnedMod<'manifest> {
    pub id: &'manifest ModId,
    pub version: &'manifest str,
}

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Failed to parse the server manifest")]
    Toml(#[from] toml::de::Error),
    #[error("The mod {id:?} is listed more than once")]
    DuplicateMod { id: String },
}
