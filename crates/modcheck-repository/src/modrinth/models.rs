use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use modcheck_manifest::instance::{Loader, Target};
use serde::{Deserialize, Serialize};

/// A project as returned by `GET /v2/project/{id}`.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Project {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub project_type: ProjectType,
}

impl Project {
    /// The public page of this project on [modrinth.com](https://modrinth.com).
    #[must_use]
    pub fn url(&self) -> String {
        format!(
            "https://modrinth.com/{kind}/{slug}",
            kind = self.project_type,
            slug = self.slug
        )
    }

    /// Whether the project is referred to by something other than its slug.
    #[must_use]
    pub fn has_readable_slug_for(&self, id: &str) -> bool {
        !self.slug.is_empty() && self.slug != id
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, Hash, Debug, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProjectType {
    #[default]
    Mod,
    Modpack,
    Resourcepack,
    Shader,
    Datapack,
    Plugin,
    #[serde(other)]
    Project,
}

/// A version as returned by `GET /v2/project/{id}/version`.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Version {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub version_number: String,
    #[serde(default)]
    pub changelog: Option<String>,
    #[serde(default)]
    pub version_type: VersionType,
    pub date_published: DateTime<Utc>,
    pub game_versions: HashSet<String>,
    pub loaders: HashSet<Loader>,
}

impl Version {
    #[must_use]
    pub fn is_compatible(&self, target: &Target) -> bool {
        let is_for_correct_version = self
            .game_versions
            .contains(&target.minecraft_version.to_string());
        let has_supported_loader = !target.allowed_loaders().is_disjoint(&self.loaders);
        is_for_correct_version && has_supported_loader
    }

    /// The changelog, if there is a non-blank one.
    #[must_use]
    pub fn changelog(&self) -> Option<&str> {
        self.changelog
            .as_deref()
            .map(str::trim)
            .filter(|changelog| !changelog.is_empty())
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.version_number, self.version_type)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, Hash, Debug, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VersionType {
    #[default]
    Release,
    Beta,
    Alpha,
}
