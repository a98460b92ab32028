use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};
use version::MinecraftVersion;

/// Some domain-specific types representing Minecraft's version formats.
pub mod version;

/// What a server runs: the game version and the modloader on top of it.
///
/// A mod version is compatible with a [`Target`] if it was published for the
/// [`minecraft_version`] and for one of the [`allowed_loaders`].
///
/// [`minecraft_version`]: Self::minecraft_version
/// [`allowed_loaders`]: Self::allowed_loaders
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct Target {
    pub minecraft_version: MinecraftVersion,
    pub loader: Loader,

    /// Mods built for these loaders are also accepted.
    ///
    /// Quilt loads Fabric mods natively, so a Quilt server is fitted with
    /// [`Loader::Fabric`] here by [`Target::new`].
    pub allowed_foreign_loaders: HashSet<Loader>,
}

impl Target {
    pub fn new(minecraft_version: MinecraftVersion, loader: Loader) -> Self {
        let mut allowed_foreign_loaders = HashSet::new();
        if loader == Loader::Quilt {
            allowed_foreign_loaders.insert(Loader::Fabric);
        }

        Self {
            minecraft_version,
            loader,
            allowed_foreign_loaders,
        }
    }

    #[must_use]
    pub fn allowed_loaders(&self) -> HashSet<Loader> {
        let mut loaders = self.allowed_foreign_loaders.clone();
        loaders.insert(self.loader.clone());
        loaders
    }

    /// The loader name in the lowercase form Modrinth uses, e.g. `fabric`.
    #[must_use]
    pub fn loader_name(&self) -> String {
        self.loader.to_string()
    }
}

/// Possible types of modloaders a server can run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize, strum::EnumString)]
#[serde(from = "String")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Loader {
    /// Vanilla minecraft with no external modloader.
    #[strum(to_string = "minecraft", serialize = "vanilla", serialize = "none")]
    Minecraft,

    /// The [**Forge**](https://minecraftforge.net) modloader.
    Forge,

    /// The [**NeoForge**](https://neoforged.net) modloader.
    Neoforge,

    /// The [**Fabric**](https://fabricmc.net) modloader.
    ///
    /// This is what mcman assumes when a manifest doesn't say otherwise.
    #[default]
    Fabric,

    /// The [**Quilt**](https://quiltmc.org/en) modloader.
    Quilt,

    /// Some other server software or loader we don't know about, like
    /// `paper` or `velocity`, by its lowercase name.
    #[strum(default)]
    Other(String),
}

impl Loader {
    /// The name of the loader the way its authors spell it. Unknown loaders
    /// keep the name they were given.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::Minecraft => "Vanilla",
            Self::Forge => "Forge",
            Self::Neoforge => "NeoForge",
            Self::Fabric => "Fabric",
            Self::Quilt => "Quilt",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Minecraft => "minecraft",
            Self::Forge => "forge",
            Self::Neoforge => "neoforge",
            Self::Fabric => "fabric",
            Self::Quilt => "quilt",
            Self::Other(name) => name,
        })
    }
}

impl Serialize for Loader {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<String> for Loader {
    fn from(name: String) -> Self {
        let name = name.trim().to_ascii_lowercase();
        Self::from_str(&name).unwrap_or(Self::Other(name))
    }
}
