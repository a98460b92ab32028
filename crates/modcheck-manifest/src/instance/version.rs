use std::fmt;
use std::str::FromStr;

pub use semver;
use serde::{Deserialize, Serialize, Serializer};

/// A [version of Minecraft], be it semantic one, a [`Snapshot`] or whatever.
///
/// Minecraft versions only look like [semver]. Releases drop the patch
/// component (`1.21`), pre-releases use their own suffixes (`1.21.2-rc2`),
/// and snapshots follow a completely different `YYwWWn` scheme. Anything
/// that can't be parsed is kept verbatim as [`MinecraftVersion::Unknown`],
/// which is fine for our purposes: Modrinth only ever needs the string.
///
/// [version of Minecraft]: https://minecraft.wiki/w/Java_Edition_version_history
/// [semver]: https://semver.org
#[derive(Deserialize, Clone, PartialEq, Eq, Hash, Debug)]
#[serde(from = "String")]
#[must_use]
pub enum MinecraftVersion {
    /// A regular minecraft semantic version, like `1.20.1` or `1.18.2-pre3`.
    Semantic(semver::Version),
    /// A minecraft snapshot, like [`18w10d`](https://minecraft.wiki/w/18w10d).
    Snapshot(Snapshot),
    /// Some other minecraft version, kept as it was written.
    Unknown(String),
}

impl<S> From<S> for MinecraftVersion
where
    S: AsRef<str>,
{
    fn from(value: S) -> Self {
        let str = value.as_ref().trim();
        if let Ok(version) = semver::Version::from_str(str) {
            return Self::Semantic(version);
        }

        // `1.17` is a perfectly valid release, just not a valid semver.
        let (core, suffix) = str.split_at(str.find(['-', '+']).unwrap_or(str.len()));
        if core.matches('.').count() == 1 {
            if let Ok(version) = semver::Version::from_str(&format!("{core}.0{suffix}")) {
                return Self::Semantic(version);
            }
        }

        match Snapshot::from_str(str) {
            Ok(snapshot) => Self::Snapshot(snapshot),
            Err(_) => Self::Unknown(str.to_string()),
        }
    }
}

impl fmt::Display for MinecraftVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Snapshot(snapshot) => write!(f, "{snapshot}"),
            Self::Unknown(string_repr) => write!(f, "{string_repr}"),
            Self::Semantic(version) if version.patch == 0 => {
                write!(f, "{}.{}", version.major, version.minor)?;
                if !version.pre.is_empty() {
                    write!(f, "-{}", version.pre)?;
                }
                if !version.build.is_empty() {
                    write!(f, "+{}", version.build)?;
                }
                Ok(())
            }
            Self::Semantic(version) => write!(f, "{version}"),
        }
    }
}

impl Serialize for MinecraftVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A [Minecraft snapshot](https://minecraft.wiki/w/Snapshot), like `18w10d`.
///
/// Snapshots use the format `YYwWWn`: a two-digit year, a literal `w`, the
/// two-digit week and a letter that increments for every extra snapshot in
/// the same week. April Fools' snapshots (`24w14potato`) don't fit and end up
/// as [`MinecraftVersion::Unknown`].
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Hash, Debug)]
#[must_use]
pub struct Snapshot {
    pub year: u8,
    pub week: u8,
    pub identifier: char,
}

impl Snapshot {
    /// The length of a string-represented snapshot, in chars.
    pub const LENGTH: usize = "YYwWWn".len();

    /// A shorthand for creating a [`Snapshot`].
    pub const fn new(year: u8, week: u8, identifier: char) -> Self {
        Self {
            year,
            week,
            identifier,
        }
    }
}

/// Errors that may occur when parsing a [`Snapshot`] string.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum SnapshotParseError {
    #[error("The snapshot string was {0} chars long, which is invalid")]
    WrongLength(usize),
    #[error("The snapshot string {0:?} does not follow the YYwWWn format")]
    Malformed(String),
    #[error(transparent)]
    ParseIntError(#[from] std::num::ParseIntError),
}

impl FromStr for Snapshot {
    type Err = SnapshotParseError;

    fn from_str(str: &str) -> Result<Self, Self::Err> {
        if str.len() != Self::LENGTH {
            return Err(SnapshotParseError::WrongLength(str.len()));
        }

        let bytes = str.as_bytes();
        let identifier = char::from(bytes[5]);
        if !str.is_ascii() || bytes[2] != b'w' || !identifier.is_ascii_lowercase() {
            return Err(SnapshotParseError::Malformed(str.to_string()));
        }

        let year: u8 = str[0..2].parse()?;
        let week: u8 = str[3..5].parse()?;
        Ok(Self::new(year, week, identifier))
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}w{:02}{}", self.year, self.week, self.identifier)
    }
}
