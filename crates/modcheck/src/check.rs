//! Figuring out which mods have newer versions available.

use modcheck_manifest::instance::Target;
use modcheck_manifest::{PinnedMod, ServerManifest};
use modcheck_repository::models::{Project, Version};
use modcheck_repository::{Registry, compatible_versions};
use serde::Serialize;
use tracing::instrument;

/// How wide changelog lines may get before they are wrapped.
pub const CHANGELOG_WIDTH: usize = 70;

/// Where a single mod stands compared to what Modrinth has to offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModStatus {
    /// The mod's ID as written in the manifest.
    pub id: String,
    pub project: Project,
    /// The version ID pinned in the manifest.
    pub current_id: String,
    /// The pinned version, if it is among the compatible ones.
    pub current: Option<Version>,
    /// The newest compatible version, if there is any.
    pub latest: Option<Version>,
}

impl ModStatus {
    #[must_use]
    pub const fn is_compatible(&self) -> bool {
        self.latest.is_some()
    }

    #[must_use]
    pub fn needs_update(&self) -> bool {
        match (&self.current, &self.latest) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(_), Some(latest)) => latest.id != self.current_id,
        }
    }

    /// How big the jump to [`Self::latest`] is.
    #[must_use]
    pub fn significance(&self) -> Significance {
        match (&self.current, &self.latest) {
            (Some(current), Some(latest)) => {
                Significance::between(&current.version_number, &latest.version_number)
            }
            _ => Significance::Patch,
        }
    }
}

/// Checks a single mod against `registry`.
///
/// Returns [`None`] if the project itself can't be fetched, in which case
/// there is nothing meaningful to report about it.
#[instrument(level = "debug", skip(registry, target), fields(id = %pinned.id))]
pub fn check_mod<R>(registry: &R, pinned: PinnedMod<'_>, target: &Target) -> Option<ModStatus>
where
    R: Registry + ?Sized,
{
    let id = pinned.id.as_ref();
    let project = match registry.project(id) {
        Ok(project) => project,
        Err(error) => {
            tracing::error!(%error, "Error fetching mod {id}");
            return None;
        }
    };

    let versions = compatible_versions(registry, id, target).unwrap_or_else(|error| {
        tracing::error!(%error, "Error fetching versions for mod {id}");
        vec![]
    });

    let current = versions
        .iter()
        .find(|version| version.id == pinned.version)
        .cloned();
    let latest = versions.into_iter().next();

    Some(ModStatus {
        id: id.to_string(),
        project,
        current_id: pinned.version.to_string(),
        current,
        latest,
    })
}

/// Checks every pinned Modrinth mod of `manifest`, or only those listed in
/// `only` if it isn't empty.
pub fn check_mods<'manifest, R>(
    registry: &'manifest R,
    manifest: &'manifest ServerManifest,
    only: &'manifest [String],
) -> impl Iterator<Item = ModStatus> + 'manifest
where
    R: Registry + ?Sized,
{
    let target = manifest.target();
    manifest
        .modrinth_mods()
        .filter(move |pinned| only.is_empty() || only.iter().any(|id| id == pinned.id.as_ref()))
        .filter_map(move |pinned| check_mod(registry, pinned, &target))
}

/// How significant the difference between two version numbers is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Significance {
    Patch,
    Minor,
    Major,
}

impl Significance {
    /// Compares the dotted cores of two version numbers.
    ///
    /// Build metadata (`+...`) and pre-release tags (`-...`) are ignored. The
    /// first differing component decides: the first is [`Major`], the second
    /// [`Minor`], anything after that (or no difference at all) [`Patch`].
    ///
    /// [`Major`]: Self::Major
    /// [`Minor`]: Self::Minor
    /// [`Patch`]: Self::Patch
    #[must_use]
    pub fn between(current: &str, latest: &str) -> Self {
        let core = |version: &str| -> Vec<String> {
            let version = version.split('+').next().unwrap_or_default();
            let version = version.split('-').next().unwrap_or_default();
            version.split('.').map(String::from).collect()
        };

        let differing = core(current)
            .into_iter()
            .zip(core(latest))
            .position(|(current, latest)| current != latest);

        match differing {
            Some(0) => Self::Major,
            Some(1) => Self::Minor,
            _ => Self::Patch,
        }
    }
}

/// Formats a changelog for terminal display.
///
/// Blank lines are dropped, long lines are word-wrapped to `width` and every
/// line is indented by two spaces.
#[must_use]
pub fn format_changelog(changelog: &str, width: usize) -> String {
    changelog
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .flat_map(|line| {
            if line.chars().count() > width {
                wrap_line(line, width)
            } else {
                vec![line.to_string()]
            }
        })
        .map(|line| format!("  {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let mut wrapped = vec![];
    let mut current = String::new();

    for word in line.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if current.chars().count() + word.chars().count() < width {
            current.push(' ');
            current.push_str(word);
        } else {
            wrapped.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }

    if !current.is_empty() {
        wrapped.push(current);
    }
    wrapped
}

#[cfg(test)]
pub(crate) mod tests {
    use indoc::indoc;
    use modcheck_manifest::ServerManifest;
    use modcheck_repository::memory::MemoryRegistry;
    use modcheck_repository::models::{Project, ProjectType, Version};
    use rstest::{fixture, rstest};
    use serde_json::json;

    use super::{Significance, check_mods, format_changelog, wrap_line};

    pub const MANIFEST: &str = indoc! {r#"
        mc_version = "1.21.5"

        [jar]
        type = "fabric"

        [[mods]]
        type = "modrinth"
        id = "P7dR8mSH"
        version = "api-2"

        [[mods]]
        type = "modrinth"
        id = "lithium"
        version = "lith-1"

        [[mods]]
        type = "modrinth"
        id = "forge-only"
        version = "forge-1"

        [[mods]]
        type = "modrinth"
        id = "vanished"
        version = "gone-1"
    "#};

    pub fn version(id: &str, number: &str, day: u8, loaders: &[&str]) -> Version {
        serde_json::from_value(json!({
            "id": id,
            "project_id": "x",
            "name": number,
            "version_number": number,
            "changelog": format!("Changes in {number}"),
            "version_type": "release",
            "date_published": format!("2025-03-{day:02}T00:00:00Z"),
            "game_versions": ["1.21.5"],
            "loaders": loaders,
        }))
        .unwrap()
    }

    pub fn project(id: &str, slug: &str, title: &str) -> Project {
        Project {
            id: id.into(),
            slug: slug.into(),
            title: title.into(),
            description: format!("{title} description"),
            project_type: ProjectType::Mod,
        }
    }

    #[fixture]
    pub fn registry() -> MemoryRegistry {
        let mut registry = MemoryRegistry::default();
        registry.insert(
            project("P7dR8mSH", "fabric-api", "Fabric API"),
            vec![
                version("api-1", "0.118.0+1.21.5", 1, &["fabric"]),
                version("api-2", "0.119.0+1.21.5", 2, &["fabric"]),
            ],
        );
        registry.insert(
            project("gvQqBUqZ", "lithium", "Lithium"),
            vec![
                version("lith-1", "mc1.21.5-0.15.0", 1, &["fabric"]),
                version("lith-2", "mc1.21.5-0.16.0", 5, &["fabric"]),
            ],
        );
        registry.insert(
            project("forge-only", "forge-only", "Forge Only"),
            vec![version("forge-1", "1.0.0", 1, &["forge"])],
        );
        registry
    }

    #[rstest]
    fn statuses(registry: MemoryRegistry) {
        let manifest = ServerManifest::from_toml(MANIFEST).unwrap();
        let statuses = check_mods(&registry, &manifest, &[]).collect::<Vec<_>>();

        // `vanished` can't be fetched and is skipped entirely.
        assert_eq!(statuses.len(), 3);

        let api = &statuses[0];
        assert!(!api.needs_update());
        assert_eq!(api.current.as_ref().map(|v| v.id.as_str()), Some("api-2"));

        let lithium = &statuses[1];
        assert!(lithium.needs_update());
        assert_eq!(lithium.latest.as_ref().map(|v| v.id.as_str()), Some("lith-2"));

        let forge = &statuses[2];
        assert!(!forge.is_compatible());
        assert!(!forge.needs_update());
    }

    #[rstest]
    fn only_selected_mods_are_checked(registry: MemoryRegistry) {
        let manifest = ServerManifest::from_toml(MANIFEST).unwrap();
        let only = vec!["lithium".to_string()];
        let statuses = check_mods(&registry, &manifest, &only).collect::<Vec<_>>();
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].project.slug, "lithium");
    }

    #[rstest]
    fn unknown_pinned_versions_need_updating(registry: MemoryRegistry) {
        let manifest =
            ServerManifest::from_toml(&MANIFEST.replace("\"api-2\"", "\"api-0\"")).unwrap();
        let statuses = check_mods(&registry, &manifest, &[]).collect::<Vec<_>>();
        assert!(statuses[0].current.is_none());
        assert!(statuses[0].needs_update());
        assert_eq!(statuses[0].significance(), Significance::Patch);
    }

    #[rstest]
    #[case::major("1.2.3", "2.0.0", Significance::Major)]
    #[case::minor("1.2.3", "1.3.0", Significance::Minor)]
    #[case::patch("1.2.3", "1.2.4", Significance::Patch)]
    #[case::deep("1.2.3.4", "1.2.3.5", Significance::Patch)]
    #[case::build_metadata("0.118.0+1.21.4", "0.119.0+1.21.5", Significance::Minor)]
    #[case::prerelease("1.0.0-beta.1", "1.0.0-beta.2", Significance::Patch)]
    #[case::prefixed("mc1.21.5-0.15.0", "mc1.21.5-0.16.0", Significance::Patch)]
    #[case::equal("1.0.0", "1.0.0", Significance::Patch)]
    #[case::non_numeric("abc", "abd", Significance::Major)]
    fn significance(#[case] current: &str, #[case] latest: &str, #[case] expected: Significance) {
        assert_eq!(Significance::between(current, latest), expected);
    }

    #[test]
    fn changelogs_are_indented_and_wrapped() {
        let changelog = indoc! {"
            - Fixed a crash


            - This line is long enough that it has to be wrapped somewhere around the seventy character mark
        "};
        let formatted = format_changelog(changelog, 40);
        for line in formatted.lines() {
            assert!(line.starts_with("  "), "{line:?} is not indented");
            assert!(line.len() <= 42, "{line:?} is too long");
        }
        assert_eq!(formatted.lines().next(), Some("  - Fixed a crash"));
        assert_eq!(formatted.lines().count(), 4);
    }

    #[test]
    fn overlong_words_get_their_own_line() {
        let wrapped = wrap_line("a supercalifragilisticexpialidocious b", 10);
        assert_eq!(wrapped, ["a", "supercalifragilisticexpialidocious", "b"]);
    }

    #[test]
    fn empty_changelogs_stay_empty() {
        assert_eq!(format_changelog("\n \n", 70), "");
    }
}
