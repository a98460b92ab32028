use bon::bon;
use itertools::Itertools;
use modcheck_manifest::instance::Target;
use reqwest::StatusCode;
use tracing::instrument;
use url::Url;

pub mod memory;
pub mod models;

/// A source of project and version metadata.
///
/// Implemented by [`ModrinthRepository`] for the real thing and by
/// [`memory::MemoryRegistry`] for tests and offline use.
pub trait Registry {
    /// Fetches a project by its ID or slug.
    fn project(&self, id: &str) -> Result<models::Project, RegistryError>;

    /// Fetches every version ever published for a project.
    fn versions(&self, id: &str) -> Result<Vec<models::Version>, RegistryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Failed to talk to the Modrinth API")]
    Http(#[from] reqwest::Error),
    #[error("No project with ID or slug {id:?} exists")]
    NotFound { id: String },
    #[error("{0} can't be used as an API base URL")]
    InvalidBase(Url),
}

/// A struct that represents the remote [modrinth](https://modrinth.com) repository.
#[derive(Debug)]
#[must_use]
pub struct ModrinthRepository {
    client: reqwest::blocking::Client,
    api_base: Url,
}

impl Default for ModrinthRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[bon]
impl ModrinthRepository {
    pub const API_BASE: &str = "https://api.modrinth.com/v2";

    pub const USER_AGENT: &str = concat!(
        env!("CARGO_PKG_REPOSITORY"),
        '/',
        env!("CARGO_PKG_VERSION"),
        ' ',
        '(',
        env!("CARGO_PKG_AUTHORS"),
        ')',
    );

    #[expect(clippy::missing_panics_doc)]
    pub fn new() -> Self {
        Self::builder()
            .build()
            .expect("Failed to build a Reqwest Client with custom user agent")
    }

    /// Builds a repository talking to a custom API base or with a custom user
    /// agent, e.g. for a staging instance of Modrinth.
    #[builder(start_fn = builder, finish_fn = build)]
    pub fn with_settings(
        #[builder(default = ModrinthRepository::default_api_base())] api_base: Url,
        #[builder(into, default = ModrinthRepository::USER_AGENT.to_string())] user_agent: String,
    ) -> Result<Self, RegistryError> {
        if api_base.cannot_be_a_base() {
            return Err(RegistryError::InvalidBase(api_base));
        }

        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client, api_base })
    }

    fn default_api_base() -> Url {
        Url::parse(Self::API_BASE).unwrap_or_else(|_| unreachable!("the API base is a valid URL"))
    }

    #[must_use]
    pub const fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Appends path `segments` to the API base, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    #[instrument(level = "debug", skip(self))]
    fn get<T>(&self, id: &str, url: Url) -> Result<T, RegistryError>
    where
        T: serde::de::DeserializeOwned,
    {
        tracing::debug!(%url, "Sending a request to Modrinth");
        let response = self.client.get(url).send()?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound { id: id.to_string() });
        }
        Ok(response.error_for_status()?.json::<T>()?)
    }

    pub fn fetch_project<S>(&self, project_id: S) -> Result<models::Project, RegistryError>
    where
        S: AsRef<str>,
    {
        let project_id = project_id.as_ref();
        let url = self.endpoint(&["project", project_id]);
        self.get(project_id, url)
    }

    pub fn fetch_versions<S>(&self, project_id: S) -> Result<Vec<models::Version>, RegistryError>
    where
        S: AsRef<str>,
    {
        let project_id = project_id.as_ref();
        let url = self.endpoint(&["project", project_id, "version"]);
        self.get(project_id, url)
    }
}

impl Registry for ModrinthRepository {
    fn project(&self, id: &str) -> Result<models::Project, RegistryError> {
        self.fetch_project(id)
    }

    fn versions(&self, id: &str) -> Result<Vec<models::Version>, RegistryError> {
        self.fetch_versions(id)
    }
}

/// Fetches the versions of `project_id` that `target` can run, newest first.
#[instrument(
    level = "debug",
    skip(registry, target),
    fields(minecraft_version = %target.minecraft_version, loader = %target.loader)
)]
pub fn compatible_versions<R>(
    registry: &R,
    project_id: &str,
    target: &Target,
) -> Result<Vec<models::Version>, RegistryError>
where
    R: Registry + ?Sized,
{
    let versions = registry
        .versions(project_id)?
        .into_iter()
        .filter(|version| version.is_compatible(target))
        .sorted_by_key(|version| version.date_published)
        .rev()
        .collect_vec();
    tracing::debug!(count = versions.len(), "Found compatible versions");
    Ok(versions)
}

#[cfg(test)]
mod tests {
    use modcheck_manifest::instance::version::MinecraftVersion;
    use modcheck_manifest::instance::{Loader, Target};
    use rstest::{fixture, rstest};

    use super::memory::MemoryRegistry;
    use super::models::tests::{project, version};
    use super::{ModrinthRepository, RegistryError, compatible_versions};

    #[fixture]
    fn registry() -> MemoryRegistry {
        let mut registry = MemoryRegistry::default();
        registry.insert(
            project("P7dR8mSH", "fabric-api", "Fabric API"),
            vec![
                version("old", "0.90.0", "2024-01-01T00:00:00Z", &["1.21.5"], &["fabric"]),
                version("new", "0.92.0", "2024-03-01T00:00:00Z", &["1.21.5"], &["fabric"]),
                version("mid", "0.91.0", "2024-02-01T00:00:00Z", &["1.21.5"], &["Fabric"]),
                version("forge", "0.93.0", "2024-04-01T00:00:00Z", &["1.21.5"], &["forge"]),
                version("snapshot", "0.94.0", "2024-05-01T00:00:00Z", &["25w02a"], &["fabric"]),
            ],
        );
        registry
    }

    #[rstest]
    fn versions_are_filtered_and_sorted(registry: MemoryRegistry) -> Result<(), RegistryError> {
        let target = Target::new(MinecraftVersion::from("1.21.5"), Loader::Fabric);
        let versions = compatible_versions(&registry, "fabric-api", &target)?;
        let ids = versions.iter().map(|v| v.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, ["new", "mid", "old"]);
        Ok(())
    }

    #[rstest]
    fn quilt_servers_see_fabric_versions(registry: MemoryRegistry) -> Result<(), RegistryError> {
        let target = Target::new(MinecraftVersion::from("1.21.5"), Loader::Quilt);
        let versions = compatible_versions(&registry, "P7dR8mSH", &target)?;
        assert_eq!(versions.len(), 3);
        Ok(())
    }

    #[rstest]
    fn unknown_projects_are_not_found(registry: MemoryRegistry) {
        let target = Target::new(MinecraftVersion::from("1.21.5"), Loader::Fabric);
        assert!(matches!(
            compatible_versions(&registry, "sodium", &target),
            Err(RegistryError::NotFound { .. })
        ));
    }

    #[test]
    fn endpoints_are_percent_encoded() -> Result<(), RegistryError> {
        let repository = ModrinthRepository::builder()
            .api_base(url::Url::parse("https://staging-api.modrinth.com/v2/").unwrap())
            .user_agent("modcheck-tests")
            .build()?;
        let url = repository.endpoint(&["project", "a b/c", "version"]);
        assert_eq!(
            url.as_str(),
            "https://staging-api.modrinth.com/v2/project/a%20b%2Fc/version"
        );
        Ok(())
    }

    #[test]
    fn default_repository_talks_to_modrinth() {
        let repository = ModrinthRepository::new();
        assert_eq!(repository.api_base().as_str(), ModrinthRepository::API_BASE);
    }
}
