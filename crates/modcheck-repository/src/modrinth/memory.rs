use std::collections::HashMap;

use super::models::{Project, Version};
use super::{Registry, RegistryError};

/// A [`Registry`] that keeps everything in memory.
///
/// Projects can be looked up by their ID or slug, just like on Modrinth.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    projects: HashMap<String, (Project, Vec<Version>)>,
}

impl MemoryRegistry {
    pub fn insert(&mut self, project: Project, versions: Vec<Version>) {
        self.projects.insert(project.id.clone(), (project, versions));
    }

    fn lookup(&self, id: &str) -> Result<&(Project, Vec<Version>), RegistryError> {
        self.projects
            .get(id)
            .or_else(|| {
                self.projects
                    .values()
                    .find(|(project, _)| project.slug == id)
            })
            .ok_or_else(|| RegistryError::NotFound { id: id.to_string() })
    }
}

impl Registry for MemoryRegistry {
    fn project(&self, id: &str) -> Result<Project, RegistryError> {
        self.lookup(id).map(|(project, _)| project.clone())
    }

    fn versions(&self, id: &str) -> Result<Vec<Version>, RegistryError> {
        self.lookup(id).map(|(_, versions)| versions.clone())
    }
}
