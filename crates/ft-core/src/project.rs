//! User-defined projects that sessions are tagged with.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{ProjectId, ValidationError};

/// Projects seeded on first use, as `(id, name)`.
pub const DEFAULT_PROJECTS: &[(&str, &str)] = &[
    ("deep-work", "Deep Work"),
    ("creative", "Creative"),
    ("study", "Study"),
    ("reading", "Reading"),
    ("training", "Training"),
    ("other", "Other"),
];

/// A project tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
}

impl Project {
    /// Creates a project; the name is trimmed and must not be empty.
    pub fn new(id: ProjectId, name: &str) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::Empty {
                field: "project name",
            });
        }
        Ok(Self {
            id,
            name: name.to_string(),
        })
    }

    fn from_value(value: &Value) -> Option<Self> {
        let id = ProjectId::new(value.get("id")?.as_str()?).ok()?;
        let name = value.get("name")?.as_str()?;
        Some(Self {
            id,
            name: name.to_string(),
        })
    }
}

/// Parses a stored project array, dropping invalid entries.
pub fn parse_projects(value: &Value) -> Vec<Project> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(Project::from_value).collect())
        .unwrap_or_default()
}

/// The project list plus the currently selected project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectList {
    projects: Vec<Project>,
    active_id: Option<ProjectId>,
}

impl Default for ProjectList {
    fn default() -> Self {
        Self::seeded()
    }
}

impl ProjectList {
    /// The default project set with the first one active.
    pub fn seeded() -> Self {
        let projects: Vec<Project> = DEFAULT_PROJECTS
            .iter()
            .filter_map(|(id, name)| {
                ProjectId::new(*id)
                    .ok()
                    .and_then(|id| Project::new(id, name).ok())
            })
            .collect();
        let active_id = projects.first().map(|p| p.id.clone());
        Self {
            projects,
            active_id,
        }
    }

    /// Restores a stored list. An empty list is replaced by the defaults, and
    /// an active id that no longer exists falls back to the first project.
    pub fn from_parts(projects: Vec<Project>, active_id: Option<ProjectId>) -> Self {
        if projects.is_empty() {
            return Self::seeded();
        }
        let mut list = Self {
            projects,
            active_id,
        };
        list.repair_active();
        list
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub const fn active_id(&self) -> Option<&ProjectId> {
        self.active_id.as_ref()
    }

    /// The selected project, or the first one.
    pub fn active(&self) -> Option<&Project> {
        self.active_id
            .as_ref()
            .and_then(|id| self.get(id))
            .or_else(|| self.projects.first())
    }

    pub fn get(&self, id: &ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| &p.id == id)
    }

    /// Adds a project at the front of the list and selects it.
    pub fn add(&mut self, name: &str) -> Result<&Project, ValidationError> {
        let project = Project::new(ProjectId::generate(), name)?;
        self.active_id = Some(project.id.clone());
        self.projects.insert(0, project);
        Ok(&self.projects[0])
    }

    /// Renames a project. Returns `false` if it does not exist.
    pub fn rename(&mut self, id: &ProjectId, name: &str) -> Result<bool, ValidationError> {
        let renamed = Project::new(id.clone(), name)?;
        let Some(project) = self.projects.iter_mut().find(|p| &p.id == id) else {
            return Ok(false);
        };
        project.name = renamed.name;
        Ok(true)
    }

    /// Removes a project. Deleting the active project selects the first
    /// remaining one; deleting the last project restores the defaults.
    pub fn delete(&mut self, id: &ProjectId) -> bool {
        let before = self.projects.len();
        self.projects.retain(|p| &p.id != id);
        if self.projects.len() == before {
            return false;
        }
        if self.projects.is_empty() {
            *self = Self::seeded();
        } else if self.active_id.as_ref() == Some(id) {
            self.active_id = self.projects.first().map(|p| p.id.clone());
        }
        true
    }

    /// Selects a project. Returns `false` if it does not exist.
    pub fn select(&mut self, id: &ProjectId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.active_id = Some(id.clone());
        true
    }

    fn repair_active(&mut self) {
        let valid = self
            .active_id
            .as_ref()
            .is_some_and(|id| self.get(id).is_some());
        if !valid {
            self.active_id = self.projects.first().map(|p| p.id.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn id(s: &str) -> ProjectId {
        ProjectId::new(s).unwrap()
    }

    #[test]
    fn seeded_list_selects_first_default() {
        let list = ProjectList::seeded();
        assert_eq!(list.projects().len(), DEFAULT_PROJECTS.len());
        assert_eq!(list.active().unwrap().name, "Deep Work");
    }

    #[test]
    fn add_prepends_and_activates() {
        let mut list = ProjectList::seeded();
        let added = list.add("  Thesis ").unwrap().clone();
        assert_eq!(added.name, "Thesis");
        assert_eq!(list.projects()[0], added);
        assert_eq!(list.active(), Some(&added));
    }

    #[test]
    fn add_rejects_empty_name() {
        let mut list = ProjectList::seeded();
        assert_eq!(
            list.add("   ").unwrap_err(),
            ValidationError::Empty {
                field: "project name"
            }
        );
    }

    #[test]
    fn rename_keeps_id() {
        let mut list = ProjectList::seeded();
        assert!(list.rename(&id("study"), "Learning").unwrap());
        assert_eq!(list.get(&id("study")).unwrap().name, "Learning");
        assert!(!list.rename(&id("missing"), "x").unwrap());
        assert!(list.rename(&id("study"), "").is_err());
    }

    #[test]
    fn deleting_active_falls_back_to_first() {
        let mut list = ProjectList::seeded();
        assert!(list.select(&id("reading")));
        assert!(list.delete(&id("reading")));
        assert_eq!(list.active_id(), Some(&id("deep-work")));
    }

    #[test]
    fn deleting_inactive_keeps_selection() {
        let mut list = ProjectList::seeded();
        list.select(&id("reading"));
        list.delete(&id("other"));
        assert_eq!(list.active_id(), Some(&id("reading")));
    }

    #[test]
    fn deleting_last_project_reseeds_defaults() {
        let mut list = ProjectList::from_parts(
            vec![Project::new(id("solo"), "Solo").unwrap()],
            Some(id("solo")),
        );
        assert!(list.delete(&id("solo")));
        assert_eq!(list, ProjectList::seeded());
    }

    #[test]
    fn from_parts_repairs_unknown_active() {
        let list = ProjectList::from_parts(
            vec![Project::new(id("a"), "A").unwrap()],
            Some(id("gone")),
        );
        assert_eq!(list.active_id(), Some(&id("a")));
    }

    #[test]
    fn parse_projects_drops_invalid_entries() {
        let parsed = parse_projects(&json!([
            {"id": "a", "name": "A"},
            {"id": "", "name": "Empty id"},
            {"id": "b"},
            42
        ]));
        assert_eq!(parsed, vec![Project::new(id("a"), "A").unwrap()]);
    }
}
