// src/project.rs

use crate::history::{HistoryProvider, LazyHistory};
use crate::model::History;
use crate::naming::{lookup_key, ProjectName};
use crate::program::SampleProgram;
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// Article file inside a project's documentation folder.
pub const DESCRIPTION_FILE: &str = "description.md";
/// Requirements file inside a project's documentation folder.
pub const REQUIREMENTS_FILE: &str = "requirements.md";

/// A named exercise and every program implementing it.
#[derive(Debug)]
pub struct Project {
    name: ProjectName,
    requires_parameters: Option<bool>,
    programs: Vec<Arc<SampleProgram>>,
    docs: Option<ProjectDocs>,
}

impl Project {
    pub(crate) fn new(name: ProjectName, requires_parameters: Option<bool>) -> Self {
        Self {
            name,
            requires_parameters,
            programs: Vec::new(),
            docs: None,
        }
    }

    pub(crate) fn add_program(&mut self, program: Arc<SampleProgram>) {
        self.programs.push(program);
    }

    /// First documentation folder wins; returns `false` if one was already set.
    pub(crate) fn attach_docs(&mut self, docs: ProjectDocs) -> bool {
        if self.docs.is_some() {
            return false;
        }
        self.docs = Some(docs);
        true
    }

    pub fn project_name(&self) -> &ProjectName {
        &self.name
    }

    pub fn name(&self) -> &str {
        self.name.name()
    }

    pub fn pathlike_name(&self) -> &str {
        self.name.pathlike()
    }

    /// From the project catalog; `None` when not declared there.
    pub fn requires_parameters(&self) -> Option<bool> {
        self.requires_parameters
    }

    /// All implementations, grouped by language in repo order.
    pub fn programs(&self) -> impl Iterator<Item = &SampleProgram> {
        self.programs.iter().map(Arc::as_ref)
    }

    /// The implementation in `language` (readable or pathlike name).
    pub fn program_in(&self, language: &str) -> Option<&SampleProgram> {
        self.programs()
            .find(|p| p.language_name() == language || p.language_pathlike_name() == language)
    }

    pub fn total_programs(&self) -> usize {
        self.programs.len()
    }

    pub fn docs(&self) -> Option<&ProjectDocs> {
        self.docs.as_ref()
    }

    /// `https://sampleprograms.io/projects/{project}/`. Import and export
    /// projects share a single requirements page.
    pub fn requirements_url(&self) -> String {
        let pathlike = self.name.pathlike();
        if pathlike.contains("export") || pathlike.contains("import") {
            "https://sampleprograms.io/projects/import-export/".to_string()
        } else {
            format!("https://sampleprograms.io/projects/{pathlike}/")
        }
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name.name())
    }
}

impl PartialEq for Project {
    fn eq(&self, other: &Self) -> bool {
        self.name.key() == other.name.key()
    }
}

impl Eq for Project {}

/// The documentation article of a project.
#[derive(Debug)]
pub struct ProjectDocs {
    article: PathBuf,
    requirements: Option<String>,
    history: LazyHistory,
}

impl ProjectDocs {
    /// Reads the documentation folder at `dir`. Returns `None` when the
    /// folder has no article.
    pub(crate) fn read(dir: &Path, history: Arc<dyn HistoryProvider>) -> Option<Self> {
        let article = dir.join(DESCRIPTION_FILE);
        if !article.is_file() {
            return None;
        }

        let requirements_path = dir.join(REQUIREMENTS_FILE);
        let requirements = if requirements_path.is_file() {
            match fs::read_to_string(&requirements_path) {
                Ok(text) => Some(text),
                Err(err) => {
                    warn!(path = %requirements_path.display(), error = %err, "Cannot read project requirements");
                    None
                }
            }
        } else {
            None
        };

        Some(Self {
            article,
            requirements,
            history: LazyHistory::new(history),
        })
    }

    pub fn article_path(&self) -> &Path {
        &self.article
    }

    /// Reads the article from disk on every call.
    pub fn article(&self) -> std::io::Result<String> {
        fs::read_to_string(&self.article)
    }

    pub fn requirements(&self) -> Option<&str> {
        self.requirements.as_deref()
    }

    pub fn history(&self) -> &History {
        self.history.get(&self.article)
    }

    pub fn authors(&self) -> &BTreeSet<String> {
        &self.history().authors
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.history().created
    }

    pub fn modified(&self) -> Option<DateTime<Utc>> {
        self.history().modified
    }
}

/// Projects of the whole repo, unique by lookup key, in insertion order.
#[derive(Debug, Default)]
pub(crate) struct ProjectRegistry {
    projects: Vec<Project>,
    index: HashMap<String, usize>,
}

impl ProjectRegistry {
    /// Returns the project for `name`, creating it on first use.
    pub(crate) fn entry(&mut self, name: &ProjectName, requires_parameters: Option<bool>) -> &mut Project {
        let next = self.projects.len();
        let index = *self.index.entry(name.key().to_string()).or_insert(next);
        if index == next {
            self.projects.push(Project::new(name.clone(), requires_parameters));
        }
        &mut self.projects[index]
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Project> {
        let index = *self.index.get(&lookup_key(name))?;
        Some(&mut self.projects[index])
    }

    pub(crate) fn into_parts(self) -> (Vec<Project>, HashMap<String, usize>) {
        (self.projects, self.index)
    }
}
