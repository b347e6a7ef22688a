// src/catalog.rs

use crate::error::ConfigError;
use crate::naming::{lookup_key, split_words, ProjectName};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// File at the archive root that declares every approved project.
pub const CATALOG_FILE: &str = ".glotter.yml";

#[derive(Debug, Deserialize)]
struct GlotterFile {
    #[serde(default)]
    projects: BTreeMap<String, ProjectDefinition>,
}

/// One entry of the `projects:` mapping.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectDefinition {
    #[serde(default)]
    pub words: Vec<String>,
    #[serde(default)]
    pub acronyms: Vec<String>,
    #[serde(default)]
    pub requires_parameters: bool,
}

#[derive(Debug, Clone)]
pub struct CatalogEntry {
    name: ProjectName,
    requires_parameters: Option<bool>,
}

impl CatalogEntry {
    pub fn name(&self) -> &ProjectName {
        &self.name
    }

    /// `None` when the entry came from a plain list of names.
    pub fn requires_parameters(&self) -> Option<bool> {
        self.requires_parameters
    }
}

/// The master list of known projects, in declaration order.
///
/// An exclusive catalog (`.glotter.yml` or an explicit list) also decides
/// which files count as sample programs. One derived from documentation
/// folders only lists the approved projects.
#[derive(Debug, Clone, Default)]
pub struct ProjectCatalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<String, usize>,
    exclusive: bool,
}

impl ProjectCatalog {
    /// Builds a catalog from names in any spelling. Unparseable names and
    /// duplicates are skipped.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut catalog = Self {
            exclusive: true,
            ..Self::default()
        };
        for name in names {
            match ProjectName::parse(name.as_ref()) {
                Some(project) => catalog.push(project, None),
                None => warn!(name = name.as_ref(), "Skipping unparseable project name"),
            }
        }
        catalog
    }

    /// Reads the catalog from `root`. A missing file is `Ok(None)`.
    pub fn load(root: &Path) -> Result<Option<Self>, ConfigError> {
        let path = root.join(CATALOG_FILE);
        if !path.is_file() {
            debug!(path = %path.display(), "No project catalog found");
            return Ok(None);
        }

        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let file: GlotterFile =
            serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse { path, source })?;

        Ok(Some(Self::from_definitions(file.projects)))
    }

    /// One entry per folder of `projects_dir`, the project folders of a
    /// documentation checkout. `None` when there are no such folders.
    pub fn from_docs(projects_dir: &Path) -> Option<Self> {
        let folders: Vec<String> = WalkDir::new(projects_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_dir())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| !name.starts_with('.'))
            .collect();
        if folders.is_empty() {
            return None;
        }

        let mut catalog = Self::from_names(folders);
        catalog.exclusive = false;
        Some(catalog)
    }

    fn from_definitions(definitions: BTreeMap<String, ProjectDefinition>) -> Self {
        let mut catalog = Self {
            exclusive: true,
            ..Self::default()
        };
        for (id, definition) in definitions {
            let words = if definition.words.is_empty() {
                split_words(&id).unwrap_or_else(|| vec![lookup_key(&id)])
            } else {
                definition.words.iter().map(|w| w.to_ascii_lowercase()).collect()
            };
            let name = ProjectName::from_words(&words, &definition.acronyms);
            catalog.push(name, Some(definition.requires_parameters));
        }
        catalog
    }

    fn push(&mut self, name: ProjectName, requires_parameters: Option<bool>) {
        if name.key().is_empty() || self.index.contains_key(name.key()) {
            return;
        }
        self.index.insert(name.key().to_string(), self.entries.len());
        self.entries.push(CatalogEntry {
            name,
            requires_parameters,
        });
    }

    /// Looks up an entry by any spelling of its name.
    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.index.get(&lookup_key(name)).map(|&i| &self.entries[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether names missing from the catalog are rejected.
    pub fn is_exclusive(&self) -> bool {
        self.exclusive
    }
}
