// src/repo.rs

use crate::catalog::ProjectCatalog;
use crate::error::{Error, Result};
use crate::history::{GitHistory, HistoryProvider, NoHistory};
use crate::language::{CollectContext, LanguageCollection};
use crate::naming::{lookup_key, readable_language_name};
use crate::program::SampleProgram;
use crate::project::{Project, ProjectDocs, ProjectRegistry};
use git2::{FetchOptions, RemoteCallbacks};
use indicatif::ProgressBar;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Upstream location of the Sample Programs archive.
pub const DEFAULT_REMOTE: &str = "https://github.com/TheRenegadeCoder/sample-programs.git";
/// Directory holding `<letter>/<language>/` folders.
pub const ARCHIVE_DIR: &str = "archive";
/// Directory of a documentation checkout holding one folder per project.
pub const DOCS_PROJECTS_DIR: &str = "sources/projects";

/// Options for loading a [`Repo`].
#[derive(Debug)]
pub struct RepoBuilder {
    source_dir: Option<PathBuf>,
    docs_dir: Option<PathBuf>,
    projects: Option<Vec<String>>,
    remote: String,
    history: Option<Arc<dyn HistoryProvider>>,
    show_progress: bool,
}

impl Default for RepoBuilder {
    fn default() -> Self {
        Self {
            source_dir: None,
            docs_dir: None,
            projects: None,
            remote: DEFAULT_REMOTE.to_string(),
            history: None,
            show_progress: false,
        }
    }
}

impl RepoBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing checkout instead of cloning. It is never modified.
    pub fn source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dir = Some(dir.into());
        self
    }

    /// Checkout of the documentation website, for project articles.
    pub fn docs_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.docs_dir = Some(dir.into());
        self
    }

    /// Master project list. Overrides the archive's `.glotter.yml`.
    pub fn projects<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projects = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Remote to clone when no source directory is given.
    pub fn remote(mut self, url: impl Into<String>) -> Self {
        self.remote = url.into();
        self
    }

    /// Replaces the git-backed history lookups.
    pub fn history_provider(mut self, provider: Arc<dyn HistoryProvider>) -> Self {
        self.history = Some(provider);
        self
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn load(self) -> Result<Repo> {
        let (root, clone) = match self.source_dir {
            Some(dir) => (dir, None),
            None => {
                let dir = clone_archive(&self.remote, self.show_progress)?;
                (dir.path().to_path_buf(), Some(dir))
            }
        };
        validate(&root)?;

        let catalog = match self.projects {
            Some(names) => Some(ProjectCatalog::from_names(names)),
            None => ProjectCatalog::load(&root).unwrap_or_else(|err| {
                warn!(error = %err, "Ignoring unreadable project catalog");
                None
            }),
        };
        // Without a catalog file the documented projects are the approved ones
        let catalog = catalog.or_else(|| {
            let docs_dir = self.docs_dir.as_ref()?;
            ProjectCatalog::from_docs(&docs_dir.join(DOCS_PROJECTS_DIR))
        });

        let history: Arc<dyn HistoryProvider> = match self.history {
            Some(provider) => provider,
            None => match GitHistory::detect(&root) {
                Some(git) => Arc::new(git),
                None => {
                    warn!(root = %root.display(), "Archive is not a git checkout, history is unavailable");
                    Arc::new(NoHistory)
                }
            },
        };

        let mut registry = ProjectRegistry::default();
        if let Some(catalog) = &catalog {
            for entry in catalog.iter() {
                registry.entry(entry.name(), entry.requires_parameters());
            }
        }

        // Readable name first, folder path to settle names shared by two folders
        let mut dirs: Vec<(String, PathBuf)> = language_dirs(&root.join(ARCHIVE_DIR))
            .into_iter()
            .map(|dir| {
                let pathlike = dir.file_name().map(|n| n.to_string_lossy().into_owned());
                (readable_language_name(&pathlike.unwrap_or_default()), dir)
            })
            .collect();
        dirs.sort_by_cached_key(|(name, dir)| (name.to_lowercase(), dir.clone()));

        let bar = if self.show_progress {
            ProgressBar::new(dirs.len() as u64)
        } else {
            ProgressBar::hidden()
        };
        bar.set_message("Indexing languages");

        let ctx = CollectContext {
            catalog: catalog.as_ref(),
            history,
        };
        let mut languages: Vec<LanguageCollection> = Vec::with_capacity(dirs.len());
        let mut language_index = HashMap::new();
        for (name, dir) in &dirs {
            bar.inc(1);
            if let Some(&kept) = language_index.get(name) {
                let kept: &LanguageCollection = &languages[kept];
                warn!(
                    language = %name,
                    path = %dir.display(),
                    kept = %kept.path().display(),
                    "Duplicate language name, skipping folder"
                );
                continue;
            }
            let language = LanguageCollection::collect(dir, &ctx, &mut registry);
            language_index.insert(name.clone(), languages.len());
            languages.push(language);
        }
        bar.finish_and_clear();

        if let Some(docs_dir) = &self.docs_dir {
            attach_docs(docs_dir, &mut registry);
        }

        let (projects, project_index) = registry.into_parts();
        info!(
            languages = languages.len(),
            projects = projects.len(),
            root = %root.display(),
            "Loaded sample programs repo"
        );

        Ok(Repo {
            root,
            languages,
            language_index,
            projects,
            project_index,
            catalog,
            clone,
        })
    }
}

fn validate(root: &Path) -> Result<()> {
    let invalid = |reason: &str| Error::InvalidRepo {
        path: root.to_path_buf(),
        reason: reason.to_string(),
    };
    if !root.is_dir() {
        return Err(invalid("not a directory"));
    }
    if !root.join(ARCHIVE_DIR).is_dir() {
        return Err(invalid("missing archive directory"));
    }
    Ok(())
}

fn clone_archive(url: &str, show_progress: bool) -> Result<TempDir> {
    let dir = tempfile::Builder::new()
        .prefix("subete-")
        .tempdir()
        .map_err(Error::CloneDirectory)?;
    info!(url, dir = %dir.path().display(), "Cloning sample programs archive");

    let bar = if show_progress {
        ProgressBar::new(0)
    } else {
        ProgressBar::hidden()
    };
    bar.set_message("Cloning archive");

    let mut callbacks = RemoteCallbacks::new();
    callbacks.transfer_progress(|stats| {
        bar.set_length(stats.total_objects() as u64);
        bar.set_position(stats.received_objects() as u64);
        true
    });
    let mut fetch = FetchOptions::new();
    fetch.remote_callbacks(callbacks);

    git2::build::RepoBuilder::new()
        .fetch_options(fetch)
        .clone(url, dir.path())
        .map_err(|source| Error::RepoClone {
            url: url.to_string(),
            source,
        })?;
    bar.finish_and_clear();

    Ok(dir)
}

/// Every `archive/<letter>/<language>` directory.
fn language_dirs(archive: &Path) -> Vec<PathBuf> {
    WalkDir::new(archive)
        .min_depth(2)
        .max_depth(2)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(error = %err, "Cannot read archive entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_dir())
        .filter(|entry| !entry.file_name().to_string_lossy().starts_with('.'))
        .map(|entry| entry.into_path())
        .collect()
}

fn attach_docs(docs_dir: &Path, registry: &mut ProjectRegistry) {
    let projects_dir = docs_dir.join(DOCS_PROJECTS_DIR);
    if !projects_dir.is_dir() {
        warn!(path = %projects_dir.display(), "Documentation directory has no projects, skipping");
        return;
    }
    let history: Arc<dyn HistoryProvider> = match GitHistory::detect(docs_dir) {
        Some(git) => Arc::new(git),
        None => Arc::new(NoHistory),
    };

    let entries = WalkDir::new(&projects_dir).min_depth(1).max_depth(1).sort_by_file_name();
    for entry in entries.into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_dir() {
            continue;
        }
        let folder = entry.file_name().to_string_lossy();
        let Some(project) = registry.get_mut(&folder) else {
            debug!(folder = %folder, "Documentation for an unknown project");
            continue;
        };
        let Some(docs) = ProjectDocs::read(entry.path(), Arc::clone(&history)) else {
            debug!(folder = %folder, "Documentation folder without an article");
            continue;
        };
        if !project.attach_docs(docs) {
            warn!(project = %project, path = %entry.path().display(), "Duplicate project documentation ignored");
        }
    }
}

/// The whole Sample Programs archive, indexed once and read-only afterwards.
#[derive(Debug)]
pub struct Repo {
    root: PathBuf,
    languages: Vec<LanguageCollection>,
    language_index: HashMap<String, usize>,
    projects: Vec<Project>,
    project_index: HashMap<String, usize>,
    catalog: Option<ProjectCatalog>,
    /// Checkout created by `load`; deleted when the repo is dropped.
    clone: Option<TempDir>,
}

impl Repo {
    pub fn builder() -> RepoBuilder {
        RepoBuilder::new()
    }

    /// Loads the archive from `source_dir`, or clones it when `None`.
    pub fn load(source_dir: Option<&Path>) -> Result<Self> {
        match source_dir {
            Some(dir) => RepoBuilder::new().source_dir(dir).load(),
            None => RepoBuilder::new().load(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the archive was cloned by this library.
    pub fn is_managed_clone(&self) -> bool {
        self.clone.is_some()
    }

    /// Looks up a language by readable name (`C#`), falling back to a
    /// case-insensitive match on the readable or folder name.
    pub fn language(&self, name: &str) -> Result<&LanguageCollection> {
        if let Some(&i) = self.language_index.get(name) {
            return Ok(&self.languages[i]);
        }
        self.languages
            .iter()
            .find(|l| l.name().eq_ignore_ascii_case(name) || l.pathlike_name().eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::LanguageNotFound(name.to_string()))
    }

    /// Languages sorted by readable name, case-insensitively.
    pub fn languages(&self) -> impl Iterator<Item = &LanguageCollection> {
        self.languages.iter()
    }

    pub fn program(&self, language: &str, project: &str) -> Result<&SampleProgram> {
        self.language(language)?.program(project)
    }

    pub fn project(&self, name: &str) -> Result<&Project> {
        self.project_index
            .get(&lookup_key(name))
            .map(|&i| &self.projects[i])
            .ok_or_else(|| Error::ProjectNotFound(name.to_string()))
    }

    /// Catalog projects first, then the rest in discovery order.
    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.iter()
    }

    pub fn catalog(&self) -> Option<&ProjectCatalog> {
        self.catalog.as_ref()
    }

    pub fn total_languages(&self) -> usize {
        self.languages.len()
    }

    pub fn total_programs(&self) -> usize {
        self.languages.iter().map(|l| l.total_programs()).sum()
    }

    /// Number of languages with a test configuration file.
    pub fn total_tests(&self) -> usize {
        self.languages.iter().filter(|l| l.has_testinfo()).count()
    }

    pub fn total_approved_projects(&self) -> usize {
        self.catalog.as_ref().map_or(0, |c| c.len())
    }

    pub fn languages_by_letter(&self, letter: char) -> Vec<&LanguageCollection> {
        let letter = letter.to_ascii_lowercase();
        self.languages
            .iter()
            .filter(|l| l.first_letter().map(|c| c.to_ascii_lowercase()) == Some(letter))
            .collect()
    }

    pub fn sorted_language_letters(&self) -> Vec<char> {
        self.languages
            .iter()
            .filter_map(|l| l.first_letter())
            .map(|c| c.to_ascii_lowercase())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Uniformly random language; seed `rng` for reproducible picks.
    pub fn random_language<R: Rng>(&self, rng: &mut R) -> Option<&LanguageCollection> {
        self.languages.choose(rng)
    }

    /// Uniformly random program across all languages.
    pub fn random_program<R: Rng>(&self, rng: &mut R) -> Option<&SampleProgram> {
        let total = self.total_programs();
        if total == 0 {
            return None;
        }
        let mut n = rng.gen_range(0..total);
        for language in &self.languages {
            if n < language.total_programs() {
                return language.programs().nth(n);
            }
            n -= language.total_programs();
        }
        None
    }
}
