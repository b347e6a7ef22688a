// src/history.rs

use crate::model::History;
use chrono::{TimeZone, Utc};
use git2::{Commit, Delta, Diff, DiffOptions, Repository, Sort};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("repository root {} no longer exists", root.display())]
    Missing { root: PathBuf },

    #[error("cannot open repository at {}: {source}", root.display())]
    Unavailable {
        root: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("{} is not inside the repository work tree", path.display())]
    OutsideRepository { path: PathBuf },

    #[error(transparent)]
    Git(#[from] git2::Error),
}

/// Source of authorship and timestamps for files in the archive.
pub trait HistoryProvider: fmt::Debug + Send + Sync {
    fn history(&self, path: &Path) -> Result<History, HistoryError>;
}

/// Provider used when the archive is not under version control.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHistory;

impl HistoryProvider for NoHistory {
    fn history(&self, _path: &Path) -> Result<History, HistoryError> {
        Ok(History::default())
    }
}

/// Reads history straight from the git object database with libgit2.
///
/// The repository is opened on every lookup, so a work tree that vanishes
/// after loading produces an error instead of stale handles. The log itself
/// is walked once per provider: the first lookup indexes every path touched
/// by a commit reachable from HEAD, later lookups only run blame.
#[derive(Debug)]
pub struct GitHistory {
    root: PathBuf,
    index: Mutex<Option<Arc<PathIndex>>>,
}

type PathIndex = HashMap<PathBuf, History>;

impl GitHistory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index: Mutex::new(None),
        }
    }

    /// Returns a provider if `root` lies inside a non-bare git work tree.
    pub fn detect(root: &Path) -> Option<Self> {
        let repo = Repository::discover(root).ok()?;
        repo.workdir().is_some().then(|| Self::new(root))
    }

    fn open(&self) -> Result<(Repository, PathBuf), HistoryError> {
        if !self.root.is_dir() {
            return Err(HistoryError::Missing {
                root: self.root.clone(),
            });
        }
        let repo = Repository::discover(&self.root).map_err(|source| HistoryError::Unavailable {
            root: self.root.clone(),
            source,
        })?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| HistoryError::OutsideRepository {
                path: self.root.clone(),
            })?
            .to_path_buf();
        Ok((repo, workdir))
    }

    fn path_index(&self, repo: &Repository) -> Result<Arc<PathIndex>, HistoryError> {
        let mut cached = self.index.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(index) = cached.as_ref() {
            return Ok(Arc::clone(index));
        }
        let index = Arc::new(index_log(repo)?);
        debug!(root = %self.root.display(), paths = index.len(), "Indexed git log");
        *cached = Some(Arc::clone(&index));
        Ok(index)
    }
}

impl HistoryProvider for GitHistory {
    fn history(&self, path: &Path) -> Result<History, HistoryError> {
        let (repo, workdir) = self.open()?;
        let relative = relative_to(&workdir, path)?;

        let mut history = self
            .path_index(&repo)?
            .get(&relative)
            .cloned()
            .unwrap_or_default();

        // Blame needs the full ancestry; shallow clones keep the log result
        match repo.blame_file(&relative, None) {
            Ok(blame) => {
                for hunk in blame.iter() {
                    if let Some(name) = hunk.final_signature().name() {
                        history.authors.insert(name.to_string());
                    }
                }
            }
            Err(err) => debug!(path = %relative.display(), error = %err, "Blame unavailable"),
        }

        Ok(history)
    }
}

fn relative_to(workdir: &Path, path: &Path) -> Result<PathBuf, HistoryError> {
    let outside = || HistoryError::OutsideRepository {
        path: path.to_path_buf(),
    };
    let workdir = workdir.canonicalize().map_err(|_| outside())?;
    let path = path.canonicalize().map_err(|_| outside())?;
    path.strip_prefix(&workdir)
        .map(Path::to_path_buf)
        .map_err(|_| outside())
}

/// Walks every commit reachable from HEAD once and records its author and
/// time against each path it changed.
fn index_log(repo: &Repository) -> Result<PathIndex, git2::Error> {
    let mut index = PathIndex::new();
    let mut revwalk = repo.revwalk()?;
    if revwalk.push_head().is_err() {
        // Unborn HEAD: nothing has been committed yet
        return Ok(index);
    }
    revwalk.set_sorting(Sort::TIME)?;

    for oid in revwalk {
        let commit = match oid.and_then(|oid| repo.find_commit(oid)) {
            Ok(commit) => commit,
            Err(err) => {
                warn!(error = %err, "History walk stopped early");
                break;
            }
        };
        let Some(time) = Utc.timestamp_opt(commit.time().seconds(), 0).single() else {
            continue;
        };
        let author = commit.author();
        for path in changed_paths(repo, &commit)? {
            index.entry(path).or_default().record(author.name(), time);
        }
    }
    Ok(index)
}

/// Paths whose content differs from every parent. A path identical to any
/// parent was brought in by a merge and is not attributed to it.
fn changed_paths(repo: &Repository, commit: &Commit) -> Result<HashSet<PathBuf>, git2::Error> {
    let tree = commit.tree()?;
    let mut opts = DiffOptions::new();
    opts.ignore_filemode(true);

    if commit.parent_count() == 0 {
        let diff = repo.diff_tree_to_tree(None, Some(&tree), Some(&mut opts))?;
        return Ok(diff_paths(&diff));
    }

    let mut changed: Option<HashSet<PathBuf>> = None;
    for parent in commit.parents() {
        let diff = repo.diff_tree_to_tree(Some(&parent.tree()?), Some(&tree), Some(&mut opts))?;
        let paths = diff_paths(&diff);
        changed = Some(match changed {
            Some(previous) => previous.intersection(&paths).cloned().collect(),
            None => paths,
        });
    }
    Ok(changed.unwrap_or_default())
}

fn diff_paths(diff: &Diff<'_>) -> HashSet<PathBuf> {
    diff.deltas()
        .filter(|delta| delta.status() != Delta::Deleted)
        .filter_map(|delta| delta.new_file().path().map(Path::to_path_buf))
        .collect()
}

/// Per-object history cache, filled on first access.
#[derive(Debug)]
pub(crate) struct LazyHistory {
    provider: Arc<dyn HistoryProvider>,
    cache: OnceLock<History>,
}

impl LazyHistory {
    pub(crate) fn new(provider: Arc<dyn HistoryProvider>) -> Self {
        Self {
            provider,
            cache: OnceLock::new(),
        }
    }

    pub(crate) fn get(&self, path: &Path) -> &History {
        self.cache.get_or_init(|| match self.provider.history(path) {
            Ok(history) => history,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "History lookup failed, leaving metadata empty");
                History::default()
            }
        })
    }
}
