// tests/common/mod.rs

#![allow(dead_code)]

use git2::{Commit, IndexAddOption, Repository, Signature, Time};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A throwaway sample programs archive on disk.
pub struct Fixture {
    dir: TempDir,
    git: Option<Repository>,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("archive")).unwrap();
        Self { dir, git: None }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn file(&self, relative: &str, contents: &str) -> &Self {
        let path = self.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
        self
    }

    pub fn git_init(&mut self) -> &mut Self {
        self.git = Some(Repository::init(self.dir.path()).unwrap());
        self
    }

    /// Commits the whole work tree as `author` at `seconds` since the epoch.
    pub fn commit(&self, author: &str, seconds: i64) {
        let repo = self.git.as_ref().expect("git_init first");
        let mut index = repo.index().unwrap();
        index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();

        let email = format!("{}@example.com", author.to_lowercase().replace(' ', "."));
        let signature = Signature::new(author, &email, &Time::new(seconds, 0)).unwrap();
        let parent = repo.head().ok().and_then(|head| head.peel_to_commit().ok());
        let parents: Vec<&Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &signature, &signature, "Update archive", &tree, &parents)
            .unwrap();
    }

    /// Removes the archive from disk while keeping the fixture alive.
    pub fn delete(&mut self) {
        self.git = None;
        fs::remove_dir_all(self.dir.path()).unwrap();
    }
}
