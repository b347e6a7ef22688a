// src/lib.rs

//! Read-only index over the Sample Programs archive: languages, the sample
//! programs in each, the projects they implement and their git history.
//!
//! ```no_run
//! let repo = subete::load(Some(std::path::Path::new("sample-programs")))?;
//! let python = repo.language("Python")?;
//! let hello = python.program("Hello World")?;
//! println!("{hello} by {:?}", hello.authors());
//! # Ok::<(), subete::Error>(())
//! ```

pub mod catalog;
pub mod classify;
pub mod error;
pub mod history;
pub mod language;
pub mod model;
pub mod naming;
pub mod program;
pub mod project;
pub mod repo;
pub mod testinfo;

pub use catalog::ProjectCatalog;
pub use error::{Error, Result};
pub use history::{GitHistory, HistoryError, HistoryProvider, NoHistory};
pub use language::LanguageCollection;
pub use model::{History, TestStatus};
pub use naming::{ProjectName, ProjectNameResolver};
pub use program::SampleProgram;
pub use project::{Project, ProjectDocs};
pub use repo::{Repo, RepoBuilder};
pub use testinfo::{TestCoverage, TestInfo};

use std::path::Path;

/// Loads the archive from `source_dir`, or clones it into a temporary
/// directory owned by the returned [`Repo`] when `None`.
pub fn load(source_dir: Option<&Path>) -> Result<Repo> {
    Repo::load(source_dir)
}
