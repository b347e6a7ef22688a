// src/language.rs

use crate::catalog::ProjectCatalog;
use crate::classify::{classify, FileKind, IgnoreReason};
use crate::error::{Error, Result};
use crate::history::HistoryProvider;
use crate::naming::{lookup_key, readable_language_name, ProjectNameResolver};
use crate::program::SampleProgram;
use crate::project::ProjectRegistry;
use crate::testinfo::TestCoverage;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Shared inputs for building every language of a repo.
pub(crate) struct CollectContext<'a> {
    pub catalog: Option<&'a ProjectCatalog>,
    pub history: Arc<dyn HistoryProvider>,
}

/// All sample programs of one language folder.
#[derive(Debug)]
pub struct LanguageCollection {
    name: String,
    pathlike: String,
    path: PathBuf,
    programs: Vec<Arc<SampleProgram>>,
    index: HashMap<String, usize>,
    readme: Option<PathBuf>,
    testinfo_path: Option<PathBuf>,
    coverage: TestCoverage,
    missing: Vec<String>,
}

impl LanguageCollection {
    /// Indexes the immediate files of `dir` and registers every program with
    /// its project. Problems with single files are logged and skipped.
    pub(crate) fn collect(dir: &Path, ctx: &CollectContext<'_>, registry: &mut ProjectRegistry) -> Self {
        let pathlike = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = readable_language_name(&pathlike);
        let resolver = ProjectNameResolver::new(ctx.catalog);
        let coverage = TestCoverage::load(dir);

        let mut programs: Vec<Arc<SampleProgram>> = Vec::new();
        let mut index = HashMap::new();
        let mut readme = None;
        let mut testinfo_path = None;

        let entries = WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(language = %name, error = %err, "Cannot read language folder entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.into_path();

            match classify(&path, &resolver) {
                FileKind::Article => readme = Some(path),
                FileKind::TestConfig => testinfo_path = Some(path),
                FileKind::SampleProgram(resolved) => {
                    let key = resolved.project.key().to_string();
                    if let Some(&first) = index.get(&key) {
                        let first: &Arc<SampleProgram> = &programs[first];
                        warn!(
                            language = %name,
                            path = %path.display(),
                            kept = %first.path().display(),
                            "Duplicate program for project, keeping the first"
                        );
                        continue;
                    }

                    let status = coverage.status_for(&resolved);
                    let requires_parameters = ctx
                        .catalog
                        .and_then(|c| c.get(resolved.project.key()))
                        .and_then(|e| e.requires_parameters());
                    let program = Arc::new(SampleProgram::new(
                        path,
                        &name,
                        &pathlike,
                        resolved,
                        status,
                        Arc::clone(&ctx.history),
                    ));
                    debug!(%program, "Collected sample program");

                    registry
                        .entry(program.project(), requires_parameters)
                        .add_program(Arc::clone(&program));
                    index.insert(key, programs.len());
                    programs.push(program);
                }
                FileKind::Ignored(IgnoreReason::Unresolved(err)) => {
                    warn!(language = %name, path = %path.display(), error = %err, "Excluding file without a valid project name");
                }
                FileKind::Ignored(reason) => {
                    debug!(language = %name, path = %path.display(), ?reason, "Ignoring file");
                }
            }
        }

        let missing = ctx
            .catalog
            .map(|catalog| {
                let mut missing: Vec<String> = catalog
                    .iter()
                    .filter(|entry| !index.contains_key(entry.name().key()))
                    .map(|entry| entry.name().name().to_string())
                    .collect();
                missing.sort();
                missing
            })
            .unwrap_or_default();

        Self {
            name,
            pathlike,
            path: dir.to_path_buf(),
            programs,
            index,
            readme,
            testinfo_path,
            coverage,
            missing,
        }
    }

    /// Readable language name, e.g. `Google Apps Script`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Folder name of the language, e.g. `google-apps-script`.
    pub fn pathlike_name(&self) -> &str {
        &self.pathlike
    }

    pub fn first_letter(&self) -> Option<char> {
        self.pathlike.chars().next()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Looks up a program by any spelling of its project name.
    pub fn program(&self, project: &str) -> Result<&SampleProgram> {
        self.index
            .get(&lookup_key(project))
            .map(|&i| self.programs[i].as_ref())
            .ok_or_else(|| Error::ProjectNotFound(project.to_string()))
    }

    /// Programs in file name order.
    pub fn programs(&self) -> impl Iterator<Item = &SampleProgram> {
        self.programs.iter().map(Arc::as_ref)
    }

    pub fn total_programs(&self) -> usize {
        self.programs.len()
    }

    /// Bytes of all programs; README and testinfo are not counted.
    pub fn total_size(&self) -> u64 {
        self.programs.iter().map(|p| p.size()).sum()
    }

    pub fn total_line_count(&self) -> usize {
        self.programs.iter().map(|p| p.line_count()).sum()
    }

    pub fn has_readme(&self) -> bool {
        self.readme.is_some()
    }

    pub fn readme_path(&self) -> Option<&Path> {
        self.readme.as_deref()
    }

    /// README contents, read on every call.
    pub fn readme(&self) -> io::Result<Option<String>> {
        self.readme.as_deref().map(fs::read_to_string).transpose()
    }

    pub fn has_testinfo(&self) -> bool {
        self.testinfo_path.is_some()
    }

    pub fn testinfo_path(&self) -> Option<&Path> {
        self.testinfo_path.as_deref()
    }

    pub fn testinfo(&self) -> &TestCoverage {
        &self.coverage
    }

    /// Catalog projects without a program here, sorted by name. Empty when
    /// the repo has no catalog.
    pub fn missing_programs(&self) -> &[String] {
        &self.missing
    }

    pub fn missing_programs_count(&self) -> usize {
        self.missing.len()
    }

    pub fn lang_docs_url(&self) -> String {
        format!("https://sampleprograms.io/languages/{}/", self.pathlike)
    }

    pub fn testinfo_url(&self) -> String {
        let letter = self.first_letter().map(String::from).unwrap_or_default();
        format!(
            "https://github.com/TheRenegadeCoder/sample-programs/blob/main/archive/{}/{}/testinfo.yml",
            letter, self.pathlike
        )
    }
}

impl fmt::Display for LanguageCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
