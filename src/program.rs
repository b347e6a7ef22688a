// src/program.rs

use crate::classify::image_type;
use crate::history::{HistoryProvider, LazyHistory};
use crate::model::{History, TestStatus};
use crate::naming::{ProjectName, ResolvedName};
use chrono::{DateTime, Utc};
use image::ImageFormat;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

const ISSUE_QUERY_BASE: &str = "https://github.com/TheRenegadeCoder/sample-programs-website/issues?utf8=%E2%9C%93&q=is%3Aissue+is%3Aopen+";

/// One example program file and everything known about it.
#[derive(Debug)]
pub struct SampleProgram {
    path: PathBuf,
    language: String,
    language_pathlike: String,
    project: ProjectName,
    extension: String,
    image_type: Option<ImageFormat>,
    test_status: TestStatus,
    size: u64,
    line_count: usize,
    history: LazyHistory,
}

impl SampleProgram {
    pub(crate) fn new(
        path: PathBuf,
        language: &str,
        language_pathlike: &str,
        resolved: ResolvedName,
        test_status: TestStatus,
        history: Arc<dyn HistoryProvider>,
    ) -> Self {
        let image_type = image_type(&resolved.extension);
        let (size, line_count) = match fs::read(&path) {
            Ok(bytes) => {
                let lines = if image_type.is_some() {
                    0
                } else {
                    String::from_utf8_lossy(&bytes).lines().count()
                };
                (bytes.len() as u64, lines)
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Cannot read sample program");
                (0, 0)
            }
        };

        Self {
            path,
            language: language.to_string(),
            language_pathlike: language_pathlike.to_string(),
            project: resolved.project,
            extension: resolved.extension,
            image_type,
            test_status,
            size,
            line_count,
            history: LazyHistory::new(history),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        self.path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
    }

    /// Readable language name, e.g. `C#`.
    pub fn language_name(&self) -> &str {
        &self.language
    }

    /// Language folder name, e.g. `c-sharp`.
    pub fn language_pathlike_name(&self) -> &str {
        &self.language_pathlike
    }

    pub fn project(&self) -> &ProjectName {
        &self.project
    }

    pub fn project_name(&self) -> &str {
        self.project.name()
    }

    pub fn project_pathlike_name(&self) -> &str {
        self.project.pathlike()
    }

    /// Full extension with its leading dot; may span several dots (`.8xp.txt`).
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn is_image(&self) -> bool {
        self.image_type.is_some()
    }

    pub fn image_type(&self) -> Option<ImageFormat> {
        self.image_type
    }

    /// Pixel size of an image program. Decodes only the header.
    pub fn image_dimensions(&self) -> Option<(u32, u32)> {
        self.image_type?;
        match image::image_dimensions(&self.path) {
            Ok(dimensions) => Some(dimensions),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "Cannot read image dimensions");
                None
            }
        }
    }

    pub fn test_status(&self) -> &TestStatus {
        &self.test_status
    }

    pub fn is_tested(&self) -> bool {
        self.test_status.is_tested()
    }

    /// Size in bytes at load time.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Number of lines at load time; always 0 for images.
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Reads the source from disk on every call.
    pub fn code(&self) -> io::Result<String> {
        let bytes = fs::read(&self.path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn history(&self) -> &History {
        self.history.get(&self.path)
    }

    /// Empty when history is unavailable.
    pub fn authors(&self) -> &BTreeSet<String> {
        &self.history().authors
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.history().created
    }

    pub fn modified(&self) -> Option<DateTime<Utc>> {
        self.history().modified
    }

    /// `https://sampleprograms.io/projects/{project}/{language}/`
    pub fn documentation_url(&self) -> String {
        format!(
            "https://sampleprograms.io/projects/{}/{}/",
            self.project.pathlike(),
            self.language_pathlike
        )
    }

    /// GitHub search for open article issues about this program.
    pub fn article_issue_query_url(&self) -> String {
        format!(
            "{}{}+{}",
            ISSUE_QUERY_BASE,
            self.project.pathlike().replace('-', "+"),
            self.language.replace(' ', "+").to_lowercase()
        )
    }
}

impl fmt::Display for SampleProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}", self.project.name(), self.language)
    }
}

impl PartialEq for SampleProgram {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.language == other.language
    }
}

impl Eq for SampleProgram {}
