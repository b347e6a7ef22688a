// src/classify.rs

use crate::naming::{NameError, ProjectNameResolver, ResolvedName};
use crate::testinfo::TEST_CONFIG_FILE;
use image::ImageFormat;
use std::path::Path;

/// Per-language documentation article.
pub const ARTICLE_FILE: &str = "README.md";

/// What a file inside a language folder is.
#[derive(Debug, Clone, PartialEq)]
pub enum FileKind {
    SampleProgram(ResolvedName),
    Article,
    TestConfig,
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, PartialEq)]
pub enum IgnoreReason {
    NotAFile,
    Hidden,
    /// Markdown or YAML other than the well-known files
    Auxiliary,
    Unresolved(NameError),
}

/// Classifies `path` by naming convention only; the file is not read.
pub fn classify(path: &Path, resolver: &ProjectNameResolver<'_>) -> FileKind {
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return FileKind::Ignored(IgnoreReason::NotAFile);
    };

    if file_name == ARTICLE_FILE {
        return FileKind::Article;
    }
    if file_name == TEST_CONFIG_FILE {
        return FileKind::TestConfig;
    }
    if file_name.starts_with('.') {
        return FileKind::Ignored(IgnoreReason::Hidden);
    }

    let lower = file_name.to_ascii_lowercase();
    if [".md", ".yml", ".yaml"].iter().any(|ext| lower.ends_with(ext)) {
        return FileKind::Ignored(IgnoreReason::Auxiliary);
    }

    match resolver.resolve(file_name) {
        Ok(resolved) => FileKind::SampleProgram(resolved),
        Err(err) => FileKind::Ignored(IgnoreReason::Unresolved(err)),
    }
}

/// Image format of a program written as a picture (e.g. Piet), judged by
/// the last segment of its extension.
pub fn image_type(extension: &str) -> Option<ImageFormat> {
    let last = extension.rsplit('.').next()?;
    if last.is_empty() {
        return None;
    }
    ImageFormat::from_extension(last)
}
