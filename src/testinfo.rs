// src/testinfo.rs

use crate::error::ConfigError;
use crate::model::TestStatus;
use crate::naming::{lookup_key, ResolvedName};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Test configuration file expected in each language folder.
pub const TEST_CONFIG_FILE: &str = "testinfo.yml";

/// Typed view of `testinfo.yml`. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestInfo {
    #[serde(default)]
    pub folder: Option<FolderInfo>,
    #[serde(default)]
    pub container: Option<ContainerInfo>,
    /// Explicit list of tested projects, in any spelling.
    #[serde(default)]
    pub projects: Option<Vec<String>>,
    #[serde(default)]
    pub untestable: Option<Untestable>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FolderInfo {
    pub extension: Option<String>,
    pub naming: Option<Naming>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Naming {
    Underscore,
    Hyphen,
    Camel,
    Pascal,
    Lower,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainerInfo {
    pub image: Option<String>,
    pub tag: Option<String>,
    pub build: Option<String>,
    pub cmd: Option<String>,
}

/// `untestable: true` or `untestable: "needs a licensed compiler"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Untestable {
    Flag(bool),
    Reason(String),
}

/// Test coverage of one language, derived from its `testinfo.yml`.
#[derive(Debug, Clone, Default)]
pub enum TestCoverage {
    /// No test configuration, or one that could not be read.
    #[default]
    NoData,
    Untestable { reason: Option<String> },
    Covered {
        /// Lookup keys of the explicitly listed projects.
        projects: Option<BTreeSet<String>>,
        extension: Option<String>,
        info: TestInfo,
    },
}

impl TestCoverage {
    /// Loads the coverage of the language folder at `dir`.
    ///
    /// Never fails: a missing file is normal and a broken one is logged.
    pub fn load(dir: &Path) -> Self {
        match TestInfo::load(dir) {
            Ok(Some(info)) => Self::from_info(info),
            Ok(None) => {
                debug!(dir = %dir.display(), "No test configuration");
                Self::NoData
            }
            Err(err) => {
                warn!(dir = %dir.display(), error = %err, "Ignoring unreadable test configuration");
                Self::NoData
            }
        }
    }

    pub fn from_info(info: TestInfo) -> Self {
        match &info.untestable {
            Some(Untestable::Flag(true)) => return Self::Untestable { reason: None },
            Some(Untestable::Reason(reason)) => {
                return Self::Untestable {
                    reason: Some(reason.clone()),
                }
            }
            _ => {}
        }

        let projects = info
            .projects
            .as_ref()
            .map(|names| names.iter().map(|n| lookup_key(n)).collect());
        let extension = info.folder.as_ref().and_then(|f| f.extension.clone());
        Self::Covered {
            projects,
            extension,
            info,
        }
    }

    pub fn is_untestable(&self) -> bool {
        matches!(self, Self::Untestable { .. })
    }

    /// The parsed file, if there was a usable one.
    pub fn info(&self) -> Option<&TestInfo> {
        match self {
            Self::Covered { info, .. } => Some(info),
            _ => None,
        }
    }

    pub fn status_for(&self, program: &ResolvedName) -> TestStatus {
        match self {
            Self::NoData => TestStatus::NoData,
            Self::Untestable { reason } => TestStatus::Untestable {
                reason: reason.clone(),
            },
            Self::Covered {
                projects: Some(projects),
                ..
            } => {
                if projects.contains(program.project.key()) {
                    TestStatus::Tested
                } else {
                    TestStatus::NotTested
                }
            }
            Self::Covered { extension, .. } => match extension {
                Some(ext) if !ext.eq_ignore_ascii_case(&program.extension) => TestStatus::NotTested,
                _ => TestStatus::Tested,
            },
        }
    }
}

impl TestInfo {
    /// Reads `testinfo.yml` from `dir`. A missing file is `Ok(None)`.
    pub fn load(dir: &Path) -> Result<Option<Self>, ConfigError> {
        let path = dir.join(TEST_CONFIG_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        // An empty document is valid and means "no settings"
        if text.trim().is_empty() {
            return Ok(Some(Self::default()));
        }
        serde_yaml::from_str(&text)
            .map(Some)
            .map_err(|source| ConfigError::Parse { path, source })
    }
}
