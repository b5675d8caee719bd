//! Versioned persistence for rendered reports and data dumps.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::VersioningConfig;
use crate::constants::report::{DATA_EXTENSION, DATA_INFIX, REPORT_EXTENSION, VERSION_MARKER};
use crate::errors::ScorecardError;

/// `<major>.<minor>` report version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ReportVersion {
    /// Major component.
    pub major: u32,
    /// Minor component.
    pub minor: u32,
}

impl ReportVersion {
    /// Version `major.minor`.
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parse `"<major>.<minor>"`.
    pub fn parse(raw: &str) -> Option<Self> {
        let (major, minor) = raw.split_once('.')?;
        Some(Self {
            major: major.parse().ok()?,
            minor: minor.parse().ok()?,
        })
    }

    /// Extract the version from a report file name for `prefix`.
    pub fn from_report_name(name: &str, prefix: &str) -> Option<Self> {
        let rest = name.strip_prefix(prefix)?.strip_prefix(VERSION_MARKER)?;
        let version = rest
            .strip_suffix(REPORT_EXTENSION)?
            .strip_suffix('.')?;
        Self::parse(version)
    }

    /// Extract the version from a data dump file name for `prefix`.
    pub fn from_data_name(name: &str, prefix: &str) -> Option<Self> {
        let rest = name
            .strip_prefix(prefix)?
            .strip_prefix(DATA_INFIX)?
            .strip_prefix(VERSION_MARKER)?;
        let version = rest.strip_suffix(DATA_EXTENSION)?.strip_suffix('.')?;
        Self::parse(version)
    }

    /// Version claimed by either a report or a data dump file name.
    pub fn from_file_name(name: &str, prefix: &str) -> Option<Self> {
        Self::from_report_name(name, prefix).or_else(|| Self::from_data_name(name, prefix))
    }

    /// Report file name, e.g. `rep_scorecard_v1.2.md`.
    pub fn report_name(&self, prefix: &str) -> String {
        format!("{prefix}{VERSION_MARKER}{self}.{REPORT_EXTENSION}")
    }

    /// Data dump file name, e.g. `rep_scorecard_data_v1.2.json`.
    pub fn data_name(&self, prefix: &str) -> String {
        format!("{prefix}{DATA_INFIX}{VERSION_MARKER}{self}.{DATA_EXTENSION}")
    }
}

impl fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Pick the version following the highest version claimed among `names`.
///
/// Report and data dump names both count, so an orphaned dump still
/// reserves its version.
/// With no prior report, or when the configured major is newer than every
/// existing one, the result is `<major>.0`. Otherwise the minor component
/// grows by `minor_step` with no rollover into the major.
pub fn next_version<S: AsRef<str>>(names: &[S], versioning: &VersioningConfig) -> ReportVersion {
    let highest = names
        .iter()
        .filter_map(|name| ReportVersion::from_file_name(name.as_ref(), &versioning.prefix))
        .max();
    match highest {
        Some(found) if found.major >= versioning.major => ReportVersion::new(
            found.major,
            found.minor.saturating_add(versioning.minor_step),
        ),
        _ => ReportVersion::new(versioning.major, 0),
    }
}

/// Where a published report landed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SavedReport {
    /// Version both files were saved under.
    pub version: ReportVersion,
    /// Location of the Markdown report.
    pub report: PathBuf,
    /// Location of the JSON dump.
    pub data: PathBuf,
}

/// Storage backend for versioned report artifacts.
///
/// Implementations never overwrite: writing a name that already exists is a
/// [`ScorecardError::VersionConflict`].
pub trait ReportStore {
    /// File names currently present in the store.
    fn existing_names(&self) -> Result<Vec<String>, ScorecardError>;

    /// Write `contents` under a name that must not exist yet.
    fn write_new(&mut self, name: &str, contents: &str) -> Result<PathBuf, ScorecardError>;

    /// Where `name` lives in this store.
    fn location(&self, name: &str) -> PathBuf {
        PathBuf::from(name)
    }

    /// Next free version for the configured prefix.
    fn next_version(&self, versioning: &VersioningConfig) -> Result<ReportVersion, ScorecardError> {
        let names = self.existing_names()?;
        Ok(next_version(&names, versioning))
    }

    /// Persist a report and its data dump under `version`.
    ///
    /// Both names are checked before either file is written, so a taken
    /// version leaves nothing behind.
    fn save(
        &mut self,
        versioning: &VersioningConfig,
        version: ReportVersion,
        report: &str,
        data: &str,
    ) -> Result<SavedReport, ScorecardError> {
        let report_name = version.report_name(&versioning.prefix);
        let data_name = version.data_name(&versioning.prefix);
        let existing = self.existing_names()?;
        if let Some(taken) = [&report_name, &data_name]
            .into_iter()
            .find(|name| existing.contains(*name))
        {
            return Err(ScorecardError::VersionConflict {
                path: self.location(taken),
            });
        }
        let report_path = self.write_new(&report_name, report)?;
        let data_path = self.write_new(&data_name, data)?;
        info!(
            "[scorecard:store] saved v{} -> {}",
            version,
            report_path.display()
        );
        Ok(SavedReport {
            version,
            report: report_path,
            data: data_path,
        })
    }
}

/// Report store backed by a flat output directory.
#[derive(Clone, Debug)]
pub struct FileReportStore {
    root: PathBuf,
}

impl FileReportStore {
    /// Store rooted at `root`; the directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Output directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ReportStore for FileReportStore {
    fn existing_names(&self) -> Result<Vec<String>, ScorecardError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        debug!(
            "[scorecard:store] {} existing file(s) in {}",
            names.len(),
            self.root.display()
        );
        Ok(names)
    }

    fn location(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn write_new(&mut self, name: &str, contents: &str) -> Result<PathBuf, ScorecardError> {
        fs::create_dir_all(&self.root)?;
        let path = self.location(name);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                return Err(ScorecardError::VersionConflict { path });
            }
            Err(err) => return Err(err.into()),
        };
        file.write_all(contents.as_bytes())?;
        file.flush()?;
        Ok(path)
    }
}

/// In-memory report store.
#[derive(Clone, Debug, Default)]
pub struct MemoryReportStore {
    files: BTreeMap<String, String>,
}

impl MemoryReportStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing (empty) files.
    pub fn with_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            files: names
                .into_iter()
                .map(|name| (name.into(), String::new()))
                .collect(),
        }
    }

    /// Contents stored under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.files.get(name).map(String::as_str)
    }

    /// Number of stored files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl ReportStore for MemoryReportStore {
    fn existing_names(&self) -> Result<Vec<String>, ScorecardError> {
        Ok(self.files.keys().cloned().collect())
    }

    fn write_new(&mut self, name: &str, contents: &str) -> Result<PathBuf, ScorecardError> {
        if self.files.contains_key(name) {
            return Err(ScorecardError::VersionConflict {
                path: PathBuf::from(name),
            });
        }
        self.files.insert(name.to_string(), contents.to_string());
        Ok(PathBuf::from(name))
    }
}
