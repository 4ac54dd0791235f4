use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::debug;

use crate::error::{AggregateError, Result};

pub const FILE_PREFIX: &str = "bpy331_";
pub const FILE_EXTENSION: &str = ".dat";

/// Chooses which payment files a run processes
pub trait InputSelector {
    /// Files to process, in processing order
    ///
    /// Fails with [`AggregateError::NoInputFound`] when there is nothing to do.
    fn select(&self) -> Result<Vec<PathBuf>>;
}

/// Processes exactly one named file
#[derive(Debug, Clone)]
pub struct SingleFile(pub PathBuf);

impl InputSelector for SingleFile {
    fn select(&self) -> Result<Vec<PathBuf>> {
        if self.0.is_file() {
            Ok(vec![self.0.clone()])
        } else {
            Err(AggregateError::NoInputFound {
                location: self.0.clone(),
            })
        }
    }
}

/// Text file listing the names of files that were already aggregated
///
/// Rewritten files still match the naming pattern, so the log is what keeps
/// a later run from aggregating them a second time.
#[derive(Debug, Clone)]
pub struct ProcessedLog {
    path: PathBuf,
}

impl ProcessedLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names recorded so far; a missing log reads as empty
    pub fn entries(&self) -> Result<Vec<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(source) => Err(AggregateError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    pub fn contains(&self, file_name: &str) -> Result<bool> {
        Ok(self.entries()?.iter().any(|entry| entry == file_name))
    }

    pub fn record(&self, file_name: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| AggregateError::Write {
                path: self.path.clone(),
                source,
            })?;
        writeln!(file, "{}", file_name).map_err(|source| AggregateError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

/// Finds unprocessed `bpy331_*.dat` files below a directory
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    root: PathBuf,
    processed_log: Option<ProcessedLog>,
    max_age: Option<Duration>,
}

impl DirectoryScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            processed_log: None,
            max_age: None,
        }
    }

    /// Skip files whose names are in `log`
    pub fn with_processed_log(mut self, log: ProcessedLog) -> Self {
        self.processed_log = Some(log);
        self
    }

    /// Skip files last modified longer ago than `max_age`
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    fn collect(&self, dir: &Path, found: &mut Vec<(SystemTime, PathBuf)>) -> Result<()> {
        let entries = fs::read_dir(dir).map_err(|source| AggregateError::Read {
            path: dir.to_path_buf(),
            source,
        })?;

        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            let metadata = entry.metadata()?;

            if metadata.is_dir() {
                self.collect(&path, found)?;
                continue;
            }

            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !is_payment_file_name(name) {
                continue;
            }

            let modified = metadata.modified()?;
            if let Some(max_age) = self.max_age {
                // clock skew puts files "in the future"; treat those as fresh
                let age = SystemTime::now()
                    .duration_since(modified)
                    .unwrap_or(Duration::ZERO);
                if age > max_age {
                    debug!(file = %path.display(), "skipping stale payment file");
                    continue;
                }
            }

            found.push((modified, path));
        }
        Ok(())
    }
}

impl InputSelector for DirectoryScanner {
    fn select(&self) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        self.collect(&self.root, &mut found)?;

        let processed = match &self.processed_log {
            Some(log) => log.entries()?,
            None => Vec::new(),
        };
        found.retain(|(_, path)| {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            let seen = processed.iter().any(|entry| entry == name);
            if seen {
                debug!(file = %path.display(), "skipping already processed file");
            }
            !seen
        });

        if found.is_empty() {
            return Err(AggregateError::NoInputFound {
                location: self.root.clone(),
            });
        }

        found.sort();
        Ok(found.into_iter().map(|(_, path)| path).collect())
    }
}

/// Whether `name` follows the `bpy331_*.dat` naming pattern
pub fn is_payment_file_name(name: &str) -> bool {
    name.starts_with(FILE_PREFIX) && name.ends_with(FILE_EXTENSION)
}
