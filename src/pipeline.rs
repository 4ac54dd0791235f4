use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::aggregator::{aggregate, total_amount, MergeAnnotation};
use crate::error::{AggregateError, Result};
use crate::input::{InputSelector, ProcessedLog};
use crate::models::RunSummary;
use crate::notify::Notifier;
use crate::parser::parse_batch;
use crate::report::Report;
use crate::resolver::IdentityResolver;
use crate::serializer::render_batch;

/// Drives one file at a time through parse, resolve, aggregate and rewrite
///
/// # Guarantees
///
/// 1. **All or nothing**: the aggregated file is fully rendered in memory and
///    then swapped in with an atomic rename. Any failure before that leaves
///    the source file byte-for-byte untouched.
/// 2. **Best-effort follow-up**: the report, the processed log and the
///    notifier run after the write; their failures are logged and do not
///    undo the rewrite.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
///
/// use bpy331_aggregator::notify::LogNotifier;
/// use bpy331_aggregator::pipeline::Pipeline;
/// use bpy331_aggregator::resolver::ChecksumResolver;
///
/// let mut pipeline = Pipeline::new(ChecksumResolver::new(), LogNotifier);
/// let summary = pipeline.run_file(Path::new("data/bpy331_1487931_7163.1.dat")).unwrap();
/// println!("{} records -> {}", summary.input_records, summary.output_records);
/// ```
pub struct Pipeline<R: IdentityResolver, N: Notifier> {
    resolver: R,
    notifier: N,
    annotation: Option<MergeAnnotation>,
    stamp_account_ref: bool,
    report: Option<(PathBuf, Report)>,
    processed_log: Option<ProcessedLog>,
}

impl<R: IdentityResolver, N: Notifier> Pipeline<R, N> {
    pub fn new(resolver: R, notifier: N) -> Self {
        Self {
            resolver,
            notifier,
            annotation: None,
            stamp_account_ref: false,
            report: None,
            processed_log: None,
        }
    }

    /// Mark merged records with `annotation`
    pub fn with_annotation(mut self, annotation: MergeAnnotation) -> Self {
        self.annotation = Some(annotation);
        self
    }

    /// Write computed account references into the account_ref field
    pub fn with_account_ref_stamping(mut self) -> Self {
        self.stamp_account_ref = true;
        self
    }

    /// Keep a CSV report of the groups of every file processed, rewritten
    /// at `path` after each file
    pub fn with_report(mut self, path: impl Into<PathBuf>) -> Self {
        self.report = Some((path.into(), Report::new()));
        self
    }

    /// Record every rewritten file's name in `log`
    pub fn with_processed_log(mut self, log: ProcessedLog) -> Self {
        self.processed_log = Some(log);
        self
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref().map(|(_, report)| report)
    }

    /// Aggregate every file chosen by `selector`, stopping at the first failure
    ///
    /// Files are independent: a failure leaves the failing file untouched
    /// but keeps the files rewritten before it.
    pub fn run<S: InputSelector + ?Sized>(&mut self, selector: &S) -> Result<Vec<RunSummary>> {
        let files = selector.select()?;
        info!(files = files.len(), "selected payment files");

        files.iter().map(|path| self.run_file(path)).collect()
    }

    /// Aggregate one file in place
    pub fn run_file(&mut self, path: &Path) -> Result<RunSummary> {
        info!(file = %path.display(), "aggregating payment file");

        let contents = fs::read_to_string(path).map_err(|source| AggregateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut batch = parse_batch(&contents)?;
        let input_records = batch.payments.len();

        let mut groups = aggregate(std::mem::take(&mut batch.payments), &mut self.resolver)?;
        for group in groups.iter_mut() {
            if self.stamp_account_ref {
                group.stamp_account_reference();
            }
            if let Some(annotation) = &self.annotation {
                annotation.apply(group);
            }
        }

        let output = batch.with_payments(groups.iter().map(|g| g.payment.clone()).collect());
        let bytes = render_batch(&output)?;

        replace_file(path, &bytes)?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if let Some((report_path, report)) = &mut self.report {
            report.add_file(&file_name, &groups);
            if let Err(e) = report.render().and_then(|r| replace_file(report_path, &r)) {
                warn!(report = %report_path.display(), error = %e, "report not written");
            }
        }
        if let Some(log) = &self.processed_log {
            if let Err(e) = log.record(&file_name) {
                warn!(log = %log.path().display(), error = %e, "file not recorded as processed");
            }
        }

        let summary = RunSummary {
            path: path.to_path_buf(),
            input_records,
            output_records: groups.len(),
            total_amount: total_amount(&groups),
        };

        if let Err(e) = self.notifier.notify(&summary) {
            warn!(file = %path.display(), error = %e, "notification failed");
        }

        Ok(summary)
    }
}

/// Replace the contents of `path` atomically
///
/// The new contents go to a temporary file in the same directory, which is
/// then renamed over `path`. Existing permissions are carried over.
fn replace_file(path: &Path, contents: &[u8]) -> Result<()> {
    let write_error = |source| AggregateError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(write_error)?;
    temp.write_all(contents).map_err(write_error)?;
    temp.as_file().sync_all().map_err(write_error)?;

    if let Ok(metadata) = fs::metadata(path) {
        temp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(write_error)?;
    }

    temp.persist(path).map_err(|e| write_error(e.error))?;
    Ok(())
}
