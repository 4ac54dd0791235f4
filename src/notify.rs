use tracing::info;

use crate::error::Result;
use crate::models::RunSummary;

/// Receives the summary of every successfully rewritten file
///
/// Delivery is best effort: the pipeline logs a failed notification and
/// keeps the file it already wrote.
pub trait Notifier {
    fn notify(&mut self, summary: &RunSummary) -> Result<()>;
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn notify(&mut self, summary: &RunSummary) -> Result<()> {
        (**self).notify(summary)
    }
}

/// Reports run summaries as log events
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, summary: &RunSummary) -> Result<()> {
        info!(
            file = %summary.path.display(),
            input_records = summary.input_records,
            output_records = summary.output_records,
            total_amount = %summary.total_amount,
            "payment file aggregated"
        );
        Ok(())
    }
}
