use std::path::PathBuf;

use rust_decimal::Decimal;
use serde::Serialize;

/// Statistics of one successfully rewritten file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub path: PathBuf,
    pub input_records: usize,
    pub output_records: usize,
    pub total_amount: Decimal,
}
