#![allow(dead_code)]

use std::path::{Path, PathBuf};

use bpy331_aggregator::error::{AggregateError, Result};
use bpy331_aggregator::models::{Payment, RunSummary};
use bpy331_aggregator::notify::Notifier;
use bpy331_aggregator::schema::{
    AMOUNT, BANK_ACCOUNT_NUM, BANK_SORT_CODE, BUILDING_SOCIETY_NUM, FIELDS, FIELD_COUNT,
    PAYEE_NAME,
};
use rust_decimal::Decimal;

pub const HEADER: &str = "BPY331 PAYMENT EXPORT 1487931 7163";

/// (payee name, sort code, account number, building society number, amount)
pub type Row<'a> = (&'a str, &'a str, &'a str, &'a str, &'a str);

/// All 29 field values of a record, with fixed filler for the fields that
/// do not take part in grouping
pub fn record_values(row: Row) -> [String; FIELD_COUNT] {
    let (payee, sort_code, account, building_society_num, amount) = row;
    let mut values: [String; FIELD_COUNT] = [
        "BEN", "7163", "1487931", "", "CL", "", "1 HIGH STREET", "CLM0001", "J SMITH",
        "2 LOW ROAD", "", "19-OCT-2026", "19-OCT-2026", "BACS", "", "", "", "", "", "", "",
        "N", "", "", "N", "19-OCT-2026", "", "", "",
    ]
    .map(str::to_string);

    values[PAYEE_NAME] = payee.to_string();
    values[AMOUNT] = amount.to_string();
    values[BANK_SORT_CODE] = sort_code.to_string();
    values[BANK_ACCOUNT_NUM] = account.to_string();
    values[17] = payee.to_string();
    values[BUILDING_SOCIETY_NUM] = building_society_num.to_string();
    values
}

/// Helper to create a payment without going through the parser
pub fn make_payment(row: Row) -> Payment {
    let amount: Decimal = row.4.parse().unwrap();
    Payment::new(record_values(row), amount, 2)
}

/// Quote a value and pad it to the width of field `index`
pub fn pad_field(value: &str, index: usize) -> String {
    let width = FIELDS[index].width;
    format!("{:<width$}", format!("\"{}\"", value), width = width)
}

/// Build a BPY331 file with `\n` line endings and a final newline
pub fn build_file(rows: &[Row]) -> String {
    build_file_with(rows, "\n")
}

pub fn build_file_with(rows: &[Row], line_ending: &str) -> String {
    let mut lines = vec![HEADER.to_string()];
    for row in rows {
        let values = record_values(*row);
        lines.extend(values.iter().enumerate().map(|(i, v)| pad_field(v, i)));
    }
    let mut file = lines.join(line_ending);
    file.push_str(line_ending);
    file
}

/// Write `contents` as `name` inside `dir`
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// Notifier that keeps every summary it receives
#[derive(Default)]
pub struct RecordingNotifier {
    pub summaries: Vec<RunSummary>,
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, summary: &RunSummary) -> Result<()> {
        self.summaries.push(summary.clone());
        Ok(())
    }
}

/// Notifier whose delivery always fails
pub struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn notify(&mut self, _summary: &RunSummary) -> Result<()> {
        Err(AggregateError::Notification("mail relay unreachable".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_field_uses_field_width() {
        let line = pad_field("BEN", 0);
        assert_eq!(line, "\"BEN\"");

        let line = pad_field("ACME LTD", PAYEE_NAME);
        assert_eq!(line.len(), FIELDS[PAYEE_NAME].width);
        assert!(line.starts_with("\"ACME LTD\" "));
    }

    #[test]
    fn test_build_file() {
        let file = build_file(&[("ACME LTD", "12-34-56", "12345678", "0", "100.00")]);

        assert!(file.starts_with(HEADER));
        assert_eq!(file.lines().count(), 1 + FIELD_COUNT);
        assert!(file.ends_with('\n'));
    }
}
