use std::io::Write;

use serde::Serialize;

use crate::aggregator::AggregatedPayment;
use crate::error::Result;

#[derive(Debug, Clone, Serialize)]
struct ReportRow {
    file: String,
    identity: String,
    payee_name: String,
    sort_code: String,
    bank_account: String,
    building_society_num: String,
    records: usize,
    amount: String,
}

/// CSV listing of the aggregated payees of every file in a run
#[derive(Debug, Clone, Default)]
pub struct Report {
    rows: Vec<ReportRow>,
}

impl Report {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Add one row per group of the file named `file`
    pub fn add_file(&mut self, file: &str, groups: &[AggregatedPayment]) {
        self.rows.extend(groups.iter().map(|group| ReportRow {
            file: file.to_string(),
            identity: group.key.to_string(),
            payee_name: group.payment.payee_name().to_string(),
            sort_code: group.payment.sort_code().to_string(),
            bank_account: group.payment.bank_account().to_string(),
            building_society_num: group.payment.building_society_num().to_string(),
            records: group.records,
            amount: group.payment.amount_text(),
        }));
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn write<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        for row in &self.rows {
            csv_writer.serialize(row)?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    pub fn render(&self) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.write(&mut output)?;
        Ok(output)
    }
}
