use std::collections::HashMap;

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::Result;
use crate::models::{IdentityKey, Payment};
use crate::resolver::IdentityResolver;
use crate::schema::{
    ACCOUNT_REF, CLAIMANT_ADDRESS, CLAIMANT_NAME, CLAIM_REF, PAYEE_ADDRESS, POSTING_END_DATE,
    POSTING_START_DATE,
};

/// Label written into the descriptive fields of merged records
pub const DEFAULT_MERGE_LABEL: &str = "Aggregated DHC UC Payment";

/// All payments of one payee folded into a single record
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedPayment {
    pub key: IdentityKey,
    /// First record seen for the payee, carrying the summed amount
    pub payment: Payment,
    /// Number of input records folded into this one
    pub records: usize,
}

impl AggregatedPayment {
    /// Write the computed account reference into the account_ref field
    ///
    /// Does nothing for registry identities, which carry no reference.
    pub fn stamp_account_reference(&mut self) {
        if let Some(reference) = self.key.account_reference() {
            self.payment.set_field(ACCOUNT_REF, reference);
        }
    }
}

/// Groups payments by identity key in first-occurrence order
pub struct Aggregator {
    groups: Vec<AggregatedPayment>,
    /// Map of identity key to its position in `groups`
    positions: HashMap<IdentityKey, usize>,
    input_records: usize,
}

impl Aggregator {
    pub fn new() -> Self {
        Self {
            groups: Vec::new(),
            positions: HashMap::new(),
            input_records: 0,
        }
    }

    /// Fold a resolved payment into its group
    pub fn add(&mut self, key: IdentityKey, payment: Payment) {
        self.input_records += 1;

        match self.positions.get(&key).copied() {
            Some(position) => {
                let group = &mut self.groups[position];
                group.payment.amount += payment.amount;
                group.records += 1;
            }
            None => {
                self.positions.insert(key.clone(), self.groups.len());
                self.groups.push(AggregatedPayment {
                    key,
                    payment,
                    records: 1,
                });
            }
        }
    }

    pub fn input_records(&self) -> usize {
        self.input_records
    }

    pub fn groups(&self) -> &[AggregatedPayment] {
        &self.groups
    }

    /// Consume the aggregator and return the groups in first-occurrence order
    pub fn into_groups(self) -> Vec<AggregatedPayment> {
        self.groups
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve every payment and sum the amounts per identity
///
/// Fails on the first record the resolver rejects.
pub fn aggregate<R: IdentityResolver + ?Sized>(
    payments: Vec<Payment>,
    resolver: &mut R,
) -> Result<Vec<AggregatedPayment>> {
    let mut aggregator = Aggregator::new();

    for payment in payments {
        let key = resolver.resolve(&payment)?;
        aggregator.add(key, payment);
    }

    for group in aggregator.groups().iter().filter(|g| g.records > 1) {
        debug!(
            key = %group.key,
            payee = %group.payment.payee_name(),
            records = group.records,
            amount = %group.payment.amount,
            "merged payee records"
        );
    }

    Ok(aggregator.into_groups())
}

/// Sum of the amounts across all groups
pub fn total_amount(groups: &[AggregatedPayment]) -> Decimal {
    groups.iter().map(|g| g.payment.amount).sum()
}

/// Marks records that were merged from several payments
///
/// Merged records get `label` in the payee address, claim reference,
/// claimant name and claimant address fields, and the posting dates set to
/// `posting_date` as `DD-MON-YYYY`. Single-payment groups are left as they
/// were read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeAnnotation {
    pub label: String,
    pub posting_date: NaiveDate,
}

impl MergeAnnotation {
    pub fn new(posting_date: NaiveDate) -> Self {
        Self {
            label: DEFAULT_MERGE_LABEL.to_string(),
            posting_date,
        }
    }

    /// Annotation dated with the local date
    pub fn today() -> Self {
        Self::new(Local::now().date_naive())
    }

    pub fn date_text(&self) -> String {
        self.posting_date.format("%d-%b-%Y").to_string().to_uppercase()
    }

    pub fn apply(&self, group: &mut AggregatedPayment) {
        if group.records < 2 {
            return;
        }

        for field in [PAYEE_ADDRESS, CLAIM_REF, CLAIMANT_NAME, CLAIMANT_ADDRESS] {
            group.payment.set_field(field, self.label.as_str());
        }

        let date = self.date_text();
        group.payment.set_field(POSTING_START_DATE, date.as_str());
        group.payment.set_field(POSTING_END_DATE, date);
    }
}
