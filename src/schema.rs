//! The BPY331 record layout.
//!
//! A file starts with one header line, followed by records of
//! [`FIELD_COUNT`] lines each. Every field line holds one double-quoted value
//! right-padded with spaces to the field's fixed width.

/// A single positional field of the layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    /// Full line width, including the two quote characters
    pub width: usize,
}

impl FieldSpec {
    const fn new(name: &'static str, width: usize) -> Self {
        Self { name, width }
    }

    /// Longest value that fits between the quotes
    pub fn max_value_len(&self) -> usize {
        self.width - 2
    }
}

pub const FIELD_COUNT: usize = 29;

pub const ACCOUNT_REF: usize = 3;
pub const PAYEE_NAME: usize = 5;
pub const PAYEE_ADDRESS: usize = 6;
pub const CLAIM_REF: usize = 7;
pub const CLAIMANT_NAME: usize = 8;
pub const CLAIMANT_ADDRESS: usize = 9;
pub const AMOUNT: usize = 10;
pub const POSTING_START_DATE: usize = 11;
pub const POSTING_END_DATE: usize = 12;
pub const BANK_SORT_CODE: usize = 15;
pub const BANK_ACCOUNT_NUM: usize = 16;
pub const BUILDING_SOCIETY_NUM: usize = 18;

pub const FIELDS: [FieldSpec; FIELD_COUNT] = [
    FieldSpec::new("interface_source", 5),
    FieldSpec::new("batch_run_id", 12),
    FieldSpec::new("posting_ref", 12),
    FieldSpec::new("account_ref", 24),
    FieldSpec::new("payee_type", 4),
    FieldSpec::new("payee_name", 42),
    FieldSpec::new("payee_address", 62),
    FieldSpec::new("claim_ref", 27),
    FieldSpec::new("claimant_name", 42),
    FieldSpec::new("claimant_address", 62),
    FieldSpec::new("amount", 14),
    FieldSpec::new("posting_start_date", 13),
    FieldSpec::new("posting_end_date", 13),
    FieldSpec::new("payment_method", 6),
    FieldSpec::new("creditor_account_ref", 22),
    FieldSpec::new("bank_sort_code", 10),
    FieldSpec::new("bank_account_num", 10),
    FieldSpec::new("bank_account_name", 42),
    FieldSpec::new("building_society_num", 20),
    FieldSpec::new("post_office_name", 42),
    FieldSpec::new("post_office_address", 62),
    FieldSpec::new("collection_flag", 3),
    FieldSpec::new("document_num", 22),
    FieldSpec::new("document_type", 12),
    FieldSpec::new("replacement_flag", 3),
    FieldSpec::new("effective_date", 13),
    FieldSpec::new("blank_one", 2),
    FieldSpec::new("blank_two", 2),
    FieldSpec::new("document_date", 13),
];
