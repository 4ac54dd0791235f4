use std::str::FromStr;

use rust_decimal::Decimal;

use crate::schema::{AMOUNT, BANK_ACCOUNT_NUM, BANK_SORT_CODE, BUILDING_SOCIETY_NUM, FIELD_COUNT, PAYEE_NAME};

/// One BPY331 payment record
///
/// `fields` holds every positional value with its quotes and padding
/// stripped. The typed accessors read from it, so a record written back
/// without changes reproduces its source lines. `amount` is kept parsed; the
/// amount field keeps its source text until `amount` changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    pub fields: [String; FIELD_COUNT],
    pub amount: Decimal,
    /// 1-based source line of the record's first field
    pub line: usize,
}

impl Payment {
    pub fn new(fields: [String; FIELD_COUNT], amount: Decimal, line: usize) -> Self {
        Self {
            fields,
            amount,
            line,
        }
    }

    pub fn field(&self, index: usize) -> &str {
        &self.fields[index]
    }

    pub fn set_field(&mut self, index: usize, value: impl Into<String>) {
        self.fields[index] = value.into();
    }

    pub fn bank_account(&self) -> &str {
        self.field(BANK_ACCOUNT_NUM)
    }

    pub fn sort_code(&self) -> &str {
        self.field(BANK_SORT_CODE)
    }

    pub fn payee_name(&self) -> &str {
        self.field(PAYEE_NAME)
    }

    pub fn building_society_num(&self) -> &str {
        self.field(BUILDING_SOCIETY_NUM)
    }

    /// Building-society number as a lookup key value
    ///
    /// `0` (in any zero-padded form) and an empty value mean "no building
    /// society" and map to `None`.
    pub fn normalized_building_society_num(&self) -> Option<String> {
        let raw = self.building_society_num().trim();
        if raw.is_empty() || raw.chars().all(|c| c == '0') {
            None
        } else {
            Some(raw.to_string())
        }
    }

    /// Text written into the amount field
    ///
    /// The source text is kept while it still denotes `amount`. A changed
    /// amount is rendered with at least two decimal places.
    pub fn amount_text(&self) -> String {
        let source = self.field(AMOUNT);
        if Decimal::from_str(source).ok() == Some(self.amount) {
            return source.to_string();
        }

        let mut amount = self.amount;
        if amount.scale() < 2 {
            amount.rescale(2);
        }
        amount.to_string()
    }
}

/// Line terminator used by a source file, kept so rewrites match it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// A whole parsed BPY331 file
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentBatch {
    pub header: String,
    pub line_ending: LineEnding,
    /// Whether the source ended with a line terminator
    pub trailing_newline: bool,
    pub payments: Vec<Payment>,
}

impl PaymentBatch {
    /// Same header and line layout, different records
    pub fn with_payments(&self, payments: Vec<Payment>) -> Self {
        Self {
            header: self.header.clone(),
            line_ending: self.line_ending,
            trailing_newline: self.trailing_newline,
            payments,
        }
    }

    pub fn total_amount(&self) -> Decimal {
        self.payments.iter().map(|p| p.amount).sum()
    }
}
