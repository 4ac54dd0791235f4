use std::fmt;

use super::payment::Payment;

/// Grouping key produced by an identity resolver
///
/// Only compared for equality and displayed; nothing interprets the
/// contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentityKey {
    /// Identifier assigned by an identity registry
    Registered(i64),
    /// Account reference derived from the bank details
    Computed {
        account_reference: String,
        building_society_num: String,
    },
}

impl IdentityKey {
    pub fn account_reference(&self) -> Option<&str> {
        match self {
            IdentityKey::Registered(_) => None,
            IdentityKey::Computed {
                account_reference, ..
            } => Some(account_reference),
        }
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityKey::Registered(id) => write!(f, "{}", id),
            IdentityKey::Computed {
                account_reference,
                building_society_num,
            } => write!(f, "{}/{}", account_reference, building_society_num),
        }
    }
}

/// Lookup tuple for the identity registry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PayeeDetails {
    pub bank_account: String,
    pub sort_code: String,
    pub payee_name: String,
    /// `None` when the record has no building society number
    pub building_society_num: Option<String>,
}

impl From<&Payment> for PayeeDetails {
    fn from(payment: &Payment) -> Self {
        Self {
            bank_account: payment.bank_account().to_string(),
            sort_code: payment.sort_code().to_string(),
            payee_name: payment.payee_name().to_string(),
            building_society_num: payment.normalized_building_society_num(),
        }
    }
}
