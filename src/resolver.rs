use crate::checksum::{self, ChecksumError};
use crate::error::{AggregateError, Result};
use crate::models::{IdentityKey, PayeeDetails, Payment};
use crate::registry::IdentityRegistry;

/// Strategy that decides which payment records belong to the same payee
///
/// Two records are the same payee iff they resolve to equal keys.
pub trait IdentityResolver {
    fn resolve(&mut self, payment: &Payment) -> Result<IdentityKey>;
}

impl<R: IdentityResolver + ?Sized> IdentityResolver for Box<R> {
    fn resolve(&mut self, payment: &Payment) -> Result<IdentityKey> {
        (**self).resolve(payment)
    }
}

/// Resolves payees by lookup-or-create against an identity registry
///
/// The lookup tuple is (bank account, sort code, payee name, building
/// society number), with a zero building society number treated as absent.
pub struct LookupResolver<R: IdentityRegistry> {
    registry: R,
}

impl<R: IdentityRegistry> LookupResolver<R> {
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn into_registry(self) -> R {
        self.registry
    }
}

impl<R: IdentityRegistry> IdentityResolver for LookupResolver<R> {
    fn resolve(&mut self, payment: &Payment) -> Result<IdentityKey> {
        let payee = PayeeDetails::from(payment);
        let id = self.registry.find_or_create(&payee)?;
        Ok(IdentityKey::Registered(id))
    }
}

/// Resolves payees from their bank details alone
///
/// The key is the computed account reference paired with the raw building
/// society number. No state, no I/O.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChecksumResolver;

impl ChecksumResolver {
    pub fn new() -> Self {
        Self
    }
}

impl IdentityResolver for ChecksumResolver {
    fn resolve(&mut self, payment: &Payment) -> Result<IdentityKey> {
        let account_reference =
            checksum::account_reference(payment.sort_code(), payment.bank_account()).map_err(
                |e| match e {
                    ChecksumError::SortCode(value) => AggregateError::InvalidBankDetails {
                        line: payment.line,
                        field: "bank_sort_code",
                        value,
                    },
                    ChecksumError::AccountNumber(value) => AggregateError::InvalidBankDetails {
                        line: payment.line,
                        field: "bank_account_num",
                        value,
                    },
                },
            )?;

        Ok(IdentityKey::Computed {
            account_reference,
            building_society_num: payment.building_society_num().to_string(),
        })
    }
}
