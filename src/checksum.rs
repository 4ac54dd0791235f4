//! Check-digit arithmetic behind the computed account reference.
//!
//! The account reference for a sort code / account number pair is built as
//!
//! ```text
//! letter_code(first two account digits) + account digits 3..=8 + check_digit(sort code)
//! ```
//!
//! so sort code `12-34-56` and account `12345678` give `M3456786`.

use thiserror::Error;

pub const SORT_CODE_LEN: usize = 6;
pub const ACCOUNT_NUMBER_LEN: usize = 8;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChecksumError {
    #[error("sort code '{0}' must be 6 digits")]
    SortCode(String),

    #[error("account number '{0}' must be 8 digits")]
    AccountNumber(String),
}

/// Decimal digits of `value`, ignoring hyphens
///
/// Returns `None` if anything else than digits and hyphens is present, or if
/// there are no digits at all.
fn digits(value: &str) -> Option<Vec<u32>> {
    let digits = value
        .chars()
        .filter(|c| *c != '-')
        .map(|c| c.to_digit(10))
        .collect::<Option<Vec<_>>>()?;
    (!digits.is_empty()).then_some(digits)
}

/// Luhn sum where every second digit counted from the right is doubled,
/// starting with the rightmost one when `double_rightmost` is set
fn luhn_sum(digits: &[u32], double_rightmost: bool) -> u32 {
    digits
        .iter()
        .rev()
        .enumerate()
        .map(|(position, &digit)| {
            if (position % 2 == 0) == double_rightmost {
                let doubled = digit * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                digit
            }
        })
        .sum()
}

/// Mod-10 (Luhn) check digit for `number`
///
/// Hyphens are ignored, so `"40-35-03"` and `"403503"` both give `6`.
/// Returns `None` when `number` is not a digit string.
pub fn check_digit(number: &str) -> Option<u32> {
    digits(number).map(|digits| check_digit_of(&digits))
}

fn check_digit_of(digits: &[u32]) -> u32 {
    (10 - luhn_sum(digits, true) % 10) % 10
}

/// Whether `number` ends in a valid Luhn check digit
pub fn is_valid_check_number(number: &str) -> bool {
    match digits(number) {
        Some(digits) => luhn_sum(&digits, false) % 10 == 0,
        None => false,
    }
}

/// Mod-26 letter for a two-digit account prefix: `'A' + prefix % 26`
///
/// `00` maps to `A`, `12` to `M`, `26` back to `A`.
pub fn letter_code(prefix: u32) -> char {
    char::from(b'A' + (prefix % 26) as u8)
}

/// Account reference derived from a sort code and an account number
pub fn account_reference(sort_code: &str, account_number: &str) -> Result<String, ChecksumError> {
    let sort_digits = digits(sort_code)
        .filter(|d| d.len() == SORT_CODE_LEN)
        .ok_or_else(|| ChecksumError::SortCode(sort_code.to_string()))?;

    if account_number.len() != ACCOUNT_NUMBER_LEN
        || !account_number.chars().all(|c| c.is_ascii_digit())
    {
        return Err(ChecksumError::AccountNumber(account_number.to_string()));
    }

    let (prefix, rest) = account_number.split_at(2);
    let prefix = prefix
        .parse::<u32>()
        .map_err(|_| ChecksumError::AccountNumber(account_number.to_string()))?;

    Ok(format!(
        "{}{}{}",
        letter_code(prefix),
        rest,
        check_digit_of(&sort_digits)
    ))
}
