use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::{AggregateError, Result};
use crate::models::{LineEnding, Payment, PaymentBatch};
use crate::schema::{FieldSpec, AMOUNT, FIELDS, FIELD_COUNT};

/// Parse a whole BPY331 file
///
/// The first line is kept verbatim as the header. Any malformed field fails
/// the whole batch; there is no partial result.
pub fn parse_batch(input: &str) -> Result<PaymentBatch> {
    if input.is_empty() {
        return Err(AggregateError::parse(1, "file is empty, expected a header line"));
    }

    let line_ending = if input.contains("\r\n") {
        LineEnding::CrLf
    } else {
        LineEnding::Lf
    };
    let trailing_newline = input.ends_with('\n');

    let mut lines: Vec<&str> = input
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();
    if trailing_newline {
        // split leaves an empty element after the final terminator
        lines.pop();
    }

    let header = lines[0].to_string();
    let body = &lines[1..];

    let remainder = body.len() % FIELD_COUNT;
    if remainder != 0 {
        let record_start = body.len() - remainder + 2;
        return Err(AggregateError::parse(
            record_start,
            format!(
                "record truncated: expected {} field lines, found {}",
                FIELD_COUNT, remainder
            ),
        ));
    }

    let payments = body
        .chunks(FIELD_COUNT)
        .enumerate()
        .map(|(index, chunk)| parse_record(chunk, 2 + index * FIELD_COUNT))
        .collect::<Result<Vec<_>>>()?;

    Ok(PaymentBatch {
        header,
        line_ending,
        trailing_newline,
        payments,
    })
}

/// Parse the field lines of one record starting at source line `first_line`
fn parse_record(lines: &[&str], first_line: usize) -> Result<Payment> {
    let mut fields: [String; FIELD_COUNT] = Default::default();
    for (offset, (line, spec)) in lines.iter().zip(FIELDS.iter()).enumerate() {
        fields[offset] = parse_field(line, spec, first_line + offset)?;
    }

    let amount_line = first_line + AMOUNT;
    let amount = Decimal::from_str(&fields[AMOUNT]).map_err(|e| {
        AggregateError::parse(
            amount_line,
            format!("amount '{}' is not a decimal number: {}", fields[AMOUNT], e),
        )
    })?;

    Ok(Payment::new(fields, amount, first_line))
}

/// Strip the quotes and trailing padding from one field line
///
/// The line must be exactly as wide as the field, padding included.
pub fn parse_field(line: &str, spec: &FieldSpec, line_no: usize) -> Result<String> {
    let width = line.chars().count();
    if width != spec.width {
        return Err(AggregateError::parse(
            line_no,
            format!(
                "field {} is {} characters wide, expected {}",
                spec.name, width, spec.width
            ),
        ));
    }

    line.trim_end_matches(' ')
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .map(str::to_string)
        .ok_or_else(|| {
            AggregateError::parse(line_no, format!("field {} is not double-quoted", spec.name))
        })
}
