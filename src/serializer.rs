use std::io::Write;

use crate::error::{AggregateError, Result};
use crate::models::{Payment, PaymentBatch};
use crate::schema::{FieldSpec, AMOUNT, FIELDS};

/// Render a batch into the BPY331 layout
///
/// The whole file is built in memory, so a field that no longer fits its
/// width fails before anything reaches a writer.
pub fn render_batch(batch: &PaymentBatch) -> Result<Vec<u8>> {
    let mut lines = Vec::with_capacity(1 + batch.payments.len() * FIELDS.len());
    lines.push(batch.header.clone());

    for payment in &batch.payments {
        render_record(payment, &mut lines)?;
    }

    let line_ending = batch.line_ending.as_str();
    let mut output = lines.join(line_ending);
    if batch.trailing_newline {
        output.push_str(line_ending);
    }

    Ok(output.into_bytes())
}

/// Render a batch and write it to `writer`
pub fn write_batch<W: Write>(batch: &PaymentBatch, mut writer: W) -> Result<()> {
    let bytes = render_batch(batch)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

fn render_record(payment: &Payment, lines: &mut Vec<String>) -> Result<()> {
    for (index, spec) in FIELDS.iter().enumerate() {
        let line = if index == AMOUNT {
            render_field(&payment.amount_text(), spec)?
        } else {
            render_field(payment.field(index), spec)?
        };
        lines.push(line);
    }
    Ok(())
}

/// Quote `value` and pad it with spaces to the field width
pub fn render_field(value: &str, spec: &FieldSpec) -> Result<String> {
    let len = value.chars().count();
    if len > spec.max_value_len() {
        return Err(AggregateError::FieldOverflow {
            field: spec.name,
            value: value.to_string(),
            width: spec.width,
        });
    }

    let padding = spec.max_value_len() - len;
    Ok(format!("\"{}\"{}", value, " ".repeat(padding)))
}
