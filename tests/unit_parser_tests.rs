mod common;

use bpy331_aggregator::error::AggregateError;
use bpy331_aggregator::models::LineEnding;
use bpy331_aggregator::parser::{parse_batch, parse_field};
use bpy331_aggregator::schema::{FIELDS, FIELD_COUNT, PAYEE_NAME};
use bpy331_aggregator::serializer::{render_batch, render_field};
use common::{build_file, build_file_with, make_payment, pad_field, HEADER};
use rust_decimal_macros::dec;

#[test]
fn test_parse_single_record() {
    let file = build_file(&[("ACME LTD", "12-34-56", "12345678", "0", "100.00")]);

    let batch = parse_batch(&file).unwrap();

    assert_eq!(batch.header, HEADER);
    assert_eq!(batch.line_ending, LineEnding::Lf);
    assert!(batch.trailing_newline);
    assert_eq!(batch.payments.len(), 1);

    let payment = &batch.payments[0];
    assert_eq!(payment.payee_name(), "ACME LTD");
    assert_eq!(payment.sort_code(), "12-34-56");
    assert_eq!(payment.bank_account(), "12345678");
    assert_eq!(payment.building_society_num(), "0");
    assert_eq!(payment.amount, dec!(100.00));
    assert_eq!(payment.line, 2);
}

#[test]
fn test_parse_multiple_records_tracks_lines() {
    let file = build_file(&[
        ("ACME LTD", "12-34-56", "12345678", "0", "100.00"),
        ("J BROWN", "40-35-03", "87654321", "0", "3025.00"),
    ]);

    let batch = parse_batch(&file).unwrap();

    assert_eq!(batch.payments.len(), 2);
    assert_eq!(batch.payments[1].line, 2 + FIELD_COUNT);
    assert_eq!(batch.payments[1].amount, dec!(3025.00));
}

#[test]
fn test_parse_header_only() {
    let batch = parse_batch(&format!("{}\n", HEADER)).unwrap();
    assert!(batch.payments.is_empty());
}

#[test]
fn test_parse_empty_file_fails() {
    let err = parse_batch("").unwrap_err();
    assert!(matches!(err, AggregateError::Parse { line: 1, .. }));
}

#[test]
fn test_parse_truncated_record_fails() {
    let file = build_file(&[("ACME LTD", "12-34-56", "12345678", "0", "100.00")]);
    // Drop the last field line
    let truncated: String = file
        .lines()
        .take(FIELD_COUNT)
        .map(|l| format!("{}\n", l))
        .collect();

    let err = parse_batch(&truncated).unwrap_err();
    assert!(matches!(err, AggregateError::Parse { line: 2, .. }));
}

#[test]
fn test_parse_unquoted_field_fails() {
    let file = build_file(&[("ACME LTD", "12-34-56", "12345678", "0", "100.00")]);
    let broken = file.replacen("\"ACME LTD\"", "ACME LTD  ", 1);

    let err = parse_batch(&broken).unwrap_err();
    assert!(matches!(err, AggregateError::Parse { line, .. } if line == 2 + PAYEE_NAME));
}

#[test]
fn test_parse_non_decimal_amount_fails() {
    let file = build_file(&[("ACME LTD", "12-34-56", "12345678", "0", "ONE HUNDRED")]);

    let err = parse_batch(&file).unwrap_err();
    assert!(matches!(err, AggregateError::Parse { line: 12, .. }));
}

#[test]
fn test_parse_field_strips_quotes_and_padding() {
    let spec = &FIELDS[PAYEE_NAME];
    let line = pad_field(" J BROWN", PAYEE_NAME);
    assert_eq!(parse_field(&line, spec, 7).unwrap(), " J BROWN");
    let line = pad_field("MRS RV O'DRISCROLL", PAYEE_NAME);
    assert_eq!(parse_field(&line, spec, 7).unwrap(), "MRS RV O'DRISCROLL");
    assert_eq!(parse_field(&pad_field("", PAYEE_NAME), spec, 7).unwrap(), "");
}

#[test]
fn test_parse_field_rejects_overlong_value() {
    let spec = &FIELDS[0];
    let err = parse_field("\"BENEFIT\"", spec, 2).unwrap_err();
    assert!(matches!(err, AggregateError::Parse { line: 2, .. }));
}

#[test]
fn test_parse_field_rejects_lone_quote() {
    let spec = &FIELDS[PAYEE_NAME];
    assert!(parse_field("\"", spec, 2).is_err());
    assert!(parse_field("", spec, 2).is_err());
}

#[test]
fn test_round_trip_is_byte_identical() {
    let file = build_file(&[
        ("ACME LTD", "12-34-56", "12345678", "0", "100.00"),
        ("MRS RV O'DRISCROLL", "40-35-03", "87654321", "0", "535.71"),
        ("BROADACRES HOUSING ASSOCIATION", "20-00-00", "55555555", "1234", "-42.15"),
    ]);

    let batch = parse_batch(&file).unwrap();
    let rendered = render_batch(&batch).unwrap();

    assert_eq!(String::from_utf8(rendered).unwrap(), file);
}

#[test]
fn test_round_trip_crlf() {
    let file = build_file_with(
        &[("ACME LTD", "12-34-56", "12345678", "0", "100.00")],
        "\r\n",
    );

    let batch = parse_batch(&file).unwrap();
    assert_eq!(batch.line_ending, LineEnding::CrLf);

    let rendered = render_batch(&batch).unwrap();
    assert_eq!(String::from_utf8(rendered).unwrap(), file);
}

#[test]
fn test_round_trip_without_final_newline() {
    let file = build_file(&[("ACME LTD", "12-34-56", "12345678", "0", "100.00")]);
    let file = file.trim_end_matches('\n').to_string();

    let batch = parse_batch(&file).unwrap();
    assert!(!batch.trailing_newline);

    let rendered = render_batch(&batch).unwrap();
    assert_eq!(String::from_utf8(rendered).unwrap(), file);
}

#[test]
fn test_render_writes_updated_amount() {
    let mut payment = make_payment(("ACME LTD", "12-34-56", "12345678", "0", "100.00"));
    payment.amount = dec!(150.00);

    let file = build_file(&[]);
    let batch = parse_batch(&file).unwrap().with_payments(vec![payment]);
    let rendered = String::from_utf8(render_batch(&batch).unwrap()).unwrap();

    assert!(rendered.lines().any(|line| line.trim_end() == "\"150.00\""));
    assert!(!rendered.contains("\"100.00\""));
}

#[test]
fn test_render_field_pads_to_width() {
    let spec = &FIELDS[PAYEE_NAME];
    let line = render_field("ACME LTD", spec).unwrap();

    assert_eq!(line.chars().count(), spec.width);
    assert_eq!(line.trim_end(), "\"ACME LTD\"");
}

#[test]
fn test_render_field_overflow() {
    let spec = &FIELDS[0];
    let err = render_field("BENEFIT", spec).unwrap_err();

    assert!(matches!(
        err,
        AggregateError::FieldOverflow { field: "interface_source", width: 5, .. }
    ));
}

#[test]
fn test_parse_field_rejects_unpadded_line() {
    let spec = &FIELDS[PAYEE_NAME];
    let err = parse_field("\"ACME LTD\"", spec, 7).unwrap_err();
    assert!(matches!(err, AggregateError::Parse { line: 7, .. }));
}

#[test]
fn test_parse_field_rejects_extra_padding() {
    let spec = &FIELDS[PAYEE_NAME];
    let line = format!("{} ", pad_field("ACME LTD", PAYEE_NAME));
    assert!(parse_field(&line, spec, 7).is_err());
}

#[test]
fn test_parse_unpadded_line_in_file_fails() {
    let file = build_file(&[("ACME LTD", "12-34-56", "12345678", "0", "100.00")]);
    let padded = pad_field("ACME LTD", PAYEE_NAME);
    let unpadded = file.replacen(&padded, "\"ACME LTD\"", 1);

    let err = parse_batch(&unpadded).unwrap_err();
    assert!(matches!(err, AggregateError::Parse { line, .. } if line == 2 + PAYEE_NAME));
}

#[test]
fn test_round_trip_keeps_amount_text() {
    for amount in ["+100.00", "1_000.00", "-0.00", ".50", "100", "0.125"] {
        let file = build_file(&[("ACME LTD", "12-34-56", "12345678", "0", amount)]);

        let batch = parse_batch(&file).unwrap();
        let rendered = render_batch(&batch).unwrap();

        assert_eq!(String::from_utf8(rendered).unwrap(), file, "amount {}", amount);
    }
}

#[test]
fn test_changed_amount_has_two_decimal_places() {
    let mut payment = make_payment(("ACME LTD", "12-34-56", "12345678", "0", "100"));
    assert_eq!(payment.amount_text(), "100");

    payment.amount = dec!(150);
    assert_eq!(payment.amount_text(), "150.00");

    payment.amount = dec!(150.125);
    assert_eq!(payment.amount_text(), "150.125");
}
