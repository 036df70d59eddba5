//! Integration tests for the built-in checks and their orchestration.
//!
//! Each test builds an in-memory dataset, runs a check through the public
//! registry or the validator, and asserts on the three-part result.

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use eda_guard::checks::{
    parse_localized_number, CheckRegistry, COULD_NOT_VALIDATE, FIELD_NOT_FOUND,
};
use eda_guard::core::{
    tags, CheckResult, CheckStatus, Dataset, FieldDescriptor, FieldTable, Validator,
};
use eda_guard::EdaError;
use std::sync::Arc;

fn text_column(name: &str, values: Vec<Option<&str>>) -> Dataset {
    Dataset::from_columns(vec![(name, Arc::new(StringArray::from(values)) as ArrayRef)])
        .unwrap()
}

fn run(tag: &str, dataset: &Dataset, field: FieldDescriptor) -> CheckResult {
    let table = FieldTable::new(vec![field.clone()]);
    CheckRegistry::standard()
        .run(tag, dataset, &table, &field)
        .unwrap()
}

#[test]
fn test_null_empty_counts_nulls_and_blanks() {
    let dataset = text_column(
        "city",
        vec![Some("Recife"), None, Some("  "), Some("Natal")],
    );
    let result = run(
        tags::NO_NULL,
        &dataset,
        FieldDescriptor::new("city", "string").with_null("no"),
    );

    assert_eq!(result.status(), CheckStatus::Fail);
    assert_eq!(result.evidence(), "2 absences (50.00%)");
    assert!(result.details().contains("nulls: 1"));
    assert!(result.details().contains("empty/whitespace: 1"));
    assert!(result.details().contains("row 3"));
}

#[test]
fn test_null_empty_passes_on_complete_column() {
    let dataset = text_column("city", vec![Some("Recife"), Some("Natal")]);
    let result = run(
        tags::NO_NULL,
        &dataset,
        FieldDescriptor::new("city", "string").with_null("no"),
    );

    assert_eq!(result.status(), CheckStatus::Pass);
    assert_eq!(result.details(), "");
}

#[test]
fn test_zero_ratio_uses_numeric_values_only() {
    let dataset = text_column(
        "qty",
        vec![Some("0"), Some("abc"), Some("5"), Some("x"), None],
    );
    let result = run(
        tags::NO_ZERO,
        &dataset,
        FieldDescriptor::new("qty", "int").with_zero("no"),
    );

    assert_eq!(result.status(), CheckStatus::Fail);
    assert_eq!(result.evidence(), "Zeroed: 50.00%");
    assert!(result.details().contains("row 2"));
}

#[test]
fn test_negative_on_float_column() {
    let dataset = Dataset::from_columns(vec![(
        "balance",
        Arc::new(Float64Array::from(vec![10.5, -1.0, 3.0, -2.25])) as ArrayRef,
    )])
    .unwrap();
    let result = run(
        tags::NO_NEGATIVE,
        &dataset,
        FieldDescriptor::new("balance", "float").with_negative("no"),
    );

    assert_eq!(result.status(), CheckStatus::Fail);
    assert_eq!(result.evidence(), "Negatives: 50.00%");
    assert!(result.details().contains("row 3"));
}

#[test]
fn test_comma_decimals_are_numeric() {
    let dataset = text_column("price", vec![Some("12,5"), Some("-0,75")]);
    let result = run(
        tags::NO_NEGATIVE,
        &dataset,
        FieldDescriptor::new("price", "float").with_negative("no"),
    );

    assert_eq!(result.evidence(), "Negatives: 50.00%");
}

#[test]
fn test_text_column_cannot_be_checked_for_zero() {
    let dataset = text_column("name", vec![Some("Ana"), Some("Bia")]);
    let result = run(
        tags::NO_ZERO,
        &dataset,
        FieldDescriptor::new("name", "string").with_zero("no"),
    );

    assert_eq!(result.status(), CheckStatus::Error);
    assert_eq!(result.evidence(), COULD_NOT_VALIDATE);
}

#[test]
fn test_format_full_match() {
    let dataset = text_column("code", vec![Some("123"), Some("12"), Some("1234")]);
    let result = run(
        tags::FORMAT,
        &dataset,
        FieldDescriptor::new("code", "string").with_format(r"\d{3}"),
    );

    assert_eq!(result.status(), CheckStatus::Fail);
    assert_eq!(result.evidence(), "Compatible: 33.33%");
    assert!(result.details().contains("row 3"));
    assert!(result.details().contains("'12'"));
}

#[test]
fn test_format_matches_nulls_as_nan() {
    let dataset = text_column("code", vec![Some("abc"), None]);
    let lenient = run(
        tags::FORMAT,
        &dataset,
        FieldDescriptor::new("code", "string").with_format("[a-z]+"),
    );
    assert_eq!(lenient.status(), CheckStatus::Pass);
    assert_eq!(lenient.evidence(), "Compatible: 100.00%");

    let strict = run(
        tags::FORMAT,
        &dataset,
        FieldDescriptor::new("code", "string").with_format("[a-c]+"),
    );
    assert_eq!(strict.evidence(), "Compatible: 50.00%");
}

#[test]
fn test_invalid_regex_is_an_error() {
    let dataset = text_column("code", vec![Some("abc")]);
    let result = run(
        tags::FORMAT,
        &dataset,
        FieldDescriptor::new("code", "string").with_format("[unclosed"),
    );

    assert_eq!(result.status(), CheckStatus::Error);
    assert_eq!(result.evidence(), "invalid rule");
}

#[test]
fn test_range_reports_out_of_range_share() {
    let dataset = Dataset::from_columns(vec![(
        "age",
        Arc::new(Int64Array::from(vec![5, 15, 25])) as ArrayRef,
    )])
    .unwrap();
    let result = run(
        tags::RANGE,
        &dataset,
        FieldDescriptor::new("age", "int").with_range("de 10 a 20"),
    );

    assert_eq!(result.status(), CheckStatus::Fail);
    assert_eq!(result.evidence(), "Out of range: 66.67%");
    assert!(result.details().contains("row 2"));
}

#[test]
fn test_range_evidence_matches_status() {
    let dataset = Dataset::from_columns(vec![(
        "age",
        Arc::new(Int64Array::from(vec![5, 15, 25])) as ArrayRef,
    )])
    .unwrap();
    let field = FieldDescriptor::new("age", "int").with_range("de 10 a 20");
    let result = run(tags::RANGE, &dataset, field);

    // One of three values is inside the interval; the evidence reports the rest.
    let reported: f64 = result
        .evidence()
        .trim_start_matches("Out of range: ")
        .trim_end_matches('%')
        .parse()
        .unwrap();
    assert!((reported + 100.0 / 3.0 - 100.0).abs() < 0.01);
    assert_eq!(reported > 0.0, result.status() == CheckStatus::Fail);

    let all_inside = Dataset::from_columns(vec![(
        "age",
        Arc::new(Int64Array::from(vec![10, 20])) as ArrayRef,
    )])
    .unwrap();
    let passing = run(
        tags::RANGE,
        &all_inside,
        FieldDescriptor::new("age", "int").with_range("de 10 a 20"),
    );
    assert_eq!(passing.status(), CheckStatus::Pass);
    assert_eq!(passing.evidence(), "Out of range: 0.00%");
}

#[test]
fn test_range_bounds_are_inclusive_and_localized() {
    let dataset = text_column("amount", vec![Some("1234,56"), Some("2000"), Some("1500")]);
    let result = run(
        tags::RANGE,
        &dataset,
        FieldDescriptor::new("amount", "float").with_range("de 1.234,56 a 2.000"),
    );

    assert_eq!(result.status(), CheckStatus::Pass);
    assert_eq!(result.evidence(), "Out of range: 0.00%");
    assert_eq!(parse_localized_number("1.234,56").unwrap(), 1234.56);
}

#[test]
fn test_malformed_range_is_an_error() {
    let dataset = text_column("amount", vec![Some("1")]);
    let result = run(
        tags::RANGE,
        &dataset,
        FieldDescriptor::new("amount", "float").with_range("between 1 and 2"),
    );

    assert_eq!(result.status(), CheckStatus::Error);
    assert!(result.details().contains("de <min> a <max>"));
}

#[test]
fn test_values_list_with_pipes_and_numbers() {
    let dataset = text_column(
        "uf",
        vec![Some("SP"), Some("RJ"), Some("BA"), None, Some("MG")],
    );
    let result = run(
        tags::VALUES,
        &dataset,
        FieldDescriptor::new("uf", "string").with_values("SP|RJ|MG"),
    );
    assert_eq!(result.status(), CheckStatus::Fail);
    assert_eq!(result.evidence(), "Outside list: 25.00%");
    assert!(result.details().contains("row 4"));

    let codes = Dataset::from_columns(vec![(
        "code",
        Arc::new(Float64Array::from(vec![1.0, 2.0])) as ArrayRef,
    )])
    .unwrap();
    let numeric = run(
        tags::VALUES,
        &codes,
        FieldDescriptor::new("code", "int").with_values("[1, 2, 3]"),
    );
    assert_eq!(numeric.status(), CheckStatus::Pass);
}

#[test]
fn test_primary_key_duplicates() {
    let dataset = text_column("id", vec![Some("a"), Some("b"), Some("a"), Some("c")]);
    let result = run(
        tags::PK,
        &dataset,
        FieldDescriptor::new("id", "string").with_pk("yes"),
    );

    assert_eq!(result.status(), CheckStatus::Fail);
    assert_eq!(result.evidence(), "Duplicates: 1 (25.00%)");
    assert!(result.details().contains("row 4"));
}

#[test]
fn test_missing_column_is_field_not_found() {
    let dataset = text_column("id", vec![Some("1")]);
    for tag in [tags::NO_NULL, tags::NO_ZERO, tags::FORMAT, tags::PK] {
        let field = FieldDescriptor::new("absent", "string")
            .with_null("no")
            .with_zero("no")
            .with_format(".*")
            .with_pk("yes");
        let result = run(tag, &dataset, field);
        let expected = if tag == tags::NO_NULL {
            CheckStatus::Fail
        } else {
            CheckStatus::Error
        };
        assert_eq!(result.status(), expected, "{tag}");
        assert_eq!(result.evidence(), FIELD_NOT_FOUND, "{tag}");
    }
}

#[test]
fn test_column_lookup_ignores_case_and_spaces() {
    let dataset = text_column(" Valor_Total ", vec![Some("1"), Some("0")]);
    let result = run(
        tags::NO_ZERO,
        &dataset,
        FieldDescriptor::new("valor_total", "float").with_zero("no"),
    );

    assert_eq!(result.evidence(), "Zeroed: 50.00%");
}

#[test]
fn test_validator_runs_fields_in_table_order() {
    let dataset = Dataset::from_columns(vec![
        (
            "id",
            Arc::new(Int64Array::from(vec![1, 2, 2])) as ArrayRef,
        ),
        (
            "uf",
            Arc::new(StringArray::from(vec![Some("SP"), None, Some("XX")])) as ArrayRef,
        ),
    ])
    .unwrap();
    let fields = FieldTable::new(vec![
        FieldDescriptor::new("id", "int").with_pk("yes").with_fk("no"),
        FieldDescriptor::new("uf", "string")
            .with_subtype("state")
            .with_null("no")
            .with_values("SP,RJ"),
        FieldDescriptor::new("ghost", "int").with_negative("no"),
    ]);

    let report = Validator::new()
        .validate("orders", &dataset, &fields)
        .unwrap();

    let order: Vec<(&str, &str)> = report
        .entries
        .iter()
        .map(|e| (e.field.as_str(), e.check.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("id", "pk"),
            ("uf", "no-null"),
            ("uf", "values"),
            ("ghost", "no-negative"),
        ]
    );
    assert_eq!(report.metrics.total_fields, 3);
    assert_eq!(report.metrics.total_checks, 4);
    assert_eq!(report.metrics.failed_checks, 3);
    assert_eq!(report.metrics.errored_checks, 1);
    assert!(!report.is_success());

    let skipped: Vec<&str> = report.skipped.iter().map(|s| s.tag.as_str()).collect();
    assert_eq!(skipped, vec!["int", "string", "state", "int"]);
}

#[test]
fn test_validator_aborts_on_blank_type() {
    let dataset = text_column("id", vec![Some("1")]);
    let fields = FieldTable::new(vec![
        FieldDescriptor::new("id", "int"),
        FieldDescriptor::new("name", "  "),
    ]);

    let err = Validator::new()
        .validate("broken", &dataset, &fields)
        .unwrap_err();
    assert!(matches!(err, EdaError::InvalidFieldDescriptor { ref field, .. } if field == "name"));
}

#[test]
fn test_custom_check_registration() {
    fn always_fails(_: &Dataset, _: &FieldTable, field: &FieldDescriptor) -> CheckResult {
        CheckResult::fail("custom", format!("{} rejected", field.field))
    }

    let dataset = text_column("id", vec![Some("1")]);
    let fields = FieldTable::new(vec![FieldDescriptor::new("id", "int").with_fk("yes")]);
    let registry = CheckRegistry::standard().with_check(tags::FK, always_fails);

    let report = Validator::new()
        .with_registry(registry)
        .validate("custom", &dataset, &fields)
        .unwrap();

    assert_eq!(report.entries.len(), 1);
    assert_eq!(report.entries[0].check, "fk");
    assert_eq!(report.entries[0].details, "id rejected");
}
