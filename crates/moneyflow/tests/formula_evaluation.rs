//! Tests for formula evaluation against the Money Flow sheet

use moneyflow::prelude::*;
use moneyflow::{evaluate_formula, try_evaluate_formula};
use pretty_assertions::assert_eq;

/// Literal input round-trips through the store
#[test]
fn test_literal_round_trip() {
    let mut sheet = Sheet::new();

    sheet.edit("B2", "42").unwrap();
    assert_eq!(sheet.get_at("B2").unwrap(), Cell::literal(42.0));

    sheet.edit("B2", "hello").unwrap();
    assert_eq!(sheet.get_at("B2").unwrap(), Cell::literal("hello"));
    assert_eq!(sheet.get_at("B2").unwrap().formula, None);
}

/// Input starting with `=` is kept as a formula
#[test]
fn test_formula_detection() {
    let mut sheet = Sheet::new();
    sheet.edit("A1", "2").unwrap();
    sheet.edit("A2", "=A1*21").unwrap();

    let cell = sheet.get_at("A2").unwrap();
    assert_eq!(cell.formula.as_deref(), Some("=A1*21"));
    assert_eq!(cell.value, CellValue::Number(42.0));
}

/// SUM over the seed income column
#[test]
fn test_sum_income_column() {
    let sheet = Sheet::seeded();

    assert_eq!(evaluate_formula("=SUM(D2:D8)", sheet.store()), 11700.0);
    assert_eq!(sheet.evaluate_formula("=sum(d2:d8)"), 11700.0);
}

/// Row balance from literal cells
#[test]
fn test_row_balance() {
    let mut store = CellStore::new();
    store.set_at("D2", "1500").unwrap();
    store.set_at("E2", "0").unwrap();

    assert_eq!(evaluate_formula("=D2-E2", &store), 1500.0);
}

/// Malformed formulas evaluate to zero leniently and fail strictly
#[test]
fn test_malformed_formula() {
    let sheet = Sheet::seeded();

    assert_eq!(sheet.evaluate_formula("=SUM("), 0.0);
    assert!(matches!(
        sheet.try_evaluate_formula("=SUM("),
        Err(FormulaError::Parse(_))
    ));
}

/// Missing references count as zero
#[test]
fn test_missing_reference() {
    let sheet = Sheet::seeded();
    assert_eq!(sheet.evaluate_formula("=Z99+1"), 1.0);
}

/// Text without `=` yields its leading number
#[test]
fn test_non_formula_text() {
    let store = CellStore::new();

    assert_eq!(evaluate_formula("12.5 birr", &store), 12.5);
    assert_eq!(evaluate_formula("birr", &store), 0.0);
}

/// Functions compose with arithmetic and read computed cells
#[test]
fn test_functions_in_expressions() {
    let sheet = Sheet::seeded();

    assert_eq!(sheet.evaluate_formula("=SUM(D2:D8)-SUM(E2:E8)"), 11270.0);
    assert_eq!(sheet.evaluate_formula("=F9/2"), 5635.0);
    assert_eq!(sheet.evaluate_formula("=MAX(D2:D8)"), 5000.0);
    assert_eq!(sheet.evaluate_formula("=MIN(E2:E8)"), 0.0);
    assert_eq!(sheet.evaluate_formula("=COUNT(D2:D8)"), 7.0);
    assert_eq!(sheet.evaluate_formula("=AVERAGE(D2,D4)"), 2250.0);
}

/// Division follows floating point rules
#[test]
fn test_division_by_zero() {
    let sheet = Sheet::seeded();

    assert_eq!(sheet.evaluate_formula("=D2/E2"), f64::INFINITY);
    assert!(sheet.evaluate_formula("=E2/E2").is_nan());
}

/// A two-cell cycle is reported and stored as zero
#[test]
fn test_two_cell_cycle() {
    let mut sheet = Sheet::new();
    sheet.edit("A1", "=B1").unwrap();
    let stats = sheet.edit("B1", "=A1").unwrap();

    assert_eq!(
        stats.circular_cells,
        vec![
            CellAddress::parse("A1").unwrap(),
            CellAddress::parse("B1").unwrap()
        ]
    );
    assert_eq!(sheet.get_at("A1").unwrap().value, CellValue::Number(0.0));
    assert_eq!(sheet.get_at("B1").unwrap().value, CellValue::Number(0.0));

    let err = try_evaluate_formula("=A1", sheet.store()).unwrap_err();
    assert!(err.is_circular());

    // Breaking the cycle restores normal values
    let stats = sheet.edit("B1", "7").unwrap();
    assert!(stats.is_clean());
    assert_eq!(sheet.get_at("A1").unwrap().value, CellValue::Number(7.0));
}

/// A self-referencing total does not hang
#[test]
fn test_self_reference_in_range() {
    let mut sheet = Sheet::seeded();
    let stats = sheet.edit("D9", "=SUM(D2:D9)").unwrap();

    assert_eq!(stats.circular_references, 1);
    assert_eq!(sheet.get_at("D9").unwrap().value, CellValue::Number(0.0));
    assert_eq!(sheet.get_at("E9").unwrap().value, CellValue::Number(430.0));
}

/// Reset restores the seed after arbitrary edits
#[test]
fn test_reset_restores_seed() {
    let mut sheet = Sheet::seeded();
    sheet.edit("D2", "99999").unwrap();
    sheet.edit("B3", "=B3").unwrap();
    sheet.edit("AA100", "stray").unwrap();

    sheet.reset();

    assert_eq!(sheet.store().len(), moneyflow::SEED_CELL_COUNT);
    assert_eq!(sheet.get_at("D9").unwrap().value, CellValue::Number(11700.0));
    assert_eq!(sheet.get_at("E9").unwrap().value, CellValue::Number(430.0));
    assert_eq!(sheet.get_at("F9").unwrap().value, CellValue::Number(11270.0));
    assert_eq!(sheet.store(), Sheet::seeded().store());
}
