//! The Money Flow seed sheet
//!
//! A header row, seven income/expense rows with a running balance formula,
//! and a totals row. Used as the initial state of a [`Sheet`](crate::Sheet)
//! and as its reset target.

use moneyflow_core::{Cell, CellAddress, CellContent, CellStore};

const COL_DESCRIPTION: u16 = 1;
const COL_INCOME: u16 = 3;
const COL_EXPENSE: u16 = 4;
const COL_BALANCE: u16 = 5;

/// Header row
const HEADERS: [(u16, &str); 4] = [
    (COL_DESCRIPTION, "Description"),
    (COL_INCOME, "Income (ETB)"),
    (COL_EXPENSE, "Expense (ETB)"),
    (COL_BALANCE, "Balance (ETB)"),
];

/// Data rows 2 to 8: description, income, expense
const ROWS: [(&str, &str, &str); 7] = [
    ("Coffee export sale", "1500", "0"),
    ("Office rent", "0", "250"),
    ("Wholesale order", "3000", "0"),
    ("Utilities", "0", "180"),
    ("Consulting contract", "5000", "0"),
    ("Transport", "0", "120"),
    ("Retail sales", "2200", "0"),
];

/// Totals row
const TOTALS: [(u16, &str); 4] = [
    (COL_DESCRIPTION, "Total"),
    (COL_INCOME, "=SUM(D2:D8)"),
    (COL_EXPENSE, "=SUM(E2:E8)"),
    (COL_BALANCE, "=SUM(F2:F8)"),
];

/// Number of cells in the seed sheet
pub const SEED_CELL_COUNT: usize = HEADERS.len() + ROWS.len() * 4 + TOTALS.len();

/// Raw `(address, input)` pairs making up the seed sheet, in row-major order
pub fn seed_inputs() -> Vec<(CellAddress, String)> {
    let mut inputs: Vec<(CellAddress, String)> = HEADERS
        .iter()
        .map(|&(col, raw)| (CellAddress::new(0, col), raw.to_string()))
        .collect();

    for (i, (description, income, expense)) in ROWS.iter().enumerate() {
        let row = i as u32 + 1;
        let income_addr = CellAddress::new(row, COL_INCOME);
        let expense_addr = CellAddress::new(row, COL_EXPENSE);
        inputs.push((CellAddress::new(row, COL_DESCRIPTION), description.to_string()));
        inputs.push((income_addr, income.to_string()));
        inputs.push((expense_addr, expense.to_string()));
        inputs.push((
            CellAddress::new(row, COL_BALANCE),
            format!("={}-{}", income_addr, expense_addr),
        ));
    }

    let totals_row = ROWS.len() as u32 + 1;
    inputs.extend(
        TOTALS
            .iter()
            .map(|&(col, raw)| (CellAddress::new(totals_row, col), raw.to_string())),
    );
    inputs
}

/// Build the seed store
///
/// Formula cells still hold their placeholder value; the owning sheet
/// recalculates before handing the store out.
pub fn seed_store() -> CellStore {
    seed_inputs()
        .into_iter()
        .map(|(addr, raw)| (addr, Cell::from(CellContent::parse(&raw))))
        .collect()
}
