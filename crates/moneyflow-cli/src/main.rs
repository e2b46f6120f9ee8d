//! Money Flow CLI - print and query the income/expense sheet

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use moneyflow::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};
use std::io::{self, Write};

/// Width of one rendered grid column
const COLUMN_WIDTH: usize = 16;

#[derive(Parser)]
#[command(name = "moneyflow")]
#[command(author, version, about = "Money Flow income and expense sheet")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the seed sheet after applying edits
    Show {
        /// Edit to apply before printing, as ADDR=RAW (repeatable)
        #[arg(short, long = "set", value_name = "ADDR=RAW", value_parser = parse_edit)]
        edits: Vec<(String, String)>,

        /// Recalculate only the formulas downstream of each edit
        #[arg(short, long)]
        incremental: bool,

        /// Print the cell store as JSON instead of a grid
        #[arg(long)]
        json: bool,
    },

    /// Evaluate a formula against the seed sheet
    Eval {
        /// Formula text, e.g. "=SUM(D2:D8)"
        formula: String,

        /// Edit to apply before evaluating, as ADDR=RAW (repeatable)
        #[arg(short, long = "set", value_name = "ADDR=RAW", value_parser = parse_edit)]
        edits: Vec<(String, String)>,

        /// Report evaluation errors instead of printing 0
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Show {
            edits,
            incremental,
            json,
        } => show(&edits, incremental, json),
        Commands::Eval {
            formula,
            edits,
            strict,
        } => eval(&formula, &edits, strict),
    }
}

/// Split `ADDR=RAW` at the first `=`, so `F2==D2*2` stores a formula
fn parse_edit(s: &str) -> std::result::Result<(String, String), String> {
    let (addr, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ADDR=RAW, got '{}'", s))?;
    if addr.trim().is_empty() {
        return Err(format!("missing cell address in '{}'", s));
    }
    Ok((addr.trim().to_string(), raw.to_string()))
}

fn load_sheet(edits: &[(String, String)], options: RecalcOptions) -> Result<Sheet> {
    let mut sheet = Sheet::seeded_with_options(options);
    for (addr, raw) in edits {
        let stats = sheet
            .edit(addr, raw)
            .with_context(|| format!("Failed to set {} to '{}'", addr, raw))?;
        if !stats.circular_cells.is_empty() {
            eprintln!(
                "Warning: circular reference after editing {}: {}",
                addr,
                join_cells(&stats.circular_cells)
            );
        }
    }
    Ok(sheet)
}

fn show(edits: &[(String, String)], incremental: bool, json: bool) -> Result<()> {
    let options = if incremental {
        RecalcOptions::incremental()
    } else {
        RecalcOptions::full()
    };
    let sheet = load_sheet(edits, options)?;

    let output = if json {
        let mut text = serde_json::to_string_pretty(sheet.store())
            .context("Failed to serialize the sheet")?;
        text.push('\n');
        text
    } else {
        render_grid(sheet.store())
    };

    io::stdout()
        .write_all(output.as_bytes())
        .context("Failed to write to stdout")?;

    let stats = sheet.last_stats();
    eprintln!(
        "Calculated {} of {} formulas ({} circular, {} errors)",
        stats.cells_calculated, stats.formula_count, stats.circular_references, stats.errors
    );
    if !stats.circular_cells.is_empty() {
        eprintln!("Circular: {}", join_cells(&stats.circular_cells));
    }

    Ok(())
}

fn eval(formula: &str, edits: &[(String, String)], strict: bool) -> Result<()> {
    let sheet = load_sheet(edits, RecalcOptions::default())?;

    let value = if strict {
        sheet
            .try_evaluate_formula(formula)
            .with_context(|| format!("Failed to evaluate '{}'", formula))?
    } else {
        sheet.evaluate_formula(formula)
    };

    println!("{}", value);
    Ok(())
}

/// Render the used range as a fixed-width grid with row and column labels
fn render_grid(store: &CellStore) -> String {
    let used_range = match store.used_range() {
        Some(range) => range,
        None => return String::new(),
    };

    let max_row = used_range.end.row;
    let max_col = used_range.end.col;
    let mut out = String::new();

    out.push_str(&format!("{:>4} ", ""));
    for col in 0..=max_col {
        let letters = CellAddress::column_to_letters(col);
        out.push_str(&format!("{:<width$}", letters, width = COLUMN_WIDTH));
    }
    trim_line_end(&mut out);
    out.push('\n');

    for row in 0..=max_row {
        out.push_str(&format!("{:>4} ", row + 1));
        for col in 0..=max_col {
            let text = match store.cell(CellAddress::new(row, col)) {
                Some(cell) => format_value(&cell.value),
                None => String::new(),
            };
            if text.len() >= COLUMN_WIDTH && col < max_col {
                out.push_str(&text);
                out.push(' ');
            } else {
                out.push_str(&format!("{:<width$}", text, width = COLUMN_WIDTH));
            }
        }
        trim_line_end(&mut out);
        out.push('\n');
    }

    out
}

fn trim_line_end(out: &mut String) {
    let trimmed = out.trim_end_matches(' ').len();
    out.truncate(trimmed);
}

/// Format a cell value for display; numbers get two decimal places
fn format_value(value: &CellValue) -> String {
    match value {
        CellValue::Number(n) => format_amount(*n),
        CellValue::Text(s) => s.clone(),
    }
}

/// Round to two decimal places, half away from zero
fn format_amount(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    match Decimal::from_f64_retain(n) {
        Some(d) => format!(
            "{:.2}",
            d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        ),
        // Outside the decimal range
        None => format!("{:.2}", n),
    }
}

fn join_cells(cells: &[CellAddress]) -> String {
    cells
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
