use crate::output::{print_json, print_table};
use fpkit_core::report::{format_summary, sample_transactions, ExpenseReport};
use std::path::Path;

pub fn run(
    config: Option<&Path>,
    factor: Option<f64>,
    table: bool,
    json: bool,
) -> anyhow::Result<()> {
    let cfg = super::load_config(config)?;
    let factor = factor.unwrap_or(cfg.report.projection_factor);
    let report = ExpenseReport::build(&sample_transactions(), factor)?;

    if json {
        return print_json(&report);
    }

    if table {
        let rows: Vec<Vec<String>> = report
            .expenses
            .iter()
            .map(|(category, amount)| {
                let projected = report
                    .projected
                    .get(category)
                    .map(ToString::to_string)
                    .unwrap_or_default();
                vec![category.clone(), amount.to_string(), projected]
            })
            .collect();
        print_table(&["CATEGORY", "CURRENT", "PROJECTED"], &rows);
    } else {
        println!("Expense Summary:");
        for line in format_summary(&report.expenses) {
            println!(" - {line}");
        }
    }

    println!("Total Expenses: ${}", report.total_expenses);
    println!("Total Income: ${}", report.total_income);
    println!("Net: ${}", report.net());

    if !table {
        println!();
        println!(
            "Predicted Next Month Spending (x{:.2}):",
            report.projection_factor
        );
        for line in format_summary(&report.projected) {
            println!(" - {line}");
        }
    }
    Ok(())
}
