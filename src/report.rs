//! Plain-text rendering of summaries, history and the category catalog.

use std::fmt::Write;

use rust_decimal::Decimal;

use crate::{
    aggregation::{CategoryTotal, MonthGroup, Summary},
    category::Catalog,
    transaction::{Transaction, TransactionKind},
};

/// Formats `amount` with two decimal places, e.g. `1234.5` as `1234.50`.
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

/// Renders income, expenses and balance, one per line.
pub fn summary_report(summary: &Summary) -> String {
    format!(
        "Income:   {:>12}\nExpenses: {:>12}\nBalance:  {:>12}\n",
        format_amount(summary.income),
        format_amount(summary.expenses),
        format_amount(summary.balance),
    )
}

/// Renders expense totals per category, largest first.
pub fn category_totals_report(totals: &[CategoryTotal]) -> String {
    if totals.is_empty() {
        return "No expenses.\n".to_owned();
    }

    let mut sorted: Vec<&CategoryTotal> = totals.iter().collect();
    sorted.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));

    let width = sorted
        .iter()
        .map(|total| total.category.as_ref().len())
        .max()
        .unwrap_or_default();

    let mut report = String::new();
    for total in sorted {
        let _ = writeln!(
            report,
            "{:<width$}  {:>12}",
            total.category.as_ref(),
            format_amount(total.total)
        );
    }

    report
}

/// Renders transactions grouped by month, with the net amount for each month.
pub fn history_report(groups: &[MonthGroup<'_>]) -> String {
    if groups.is_empty() {
        return "No transactions.\n".to_owned();
    }

    let mut report = String::new();
    for group in groups {
        let _ = writeln!(report, "{} (net {})", group.month, format_amount(group.net()));

        for transaction in &group.transactions {
            let _ = writeln!(report, "  {}", transaction_line(transaction));
        }
    }

    report
}

/// Renders the catalog's categories and their descriptions, in file order.
pub fn catalog_report(catalog: &Catalog) -> String {
    if catalog.is_empty() {
        return "No categories.\n".to_owned();
    }

    let mut report = String::new();
    for category in catalog.iter() {
        if category.descriptions().is_empty() {
            let _ = writeln!(report, "{}", category.name());
        } else {
            let _ = writeln!(
                report,
                "{}: {}",
                category.name(),
                category.descriptions().join(", ")
            );
        }
    }

    report
}

/// A single line describing `transaction`.
///
/// Unsaved transactions are shown with `-` in place of an ID.
pub fn transaction_line(transaction: &Transaction) -> String {
    let id = if transaction.is_saved() {
        format!("#{}", transaction.id())
    } else {
        "-".to_owned()
    };

    let label = match transaction.kind() {
        TransactionKind::Income => "Income".to_owned(),
        TransactionKind::Expense {
            category,
            description: Some(description),
        } => format!("{category}: {description}"),
        TransactionKind::Expense {
            category,
            description: None,
        } => category.to_string(),
    };

    let sign = if transaction.is_income() { "+" } else { "-" };

    format!(
        "{id:>6}  {}  {label:<30}  {sign}{}",
        transaction.date().date(),
        format_amount(transaction.amount())
    )
}
