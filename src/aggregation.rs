//! Transaction aggregation for summaries, history and charts.
//!
//! Provides pure functions that derive balances, totals, expenses grouped by
//! category and transactions grouped by month from a slice of transactions.
//! An empty slice is valid input and produces zero or empty results.
//!
//! Date range filtering is done up front with [DateRange] or
//! [filter_by_date_range], the other functions take whatever slice they are given.

use std::{
    collections::{BTreeMap, HashMap},
    fmt::Display,
};

use rust_decimal::Decimal;
use serde::Serialize;
use time::{Date, Duration, Month, PrimitiveDateTime, macros::time};

use crate::{Error, category::CategoryName, transaction::Transaction};

// ============================================================================
// TOTALS
// ============================================================================

/// Total income minus total expenses.
pub fn balance(transactions: &[Transaction]) -> Decimal {
    total_income(transactions) - total_expenses(transactions)
}

/// The sum of all income amounts.
pub fn total_income(transactions: &[Transaction]) -> Decimal {
    transactions
        .iter()
        .filter(|transaction| transaction.is_income())
        .map(Transaction::amount)
        .sum()
}

/// The sum of all expense amounts.
pub fn total_expenses(transactions: &[Transaction]) -> Decimal {
    transactions
        .iter()
        .filter(|transaction| transaction.is_expense())
        .map(Transaction::amount)
        .sum()
}

/// Income, expenses and balance over the same transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Summary {
    /// Total income.
    pub income: Decimal,
    /// Total expenses.
    pub expenses: Decimal,
    /// Income minus expenses.
    pub balance: Decimal,
}

impl Summary {
    /// Summarise `transactions` in a single pass.
    pub fn of(transactions: &[Transaction]) -> Self {
        let (income, expenses) = transactions.iter().fold(
            (Decimal::ZERO, Decimal::ZERO),
            |(income, expenses), transaction| {
                if transaction.is_income() {
                    (income + transaction.amount(), expenses)
                } else {
                    (income, expenses + transaction.amount())
                }
            },
        );

        Self {
            income,
            expenses,
            balance: income - expenses,
        }
    }
}

// ============================================================================
// GROUPING
// ============================================================================

/// The total spent in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    /// The category the expenses belong to.
    pub category: CategoryName,
    /// The sum of the category's expense amounts.
    pub total: Decimal,
}

/// Sums expense amounts per category.
///
/// Income is ignored. Categories appear in the order of their first expense;
/// callers that need a particular order should sort the result.
pub fn expenses_by_category(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();
    let mut index: HashMap<&CategoryName, usize> = HashMap::new();

    for transaction in transactions {
        let Some(category) = transaction.category() else {
            continue;
        };

        match index.get(category) {
            Some(&position) => totals[position].total += transaction.amount(),
            None => {
                index.insert(category, totals.len());
                totals.push(CategoryTotal {
                    category: category.clone(),
                    total: transaction.amount(),
                });
            }
        }
    }

    totals
}

/// A calendar month, represented by its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey(Date);

impl MonthKey {
    /// The month that `date` falls in.
    pub fn of(date: PrimitiveDateTime) -> Self {
        let date = date.date();
        Self(date - Duration::days(i64::from(date.day()) - 1))
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// The month of the year.
    pub fn month(&self) -> Month {
        self.0.month()
    }

    /// The first day of the month.
    pub fn first_day(&self) -> Date {
        self.0
    }
}

impl Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.month(), self.year())
    }
}

/// The transactions that fall in one month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthGroup<'a> {
    /// The month shared by every transaction in the group.
    pub month: MonthKey,
    /// The month's transactions, in the order they appear in the input.
    pub transactions: Vec<&'a Transaction>,
}

impl MonthGroup<'_> {
    /// Income minus expenses for the month.
    pub fn net(&self) -> Decimal {
        self.transactions
            .iter()
            .map(|transaction| {
                if transaction.is_income() {
                    transaction.amount()
                } else {
                    -transaction.amount()
                }
            })
            .sum()
    }
}

/// Groups transactions by month, most recent month first.
///
/// Within a month, transactions keep their input order rather than being
/// sorted by date.
pub fn group_by_month(transactions: &[Transaction]) -> Vec<MonthGroup<'_>> {
    let mut months: BTreeMap<MonthKey, Vec<&Transaction>> = BTreeMap::new();

    for transaction in transactions {
        months
            .entry(MonthKey::of(transaction.date()))
            .or_default()
            .push(transaction);
    }

    months
        .into_iter()
        .rev()
        .map(|(month, transactions)| MonthGroup {
            month,
            transactions,
        })
        .collect()
}

// ============================================================================
// DATE RANGES
// ============================================================================

/// An inclusive range of date-times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: PrimitiveDateTime,
    end: PrimitiveDateTime,
}

impl DateRange {
    /// Create the range `start..=end`.
    ///
    /// # Errors
    /// Returns an [Error::InvalidRange] if `start` is after `end`.
    pub fn new(start: PrimitiveDateTime, end: PrimitiveDateTime) -> Result<Self, Error> {
        if start > end {
            return Err(Error::InvalidRange { start, end });
        }

        Ok(Self { start, end })
    }

    /// The range from the start of `start_date` to the end of `end_date`.
    ///
    /// # Errors
    /// Returns an [Error::InvalidRange] if `start_date` is after `end_date`.
    pub fn whole_days(start_date: Date, end_date: Date) -> Result<Self, Error> {
        Self::new(
            start_date.midnight(),
            end_date.with_time(time!(23:59:59.999_999_999)),
        )
    }

    /// The range from the earliest representable date up to `now`.
    pub fn until(now: PrimitiveDateTime) -> Self {
        Self {
            start: Date::MIN.midnight(),
            end: now,
        }
    }

    /// The first date-time in the range.
    pub fn start(&self) -> PrimitiveDateTime {
        self.start
    }

    /// The last date-time in the range.
    pub fn end(&self) -> PrimitiveDateTime {
        self.end
    }

    /// Whether `date` is within the range, bounds included.
    pub fn contains(&self, date: PrimitiveDateTime) -> bool {
        self.start <= date && date <= self.end
    }

    /// The transactions dated within the range, in input order.
    pub fn filter(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        transactions
            .iter()
            .filter(|transaction| self.contains(transaction.date()))
            .cloned()
            .collect()
    }
}

/// The transactions dated from `start` to `end`, bounds included.
///
/// # Errors
/// Returns an [Error::InvalidRange] if `start` is after `end`.
pub fn filter_by_date_range(
    transactions: &[Transaction],
    start: PrimitiveDateTime,
    end: PrimitiveDateTime,
) -> Result<Vec<Transaction>, Error> {
    Ok(DateRange::new(start, end)?.filter(transactions))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use time::{
        Date, Month, PrimitiveDateTime,
        macros::{date, datetime, time},
    };

    use crate::{
        Error,
        aggregation::{
            DateRange, MonthKey, Summary, balance, expenses_by_category, filter_by_date_range,
            group_by_month, total_expenses, total_income,
        },
        category::CategoryName,
        transaction::Transaction,
    };

    fn income(amount: Decimal, date: PrimitiveDateTime) -> Transaction {
        Transaction::income(amount, date).unwrap()
    }

    fn expense(category: &str, amount: Decimal, date: PrimitiveDateTime) -> Transaction {
        Transaction::expense(CategoryName::new_unchecked(category), amount, date, None).unwrap()
    }

    fn mixed_transactions() -> Vec<Transaction> {
        vec![
            income(dec!(1000.00), datetime!(2024-01-10 9:00)),
            expense("Food", dec!(200.00), datetime!(2024-01-15 12:30)),
            expense("Transport", dec!(35.10), datetime!(2024-02-01 8:00)),
            expense("Food", dec!(0.10), datetime!(2024-02-03 19:00)),
            income(dec!(0.20), datetime!(2023-12-31 23:59)),
            expense("Food", dec!(0.20), datetime!(2024-03-09 10:00)),
        ]
    }

    #[test]
    fn balance_is_income_minus_expenses() {
        let transaction_sets = [
            vec![],
            mixed_transactions(),
            vec![income(dec!(5), datetime!(2024-01-01 0:00))],
            vec![expense("Food", dec!(5), datetime!(2024-01-01 0:00))],
        ];

        for transactions in transaction_sets {
            assert_eq!(
                balance(&transactions),
                total_income(&transactions) - total_expenses(&transactions)
            );
        }
    }

    #[test]
    fn totals_are_exact() {
        let transactions = vec![
            income(dec!(0.10), datetime!(2024-01-01 0:00)),
            income(dec!(0.20), datetime!(2024-01-02 0:00)),
            expense("Food", dec!(0.30), datetime!(2024-01-03 0:00)),
        ];

        assert_eq!(total_income(&transactions), dec!(0.30));
        assert_eq!(balance(&transactions), Decimal::ZERO);
    }

    #[test]
    fn empty_input_gives_zero_and_empty_results() {
        assert_eq!(balance(&[]), Decimal::ZERO);
        assert_eq!(total_income(&[]), Decimal::ZERO);
        assert_eq!(total_expenses(&[]), Decimal::ZERO);
        assert!(expenses_by_category(&[]).is_empty());
        assert!(group_by_month(&[]).is_empty());
        assert_eq!(Summary::of(&[]), Summary::default());
    }

    #[test]
    fn summary_matches_individual_totals() {
        let transactions = mixed_transactions();

        let summary = Summary::of(&transactions);

        assert_eq!(summary.income, total_income(&transactions));
        assert_eq!(summary.expenses, total_expenses(&transactions));
        assert_eq!(summary.balance, balance(&transactions));
    }

    #[test]
    fn expenses_by_category_sums_per_category_in_first_seen_order() {
        let totals = expenses_by_category(&mixed_transactions());

        let got: Vec<_> = totals
            .iter()
            .map(|total| (total.category.as_ref(), total.total))
            .collect();
        assert_eq!(got, [("Food", dec!(200.30)), ("Transport", dec!(35.10))]);
    }

    #[test]
    fn expenses_by_category_ignores_order() {
        let transactions = mixed_transactions();
        let mut reversed = transactions.clone();
        reversed.reverse();

        let mut want = expenses_by_category(&transactions);
        let mut got = expenses_by_category(&reversed);
        want.sort_by(|a, b| a.category.cmp(&b.category));
        got.sort_by(|a, b| a.category.cmp(&b.category));

        assert_eq!(got, want);
    }

    #[test]
    fn group_by_month_is_descending_by_month() {
        let transactions = vec![
            expense("Food", dec!(100), datetime!(2024-01-05 0:00)),
            expense("Food", dec!(50), datetime!(2024-02-10 0:00)),
            expense("Food", dec!(200), datetime!(2024-01-20 0:00)),
        ];

        let groups = group_by_month(&transactions);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].month.month(), Month::February);
        assert_eq!(groups[0].transactions, [&transactions[1]]);
        assert_eq!(groups[1].month.month(), Month::January);
        assert_eq!(groups[1].transactions, [&transactions[0], &transactions[2]]);
        assert_eq!(groups[1].net(), dec!(-300));
    }

    #[test]
    fn group_by_month_keeps_input_order_within_month() {
        let transactions = vec![
            expense("Food", dec!(1), datetime!(2024-01-20 0:00)),
            expense("Food", dec!(2), datetime!(2024-01-05 0:00)),
        ];

        let groups = group_by_month(&transactions);

        assert_eq!(groups[0].transactions, [&transactions[0], &transactions[1]]);
    }

    #[test]
    fn group_by_month_is_a_partition() {
        let transactions = mixed_transactions();

        let groups = group_by_month(&transactions);

        let grouped_sum: Decimal = groups
            .iter()
            .flat_map(|group| group.transactions.iter())
            .map(|transaction| transaction.amount())
            .sum();
        let grouped_count: usize = groups.iter().map(|group| group.transactions.len()).sum();
        let input_sum: Decimal = transactions.iter().map(Transaction::amount).sum();
        assert_eq!(grouped_sum, input_sum);
        assert_eq!(grouped_count, transactions.len());
        for pair in groups.windows(2) {
            assert!(
                pair[0].month > pair[1].month,
                "{} should come before {}",
                pair[0].month,
                pair[1].month
            );
        }
    }

    #[test]
    fn month_key_separates_years() {
        let december = MonthKey::of(datetime!(2023-12-31 23:59));
        let january = MonthKey::of(datetime!(2024-01-01 0:00));

        assert!(january > december);
        assert_eq!(december.first_day(), date!(2023-12-01));
        assert_eq!(december.to_string(), "December 2023");
        assert_eq!(january.to_string(), "January 2024");
    }

    #[test]
    fn filter_is_inclusive_on_both_bounds() {
        let transactions = vec![
            income(dec!(1), datetime!(2024-01-01 0:00)),
            income(dec!(2), datetime!(2024-01-15 0:00)),
            income(dec!(3), datetime!(2024-01-31 0:00)),
            income(dec!(4), datetime!(2024-02-01 0:00)),
        ];

        let got = filter_by_date_range(
            &transactions,
            datetime!(2024-01-01 0:00),
            datetime!(2024-01-31 0:00),
        )
        .unwrap();

        assert_eq!(got, transactions[..3]);
        for transaction in got {
            assert!(transaction.date() >= datetime!(2024-01-01 0:00));
            assert!(transaction.date() <= datetime!(2024-01-31 0:00));
        }
    }

    #[test]
    fn filter_with_widest_range_returns_everything() {
        let transactions = mixed_transactions();

        let got = filter_by_date_range(
            &transactions,
            Date::MIN.midnight(),
            Date::MAX.with_time(time!(23:59:59.999_999_999)),
        );

        assert_eq!(got, Ok(transactions));
    }

    #[test]
    fn filter_with_no_matches_is_empty() {
        let got = filter_by_date_range(
            &mixed_transactions(),
            datetime!(2030-01-01 0:00),
            datetime!(2030-12-31 0:00),
        );

        assert_eq!(got, Ok(vec![]));
    }

    #[test]
    fn filter_rejects_inverted_range() {
        let start = datetime!(2024-02-01 0:00);
        let end = datetime!(2024-01-01 0:00);

        let got = filter_by_date_range(&mixed_transactions(), start, end);

        assert_eq!(got, Err(Error::InvalidRange { start, end }));
    }

    #[test]
    fn whole_days_covers_the_last_day() {
        let range = DateRange::whole_days(date!(2024-01-01), date!(2024-01-31)).unwrap();

        assert!(range.contains(datetime!(2024-01-01 0:00)));
        assert!(range.contains(datetime!(2024-01-31 23:59:59)));
        assert!(!range.contains(datetime!(2024-02-01 0:00)));
    }

    #[test]
    fn whole_days_allows_a_single_day() {
        let range = DateRange::whole_days(date!(2024-01-01), date!(2024-01-01));

        assert!(range.is_ok());
    }

    #[test]
    fn until_covers_everything_up_to_now() {
        let now = datetime!(2024-06-01 12:00);
        let range = DateRange::until(now);

        assert!(range.contains(datetime!(1900-01-01 0:00)));
        assert!(range.contains(now));
        assert!(!range.contains(datetime!(2024-06-01 12:00:01)));
    }
}
