use std::{error::Error, fs, path::PathBuf};

use clap::{Args as ClapArgs, Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use time::{
    Date, PrimitiveDateTime, format_description::BorrowedFormatItem, macros::format_description,
};

use tally_rs::{
    SQLAppState, TransactionId,
    aggregation::{CategoryTotal, DateRange, Summary, expenses_by_category, group_by_month},
    chart::{expenses_pie_chart, standalone_html},
    config::{Config, DEFAULT_CATEGORIES_PATH, DEFAULT_DB_PATH, DEFAULT_PAGE_SIZE, DEFAULT_TIMEZONE},
    ledger::{Added, Persistence},
    report::{
        catalog_report, category_totals_report, format_amount, history_report, summary_report,
    },
    setup_logging,
};

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// A personal finance tracker for recording income and expenses.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "TALLY_DB_PATH", default_value = DEFAULT_DB_PATH, global = true)]
    db_path: PathBuf,

    /// File path to the category definitions, one `name,description,...` line per category.
    #[arg(long, env = "TALLY_CATEGORIES", default_value = DEFAULT_CATEGORIES_PATH, global = true)]
    categories: PathBuf,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    #[arg(long, env = "TALLY_TIMEZONE", default_value = DEFAULT_TIMEZONE, global = true)]
    timezone: String,

    /// How many transactions to load from the database at a time.
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, global = true)]
    page_size: u32,

    /// Log more detail, repeat for even more.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Also append logs to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the expense categories and their descriptions.
    Categories,

    /// Record money that was earned.
    Income {
        /// The amount earned, e.g. 1000.00.
        #[arg(allow_negative_numbers = true)]
        amount: Decimal,

        /// The date the money was earned as YYYY-MM-DD, defaults to now.
        #[arg(long, value_parser = parse_date)]
        date: Option<Date>,
    },

    /// Record money that was spent.
    Expense {
        /// The name of the category, see `tally categories`.
        category: String,

        /// The amount spent, e.g. 12.50.
        #[arg(allow_negative_numbers = true)]
        amount: Decimal,

        /// A short description, usually one of the category's descriptions.
        #[arg(short, long)]
        description: Option<String>,

        /// The date the money was spent as YYYY-MM-DD, defaults to now.
        #[arg(long, value_parser = parse_date)]
        date: Option<Date>,
    },

    /// Delete a transaction by its ID.
    Delete {
        /// The ID shown next to the transaction in `tally history`.
        id: TransactionId,
    },

    /// Show total income, expenses and balance, and expenses per category.
    Summary {
        #[command(flatten)]
        range: RangeArgs,

        /// Print the totals as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show transactions grouped by month, most recent first.
    History {
        #[command(flatten)]
        range: RangeArgs,
    },

    /// Write a pie chart of expenses by category as ECharts options.
    Chart {
        #[command(flatten)]
        range: RangeArgs,

        /// Write the chart to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write a standalone HTML page instead of JSON options.
        #[arg(long)]
        html: bool,
    },
}

/// Limits a command to transactions from whole days.
#[derive(ClapArgs, Debug)]
struct RangeArgs {
    /// The first day to include as YYYY-MM-DD.
    #[arg(long, value_parser = parse_date)]
    from: Option<Date>,

    /// The last day to include as YYYY-MM-DD, defaults to today.
    #[arg(long, value_parser = parse_date)]
    to: Option<Date>,
}

impl RangeArgs {
    fn resolve(&self, now: PrimitiveDateTime) -> Result<Option<DateRange>, tally_rs::Error> {
        match (self.from, self.to) {
            (None, None) => Ok(None),
            (from, to) => DateRange::whole_days(
                from.unwrap_or(Date::MIN),
                to.unwrap_or(now.date()),
            )
            .map(Some),
        }
    }
}

#[derive(Serialize)]
struct SummaryOutput<'a> {
    #[serde(flatten)]
    summary: Summary,
    expenses_by_category: &'a [CategoryTotal],
}

fn parse_date(text: &str) -> Result<Date, time::error::Parse> {
    Date::parse(text, DATE_FORMAT)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    setup_logging(args.verbose, args.log_file.as_deref())?;

    let config = Config {
        db_path: args.db_path,
        categories_path: args.categories,
        timezone: args.timezone,
        page_size: args.page_size,
    };
    tracing::debug!("Using {config:?}");

    let mut state = SQLAppState::open(&config).await?;

    match args.command {
        Command::Categories => print!("{}", catalog_report(&state.catalog)),
        Command::Income { amount, date } => {
            let date = date_or_now(date, &state)?;
            let added = state.record_income(amount, date).await?;
            print_added(&added);
        }
        Command::Expense {
            category,
            amount,
            description,
            date,
        } => {
            let date = date_or_now(date, &state)?;
            let added = state
                .record_expense(&category, amount, date, description.as_deref())
                .await?;
            print_added(&added);
        }
        Command::Delete { id } => match state.delete(id).await? {
            Persistence::Saved => println!("Deleted transaction #{id}"),
            Persistence::Degraded(error) => {
                println!("Deleted transaction #{id} from this session only: {error}")
            }
        },
        Command::Summary { range, json } => {
            let range = range.resolve(state.now()?)?;
            let transactions = match &range {
                Some(range) => range.filter(state.ledger.all()),
                None => state.ledger.all().to_vec(),
            };
            let summary = Summary::of(&transactions);
            let totals = expenses_by_category(&transactions);

            if json {
                let output = SummaryOutput {
                    summary,
                    expenses_by_category: &totals,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print!("{}", summary_report(&summary));
                println!();
                print!("{}", category_totals_report(&totals));
            }
        }
        Command::History { range } => {
            let range = range.resolve(state.now()?)?;
            let transactions = match &range {
                Some(range) => range.filter(state.ledger.all()),
                None => state.ledger.all().to_vec(),
            };

            print!("{}", history_report(&group_by_month(&transactions)));
        }
        Command::Chart {
            range,
            output,
            html,
        } => {
            let range = range.resolve(state.now()?)?;
            let transactions = match &range {
                Some(range) => range.filter(state.ledger.all()),
                None => state.ledger.all().to_vec(),
            };
            let options =
                expenses_pie_chart(&expenses_by_category(&transactions), range.as_ref())
                    .to_string();
            let contents = if html {
                standalone_html(&options)
            } else {
                options
            };

            match output {
                Some(path) => {
                    fs::write(&path, contents)?;
                    tracing::info!("Wrote chart to {}", path.display());
                }
                None => println!("{contents}"),
            }
        }
    }

    Ok(())
}

fn date_or_now(
    date: Option<Date>,
    state: &SQLAppState,
) -> Result<PrimitiveDateTime, tally_rs::Error> {
    let now = state.now()?;

    Ok(match date {
        Some(date) if date == now.date() => now,
        Some(date) => date.midnight(),
        None => now,
    })
}

fn print_added(added: &Added) {
    let transaction = &added.transaction;

    match &added.persistence {
        Persistence::Saved => println!(
            "Added transaction #{} for {} on {}",
            transaction.id(),
            format_amount(transaction.amount()),
            transaction.date().date()
        ),
        Persistence::Degraded(error) => println!(
            "Added transaction for {} on {} to this session only: {error}",
            format_amount(transaction.amount()),
            transaction.date().date()
        ),
    }
}
