use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tally", about = "Sales and expense bookkeeping from the command line")]
pub struct Cli {
    /// Settings file, defaults to `TALLY_CONFIG` or `config.toml`
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Store to work on, defaults to the first store on the account
    #[arg(long, global = true)]
    pub store: Option<i64>,

    /// Remember the login email for next time
    #[arg(long, global = true, conflicts_with = "forget")]
    pub remember: bool,

    /// Forget the remembered login email
    #[arg(long, global = true)]
    pub forget: bool,

    /// More detail in the log file, repeat for more (`RUST_LOG` overrides)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Show the logged-in user and their stores
    Me,
    #[command(subcommand)]
    Sales(RecordCommand),
    #[command(subcommand)]
    Expenses(RecordCommand),
    #[command(subcommand)]
    Delivery(DeliveryCommand),
    #[command(subcommand)]
    Stats(StatsCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum RecordCommand {
    List(ListArgs),
    Get { id: i64 },
    Delete { id: i64 },
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ListArgs {
    #[arg(long, default_value_t = 0)]
    pub page: u32,

    #[arg(long, default_value_t = 10)]
    pub size: u32,

    /// Oldest first
    #[arg(long)]
    pub asc: bool,

    #[arg(long, requires = "to")]
    pub from: Option<NaiveDate>,

    #[arg(long, requires = "from")]
    pub to: Option<NaiveDate>,

    /// Payment method code such as `CARD` (expenses only)
    #[arg(long)]
    pub payment: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum DeliveryCommand {
    /// Enabled platforms and their commission rates
    Show,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum StatsCommand {
    SalesExpense(PeriodArgs),
    SalesType {
        #[arg(long)]
        year: i32,

        #[arg(long)]
        exclude_delivery_fee: bool,
    },
    Delivery(PeriodArgs),
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct PeriodArgs {
    #[arg(long)]
    pub year: i32,

    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,

    /// Break the month down by day instead of the year by month
    #[arg(long, requires = "month")]
    pub daily: bool,

    #[arg(long)]
    pub exclude_commission: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("tally").chain(args.iter().copied()))
    }

    #[test]
    fn test_sales_list_defaults() {
        let cli = parse(&["sales", "list"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Sales(RecordCommand::List(ListArgs {
                page: 0,
                size: 10,
                asc: false,
                from: None,
                to: None,
                payment: None,
            }))
        );
        assert!(!cli.remember);
    }

    #[test]
    fn test_date_range_needs_both_ends() {
        assert!(parse(&["expenses", "list", "--from", "2025-01-01"]).is_err());

        let cli = parse(&[
            "expenses", "list", "--from", "2025-01-01", "--to", "2025-01-31", "--payment", "CARD",
        ])
        .unwrap();
        let Command::Expenses(RecordCommand::List(args)) = cli.command else {
            panic!("expected expenses list");
        };
        assert_eq!(args.from, NaiveDate::from_ymd_opt(2025, 1, 1));
        assert_eq!(args.payment.as_deref(), Some("CARD"));
    }

    #[test]
    fn test_daily_stats_need_a_month() {
        assert!(parse(&["stats", "sales-expense", "--year", "2025", "--daily"]).is_err());
        assert!(parse(&["stats", "delivery", "--year", "2025", "--month", "13"]).is_err());

        let cli = parse(&[
            "--store", "4", "stats", "delivery", "--year", "2025", "--month", "3", "--daily",
        ])
        .unwrap();
        assert_eq!(cli.store, Some(4));
        assert!(matches!(
            cli.command,
            Command::Stats(StatsCommand::Delivery(PeriodArgs { daily: true, month: Some(3), .. }))
        ));
    }

    #[test]
    fn test_verbose_is_counted() {
        assert_eq!(parse(&["me"]).unwrap().verbose, 0);
        assert_eq!(parse(&["-vv", "me"]).unwrap().verbose, 2);
    }

    #[test]
    fn test_remember_and_forget_conflict() {
        assert!(parse(&["--remember", "--forget", "me"]).is_err());
        assert!(parse(&["me", "--forget"]).unwrap().forget);
    }
}
