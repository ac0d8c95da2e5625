use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use engine::{FundingSource, Money, ShiftLabel};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "tillbook")]
#[command(about = "Shift cash ledger: record till movements and reconcile shift closings")]
pub struct Cli {
    /// Database connection string; overrides the configured database.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(subcommand)]
    Shift(ShiftCommand),
    /// Record a transaction on the open shift, opening it if needed.
    Record(RecordArgs),
    #[command(subcommand)]
    Vendor(VendorCommand),
    /// Expense heads.
    #[command(subcommand)]
    Head(HeadCommand),
    #[command(subcommand)]
    Personal(PersonalCommand),
    #[command(subcommand)]
    Report(ReportCommand),
}

/// Which shift a command addresses. The date defaults to today.
#[derive(Args, Debug)]
pub struct SlotArgs {
    #[arg(long)]
    pub date: Option<NaiveDate>,
    #[arg(long, value_parser = parse_label)]
    pub label: ShiftLabel,
}

#[derive(Subcommand, Debug)]
pub enum ShiftCommand {
    /// Open the shift, or show it if it is already open.
    Open(SlotArgs),
    /// Show expected cash for the open shift.
    Status(SlotArgs),
    /// Count the till and close the shift.
    Close {
        #[command(flatten)]
        slot: SlotArgs,
        #[arg(long)]
        cash: Money,
    },
}

#[derive(Args, Debug)]
pub struct RecordArgs {
    #[command(flatten)]
    pub slot: SlotArgs,
    #[arg(long)]
    pub amount: Money,
    #[arg(long)]
    pub description: Option<String>,
    #[command(subcommand)]
    pub kind: KindArgs,
}

#[derive(Subcommand, Debug)]
pub enum KindArgs {
    Sale,
    Return {
        #[arg(long)]
        vendor: Option<Uuid>,
    },
    Expense {
        #[arg(long, value_parser = parse_source, default_value = "sales")]
        source: FundingSource,
        #[arg(long)]
        head: Option<Uuid>,
    },
    VendorPayment {
        #[arg(long)]
        vendor: Uuid,
        #[arg(long, value_parser = parse_source, default_value = "sales")]
        source: FundingSource,
        #[arg(long)]
        method: Option<String>,
    },
    Purchase {
        #[arg(long)]
        vendor: Uuid,
        #[arg(long, value_parser = parse_source, default_value = "credit")]
        source: FundingSource,
    },
    Withdrawal,
}

#[derive(Subcommand, Debug)]
pub enum VendorCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "0")]
        opening_balance: Money,
    },
    List {
        /// Include deactivated vendors.
        #[arg(long)]
        all: bool,
    },
    Balance {
        id: Uuid,
    },
    Statement {
        id: Uuid,
    },
    Activate {
        id: Uuid,
    },
    Deactivate {
        id: Uuid,
    },
    Rename {
        id: Uuid,
        #[arg(long)]
        name: String,
    },
    /// Delete the vendor; its past transactions keep the reference.
    Remove {
        id: Uuid,
    },
}

#[derive(Subcommand, Debug)]
pub enum HeadCommand {
    Add {
        #[arg(long)]
        name: String,
    },
    List {
        #[arg(long)]
        all: bool,
    },
    Activate {
        id: Uuid,
    },
    Deactivate {
        id: Uuid,
    },
    Remove {
        id: Uuid,
    },
}

#[derive(Subcommand, Debug)]
pub enum PersonalCommand {
    Balance,
    /// Statement of the days `[from, to]`.
    Statement {
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    /// Per-shift totals for the days `[from, to]`.
    Shifts {
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
        #[arg(long, value_parser = parse_label)]
        label: Option<ShiftLabel>,
    },
    Daily {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Profit and loss; COGS is entered by hand.
    Pnl {
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
        #[arg(long, default_value = "0")]
        cogs: Money,
    },
    /// Expenses booked in the days `[from, to]`.
    Expenses {
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
        #[arg(long)]
        head: Option<Uuid>,
    },
    /// Vendor movements in the days `[from, to]`, all vendors by default.
    Vendors {
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
        #[arg(long)]
        vendor: Option<Uuid>,
    },
    /// Cash counted at the last closing.
    Cash,
}

fn parse_label(raw: &str) -> Result<ShiftLabel, String> {
    ShiftLabel::try_from(raw).map_err(|err| err.to_string())
}

fn parse_source(raw: &str) -> Result<FundingSource, String> {
    FundingSource::try_from(raw).map_err(|err| err.to_string())
}
