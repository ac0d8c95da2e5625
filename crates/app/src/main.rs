use std::error::Error;

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};
use clap::Parser;
use engine::{
    DatabaseStore, Engine, LedgerLine, Money, RecordCmd, Shift, TransactionKind, WriteOutcome,
};
use migration::{Migrator, MigratorTrait};

use cli::{
    Cli, Command, HeadCommand, KindArgs, PersonalCommand, RecordArgs, ReportCommand, ShiftCommand,
    SlotArgs, VendorCommand,
};

mod cli;
mod settings;

type AppResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "tillbook={level},engine={level}",
            level = settings.app.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let url = cli
        .database_url
        .unwrap_or_else(|| settings.database.url());
    let db = connect_db(&url).await?;
    let mut engine = Engine::builder().database(db).build()?;

    let result = run(&mut engine, cli.command).await;

    if !engine.flush_pending().await {
        tracing::warn!(
            pending = engine.pending_count(),
            "store still unavailable; queued writes are dropped on exit"
        );
        for op in engine.pending() {
            eprintln!("not saved: {} {}", op.verb(), op.table().as_str());
        }
    }

    if let Err(err) = result {
        eprintln!("rejected: {err}");
        std::process::exit(1);
    }
    Ok(())
}

async fn connect_db(database_url: &str) -> AppResult<sea_orm::DatabaseConnection> {
    let db = sea_orm::Database::connect(database_url).await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

async fn run(engine: &mut Engine<DatabaseStore>, command: Command) -> AppResult<()> {
    match command {
        Command::Shift(command) => shift(engine, command).await,
        Command::Record(args) => record(engine, args).await,
        Command::Vendor(command) => vendor(engine, command).await,
        Command::Head(command) => head(engine, command).await,
        Command::Personal(command) => personal(engine, command).await,
        Command::Report(command) => report(engine, command).await,
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn start_of(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Prints how a write ended; rejections never get here.
fn outcome<T>(outcome: &WriteOutcome<T>, what: &str) {
    match outcome {
        WriteOutcome::Committed(_) => println!("saved: {what}"),
        WriteOutcome::Queued(_) => println!("queued: {what} (store unavailable, will retry)"),
    }
}

fn print_shift(shift: &Shift) {
    let id = shift
        .id
        .map_or_else(|| "not stored yet".to_string(), |id| id.to_string());
    println!(
        "{} {} [{}] opening {} ({id})",
        shift.date,
        shift.label.as_str(),
        shift.status.as_str(),
        shift.opening_cash
    );
    if let Some(close) = shift.close {
        println!(
            "  expected {}  actual {}  shortage {}",
            close.expected_closing, close.actual_closing, close.shortage
        );
    }
}

fn print_statement(lines: &[LedgerLine]) {
    for line in lines {
        println!(
            "{}  {:<15} {:>12} {:>12}  {}",
            line.created_at.format("%Y-%m-%d %H:%M"),
            line.kind,
            line.change,
            line.balance,
            line.description.as_deref().unwrap_or("")
        );
    }
}

async fn shift(engine: &mut Engine<DatabaseStore>, command: ShiftCommand) -> AppResult<()> {
    match command {
        ShiftCommand::Open(SlotArgs { date, label }) => {
            let shift = engine
                .open_or_get_shift(date.unwrap_or_else(today), label)
                .await?;
            print_shift(&shift);
        }
        ShiftCommand::Status(SlotArgs { date, label }) => {
            let date = date.unwrap_or_else(today);
            match engine.find_open_shift(date, label).await? {
                Some(shift) => {
                    print_shift(&shift);
                    println!("  expected {}", engine.compute_expected_cash(&shift).await?);
                }
                None => println!("no open {} shift on {date}", label.as_str()),
            }
        }
        ShiftCommand::Close {
            slot: SlotArgs { date, label },
            cash,
        } => {
            let date = date.unwrap_or_else(today);
            let Some(open) = engine.find_open_shift(date, label).await? else {
                return Err(format!("no open {} shift on {date}", label.as_str()).into());
            };
            let id = open.require_id()?;
            let closed = engine.close_shift(id, cash).await?;
            print_shift(&closed);
        }
    }
    Ok(())
}

async fn record(engine: &mut Engine<DatabaseStore>, args: RecordArgs) -> AppResult<()> {
    let shift = engine
        .open_or_get_shift(args.slot.date.unwrap_or_else(today), args.slot.label)
        .await?;
    let kind = match args.kind {
        KindArgs::Sale => TransactionKind::Sale,
        KindArgs::Return { vendor } => TransactionKind::Return { vendor_id: vendor },
        KindArgs::Expense { source, head } => TransactionKind::Expense {
            source,
            expense_head_id: head,
        },
        KindArgs::VendorPayment {
            vendor,
            source,
            method,
        } => TransactionKind::VendorPayment {
            source,
            vendor_id: vendor,
            payment_method: method,
        },
        KindArgs::Purchase { vendor, source } => TransactionKind::Purchase {
            source,
            vendor_id: vendor,
        },
        KindArgs::Withdrawal => TransactionKind::Withdrawal,
    };
    let mut cmd = RecordCmd::new(&shift, kind, args.amount);
    if let Some(description) = args.description {
        cmd = cmd.description(description);
    }
    let result = engine.record_transaction(cmd).await?;
    let tx = match &result {
        WriteOutcome::Committed(tx) | WriteOutcome::Queued(tx) => tx,
    };
    outcome(&result, &format!("{} {} ({})", tx.kind.as_str(), tx.amount, tx.id));
    Ok(())
}

async fn vendor(engine: &mut Engine<DatabaseStore>, command: VendorCommand) -> AppResult<()> {
    match command {
        VendorCommand::Add {
            name,
            opening_balance,
        } => {
            let result = engine.add_vendor(&name, opening_balance).await?;
            let id = match &result {
                WriteOutcome::Committed(vendor) | WriteOutcome::Queued(vendor) => vendor.id,
            };
            outcome(&result, &format!("vendor {name} ({id})"));
        }
        VendorCommand::List { all } => {
            for vendor in engine.vendors(!all).await? {
                let state = if vendor.active { "" } else { " (inactive)" };
                println!("{}  {}{state}", vendor.id, vendor.name);
            }
        }
        VendorCommand::Balance { id } => {
            let vendor = engine.vendor(id).await?;
            println!("{}: {}", vendor.name, engine.vendor_balance(id).await?);
        }
        VendorCommand::Statement { id } => {
            let vendor = engine.vendor(id).await?;
            println!("{}  opening {}", vendor.name, vendor.opening_balance);
            print_statement(&engine.vendor_statement(id).await?);
        }
        VendorCommand::Activate { id } => {
            let result = engine.set_vendor_active(id, true).await?;
            outcome(&result, &format!("vendor {id} activated"));
        }
        VendorCommand::Deactivate { id } => {
            let result = engine.set_vendor_active(id, false).await?;
            outcome(&result, &format!("vendor {id} deactivated"));
        }
        VendorCommand::Rename { id, name } => {
            let result = engine.rename_vendor(id, &name).await?;
            outcome(&result, &format!("vendor {id} renamed"));
        }
        VendorCommand::Remove { id } => {
            let result = engine.remove_vendor(id).await?;
            outcome(&result, &format!("vendor {id} removed"));
        }
    }
    Ok(())
}

async fn head(engine: &mut Engine<DatabaseStore>, command: HeadCommand) -> AppResult<()> {
    match command {
        HeadCommand::Add { name } => {
            let result = engine.add_expense_head(&name).await?;
            let id = match &result {
                WriteOutcome::Committed(head) | WriteOutcome::Queued(head) => head.id,
            };
            outcome(&result, &format!("expense head {name} ({id})"));
        }
        HeadCommand::List { all } => {
            for head in engine.expense_heads(!all).await? {
                let state = if head.active { "" } else { " (inactive)" };
                println!("{}  {}{state}", head.id, head.name);
            }
        }
        HeadCommand::Activate { id } => {
            let result = engine.set_expense_head_active(id, true).await?;
            outcome(&result, &format!("expense head {id} activated"));
        }
        HeadCommand::Deactivate { id } => {
            let result = engine.set_expense_head_active(id, false).await?;
            outcome(&result, &format!("expense head {id} deactivated"));
        }
        HeadCommand::Remove { id } => {
            let result = engine.remove_expense_head(id).await?;
            outcome(&result, &format!("expense head {id} removed"));
        }
    }
    Ok(())
}

async fn personal(engine: &mut Engine<DatabaseStore>, command: PersonalCommand) -> AppResult<()> {
    match command {
        PersonalCommand::Balance => println!("personal: {}", engine.personal_balance().await?),
        PersonalCommand::Statement { from, to } => {
            let to = match to {
                Some(day) => Some(start_of(
                    day.succ_opt().ok_or("end date out of range")?,
                )),
                None => None,
            };
            let lines = engine.personal_statement(from.map(start_of), to).await?;
            print_statement(&lines);
        }
    }
    Ok(())
}

async fn report(engine: &mut Engine<DatabaseStore>, command: ReportCommand) -> AppResult<()> {
    match command {
        ReportCommand::Shifts { from, to, label } => {
            let report = engine.shift_report(from, to, label).await?;
            println!(
                "{:<10} {:<8} {:>10} {:>10} {:>10} {:>10} {:>10}",
                "date", "shift", "sales", "returns", "expenses", "net", "shortage"
            );
            for row in &report.rows {
                let shortage = row
                    .shift
                    .close
                    .map_or_else(|| "open".to_string(), |close| close.shortage.to_string());
                println!(
                    "{:<10} {:<8} {:>10} {:>10} {:>10} {:>10} {:>10}",
                    row.shift.date,
                    row.shift.label.as_str(),
                    row.summary.sales,
                    row.summary.returns,
                    row.summary.expenses,
                    row.summary.net_cash(),
                    shortage
                );
            }
            println!(
                "{:<19} {:>10} {:>10} {:>10} {:>10} {:>10}",
                "total",
                report.totals.sales,
                report.totals.returns,
                report.totals.expenses,
                report.totals.net_cash(),
                report.total_shortage
            );
        }
        ReportCommand::Daily { date } => {
            let date = date.unwrap_or_else(today);
            let summary = engine.daily_summary(date).await?;
            println!("{date}");
            println!("  sales            {}", summary.sales);
            println!("  returns          {}", summary.returns);
            println!("  expenses         {}", summary.expenses);
            println!("  vendor payments  {}", summary.vendor_payments);
            println!("  purchases        {}", summary.purchases);
            println!("  withdrawals      {}", summary.withdrawals);
            println!("  net cash         {}", summary.net_cash());
        }
        ReportCommand::Pnl { from, to, cogs } => {
            let pnl = engine.profit_and_loss(from, to, cogs).await?;
            println!("net sales     {}", pnl.net_sales);
            println!("cogs          {}", pnl.cogs);
            println!("gross profit  {}", pnl.gross_profit);
            println!("expenses      {}", pnl.expenses);
            println!("net profit    {}", pnl.net_profit);
        }
        ReportCommand::Expenses { from, to, head } => {
            let report = engine.expense_report(from, to, head).await?;
            for line in &report.lines {
                println!(
                    "{}  {:<15} {:<7} {:>12}  {}",
                    line.created_at.format("%Y-%m-%d %H:%M"),
                    line.head.as_deref().unwrap_or("Unknown"),
                    line.source.as_str(),
                    line.amount,
                    line.description.as_deref().unwrap_or("")
                );
            }
            println!("total {}", report.total);
        }
        ReportCommand::Vendors { from, to, vendor } => {
            let vendors = engine.vendors(false).await?;
            let name = |id: Option<uuid::Uuid>| {
                id.and_then(|id| vendors.iter().find(|vendor| vendor.id == id))
                    .map_or("Unknown", |vendor| vendor.name.as_str())
            };
            for line in engine.vendor_report(from, to, vendor).await? {
                println!(
                    "{}  {:<20} {:<15} {:>12} {:>12}",
                    line.created_at.format("%Y-%m-%d %H:%M"),
                    name(line.vendor_id),
                    line.kind,
                    line.change,
                    line.balance
                );
            }
        }
        ReportCommand::Cash => {
            let cash: Money = engine.cash_in_hand().await?;
            println!("cash in hand: {cash}");
        }
    }
    Ok(())
}
