use std::error::Error;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use engine::{
    AccountKind, AccountStatus, Engine, EngineError, ErrorKind, NewAccount, NewCustomer,
    TransactionRequest,
};
use migration::{Migrator, MigratorTrait};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

mod settings;

#[derive(Parser, Debug)]
#[command(name = "bank_admin")]
#[command(about = "Back office utilities for the bank ledger")]
struct Cli {
    /// Optional settings file path (TOML, without extension).
    #[arg(long)]
    config: Option<String>,

    /// Database connection string, overrides the settings file.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Customer(Customer),
    Account(Account),
    Tx(Tx),
    /// Manage the schema; other commands apply pending migrations on start.
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
}

#[derive(Subcommand, Debug)]
enum MigrateAction {
    Up,
    Down,
    Fresh,
    Status,
}

#[derive(Args, Debug)]
struct Customer {
    #[command(subcommand)]
    command: CustomerCommand,
}

#[derive(Subcommand, Debug)]
enum CustomerCommand {
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: Option<String>,
    },
    Show {
        id: Uuid,
    },
}

#[derive(Args, Debug)]
struct Account {
    #[command(subcommand)]
    command: AccountCommand,
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
    Open {
        #[arg(long)]
        customer: Uuid,
        #[arg(long)]
        number: String,
        /// CHECKING, SAVINGS or FIXED_DEPOSIT.
        #[arg(long, default_value = "CHECKING")]
        kind: AccountKind,
        #[arg(long, default_value = "0")]
        balance: Decimal,
        #[arg(long)]
        status: Option<AccountStatus>,
    },
    Show {
        id: Uuid,
    },
    List {
        #[arg(long)]
        customer: Option<Uuid>,
    },
    Status {
        id: Uuid,
        status: String,
    },
    Close {
        id: Uuid,
        /// RFC 3339 timestamp, defaults to now.
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    Delete {
        id: Uuid,
    },
}

#[derive(Args, Debug)]
struct Tx {
    #[command(subcommand)]
    command: TxCommand,
}

#[derive(Args, Debug)]
struct Movement {
    #[arg(long)]
    account: Uuid,
    #[arg(long)]
    amount: Decimal,
    #[arg(long)]
    description: Option<String>,
}

#[derive(Subcommand, Debug)]
enum TxCommand {
    Deposit(Movement),
    Withdraw(Movement),
    Transfer {
        #[command(flatten)]
        movement: Movement,
        #[arg(long)]
        to: Uuid,
    },
    Show {
        id: Uuid,
    },
    List {
        #[arg(long)]
        account: Option<Uuid>,
    },
}

fn with_description(request: TransactionRequest, description: Option<String>) -> TransactionRequest {
    match description {
        Some(description) => request.description(description),
        None => request,
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error + Send + Sync>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(engine: &Engine, command: Command) -> Result<(), Box<dyn Error + Send + Sync>> {
    match command {
        Command::Customer(Customer { command }) => match command {
            CustomerCommand::Create { name, email } => {
                let mut new_customer = NewCustomer::new(name);
                if let Some(email) = email {
                    new_customer = new_customer.email(email);
                }
                print_json(&engine.new_customer(new_customer).await?)
            }
            CustomerCommand::Show { id } => print_json(&engine.customer(id).await?),
        },
        Command::Account(Account { command }) => match command {
            AccountCommand::Open {
                customer,
                number,
                kind,
                balance,
                status,
            } => {
                let mut new_account = NewAccount::new(customer, number, kind, balance);
                if let Some(status) = status {
                    new_account = new_account.status(status);
                }
                print_json(&engine.open_account(new_account).await?)
            }
            AccountCommand::Show { id } => print_json(&engine.account(id).await?),
            AccountCommand::List { customer: None } => print_json(&engine.accounts().await?),
            AccountCommand::List {
                customer: Some(customer),
            } => print_json(&engine.accounts_for_customer(customer).await?),
            AccountCommand::Status { id, status } => {
                print_json(&engine.update_account_status(id, &status).await?)
            }
            AccountCommand::Close { id, at } => print_json(&engine.close_account(id, at).await?),
            AccountCommand::Delete { id } => {
                engine.delete_account(id).await?;
                print_json(&serde_json::json!({ "deleted": id }))
            }
        },
        Command::Tx(Tx { command }) => match command {
            TxCommand::Deposit(m) => {
                let request = TransactionRequest::deposit(m.account, m.amount);
                let request = with_description(request, m.description);
                print_json(&engine.create_transaction(request).await?)
            }
            TxCommand::Withdraw(m) => {
                let request = TransactionRequest::withdrawal(m.account, m.amount);
                let request = with_description(request, m.description);
                print_json(&engine.create_transaction(request).await?)
            }
            TxCommand::Transfer { movement: m, to } => {
                let request = TransactionRequest::transfer(m.account, to, m.amount);
                let request = with_description(request, m.description);
                print_json(&engine.create_transaction(request).await?)
            }
            TxCommand::Show { id } => print_json(&engine.transaction(id).await?),
            TxCommand::List { account: None } => print_json(&engine.transactions().await?),
            TxCommand::List {
                account: Some(account),
            } => print_json(&engine.transactions_for_account(account).await?),
        },
        Command::Migrate { .. } => Ok(()),
    }
}

fn exit_code(err: &EngineError) -> i32 {
    match err.kind() {
        ErrorKind::Rejected => 2,
        ErrorKind::NotFound => 3,
        ErrorKind::Conflict => 4,
        ErrorKind::Storage => 1,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = settings::Settings::new(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "bank_admin={level},engine={level}",
            level = settings.app.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let url = cli
        .database_url
        .unwrap_or_else(|| settings.database.url());
    tracing::debug!(%url, "connecting to database");
    let db = sea_orm::Database::connect(url).await?;

    if let Command::Migrate { action } = &cli.command {
        match action {
            MigrateAction::Up => Migrator::up(&db, None).await?,
            MigrateAction::Down => Migrator::down(&db, None).await?,
            MigrateAction::Fresh => Migrator::fresh(&db).await?,
            MigrateAction::Status => Migrator::status(&db).await?,
        }
        return Ok(());
    }
    Migrator::up(&db, None).await?;

    let engine = Engine::builder().database(db).build().await?;

    if let Err(err) = run(&engine, cli.command).await {
        match err.downcast::<EngineError>() {
            Ok(err) => {
                eprintln!("{err}");
                std::process::exit(exit_code(&err));
            }
            Err(err) => return Err(err),
        }
    }

    Ok(())
}
