//! Shop Ledger - command line front end
//!
//! Opens the configured account from the data directory and runs one
//! command against it.

use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use shared::{BulkOrderRow, DateRange, OrderStatus, PaymentMethod, ReportMode};
use shop_ledger::{
    config::Config,
    services::ReconciliationReport,
    store::FileStore,
    SessionOptions, ShopSession,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "shop-ledger", about = "Orders, stock and reconciliation for the shop", version)]
struct Cli {
    #[arg(long, global = true, help = "Account to open instead of the configured one")]
    account: Option<String>,
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Revenue, expense and profit over a date range
    Report(ReportArgs),
    #[command(subcommand)]
    Orders(OrdersCommands),
    #[command(subcommand)]
    Inventory(InventoryCommands),
    #[command(subcommand)]
    Products(ProductsCommands),
}

#[derive(Args)]
struct ReportArgs {
    #[arg(long, help = "First day of the range (YYYY-MM-DD)")]
    from: NaiveDate,
    #[arg(long, help = "Last day of the range, inclusive (YYYY-MM-DD)")]
    to: NaiveDate,
    #[arg(long, help = "order_based or ledger_only; defaults to the configured mode")]
    mode: Option<String>,
    #[arg(long, action = ArgAction::SetTrue, help = "Print the daily series as CSV")]
    csv: bool,
}

#[derive(Subcommand)]
enum OrdersCommands {
    List {
        #[arg(long, help = "Only orders in this status, e.g. SHIPPING")]
        status: Option<String>,
        #[arg(long, help = "Only orders paid this way: cod, bank_transfer or momo")]
        payment: Option<String>,
    },
    /// Write every order as CSV to stdout
    Export,
    /// Create pending orders from a CSV file
    Import {
        /// CSV with customer_name, phone, address, product_name, price,
        /// quantity, shipping_fee, notes
        path: PathBuf,
    },
}

#[derive(Subcommand)]
enum InventoryCommands {
    List {
        #[arg(long, help = "Only materials at or below this quantity")]
        low_stock: Option<u32>,
    },
}

#[derive(Subcommand)]
enum ProductsCommands {
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let config = Config::load().context("failed to load configuration")?;
    init_tracing(&config);

    tracing::debug!(environment = %config.environment, "configuration loaded");

    let account = cli
        .account
        .clone()
        .unwrap_or_else(|| config.storage.account_id.clone());
    let store = Arc::new(FileStore::new(&config.storage.data_dir));
    let options = SessionOptions::from_config(&config)?;
    let mut session = ShopSession::open(store, account, options)
        .with_context(|| format!("failed to open account in {}", config.storage.data_dir))?;

    match cli.command {
        Commands::Report(args) => run_report(&session, args, cli.json)?,
        Commands::Orders(command) => run_orders(&mut session, command, cli.json)?,
        Commands::Inventory(InventoryCommands::List { low_stock }) => {
            let items: Vec<_> = match low_stock {
                Some(threshold) => session
                    .inventory()
                    .low_stock(threshold)
                    .into_iter()
                    .cloned()
                    .collect(),
                None => session.inventory().list().to_vec(),
            };
            if cli.json {
                print_json(&items)?;
            } else {
                for item in items {
                    println!(
                        "{:<36}  {:>6} {:<6} {}",
                        item.id, item.quantity, item.unit, item.name
                    );
                }
            }
        }
        Commands::Products(ProductsCommands::List) => {
            let products = session.catalog().list();
            if cli.json {
                print_json(&products)?;
            } else {
                for product in products {
                    println!("{:<36}  {:>10}  {}", product.id, product.price, product.name);
                }
            }
        }
    }

    Ok(())
}

fn run_report(session: &ShopSession, args: ReportArgs, json: bool) -> Result<()> {
    let range = DateRange::new(args.from, args.to).map_err(|e| anyhow!(e))?;
    let mode = args
        .mode
        .as_deref()
        .map(|m| ReportMode::from_str(m).ok_or_else(|| anyhow!("unknown report mode: {}", m)))
        .transpose()?;

    let summary = session.report(range, mode);

    if args.csv {
        print!("{}", ReconciliationReport::export_to_csv(&summary.daily)?);
    } else if json {
        print_json(&summary)?;
    } else {
        println!("Range:    {} .. {}", range.start(), range.end());
        println!("Mode:     {:?}", summary.mode);
        println!("Revenue:  {}", summary.revenue);
        println!("Expense:  {}", summary.expense);
        println!("Profit:   {}", summary.profit);
        println!(
            "Orders:   {} created, {} in transit, {} reconciled",
            summary.orders.total, summary.orders.in_transit, summary.orders.reconciled
        );
    }
    Ok(())
}

fn run_orders(session: &mut ShopSession, command: OrdersCommands, json: bool) -> Result<()> {
    match command {
        OrdersCommands::List { status, payment } => {
            let status = status
                .as_deref()
                .map(|s| {
                    OrderStatus::from_str(s).ok_or_else(|| anyhow!("unknown order status: {}", s))
                })
                .transpose()?;
            let payment = payment
                .as_deref()
                .map(|p| {
                    PaymentMethod::from_str(p)
                        .ok_or_else(|| anyhow!("unknown payment method: {}", p))
                })
                .transpose()?;
            let orders = session.orders().filter(status, payment);
            if json {
                print_json(&orders)?;
            } else {
                for order in orders {
                    println!(
                        "{:<8} {:<16} {:>12}  {}",
                        order.order_code,
                        order.status.label_vi(),
                        order.total_amount(),
                        order.customer.name
                    );
                }
            }
        }
        OrdersCommands::Export => {
            let rows = session.orders().export_rows();
            print!("{}", ReconciliationReport::export_to_csv(&rows)?);
        }
        OrdersCommands::Import { path } => {
            let data = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let mut reader = csv::Reader::from_reader(data.as_bytes());
            let rows = reader
                .deserialize::<BulkOrderRow>()
                .collect::<std::result::Result<Vec<_>, _>>()
                .context("failed to parse order rows")?;

            let created = session.import_orders(rows)?;
            if json {
                print_json(&created)?;
            } else {
                println!("Imported {} orders", created.len());
            }
        }
    }
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so command output stays clean
    if config.logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
