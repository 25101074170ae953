use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use clap::{ArgAction, Args, Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use stockview_client::{
    ClientConfig, ConfirmPrompt, DeleteOutcome, HttpInventoryApi, InventoryController, LopdfEngine,
    export_report,
};
use stockview_core::ItemId;
use stockview_inventory::{InventoryItem, ItemPatch};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ClientConfig::from_env().context("failed to load client config")?;
    stockview_observability::init(config.log_format);

    let api = HttpInventoryApi::from_config(&config).context("failed to build inventory client")?;
    let controller = InventoryController::new(Arc::new(api), config.report_format.clone());
    controller.load().await.context("failed to load inventory")?;

    match cli.command {
        Commands::List(args) => handle_list(&controller, args, cli.json),
        Commands::Summary => print_or_json(&controller.summary(), cli.json, |summary| {
            println!("Items:          {}", summary.item_count);
            println!("Total quantity: {}", summary.total_quantity);
            println!("Low stock:      {}", summary.low_stock_count);
            println!(
                "Stock value:    {}",
                controller.report_format().price(Some(summary.stock_value))
            );
        }),
        Commands::Chart => print_json(&controller.chart_series().to_config()),
        Commands::Report(args) => handle_report(&controller, &config, args, cli.json),
        Commands::Update(args) => handle_update(&controller, args, cli.json).await,
        Commands::Delete(args) => handle_delete(&controller, args).await,
    }
}

#[derive(Parser)]
#[command(name = "stockview", about = "Inventory dashboard client", version)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON when available"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the inventory table
    List(ListArgs),
    /// Show headline totals over the whole inventory
    Summary,
    /// Print the quantity chart configuration
    Chart,
    /// Export the (filtered) table as a PDF report
    Report(ReportArgs),
    /// Edit one item and submit it
    Update(UpdateArgs),
    /// Delete one item
    Delete(DeleteArgs),
}

#[derive(Args)]
struct ListArgs {
    #[arg(long, help = "Only show items whose searchable fields contain this text")]
    search: Option<String>,
    #[arg(long, action = ArgAction::SetTrue, help = "Only show low-stock items")]
    low_stock: bool,
}

#[derive(Args)]
struct ReportArgs {
    #[arg(long, help = "Only include items matching this search term")]
    search: Option<String>,
    #[arg(long, help = "Directory to write the report into")]
    out: Option<PathBuf>,
}

#[derive(Args)]
struct UpdateArgs {
    #[arg(help = "Item id")]
    id: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    sku: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    quantity: Option<u64>,
    #[arg(long)]
    price: Option<Decimal>,
    #[arg(long)]
    supplier: Option<String>,
    #[arg(long)]
    reorder_level: Option<u64>,
}

impl UpdateArgs {
    fn patch(&self) -> ItemPatch {
        ItemPatch {
            item_name: self.name.clone(),
            sku: self.sku.clone(),
            category: self.category.clone(),
            quantity: self.quantity,
            price: self.price,
            supplier: self.supplier.clone(),
            reorder_level: self.reorder_level,
        }
    }
}

#[derive(Args)]
struct DeleteArgs {
    #[arg(help = "Item id")]
    id: String,
    #[arg(long, action = ArgAction::SetTrue, help = "Skip the confirmation prompt")]
    yes: bool,
}

fn handle_list(controller: &InventoryController, args: ListArgs, json: bool) -> Result<()> {
    if let Some(term) = args.search {
        controller.set_search(term);
    }
    let mut items = controller.filtered_items();
    if args.low_stock {
        items.retain(InventoryItem::is_low_stock);
    }

    print_or_json(&items, json, |items| {
        if items.is_empty() {
            println!("No items found");
            return;
        }
        let format = controller.report_format();
        for item in items {
            let flag = if item.is_low_stock() { "  LOW" } else { "" };
            println!(
                "{:<12} {:<28} {:>8} {:>12}{}",
                item.id,
                item.display_name(),
                item.quantity.map(|q| q.to_string()).unwrap_or_else(|| "N/A".to_string()),
                format.price(item.price),
                flag
            );
        }
    })
}

fn handle_report(
    controller: &InventoryController,
    config: &ClientConfig,
    args: ReportArgs,
    json: bool,
) -> Result<()> {
    if let Some(term) = args.search {
        controller.set_search(term);
    }
    let report = controller.build_report(Local::now().naive_local());
    let dir = args.out.unwrap_or_else(|| config.report_dir.clone());

    let mut engine = LopdfEngine::default();
    let path = export_report(&mut engine, &report, &dir)
        .with_context(|| format!("failed to export report to {}", dir.display()))?;

    #[derive(Serialize)]
    struct Exported {
        path: PathBuf,
        rows: usize,
    }

    print_or_json(
        &Exported {
            path: path.clone(),
            rows: report.rows.len(),
        },
        json,
        |exported| println!("Report written to {} ({})", exported.path.display(), report.summary_line()),
    )
}

async fn handle_update(controller: &InventoryController, args: UpdateArgs, json: bool) -> Result<()> {
    let id = ItemId::parse(&args.id).context("invalid item id")?;
    let patch = args.patch();
    if patch.is_empty() {
        return Err(anyhow!("nothing to update; pass at least one field"));
    }

    controller
        .begin_edit(&id)
        .with_context(|| format!("item {id} is not loaded"))?;
    controller.apply_patch(&patch).context("invalid edit")?;
    let item = controller
        .submit_edit()
        .await
        .with_context(|| format!("failed to update item {id}"))?;

    print_or_json(&item, json, |item| {
        println!("Item {} updated ({})", item.id, item.display_name())
    })
}

async fn handle_delete(controller: &InventoryController, args: DeleteArgs) -> Result<()> {
    let id = ItemId::parse(&args.id).context("invalid item id")?;
    let outcome = if args.yes {
        controller.remove(&id, &|_: &str| true).await
    } else {
        controller.remove(&id, &StdinPrompt).await
    }
    .with_context(|| format!("failed to delete item {id}"))?;

    match outcome {
        DeleteOutcome::Deleted => println!("Item {id} deleted"),
        DeleteOutcome::Cancelled => println!("Delete cancelled"),
    }
    Ok(())
}

/// Asks on stderr and reads a y/N answer from stdin.
struct StdinPrompt;

impl ConfirmPrompt for StdinPrompt {
    fn confirm(&self, message: &str) -> bool {
        eprint!("{message} [y/N] ");
        if io::stderr().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_or_json<T: Serialize>(value: &T, json: bool, human: impl FnOnce(&T)) -> Result<()> {
    if json {
        print_json(value)
    } else {
        human(value);
        Ok(())
    }
}
