use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use store_replenishment::analysis::insights::{
    scope_summary, top_recipients, RecipientKind, Scope, ScopeSummary,
};
use store_replenishment::engine::config::{load_matrix, RunParameters};
use store_replenishment::engine::run::{ReplenishmentEngine, RunReport};
use store_replenishment::io::synthetic::{generate_snapshot, SyntheticConfig};
use store_replenishment::io::{reporting, snapshot};
use store_replenishment::logging;

#[derive(Debug, Parser)]
#[command(name = "replenish", about = "Store replenishment planner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute needs and allocate warehouse stock for a snapshot
    Plan(PlanArgs),
    /// Drill into one category, store or product of an inventory snapshot
    Inspect(InspectArgs),
    /// Write a generated inventory/warehouse snapshot
    Synthetic(SyntheticArgs),
}

#[derive(Debug, Args)]
struct PlanArgs {
    /// Inventory snapshot CSV
    #[arg(long)]
    inventory: PathBuf,
    /// Warehouse stock CSV
    #[arg(long)]
    warehouse: PathBuf,
    /// Run parameters JSON; flags below take precedence
    #[arg(long)]
    config: Option<PathBuf>,
    /// Segment matrix JSON
    #[arg(long)]
    matrix: Option<PathBuf>,
    #[arg(long)]
    forward_cover: Option<f64>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    brand: Option<String>,
    /// Where to write allocation results
    #[arg(long)]
    output: Option<PathBuf>,
    /// Rows shown per ranking
    #[arg(long, default_value_t = 5)]
    top: usize,
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false, id = "scope")]
struct ScopeArgs {
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    store: Option<String>,
    #[arg(long)]
    product: Option<String>,
}

impl ScopeArgs {
    fn into_scope(self) -> Option<Scope> {
        self.category
            .map(Scope::Category)
            .or(self.store.map(Scope::Store))
            .or(self.product.map(Scope::Product))
    }
}

#[derive(Debug, Args)]
struct InspectArgs {
    /// Inventory snapshot CSV
    #[arg(long)]
    inventory: PathBuf,
    #[command(flatten)]
    scope: ScopeArgs,
    /// Below-minimum lines listed
    #[arg(long, default_value_t = 10)]
    top: usize,
}

#[derive(Debug, Args)]
struct SyntheticArgs {
    #[arg(long, default_value_t = 20)]
    stores: usize,
    #[arg(long, default_value_t = 50)]
    products: usize,
    #[arg(long, default_value_t = 2)]
    warehouses: usize,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Plan(args) => plan(args),
        Command::Inspect(args) => inspect(args),
        Command::Synthetic(args) => synthetic(args),
    }
}

fn plan(args: PlanArgs) -> anyhow::Result<()> {
    // 1. PARAMETERS
    let mut params = match &args.config {
        Some(path) => RunParameters::from_path(path)
            .with_context(|| format!("reading run parameters from {}", path.display()))?,
        None => RunParameters::default(),
    };
    if let Some(path) = &args.matrix {
        params.matrix = Some(
            load_matrix(path)
                .with_context(|| format!("reading segment matrix from {}", path.display()))?,
        );
    }
    if let Some(weeks) = args.forward_cover {
        params.forward_cover_weeks = weeks;
    }
    if args.category.is_some() {
        params.category = args.category.clone();
    }
    if args.brand.is_some() {
        params.brand = args.brand.clone();
    }
    let engine = ReplenishmentEngine::new(params)?;

    // 2. SNAPSHOT
    let records = snapshot::load_inventory_path(&args.inventory)
        .with_context(|| format!("loading inventory from {}", args.inventory.display()))?;
    let pool = snapshot::load_warehouse_stock_path(&args.warehouse)
        .with_context(|| format!("loading warehouse stock from {}", args.warehouse.display()))?;

    // 3. RUN
    let report = engine.run(&records, pool)?;

    // 4. EXPORT
    if let Some(path) = &args.output {
        reporting::write_allocation_results(path, &report.results)
            .with_context(|| format!("writing results to {}", path.display()))?;
        println!("Results written to {}", path.display());
    }

    // 5. PRINT
    print_report(&report, args.top);
    Ok(())
}

fn print_report(report: &RunReport, top: usize) {
    let summary = &report.summary;

    println!("=== Replenishment Summary ===");
    if summary.no_replenishment_required {
        println!("No replenishment required.");
        return;
    }
    println!("Total need:       {:.0}", summary.total_need);
    println!("Total shipped:    {:.0}", summary.total_shipped);
    println!("Total unmet:      {:.0}", summary.total_unmet);
    println!("Fulfillment rate: {:.1}%", summary.fulfillment_rate);
    println!(
        "Products: {}  Stores: {}  Warehouses: {}",
        summary.product_count, summary.store_count, summary.warehouse_count
    );
    for (warehouse, shipped) in &summary.shipped_by_warehouse {
        println!("  {warehouse}: {shipped:.0} shipped");
    }

    println!("\n=== Stock Status ===");
    for count in &report.status_breakdown {
        println!(
            "{:<22} {:>7} lines {:>10.0} units",
            count.status.label(),
            count.records,
            count.store_stock
        );
    }

    println!("\n=== Top Products ===");
    for r in top_recipients(&report.results, RecipientKind::Product, top) {
        println!("{:<12} {:>10.0}", r.id, r.shipped_units);
    }
    println!("\n=== Top Stores ===");
    for r in top_recipients(&report.results, RecipientKind::Store, top) {
        println!("{:<12} {:>10.0}", r.id, r.shipped_units);
    }

    println!("\n=== Dispatch Feasibility ===");
    for row in report.feasibility.iter().take(top) {
        println!(
            "{:<12} {:>4} stores need {:>8.0} / available {:>8.0}  {:?}",
            row.product_id, row.store_count, row.total_need, row.available_units, row.feasibility
        );
    }

    if !report.markdown_candidates.is_empty() {
        println!("\n=== Markdown Candidates ===");
        for c in report.markdown_candidates.iter().take(top) {
            println!(
                "{:<12} {:>4} stores {:>8.0} units {:>7.1} wks  {:?}",
                c.product_id, c.store_count, c.total_stock, c.cover_weeks, c.action
            );
        }
    }
}

fn inspect(args: InspectArgs) -> anyhow::Result<()> {
    let records = snapshot::load_inventory_path(&args.inventory)
        .with_context(|| format!("loading inventory from {}", args.inventory.display()))?;
    let scope = args
        .scope
        .into_scope()
        .context("one of --category, --store or --product is required")?;

    match scope_summary(&records, &scope) {
        Some(summary) => print_scope(&summary, args.top),
        None => println!("Nothing found for {scope:?}."),
    }
    Ok(())
}

fn print_scope(summary: &ScopeSummary, top: usize) {
    println!("=== {:?} ===", summary.scope);
    println!("Lines:       {}", summary.records);
    println!("Products:    {}", summary.product_count);
    println!("Stores:      {}", summary.store_count);
    println!("Total stock: {:.0}", summary.total_stock);
    println!("Total sales: {:.0}", summary.total_sales);

    println!("\n=== Stock Status ===");
    for count in summary.statuses.iter().filter(|c| c.records > 0) {
        println!("{:<22} {:>7} lines", count.status.label(), count.records);
    }

    if !summary.replenishment_required.is_empty() {
        println!("\n=== Below Minimum ===");
        for r in summary.replenishment_required.iter().take(top) {
            println!(
                "{:<8} {:<12} stock {:>6.0}  min {:>6.0}  sales {:>6.0}",
                r.store_id, r.product_id, r.current_store_stock, r.min_threshold, r.weekly_sales_rate
            );
        }
    }
}

fn synthetic(args: SyntheticArgs) -> anyhow::Result<()> {
    let config = SyntheticConfig {
        stores: args.stores,
        products: args.products,
        warehouses: args.warehouses,
        seed: args.seed,
        ..SyntheticConfig::default()
    };
    let snapshot = generate_snapshot(&config)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;
    let inventory = args.out_dir.join("inventory.csv");
    let warehouse = args.out_dir.join("warehouse.csv");
    reporting::write_inventory(&inventory, &snapshot.records)?;
    reporting::write_warehouse_lines(&warehouse, &snapshot.warehouse_lines)?;

    println!(
        "Wrote {} inventory lines to {} and {} warehouse lines to {}",
        snapshot.records.len(),
        inventory.display(),
        snapshot.warehouse_lines.len(),
        warehouse.display()
    );
    Ok(())
}
