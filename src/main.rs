use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use configuration::{init_tracing, load_config, ConfigOverrides};
use dashboard::{Dashboard, DashboardView, HeatmapPanel, Panel, TrendPanel, ViewFilter};
use std::net::SocketAddr;
use std::path::PathBuf;

/// The main entry point for the Plantwatch utility dashboard.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file, if there is one.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    let _log_guard = init_tracing(config.general.log_dir.as_deref())?;

    // Execute the appropriate command
    match cli.command {
        Commands::Report(args) => {
            args.overrides.apply(&mut config);
            handle_report(args, Dashboard::new(config))
        }
        Commands::Export(args) => {
            args.overrides.apply(&mut config);
            handle_export(args, Dashboard::new(config))
        }
        Commands::Serve(args) => web_server::run_server(args.addr, config).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Synthetic utility metrics (flue gas, compressor efficiency, energy loss) and their KPIs.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. A missing file means stock settings.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the dashboard and print KPI cards to the terminal.
    Report(ReportArgs),
    /// Render the dashboard and write one JSON artifact per panel.
    Export(ExportArgs),
    /// Serve the dashboard API for the browser front end.
    Serve(ServeArgs),
}

#[derive(Parser)]
struct ReportArgs {
    #[command(flatten)]
    overrides: ConfigOverrides,

    /// Only show samples from this date on (format: YYYY-MM-DD).
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Only show samples up to this date (format: YYYY-MM-DD).
    #[arg(long)]
    to: Option<NaiveDate>,
}

#[derive(Parser)]
struct ExportArgs {
    #[command(flatten)]
    overrides: ConfigOverrides,

    /// Directory for the artifacts. Defaults to `general.output_dir`.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(Parser)]
struct ServeArgs {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: SocketAddr,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn handle_report(args: ReportArgs, dashboard: Dashboard) -> anyhow::Result<()> {
    let filter = ViewFilter {
        from: args.from,
        to: args.to,
        ..Default::default()
    };
    let view = dashboard.render(&filter).context("Failed to render dashboard")?;
    print_view(&view);
    Ok(())
}

fn handle_export(args: ExportArgs, dashboard: Dashboard) -> anyhow::Result<()> {
    let dir = args
        .output
        .unwrap_or_else(|| dashboard.config().general.output_dir.clone());
    let view = dashboard
        .render(&ViewFilter::default())
        .context("Failed to render dashboard")?;

    tracing::info!(dir = %dir.display(), "Exporting dashboard artifacts.");
    let written = dashboard::export(&view, &dir)
        .with_context(|| format!("Failed to export artifacts to {}", dir.display()))?;
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}

fn print_view(view: &DashboardView) {
    match view.seed {
        Some(seed) => println!("Seed: {seed}"),
        None => println!("Seed: (unseeded)"),
    }
    for panel in &view.panels {
        println!();
        match panel {
            Panel::Trend(trend) => print_trend(trend),
            Panel::Heatmap(heatmap) => print_heatmap(heatmap),
        }
    }
}

fn print_trend(panel: &TrendPanel) {
    println!("{}", panel.title);
    let report = &panel.report;

    let anomalies = report
        .anomalies
        .iter()
        .filter_map(|i| panel.series.get(i))
        .map(|s| format!("{} ({:.2})", s.timestamp.date(), s.value))
        .collect::<Vec<_>>()
        .join(", ");
    let deviation_pct = report
        .deviation_pct()
        .map(|p| format!(" ({p:+.2}%)"))
        .unwrap_or_default();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Metric", "Value"]);
    table.add_row(vec![Cell::new("Samples"), Cell::new(report.sample_count)]);
    table.add_row(vec![
        Cell::new("Mean"),
        Cell::new(format!("{:.3} {}", report.kpis.mean, panel.unit)),
    ]);
    table.add_row(vec![
        Cell::new(format!("Deviation from {:.2}", report.reference)),
        Cell::new(format!("{:+.3}{deviation_pct}", report.kpis.deviation_from_reference)),
    ]);
    table.add_row(vec![
        Cell::new("Residual std dev"),
        Cell::new(format!("{:.4}", report.kpis.residual_std_dev)),
    ]);
    table.add_row(vec![
        Cell::new("Range"),
        Cell::new(format!("{:.3} .. {:.3}", report.min, report.max)),
    ]);
    table.add_row(vec![Cell::new("Anomalies"), Cell::new(anomalies)]);
    println!("{table}");
}

fn print_heatmap(panel: &HeatmapPanel) {
    println!("{}", panel.title);

    let mut cells = Table::new();
    cells.load_preset(UTF8_FULL).set_header(vec!["Utility", "Loss (%)"]);
    for cell in &panel.cells {
        cells.add_row(vec![Cell::new(&cell.label), Cell::new(format!("{:.0}", cell.loss_percent))]);
    }
    println!("{cells}");

    let mut costs = Table::new();
    costs
        .load_preset(UTF8_FULL)
        .set_header(vec![format!("Rate per kWh ({:.0} kWh lost)", panel.total_loss_kwh), "Cost".to_string()]);
    for line in &panel.costs {
        costs.add_row(vec![Cell::new(format!("{:.2}", line.rate)), Cell::new(format!("{:.2}", line.cost))]);
    }
    println!("{costs}");
}
