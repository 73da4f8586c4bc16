use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use larder::config::AppConfig;
use larder::directory::{
    directory_router, DonationHubDirectory, FoodCategory, HubFilter, HubType,
};
use larder::error::AppError;
use larder::inventory::{
    inventory_router, InventoryItem, InventoryService, MemoryRepository, StockStatus,
};
use larder::telemetry;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::fs::File;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "larder",
    about = "Run the restaurant surplus operations service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Browse the donation hub directory
    Directory {
        #[command(subcommand)]
        command: DirectoryCommand,
    },
    /// Inspect inventory stock status
    Inventory {
        #[command(subcommand)]
        command: InventoryCommand,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
    /// Serve the directory from a CSV export instead of the built-in data
    #[arg(long)]
    hubs_csv: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum DirectoryCommand {
    /// Search and filter donation hubs
    Search(SearchArgs),
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Free-text query matched against name, address, and description
    #[arg(long, default_value = "")]
    query: String,
    /// Keep hubs within this many miles (inclusive)
    #[arg(long)]
    max_distance: Option<f64>,
    /// Keep hubs of this type (community, regional, local, specialized)
    #[arg(long = "type", value_parser = parse_hub_type)]
    hub_type: Option<HubType>,
    /// Keep hubs accepting this category (e.g. fresh-produce, dairy)
    #[arg(long, value_parser = parse_category)]
    accepts: Option<FoodCategory>,
    /// Keep hubs rated at least this highly (inclusive)
    #[arg(long)]
    min_rating: Option<f64>,
    /// Read the directory from a CSV export instead of the built-in data
    #[arg(long)]
    csv: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum InventoryCommand {
    /// Classify the items in a JSON inventory dump
    Report(ReportArgs),
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// JSON file holding an array of inventory items
    #[arg(long)]
    file: PathBuf,
    /// Evaluation date for status derivation (defaults to today)
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Directory {
            command: DirectoryCommand::Search(args),
        } => run_directory_search(args),
        Command::Inventory {
            command: InventoryCommand::Report(args),
        } => run_inventory_report(args),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn parse_hub_type(raw: &str) -> Result<HubType, String> {
    HubType::from_token(raw)
        .ok_or_else(|| format!("unknown hub type '{raw}' (expected community, regional, local, or specialized)"))
}

fn parse_category(raw: &str) -> Result<FoodCategory, String> {
    FoodCategory::from_token(raw).ok_or_else(|| {
        format!("unknown food category '{raw}' (expected fresh-produce, prepared-foods, non-perishables, or dairy)")
    })
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let directory = match args.hubs_csv.take() {
        Some(path) => DonationHubDirectory::from_path(path)?,
        None => DonationHubDirectory::sample(),
    };
    info!(hubs = directory.len(), "donation hub directory loaded");

    let inventory = Arc::new(InventoryService::new(Arc::new(MemoryRepository::default())));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(directory_router(Arc::new(directory)))
        .merge(inventory_router(inventory))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "surplus operations service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_directory_search(args: SearchArgs) -> Result<(), AppError> {
    let SearchArgs {
        query,
        max_distance,
        hub_type,
        accepts,
        min_rating,
        csv,
    } = args;

    let directory = match csv {
        Some(path) => DonationHubDirectory::from_path(path)?,
        None => DonationHubDirectory::sample(),
    };

    let filter = HubFilter {
        query,
        max_distance,
        hub_type,
        accepts,
        min_rating,
    };
    let hubs = directory.search(&filter);

    println!("{} donation hub(s) found", hubs.len());
    for hub in &hubs {
        println!(
            "\n{} ({}) - {:.1} mi, rated {:.1}",
            hub.name,
            hub.hub_type.label(),
            hub.distance_miles,
            hub.rating
        );
        println!("  {}", hub.address);
        let tags: Vec<&str> = hub.accepts.iter().map(|tag| tag.label()).collect();
        println!("  Accepts: {}", tags.join(", "));
        if let Some(hours) = &hub.hours {
            println!("  Hours: {hours}");
        }
    }

    Ok(())
}

fn run_inventory_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs { file, today } = args;

    let items: Vec<InventoryItem> = serde_json::from_reader(File::open(file)?)?;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    println!("Inventory status report (evaluated {today})");
    if items.is_empty() {
        println!("No inventory items found");
        return Ok(());
    }

    let mut attention = 0usize;
    for item in &items {
        let status = item.status(today);
        if status != StockStatus::Normal {
            attention += 1;
        }
        println!(
            "- {} | {} {} | min {} / max {} | {} | value ${:.2}",
            item.name,
            item.current_quantity,
            item.unit,
            item.min_quantity,
            item.max_quantity,
            status.label(),
            item.total_value()
        );
    }

    println!(
        "\n{} of {} item(s) need attention",
        attention,
        items.len()
    );

    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
