//! conveyor CLI — demo pipeline driver.
//!
//! Wires a two-stage pipeline (wheels → paint) over a batch of cars and
//! runs it to completion. The pipeline itself is surrounding code; the
//! core crate only supplies the registry, cursors, and gating.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use conveyor::config::Config;
use conveyor::factory::CursorFactory;
use conveyor::model::{Item, NewItem};
use conveyor::order::{ArrivalOrder, OrderPolicy, UrgencyOrder};
use conveyor::readiness::StageGate;
use conveyor::registry::Registry;
use conveyor::stage::{Stage, StageConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "conveyor", about = "Dynamic-priority pipeline demo")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the wheels → paint demo pipeline over a car batch
    Run {
        /// Number of cars to seed
        #[arg(long, default_value_t = 5)]
        cars: usize,
        /// Order by urgency instead of arrival
        #[arg(long)]
        by_urgency: bool,
        /// Append one extra urgent car while the pipeline is running
        #[arg(long)]
        late_arrival: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_level))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            cars,
            by_urgency,
            late_arrival,
        } => cmd_run(&config, cars, by_urgency, late_arrival).await,
    }
}

async fn cmd_run(
    config: &Config,
    cars: usize,
    by_urgency: bool,
    late_arrival: bool,
) -> anyhow::Result<()> {
    let order: Box<dyn OrderPolicy> = if by_urgency {
        Box::new(UrgencyOrder)
    } else {
        Box::new(ArrivalOrder)
    };
    let registry = Arc::new(Registry::new(order));
    let factory = CursorFactory::new(Arc::clone(&registry));

    let stage_config = StageConfig {
        poll_interval: config.poll_interval,
    };

    let mut wheels = Stage::new(
        "wheels",
        factory.create_cursor(Box::new(StageGate::new("wheels"))),
        |item: &Item| info!(stage = "wheels", id = %item.id, urgency = item.urgency, "working"),
        stage_config.clone(),
    );
    let mut paint = Stage::new(
        "paint",
        factory.create_cursor(Box::new(StageGate::new("paint").requires("wheels"))),
        |item: &Item| info!(stage = "paint", id = %item.id, urgency = item.urgency, "working"),
        stage_config,
    );
    let stop_wheels = wheels.shutdown_handle();
    let stop_paint = paint.shutdown_handle();

    for n in 0..cars {
        registry.append(NewItem::new("car").urgency(n as i32 % 3));
    }
    info!(cars, "batch seeded");

    let wheels_task = tokio::spawn(async move { wheels.run().await });
    let paint_task = tokio::spawn(async move { paint.run().await });

    if late_arrival {
        tokio::time::sleep(config.poll_interval).await;
        let item = registry.append(NewItem::new("car").urgency(10));
        info!(id = %item.id, "late urgent arrival");
    }

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("interrupted, shutting down"),
        _ = wait_for_drain(&registry) => {}
    }

    stop_wheels.notify_one();
    stop_paint.notify_one();
    wheels_task.await??;
    paint_task.await??;

    for item in registry.snapshot() {
        println!("{}", serde_json::to_string(&*item)?);
    }
    info!("pipeline drained");
    Ok(())
}

/// Wait until every car has passed both stages.
async fn wait_for_drain(registry: &Registry) {
    while !batch_drained(registry) {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

/// Every item has passed both stages. An empty batch counts as drained,
/// so `run --cars 0` exits instead of waiting forever.
fn batch_drained(registry: &Registry) -> bool {
    registry
        .snapshot()
        .iter()
        .all(|item| item.flags.is_set("wheels") && item.flags.is_set("paint"))
}
