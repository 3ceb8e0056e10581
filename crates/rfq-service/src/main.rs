use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rfq_config::ConfigLoader;
use rfq_core::RfqEngineBuilder;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;

#[derive(Parser)]
#[command(name = "rfq-service")]
#[command(about = "RFQ quoting and validation service", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Option<Commands>,

	#[arg(short, long, value_name = "FILE", default_value = "config/local.toml")]
	config: PathBuf,

	#[arg(long, env = "RFQ_LOG_LEVEL", default_value = "info")]
	log_level: String,
}

#[derive(Subcommand)]
enum Commands {
	/// Start the RFQ service
	Start,
	/// Validate the configuration file
	Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	setup_tracing(&cli.log_level)?;

	match cli.command {
		Some(Commands::Start) | None => start_service(cli).await,
		Some(Commands::Validate) => validate_config(cli).await,
	}
}

async fn start_service(cli: Cli) -> Result<()> {
	info!("starting RFQ service");
	info!("loading configuration from {:?}", cli.config);

	let config = ConfigLoader::new()
		.with_file(&cli.config)
		.load()
		.await
		.context("failed to load configuration")?;

	let port = config.service.http_port;
	let engine = RfqEngineBuilder::new()
		.with_config(config)
		.build()
		.await
		.context("failed to build RFQ engine")?;
	let engine = Arc::new(engine);

	// seed the blacklist from the maker network; a failure here only means
	// the cache starts cold
	match engine.refresh_blacklist().await {
		Ok(count) => info!(count, "blacklist seeded"),
		Err(err) => warn!(%err, "could not seed blacklist"),
	}

	let server = tokio::spawn(api::serve(engine, port));

	shutdown_signal().await;
	info!("shutdown signal received, stopping");
	server.abort();
	Ok(())
}

async fn validate_config(cli: Cli) -> Result<()> {
	let config = ConfigLoader::new()
		.with_file(&cli.config)
		.load()
		.await
		.context("configuration is invalid")?;
	info!(
		exchange = %config.exchange.name,
		network_id = config.exchange.network_id,
		"configuration is valid"
	);
	Ok(())
}

fn setup_tracing(log_level: &str) -> Result<()> {
	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
	tracing_subscriber::registry()
		.with(filter)
		.with(tracing_subscriber::fmt::layer())
		.init();
	Ok(())
}

async fn shutdown_signal() {
	if let Err(err) = signal::ctrl_c().await {
		warn!(%err, "failed to listen for shutdown signal");
	}
}
