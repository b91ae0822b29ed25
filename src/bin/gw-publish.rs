//! Gateway Publisher CLI
//!
//! Creates, fills and commits publishes on a content gateway

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gateway_publisher::{
    ConfigLoadOptions, ConfigLoader, GatewayClient, GatewayConfig, GatewayError,
    GatewayTokenManager, ItemInput, Publish,
};
use std::path::{Path, PathBuf};
use std::process;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Content gateway publishing client
#[derive(Parser)]
#[command(name = "gw-publish")]
#[command(version)]
#[command(about = "Content gateway publishing client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./.gw-publish.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Gateway base URL
    #[arg(long, global = true)]
    url: Option<String>,

    /// Target environment
    #[arg(short, long, global = true)]
    env: Option<String>,

    /// Maximum items per add request
    #[arg(long, global = true)]
    batch_size: Option<usize>,

    /// HTTP request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Overall deadline in seconds; cancels whatever is in flight
    #[arg(long, global = true)]
    deadline: Option<u64>,

    /// Log what would be sent without contacting the gateway
    #[arg(long, global = true)]
    dry_run: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new publish and print its id
    New,

    /// Add items to an existing publish
    Add {
        /// Publish id
        #[arg(short, long)]
        publish: String,

        /// JSON file holding an array of items ("-" for stdin)
        #[arg(value_name = "ITEMS")]
        items: PathBuf,
    },

    /// Commit an existing publish and wait for it to finish
    Commit {
        /// Publish id
        #[arg(short, long)]
        publish: String,
    },

    /// Create a publish, add items and commit it
    Publish {
        /// JSON file holding an array of items ("-" for stdin)
        #[arg(value_name = "ITEMS")]
        items: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("\n❌ Error");
            match e.downcast_ref::<GatewayError>() {
                Some(gateway_error) => report_gateway_error(gateway_error),
                None => eprintln!("{:#}", e),
            }
            process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn report_gateway_error(error: &GatewayError) {
    eprintln!("[{}] {}", error.code(), error);
    let actions = error.suggested_actions();
    if !actions.is_empty() {
        eprintln!("\nSuggested actions:");
        for action in actions {
            eprintln!("  - {}", action);
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    let config = load_config(&cli).await?;

    let validation = ConfigLoader::validate(&config);
    if !validation.valid || !validation.warnings.is_empty() {
        eprintln!("{}", ConfigLoader::format_validation_result(&validation));
    }
    if !validation.valid {
        return Ok(1);
    }

    let cancel = CancellationToken::new();
    spawn_cancel_triggers(&cancel, cli.deadline);

    let tokens = GatewayTokenManager::from_env(config.token_env());
    let client = GatewayClient::new(config, tokens)?;

    match cli.command {
        Commands::New => {
            let publish = client.new_publish(&cancel).await?;
            println!("{}", publish.id());
        }
        Commands::Add { publish, items } => {
            let items = read_items(&items).await?;
            let publish = client.get_publish(&cancel, &publish).await?;
            publish.add_items(&cancel, &items).await?;
            println!("\n✅ Added {} item(s) to {}", items.len(), publish.id());
        }
        Commands::Commit { publish } => {
            let publish = client.get_publish(&cancel, &publish).await?;
            publish.commit(&cancel).await?;
            println!("\n✅ Committed {}", publish.id());
        }
        Commands::Publish { items } => {
            let items = read_items(&items).await?;
            let publish = client.new_publish(&cancel).await?;
            println!("📦 Publish {}", publish.id());
            publish.add_items(&cancel, &items).await?;
            publish.commit(&cancel).await?;
            println!("\n✅ Published {} item(s) via {}", items.len(), publish.id());
        }
    }

    Ok(0)
}

async fn load_config(cli: &Cli) -> Result<GatewayConfig> {
    let cli_args = GatewayConfig {
        url: cli.url.clone(),
        env: cli.env.clone(),
        batch_size: cli.batch_size,
        timeout: cli.timeout,
        dry_run: cli.dry_run.then_some(true),
        ..GatewayConfig::empty()
    };

    let options = ConfigLoadOptions {
        project_path: std::env::current_dir().context("cannot determine current directory")?,
        config_path: cli.config.clone(),
        cli_args: Some(cli_args),
        env: std::env::vars().collect(),
    };

    Ok(ConfigLoader::load(options).await?)
}

/// Cancel on Ctrl-C, and after `deadline` seconds when one is given
fn spawn_cancel_triggers(cancel: &CancellationToken, deadline: Option<u64>) {
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            token.cancel();
        }
    });

    if let Some(secs) = deadline {
        let token = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_secs(secs)).await;
            tracing::warn!(deadline_secs = secs, "Deadline reached, cancelling");
            token.cancel();
        });
    }
}

async fn read_items(path: &Path) -> Result<Vec<ItemInput>> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        tokio::io::AsyncReadExt::read_to_string(&mut tokio::io::stdin(), &mut buf)
            .await
            .context("failed to read items from stdin")?;
        buf
    } else {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read items from {}", path.display()))?
    };

    serde_json::from_str(&raw).context("items must be a JSON array of objects")
}
