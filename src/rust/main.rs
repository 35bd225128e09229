use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use amygdala::{AppState, ModelKind, ModelManager, ServiceConfig};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the training CSV files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Directory for trained model artifacts
    #[arg(long, global = true)]
    model_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server (default)
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
        /// Remove existing artifacts and retrain the disease model
        #[arg(short, long)]
        fresh: bool,
    },
    /// Train one or both models and print their holdout accuracy
    Train {
        #[arg(value_enum, default_value_t = Target::All)]
        target: Target,
        /// Remove existing artifacts before training
        #[arg(short, long)]
        fresh: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Target {
    Disease,
    Emoji,
    All,
}

impl Target {
    fn kinds(self) -> &'static [ModelKind] {
        match self {
            Target::Disease => &[ModelKind::Disease],
            Target::Emoji => &[ModelKind::Emoji],
            Target::All => &[ModelKind::Disease, ModelKind::Emoji],
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = ServiceConfig::from_env();
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    if let Some(dir) = args.model_dir {
        config.model_dir = dir;
    }

    let manager = ModelManager::new(&config.model_dir)
        .with_context(|| format!("cannot create model directory {:?}", config.model_dir))?;

    match args.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
        fresh: false,
    }) {
        Command::Serve { host, port, fresh } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            serve(config, manager, fresh).await
        }
        Command::Train { target, fresh } => train(&config, &manager, target, fresh).await,
    }
}

async fn serve(config: ServiceConfig, manager: ModelManager, fresh: bool) -> Result<()> {
    info!("=== Starting amygdala ===");
    if fresh {
        info!("Fresh start requested - removing existing disease model files...");
        manager.remove_artifacts(ModelKind::Disease)?;
    }

    let start_time = Instant::now();
    let state = AppState::initialize(manager, config.data_sources())
        .await
        .context("disease model could not be loaded or trained")?;
    info!("=== Models ready (took {:.2?}) ===", start_time.elapsed());

    amygdala::server::serve(Arc::new(state), &config.bind_address()).await?;
    Ok(())
}

async fn train(config: &ServiceConfig, manager: &ModelManager, target: Target, fresh: bool) -> Result<()> {
    let sources = config.data_sources();
    for &kind in target.kinds() {
        if fresh {
            manager.remove_artifacts(kind)?;
        }
        let start_time = Instant::now();
        let report = manager
            .train(kind, &sources)
            .await
            .with_context(|| format!("training the {} model failed", kind))?;
        println!(
            "{}: accuracy {:.4} ({} classes, {} features, {} train / {} test rows) in {:.2?}",
            kind,
            report.accuracy,
            report.num_classes,
            report.num_features,
            report.train_rows,
            report.test_rows,
            start_time.elapsed()
        );
    }
    Ok(())
}
