//! agent-market-indexer: event-driven ranking mirror

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tokio::io::{AsyncBufRead, BufReader};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_market_indexer::{
    config::{Args, Command},
    consumer::{self, Consumer},
    snapshot::{self, AgentRecord},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("agent_market_indexer={},info", args.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    match &args.command {
        Command::Ingest { input } => match input {
            Some(path) => {
                let file = tokio::fs::File::open(path)
                    .await
                    .with_context(|| format!("opening {}", path.display()))?;
                ingest(&args, BufReader::new(file)).await
            }
            None => ingest(&args, BufReader::new(tokio::io::stdin())).await,
        },
        Command::Top {
            limit,
            category,
            sort,
        } => {
            let mirror = load(&args.state_path)?;
            let top: Vec<AgentRecord> = mirror
                .top(*limit, category.as_deref(), *sort)
                .into_iter()
                .map(AgentRecord::from)
                .collect();
            print_json(&top)
        }
        Command::Agent { id } => {
            let mirror = load(&args.state_path)?;
            let agent = mirror
                .agent(*id)
                .with_context(|| format!("agent {id} is not mirrored"))?;
            print_json(&AgentRecord::from(agent))
        }
        Command::Owned { owner } => {
            let owner = snapshot::parse_identity(owner)?;
            print_json(&load(&args.state_path)?.owned_by(&owner))
        }
        Command::Authorized { id } => {
            let mirror = load(&args.state_path)?;
            let users: Vec<String> = mirror
                .authorized_users(*id)?
                .iter()
                .map(ToString::to_string)
                .collect();
            print_json(&users)
        }
    }
}

async fn ingest<R>(args: &Args, reader: R) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mirror = load(&args.state_path)?;
    info!(
        state = %args.state_path.display(),
        program_id = %args.program_id,
        resume_slot = mirror.cursor().slot,
        agents = mirror.len(),
        batch_size = args.batch_size,
        max_propagation_secs = args.max_propagation_secs,
        "Starting ingest"
    );

    let (tx, rx) = consumer::channel(args.channel_capacity);
    let worker = tokio::spawn(Consumer::new(mirror, args.consumer_config()).run(rx));

    let forwarded = consumer::feed_lines(reader, &args.program_id, tx).await?;
    let (mirror, stats) = worker.await.context("consumer task panicked")??;

    info!(
        forwarded,
        applied = stats.applied,
        skipped = stats.skipped,
        duplicates = stats.duplicates,
        agents = mirror.len(),
        "Ingest complete"
    );
    Ok(())
}

fn load(path: &Path) -> anyhow::Result<agent_market_indexer::RankingMirror> {
    snapshot::load(path).with_context(|| format!("loading snapshot {}", path.display()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
