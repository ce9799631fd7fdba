//! Configuration for the indexer
//!
//! CLI arguments with environment variable fallbacks, loaded through clap.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anchor_lang::prelude::Pubkey;
use clap::{Parser, Subcommand};

use crate::consumer::ConsumerConfig;
use crate::mirror::SortKey;

/// Event-driven ranking mirror for the agent marketplace
#[derive(Parser, Debug, Clone)]
#[command(name = "agent-market-indexer")]
#[command(about = "Mirror agent-market events into a queryable ranking snapshot")]
pub struct Args {
    /// Path of the JSON snapshot holding mirror state
    #[arg(long, env = "STATE_PATH", default_value = "agent-market-mirror.json")]
    pub state_path: PathBuf,

    /// Market program whose `Program data:` lines are mirrored
    #[arg(long, env = "PROGRAM_ID", default_value_t = agent_market::ID.to_string())]
    pub program_id: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Propagation lag, in seconds, above which a warning is logged
    #[arg(long, env = "MAX_PROPAGATION_SECS", default_value = "30")]
    pub max_propagation_secs: u64,

    /// Capacity of the channel between the log reader and the consumer
    #[arg(long, env = "CHANNEL_CAPACITY", default_value = "1024")]
    pub channel_capacity: usize,

    /// Maximum events applied between two snapshot writes
    #[arg(long, env = "BATCH_SIZE", default_value = "64")]
    pub batch_size: usize,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Read program logs (file or stdin) and apply their events to the snapshot
    Ingest {
        /// Log file to read; stdin when omitted
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Leaderboard of the highest ranked agents
    Top {
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Only agents in this category
        #[arg(long)]
        category: Option<String>,

        #[arg(long, value_enum, default_value = "score")]
        sort: SortKey,
    },

    /// One agent's mirrored state
    Agent { id: u64 },

    /// Ids of the agents held by an identity
    Owned { owner: String },

    /// Identities granted usage rights on an agent
    Authorized { id: u64 },
}

impl Args {
    pub fn validate(&self) -> Result<(), String> {
        if self.channel_capacity == 0 {
            return Err("CHANNEL_CAPACITY must be at least 1".to_string());
        }
        if self.batch_size == 0 {
            return Err("BATCH_SIZE must be at least 1".to_string());
        }
        if Pubkey::from_str(&self.program_id).is_err() {
            return Err(format!("PROGRAM_ID is not a valid address: {}", self.program_id));
        }
        Ok(())
    }

    pub fn consumer_config(&self) -> ConsumerConfig {
        ConsumerConfig {
            batch_size: self.batch_size,
            max_propagation: Duration::from_secs(self.max_propagation_secs),
            state_path: Some(self.state_path.clone()),
        }
    }
}
