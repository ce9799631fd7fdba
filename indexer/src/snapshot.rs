//! JSON persistence of mirror state.
//!
//! Identities are stored as base58 strings and content hashes as hex. Scores
//! are written for readers but recomputed from the counters on load. The
//! ingest cursor is stored next to the agents so a restart resumes after the
//! last applied event.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use agent_market::ranking::format_score;
use anchor_lang::prelude::Pubkey;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{IndexerError, Result};
use crate::mirror::{Cursor, MirroredAgent, RankingMirror};

const SNAPSHOT_VERSION: u32 = 2;

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    version: u32,
    events_applied: u64,
    #[serde(default)]
    cursor: Cursor,
    agents: Vec<AgentRecord>,
}

/// Serialized form of a [`MirroredAgent`], also printed by the query commands
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub agent_id: u64,
    pub owner: String,
    pub name: String,
    pub category: String,
    pub is_public: bool,
    #[serde(default)]
    pub descriptions: Vec<String>,
    /// Hex-encoded content hashes
    #[serde(default)]
    pub content_hashes: Vec<String>,
    pub authorized_users: Vec<String>,
    pub total_staked: u64,
    pub loves: u64,
    /// Decimal rendering of the fixed-point score
    pub score: String,
    pub cloned_from: u64,
}

impl From<&MirroredAgent> for AgentRecord {
    fn from(agent: &MirroredAgent) -> Self {
        Self {
            agent_id: agent.agent_id,
            owner: agent.owner.to_string(),
            name: agent.name.clone(),
            category: agent.category.clone(),
            is_public: agent.is_public,
            descriptions: agent.descriptions.clone(),
            content_hashes: agent.content_hashes.iter().map(hex::encode).collect(),
            authorized_users: agent.authorized_users.iter().map(Pubkey::to_string).collect(),
            total_staked: agent.total_staked,
            loves: agent.loves,
            score: format_score(agent.score),
            cloned_from: agent.cloned_from,
        }
    }
}

impl TryFrom<AgentRecord> for MirroredAgent {
    type Error = IndexerError;

    fn try_from(record: AgentRecord) -> Result<Self> {
        Ok(Self {
            agent_id: record.agent_id,
            owner: parse_identity(&record.owner)?,
            name: record.name,
            category: record.category,
            is_public: record.is_public,
            descriptions: record.descriptions,
            content_hashes: record
                .content_hashes
                .iter()
                .map(|h| parse_hash(h))
                .collect::<Result<_>>()?,
            authorized_users: record
                .authorized_users
                .iter()
                .map(|u| parse_identity(u))
                .collect::<Result<_>>()?,
            total_staked: record.total_staked,
            loves: record.loves,
            // recomputed by RankingMirror::restore
            score: 0,
            cloned_from: record.cloned_from,
        })
    }
}

pub fn parse_identity(value: &str) -> Result<Pubkey> {
    Pubkey::from_str(value.trim()).map_err(|_| IndexerError::InvalidIdentity(value.to_string()))
}

fn parse_hash(value: &str) -> Result<[u8; 32]> {
    let mut hash = [0u8; 32];
    hex::decode_to_slice(value.trim(), &mut hash)
        .map_err(|_| IndexerError::InvalidHash(value.to_string()))?;
    Ok(hash)
}

/// Write the mirror to `path` through a temporary file and a rename, so
/// readers never observe a half-written snapshot.
pub fn save(path: &Path, mirror: &RankingMirror) -> Result<()> {
    let file = SnapshotFile {
        version: SNAPSHOT_VERSION,
        events_applied: mirror.events_applied(),
        cursor: mirror.cursor().clone(),
        agents: mirror.agents().map(AgentRecord::from).collect(),
    };
    let json = serde_json::to_vec_pretty(&file)?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    debug!(path = %path.display(), agents = file.agents.len(), "Snapshot written");
    Ok(())
}

/// Load a snapshot; a missing file is an empty mirror.
pub fn load(path: &Path) -> Result<RankingMirror> {
    if !path.exists() {
        info!(path = %path.display(), "No snapshot yet, starting empty");
        return Ok(RankingMirror::new());
    }
    let file: SnapshotFile = serde_json::from_slice(&fs::read(path)?)?;
    let agents = file
        .agents
        .into_iter()
        .map(MirroredAgent::try_from)
        .collect::<Result<Vec<_>>>()?;
    Ok(RankingMirror::restore(agents, file.events_applied, file.cursor))
}
