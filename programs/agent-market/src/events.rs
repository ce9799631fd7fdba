use anchor_lang::prelude::*;

use crate::state::VerifierKind;

/// Emitted when an agent is minted
#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct Minted {
    pub agent_id: u64,
    pub owner: Pubkey,
    pub content_hashes: Vec<[u8; 32]>,
    pub descriptions: Vec<String>,
    pub name: String,
    pub category: String,
    pub is_public: bool,
}

/// Emitted when ownership of an agent moves
#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct Transferred {
    pub agent_id: u64,
    pub from: Pubkey,
    pub to: Pubkey,
    /// Content bound to the agent after the move
    pub content_hashes: Vec<[u8; 32]>,
}

/// Emitted when a clone of an agent is created for a new holder
#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct Cloned {
    pub source_id: u64,
    pub new_id: u64,
    pub from: Pubkey,
    pub to: Pubkey,
    pub content_hashes: Vec<[u8; 32]>,
}

/// Emitted when the payload key was re-sealed for the recipient of a
/// transfer or clone
#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct SealedKeyPublished {
    pub agent_id: u64,
    pub to: Pubkey,
    pub recipient_pubkeys: Vec<Vec<u8>>,
    pub sealed_keys: Vec<Vec<u8>>,
}

#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct AuthorizedUsage {
    pub agent_id: u64,
    pub user: Pubkey,
}

#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct UsageRevoked {
    pub agent_id: u64,
    pub user: Pubkey,
}

#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct AgentStaked {
    pub agent_id: u64,
    pub staker: Pubkey,
    pub amount: u64,
}

#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct AgentLoved {
    pub agent_id: u64,
    pub user: Pubkey,
}

/// Emitted when the admin swaps the verifier backend
#[event]
#[derive(Clone, Debug, PartialEq)]
pub struct VerifierUpdated {
    pub admin: Pubkey,
    pub verifier: VerifierKind,
}
