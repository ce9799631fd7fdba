use anchor_lang::prelude::*;

pub mod constants;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod ranking;
pub mod registry;
pub mod state;
pub mod verifier;

use instructions::*;
use state::{AgentView, VerifierKind};

declare_id!("AgMkt7Qw3nTn1vJ8y2mS4pXc6dRbE5fHkLzU9aWoYs1P");

#[program]
pub mod agent_market {
    use super::*;

    /// Initialize the global market state and pick the verifier backend
    pub fn initialize(
        ctx: Context<Initialize>,
        verifier: VerifierKind,
        one_love_per_identity: bool,
    ) -> Result<()> {
        instructions::initialize::handler(ctx, verifier, one_love_per_identity)
    }

    /// Swap the verifier backend (admin only)
    pub fn set_verifier(ctx: Context<SetVerifier>, verifier: VerifierKind) -> Result<()> {
        instructions::set_verifier::handler(ctx, verifier)
    }

    /// Mint a new agent; one ownership proof per description
    pub fn mint_agent<'info>(
        ctx: Context<'_, '_, 'info, 'info, MintAgent<'info>>,
        proofs: Vec<Vec<u8>>,
        descriptions: Vec<String>,
        name: String,
        category: String,
        is_public: bool,
    ) -> Result<()> {
        instructions::mint_agent::handler(ctx, proofs, descriptions, name, category, is_public)
    }

    /// Transfer an agent; private agents need transfer-validity proofs
    pub fn transfer_agent<'info>(
        ctx: Context<'_, '_, 'info, 'info, TransferAgent<'info>>,
        agent_id: u64,
        to: Pubkey,
        proofs: Vec<Vec<u8>>,
    ) -> Result<()> {
        instructions::transfer_agent::handler(ctx, agent_id, to, proofs)
    }

    /// Clone an agent for a new holder, leaving the source untouched
    pub fn clone_agent<'info>(
        ctx: Context<'_, '_, 'info, 'info, CloneAgent<'info>>,
        agent_id: u64,
        to: Pubkey,
        proofs: Vec<Vec<u8>>,
    ) -> Result<()> {
        instructions::clone_agent::handler(ctx, agent_id, to, proofs)
    }

    /// Transfer a public agent without proofs
    pub fn transfer_public(ctx: Context<TransferAgent>, agent_id: u64, to: Pubkey) -> Result<()> {
        instructions::transfer_agent::public_handler(ctx, agent_id, to)
    }

    /// Clone a public agent without proofs
    pub fn clone_public(ctx: Context<CloneAgent>, agent_id: u64, to: Pubkey) -> Result<()> {
        instructions::clone_agent::public_handler(ctx, agent_id, to)
    }

    /// Grant usage rights on an agent (owner only, idempotent)
    pub fn authorize_usage(ctx: Context<ManageUsage>, agent_id: u64, user: Pubkey) -> Result<()> {
        instructions::authorize_usage::authorize_handler(ctx, agent_id, user)
    }

    /// Withdraw usage rights on an agent (owner only, idempotent)
    pub fn revoke_usage(ctx: Context<ManageUsage>, agent_id: u64, user: Pubkey) -> Result<()> {
        instructions::authorize_usage::revoke_handler(ctx, agent_id, user)
    }

    /// Stake lamports on an agent and recompute its ranking score
    pub fn stake_on_agent(ctx: Context<StakeOnAgent>, agent_id: u64, amount: u64) -> Result<()> {
        instructions::stake_on_agent::handler(ctx, agent_id, amount)
    }

    /// Love an agent and recompute its ranking score
    pub fn love_agent(ctx: Context<LoveAgent>, agent_id: u64) -> Result<()> {
        instructions::love_agent::handler(ctx, agent_id)
    }

    /// Return an agent's current state
    pub fn get_agent(ctx: Context<GetAgent>, agent_id: u64) -> Result<AgentView> {
        instructions::get_agent::handler(ctx, agent_id)
    }
}
