use anchor_lang::prelude::*;

use crate::errors::MarketError;

/// Which attestation backend the market's proof verifier uses.
///
/// Chosen at `initialize` and swappable by the admin; the registry never
/// branches on it beyond building the verifier.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, InitSpace, Debug)]
pub enum VerifierKind {
    /// Accepts any attestation payload; nonce replay is still enforced
    Mock,
    /// Requires an Ed25519 signature from the enclave key over the proof digest
    Enclave { signer: Pubkey },
}

/// Global market state - id counter, admin and verifier selection
#[account]
#[derive(InitSpace)]
pub struct MarketConfig {
    /// Admin pubkey who can swap the verifier
    pub admin: Pubkey,
    /// Verifier backend used for every proof-gated instruction
    pub verifier: VerifierKind,
    /// When set, each identity can love a given agent at most once
    pub one_love_per_identity: bool,
    /// Id handed to the next minted or cloned agent (ids start at 1)
    pub next_agent_id: u64,
    /// Total number of agents ever created
    pub total_agents: u64,
    /// Bump seed for PDA
    pub bump: u8,
}

impl MarketConfig {
    pub const SEED_PREFIX: &'static [u8] = b"market";

    pub const FIRST_AGENT_ID: u64 = 1;

    /// Hand out the next agent id and bump the counters.
    pub fn allocate_agent_id(&mut self) -> Result<u64> {
        let id = self.next_agent_id;
        self.next_agent_id = id.checked_add(1).ok_or(MarketError::ArithmeticOverflow)?;
        self.total_agents = self
            .total_agents
            .checked_add(1)
            .ok_or(MarketError::ArithmeticOverflow)?;
        Ok(id)
    }
}
