use anchor_lang::prelude::*;

/// Marker account proving a proof nonce has been consumed.
///
/// PDA seeds: ["nonce", nonce]. The account is created in the same
/// transaction that accepts the proof and is never closed, so its existence
/// is the replay guard.
#[account]
#[derive(InitSpace)]
pub struct UsedNonce {
    /// The consumed nonce
    pub nonce: [u8; 32],
    /// Signer of the transaction that consumed it
    pub consumed_by: Pubkey,
    /// Slot in which it was consumed
    pub consumed_slot: u64,
    /// Bump seed for PDA derivation
    pub bump: u8,
}

impl UsedNonce {
    pub const SEED_PREFIX: &'static [u8] = b"nonce";
}
