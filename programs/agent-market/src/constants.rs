use anchor_lang::prelude::*;

/// Maximum agent name length in bytes
pub const MAX_NAME_LEN: usize = 64;

/// Maximum category length in bytes
pub const MAX_CATEGORY_LEN: usize = 32;

/// Maximum length of a single description in bytes
pub const MAX_DESCRIPTION_LEN: usize = 128;

/// Maximum number of proofs (and therefore descriptions) per instruction
pub const MAX_PROOFS: usize = 8;

/// Maximum number of content hashes carried by one agent
pub const MAX_CONTENT_HASHES: usize = 16;

/// Maximum number of identities an owner may authorize on one agent
pub const MAX_AUTHORIZED_USERS: usize = 32;

/// Fixed-point unit of the staking currency (lamports per SOL)
pub const STAKE_SCALE: u64 = 1_000_000_000;

/// Score units contributed by a single love (0.1 of a whole point)
pub const LOVE_WEIGHT: u64 = STAKE_SCALE / 10;

/// Number of decimals in the fixed-point ranking score
pub const SCORE_DECIMALS: u32 = 9;

/// Domain tag mixed into the digest of an ownership proof
pub const OWNERSHIP_DOMAIN: &[u8] = b"agent-market:ownership:v1";

/// Domain tag mixed into the digest of a transfer-validity proof
pub const TRANSFER_DOMAIN: &[u8] = b"agent-market:transfer:v1";

/// Largest return-data payload the runtime accepts
pub const MAX_RETURN_DATA: usize = 1024;

/// Identity used as the "no recipient" sentinel
pub const ZERO_IDENTITY: Pubkey = Pubkey::new_from_array([0u8; 32]);
