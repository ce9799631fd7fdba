use anchor_lang::prelude::*;

#[error_code]
pub enum MarketError {
    #[msg("Proof blob is empty, malformed or declares no content hashes")]
    InvalidProof,

    #[msg("Proof nonce has already been consumed")]
    ReplayedNonce,

    #[msg("Proof was issued against content hashes the agent no longer carries")]
    StaleProof,

    #[msg("Attestation did not validate the proof")]
    AttestationRejected,

    #[msg("Unauthorized: caller does not own this agent")]
    NotOwner,

    #[msg("Recipient must not be the zero identity")]
    InvalidRecipient,

    #[msg("Transfer proof was issued for a different recipient")]
    RecipientMismatch,

    #[msg("Number of proofs does not match number of descriptions")]
    ArityMismatch,

    #[msg("At least one proof is required")]
    EmptyInput,

    #[msg("Agent not found")]
    UnknownAgent,

    #[msg("Stake amount must be greater than zero")]
    ZeroStake,

    #[msg("Agent is not public; submit proofs through transfer_agent/clone_agent")]
    NotPublic,

    #[msg("Name is too long (max 64 bytes)")]
    NameTooLong,

    #[msg("Category is too long (max 32 bytes)")]
    CategoryTooLong,

    #[msg("Description is too long (max 128 bytes)")]
    DescriptionTooLong,

    #[msg("Too many proofs in one instruction (max 8)")]
    TooManyProofs,

    #[msg("Too many content hashes for one agent (max 16)")]
    TooManyContentHashes,

    #[msg("Authorized user list is full (max 32)")]
    AuthorizationListFull,

    #[msg("This identity has already loved the agent")]
    AlreadyLoved,

    #[msg("Unauthorized: only the market admin can do this")]
    Unauthorized,

    #[msg("Nonce account for this proof was not supplied")]
    NonceAccountMismatch,

    #[msg("Arithmetic overflow")]
    ArithmeticOverflow,
}
