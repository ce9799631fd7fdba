use anchor_lang::prelude::*;
use crate::events::Minted;
use crate::registry;
use crate::state::{AgentAccount, MarketConfig};
use crate::verifier::{PdaNonceStore, Verifier};

/// Mint a new agent from one ownership proof per description.
///
/// Remaining accounts: the `UsedNonce` PDA of every proof's nonce (writable).
#[derive(Accounts)]
pub struct MintAgent<'info> {
    #[account(mut)]
    pub creator: Signer<'info>,

    #[account(
        mut,
        seeds = [MarketConfig::SEED_PREFIX],
        bump = market.bump
    )]
    pub market: Account<'info, MarketConfig>,

    #[account(
        init,
        payer = creator,
        space = 8 + AgentAccount::INIT_SPACE,
        seeds = [
            AgentAccount::SEED_PREFIX,
            market.next_agent_id.to_le_bytes().as_ref()
        ],
        bump
    )]
    pub agent: Account<'info, AgentAccount>,

    /// CHECK: instructions sysvar, read by the enclave attestor
    #[account(address = anchor_lang::solana_program::sysvar::instructions::ID)]
    pub instructions: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, MintAgent<'info>>,
    proofs: Vec<Vec<u8>>,
    descriptions: Vec<String>,
    name: String,
    category: String,
    is_public: bool,
) -> Result<()> {
    // Validate inputs before any proof is looked at
    registry::check_arity(proofs.len(), descriptions.len())?;
    registry::check_metadata(&name, &category, &descriptions)?;

    let nonces = PdaNonceStore::new(
        ctx.program_id,
        ctx.accounts.creator.to_account_info(),
        ctx.accounts.system_program.to_account_info(),
        ctx.remaining_accounts,
    );
    let mut verifier = Verifier::for_kind(
        ctx.accounts.market.verifier,
        ctx.accounts.instructions.to_account_info(),
        nonces,
    );
    let content_hashes = registry::collect_minted_hashes(&mut verifier, &proofs)?;

    let agent_id = ctx.accounts.market.allocate_agent_id()?;
    let owner = ctx.accounts.creator.key();
    let clock = Clock::get()?;

    let agent = &mut ctx.accounts.agent;
    agent.set_inner(AgentAccount::minted(
        agent_id,
        owner,
        name,
        category,
        descriptions,
        content_hashes,
        is_public,
    ));
    agent.created_at = clock.unix_timestamp;
    agent.updated_at = clock.unix_timestamp;
    agent.bump = ctx.bumps.agent;

    emit!(Minted {
        agent_id,
        owner,
        content_hashes: agent.content_hashes.clone(),
        descriptions: agent.descriptions.clone(),
        name: agent.name.clone(),
        category: agent.category.clone(),
        is_public,
    });

    msg!(
        "Agent minted: id={}, owner={}, hashes={}, public={}",
        agent_id,
        owner,
        agent.content_hashes.len(),
        is_public
    );

    Ok(())
}
