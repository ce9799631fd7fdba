use anchor_lang::prelude::*;
use crate::errors::MarketError;
use crate::events::{Cloned, SealedKeyPublished};
use crate::registry::{self, Reseal};
use crate::state::{AgentAccount, MarketConfig};
use crate::verifier::{PdaNonceStore, Verifier};

/// Create a copy of an agent for a new holder. The source agent is only read.
///
/// Remaining accounts: one `UsedNonce` PDA per proof.
#[derive(Accounts)]
#[instruction(agent_id: u64)]
pub struct CloneAgent<'info> {
    /// Holder of the source agent; pays for the clone and nonce accounts
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [MarketConfig::SEED_PREFIX],
        bump = market.bump
    )]
    pub market: Account<'info, MarketConfig>,

    #[account(
        seeds = [AgentAccount::SEED_PREFIX, agent_id.to_le_bytes().as_ref()],
        bump = source.bump,
        constraint = source.owner == owner.key() @ MarketError::NotOwner
    )]
    pub source: Account<'info, AgentAccount>,

    #[account(
        init,
        payer = owner,
        space = 8 + AgentAccount::INIT_SPACE,
        seeds = [
            AgentAccount::SEED_PREFIX,
            market.next_agent_id.to_le_bytes().as_ref()
        ],
        bump
    )]
    pub new_agent: Account<'info, AgentAccount>,

    /// CHECK: instructions sysvar, read by the enclave attestor
    #[account(address = anchor_lang::solana_program::sysvar::instructions::ID)]
    pub instructions: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, CloneAgent<'info>>,
    _agent_id: u64,
    to: Pubkey,
    proofs: Vec<Vec<u8>>,
) -> Result<()> {
    registry::check_recipient(&to)?;

    let nonces = PdaNonceStore::new(
        ctx.program_id,
        ctx.accounts.owner.to_account_info(),
        ctx.accounts.system_program.to_account_info(),
        ctx.remaining_accounts,
    );
    let mut verifier = Verifier::for_kind(
        ctx.accounts.market.verifier,
        ctx.accounts.instructions.to_account_info(),
        nonces,
    );
    let reseal = registry::reseal_content(&ctx.accounts.source, &mut verifier, &proofs, &to)?;

    let bump = ctx.bumps.new_agent;
    commit(ctx.accounts, to, reseal, bump)
}

/// Proof-less clone of a public agent.
pub fn public_handler(ctx: Context<CloneAgent>, _agent_id: u64, to: Pubkey) -> Result<()> {
    registry::check_recipient(&to)?;
    let reseal = registry::public_handover(&ctx.accounts.source)?;

    let bump = ctx.bumps.new_agent;
    commit(ctx.accounts, to, reseal, bump)
}

fn commit(accounts: &mut CloneAgent, to: Pubkey, reseal: Reseal, bump: u8) -> Result<()> {
    let new_id = accounts.market.allocate_agent_id()?;
    let source = &accounts.source;
    let sealed = reseal.is_sealed();
    let now = Clock::get()?.unix_timestamp;

    let new_agent = &mut accounts.new_agent;
    new_agent.set_inner(source.spawn_clone(new_id, to, reseal.content_hashes));
    new_agent.created_at = now;
    new_agent.updated_at = now;
    new_agent.bump = bump;

    emit!(Cloned {
        source_id: source.agent_id,
        new_id,
        from: source.owner,
        to,
        content_hashes: new_agent.content_hashes.clone(),
    });
    if sealed {
        emit!(SealedKeyPublished {
            agent_id: new_id,
            to,
            recipient_pubkeys: reseal.recipient_pubkeys,
            sealed_keys: reseal.sealed_keys,
        });
    }

    msg!(
        "Agent cloned: source={}, new={}, from={}, to={}",
        source.agent_id,
        new_id,
        source.owner,
        to
    );

    Ok(())
}
