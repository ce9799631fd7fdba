use anchor_lang::prelude::*;
use crate::errors::MarketError;
use crate::events::{SealedKeyPublished, Transferred};
use crate::registry::{self, Reseal};
use crate::state::{AgentAccount, MarketConfig};
use crate::verifier::{PdaNonceStore, Verifier};

/// Move an agent to a new holder.
///
/// Private agents need transfer-validity proofs covering their current
/// content; remaining accounts carry one `UsedNonce` PDA per proof.
#[derive(Accounts)]
#[instruction(agent_id: u64)]
pub struct TransferAgent<'info> {
    /// Current holder; pays for nonce accounts
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        seeds = [MarketConfig::SEED_PREFIX],
        bump = market.bump
    )]
    pub market: Account<'info, MarketConfig>,

    #[account(
        mut,
        seeds = [AgentAccount::SEED_PREFIX, agent_id.to_le_bytes().as_ref()],
        bump = agent.bump,
        constraint = agent.owner == owner.key() @ MarketError::NotOwner
    )]
    pub agent: Account<'info, AgentAccount>,

    /// CHECK: instructions sysvar, read by the enclave attestor
    #[account(address = anchor_lang::solana_program::sysvar::instructions::ID)]
    pub instructions: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, TransferAgent<'info>>,
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
    let reseal = registry::reseal_content(&ctx.accounts.agent, &mut verifier, &proofs, &to)?;

    commit(&mut ctx.accounts.agent, to, reseal)
}

/// Proof-less transfer of a public agent.
pub fn public_handler(ctx: Context<TransferAgent>, _agent_id: u64, to: Pubkey) -> Result<()> {
    registry::check_recipient(&to)?;
    let reseal = registry::public_handover(&ctx.accounts.agent)?;
    commit(&mut ctx.accounts.agent, to, reseal)
}

// Owner and content change together or not at all
fn commit(agent: &mut Account<AgentAccount>, to: Pubkey, reseal: Reseal) -> Result<()> {
    let sealed = reseal.is_sealed();
    let from = agent.hand_over(to, reseal.content_hashes);
    agent.updated_at = Clock::get()?.unix_timestamp;

    emit!(Transferred {
        agent_id: agent.agent_id,
        from,
        to,
        content_hashes: agent.content_hashes.clone(),
    });
    if sealed {
        emit!(SealedKeyPublished {
            agent_id: agent.agent_id,
            to,
            recipient_pubkeys: reseal.recipient_pubkeys,
            sealed_keys: reseal.sealed_keys,
        });
    }

    msg!(
        "Agent transferred: id={}, from={}, to={}, resealed={}",
        agent.agent_id,
        from,
        to,
        sealed
    );

    Ok(())
}
