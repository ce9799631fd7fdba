use anchor_lang::prelude::*;
use crate::errors::MarketError;
use crate::events::{AuthorizedUsage, UsageRevoked};
use crate::state::AgentAccount;

/// Grant or revoke usage rights on an agent (owner only).
/// Authorization never moves ownership.
#[derive(Accounts)]
#[instruction(agent_id: u64)]
pub struct ManageUsage<'info> {
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [AgentAccount::SEED_PREFIX, agent_id.to_le_bytes().as_ref()],
        bump = agent.bump,
        constraint = agent.owner == owner.key() @ MarketError::NotOwner
    )]
    pub agent: Account<'info, AgentAccount>,
}

pub fn authorize_handler(ctx: Context<ManageUsage>, agent_id: u64, user: Pubkey) -> Result<()> {
    let agent = &mut ctx.accounts.agent;

    if !agent.authorize(user)? {
        msg!("Usage already granted: agent={}, user={}", agent_id, user);
        return Ok(());
    }
    agent.updated_at = Clock::get()?.unix_timestamp;

    emit!(AuthorizedUsage { agent_id, user });

    msg!("Usage authorized: agent={}, user={}", agent_id, user);

    Ok(())
}

pub fn revoke_handler(ctx: Context<ManageUsage>, agent_id: u64, user: Pubkey) -> Result<()> {
    let agent = &mut ctx.accounts.agent;

    if !agent.revoke(&user) {
        msg!("No usage grant to revoke: agent={}, user={}", agent_id, user);
        return Ok(());
    }
    agent.updated_at = Clock::get()?.unix_timestamp;

    emit!(UsageRevoked { agent_id, user });

    msg!("Usage revoked: agent={}, user={}", agent_id, user);

    Ok(())
}
