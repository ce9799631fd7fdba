use anchor_lang::prelude::*;
use anchor_lang::system_program;
use crate::errors::MarketError;
use crate::events::AgentStaked;
use crate::state::AgentAccount;

/// Stake lamports on an agent. Stake is held in the agent account and is
/// permanent; the ranking score is recomputed in the same instruction.
#[derive(Accounts)]
#[instruction(agent_id: u64)]
pub struct StakeOnAgent<'info> {
    #[account(mut)]
    pub staker: Signer<'info>,

    /// CHECK: deserialized by the handler so a never-minted id reports
    /// UnknownAgent; the address is pinned by the seeds
    #[account(
        mut,
        seeds = [AgentAccount::SEED_PREFIX, agent_id.to_le_bytes().as_ref()],
        bump
    )]
    pub agent: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<StakeOnAgent>, agent_id: u64, amount: u64) -> Result<()> {
    require!(amount > 0, MarketError::ZeroStake);

    let info = ctx.accounts.agent.to_account_info();
    let mut agent = AgentAccount::load(&info)?;

    system_program::transfer(
        CpiContext::new(
            ctx.accounts.system_program.to_account_info(),
            system_program::Transfer {
                from: ctx.accounts.staker.to_account_info(),
                to: info.clone(),
            },
        ),
        amount,
    )?;

    agent.record_stake(amount)?;
    agent.updated_at = Clock::get()?.unix_timestamp;
    agent.store(&info)?;

    emit!(AgentStaked {
        agent_id,
        staker: ctx.accounts.staker.key(),
        amount,
    });

    msg!(
        "Agent staked: id={}, amount={}, total_staked={}, score={}",
        agent_id,
        amount,
        agent.total_staked,
        agent.ranking_score
    );

    Ok(())
}
