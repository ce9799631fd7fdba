use anchor_lang::prelude::*;
use crate::state::{AgentAccount, AgentView};

/// Read-only helper returning an agent's owner, metadata, counters and score
#[derive(Accounts)]
#[instruction(agent_id: u64)]
pub struct GetAgent<'info> {
    #[account(
        seeds = [AgentAccount::SEED_PREFIX, agent_id.to_le_bytes().as_ref()],
        bump = agent.bump
    )]
    pub agent: Account<'info, AgentAccount>,
}

pub fn handler(ctx: Context<GetAgent>, _agent_id: u64) -> Result<AgentView> {
    Ok(ctx.accounts.agent.view())
}
