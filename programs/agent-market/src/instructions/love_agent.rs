use anchor_lang::prelude::*;
use crate::events::AgentLoved;
use crate::state::{AgentAccount, LoveReceipt, MarketConfig};

#[derive(Accounts)]
#[instruction(agent_id: u64)]
pub struct LoveAgent<'info> {
    #[account(mut)]
    pub lover: Signer<'info>,

    #[account(
        seeds = [MarketConfig::SEED_PREFIX],
        bump = market.bump
    )]
    pub market: Account<'info, MarketConfig>,

    /// CHECK: deserialized by the handler so a never-minted id reports
    /// UnknownAgent; the address is pinned by the seeds
    #[account(
        mut,
        seeds = [AgentAccount::SEED_PREFIX, agent_id.to_le_bytes().as_ref()],
        bump
    )]
    pub agent: UncheckedAccount<'info>,

    /// Loves given by this identity to this agent (created on first love)
    #[account(
        init_if_needed,
        payer = lover,
        space = 8 + LoveReceipt::INIT_SPACE,
        seeds = [
            LoveReceipt::SEED_PREFIX,
            agent_id.to_le_bytes().as_ref(),
            lover.key().as_ref()
        ],
        bump
    )]
    pub love_receipt: Account<'info, LoveReceipt>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<LoveAgent>, agent_id: u64) -> Result<()> {
    let info = ctx.accounts.agent.to_account_info();
    let mut agent = AgentAccount::load(&info)?;
    let lover = ctx.accounts.lover.key();

    let receipt = &mut ctx.accounts.love_receipt;
    if receipt.count == 0 {
        receipt.agent_id = agent_id;
        receipt.lover = lover;
        receipt.bump = ctx.bumps.love_receipt;
    }
    receipt.register(ctx.accounts.market.one_love_per_identity)?;

    agent.record_love()?;
    agent.updated_at = Clock::get()?.unix_timestamp;
    agent.store(&info)?;

    emit!(AgentLoved {
        agent_id,
        user: lover,
    });

    msg!(
        "Agent loved: id={}, by={}, loves={}, score={}",
        agent_id,
        lover,
        agent.loves,
        agent.ranking_score
    );

    Ok(())
}
