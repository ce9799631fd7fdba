use anchor_lang::prelude::*;
use crate::state::{MarketConfig, VerifierKind};

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    #[account(
        init,
        payer = admin,
        space = 8 + MarketConfig::INIT_SPACE,
        seeds = [MarketConfig::SEED_PREFIX],
        bump
    )]
    pub market: Account<'info, MarketConfig>,

    pub system_program: Program<'info, System>,
}

pub fn handler(
    ctx: Context<Initialize>,
    verifier: VerifierKind,
    one_love_per_identity: bool,
) -> Result<()> {
    let market = &mut ctx.accounts.market;

    market.admin = ctx.accounts.admin.key();
    market.verifier = verifier;
    market.one_love_per_identity = one_love_per_identity;
    market.next_agent_id = MarketConfig::FIRST_AGENT_ID;
    market.total_agents = 0;
    market.bump = ctx.bumps.market;

    msg!(
        "Market initialized: admin={}, verifier={:?}, one_love_per_identity={}",
        market.admin,
        market.verifier,
        market.one_love_per_identity
    );

    Ok(())
}
