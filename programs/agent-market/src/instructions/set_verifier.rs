use anchor_lang::prelude::*;
use crate::errors::MarketError;
use crate::events::VerifierUpdated;
use crate::state::{MarketConfig, VerifierKind};

/// Swap the attestation backend (admin only)
#[derive(Accounts)]
pub struct SetVerifier<'info> {
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [MarketConfig::SEED_PREFIX],
        bump = market.bump,
        constraint = market.admin == admin.key() @ MarketError::Unauthorized
    )]
    pub market: Account<'info, MarketConfig>,
}

pub fn handler(ctx: Context<SetVerifier>, verifier: VerifierKind) -> Result<()> {
    let market = &mut ctx.accounts.market;
    market.verifier = verifier;

    emit!(VerifierUpdated {
        admin: market.admin,
        verifier,
    });

    msg!("Verifier set: {:?}", verifier);

    Ok(())
}
