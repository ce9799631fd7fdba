use anchor_lang::prelude::*;

use crate::errors::MarketError;

/// Per-(agent, lover) love counter
///
/// PDA seeds: ["love", agent_id, lover]
#[account]
#[derive(InitSpace)]
pub struct LoveReceipt {
    pub agent_id: u64,
    pub lover: Pubkey,
    /// Loves this identity has given the agent
    pub count: u64,
    pub bump: u8,
}

impl LoveReceipt {
    pub const SEED_PREFIX: &'static [u8] = b"love";

    /// Count one more love from this identity.
    pub fn register(&mut self, one_per_identity: bool) -> Result<()> {
        require!(
            !(one_per_identity && self.count > 0),
            MarketError::AlreadyLoved
        );
        self.count = self.count.checked_add(1).ok_or(MarketError::ArithmeticOverflow)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt() -> LoveReceipt {
        LoveReceipt {
            agent_id: 1,
            lover: Pubkey::new_unique(),
            count: 0,
            bump: 255,
        }
    }

    #[test]
    fn repeated_loves_count_by_default() {
        let mut r = receipt();
        r.register(false).unwrap();
        r.register(false).unwrap();
        assert_eq!(r.count, 2);
    }

    #[test]
    fn one_love_per_identity_rejects_second() {
        let mut r = receipt();
        r.register(true).unwrap();
        let err = r.register(true).unwrap_err();
        assert_eq!(err, MarketError::AlreadyLoved.into());
        assert_eq!(r.count, 1);
    }
}
