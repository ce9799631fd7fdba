use std::collections::BTreeSet;

use anchor_lang::prelude::*;
use anchor_lang::system_program::{self, Allocate, Assign, CreateAccount, Transfer};

use crate::errors::MarketError;
use crate::state::UsedNonce;

/// Set of consumed proof nonces.
///
/// `consume` is the check-and-mark step: it must fail with
/// `MarketError::ReplayedNonce` for a nonce that was already consumed and
/// otherwise record it, with no window in between.
pub trait NonceStore {
    fn is_consumed(&self, nonce: &[u8; 32]) -> Result<bool>;

    fn consume(&mut self, nonce: &[u8; 32]) -> Result<()>;
}

/// In-memory nonce set for tests and simulations.
#[derive(Clone, Debug, Default)]
pub struct MemoryNonceStore {
    used: BTreeSet<[u8; 32]>,
}

impl MemoryNonceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}

impl NonceStore for MemoryNonceStore {
    fn is_consumed(&self, nonce: &[u8; 32]) -> Result<bool> {
        Ok(self.used.contains(nonce))
    }

    fn consume(&mut self, nonce: &[u8; 32]) -> Result<()> {
        require!(self.used.insert(*nonce), MarketError::ReplayedNonce);
        Ok(())
    }
}

/// On-chain nonce set: one `UsedNonce` PDA per consumed nonce.
///
/// The caller passes the nonce PDAs as remaining accounts. Consuming a nonce
/// creates its PDA inside the current transaction, so the mark commits or
/// reverts together with the instruction that used the proof.
pub struct PdaNonceStore<'a, 'info> {
    program_id: &'a Pubkey,
    payer: AccountInfo<'info>,
    system_program: AccountInfo<'info>,
    candidates: &'a [AccountInfo<'info>],
}

impl<'a, 'info> PdaNonceStore<'a, 'info> {
    pub fn new(
        program_id: &'a Pubkey,
        payer: AccountInfo<'info>,
        system_program: AccountInfo<'info>,
        candidates: &'a [AccountInfo<'info>],
    ) -> Self {
        Self {
            program_id,
            payer,
            system_program,
            candidates,
        }
    }

    pub fn address(program_id: &Pubkey, nonce: &[u8; 32]) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[UsedNonce::SEED_PREFIX, nonce.as_ref()], program_id)
    }

    fn locate(&self, nonce: &[u8; 32]) -> Result<(&'a AccountInfo<'info>, u8)> {
        let (address, bump) = Self::address(self.program_id, nonce);
        self.candidates
            .iter()
            .find(|info| info.key == &address)
            .map(|info| (info, bump))
            .ok_or_else(|| error!(MarketError::NonceAccountMismatch))
    }

    fn is_marked(&self, info: &AccountInfo<'info>) -> bool {
        info.owner == self.program_id && !info.data_is_empty()
    }

    fn create(&self, info: &AccountInfo<'info>, nonce: &[u8; 32], bump: u8) -> Result<()> {
        let space = 8 + UsedNonce::INIT_SPACE;
        let required = Rent::get()?.minimum_balance(space);
        let bump_seed = [bump];
        let seeds: &[&[u8]] = &[UsedNonce::SEED_PREFIX, nonce.as_ref(), &bump_seed];
        let signer = &[seeds];

        if info.lamports() == 0 {
            system_program::create_account(
                CpiContext::new_with_signer(
                    self.system_program.clone(),
                    CreateAccount {
                        from: self.payer.clone(),
                        to: info.clone(),
                    },
                    signer,
                ),
                required,
                space as u64,
                self.program_id,
            )?;
            return Ok(());
        }

        // Someone pre-funded the address; top up, allocate and assign instead
        let top_up = required.saturating_sub(info.lamports());
        if top_up > 0 {
            system_program::transfer(
                CpiContext::new(
                    self.system_program.clone(),
                    Transfer {
                        from: self.payer.clone(),
                        to: info.clone(),
                    },
                ),
                top_up,
            )?;
        }
        system_program::allocate(
            CpiContext::new_with_signer(
                self.system_program.clone(),
                Allocate {
                    account_to_allocate: info.clone(),
                },
                signer,
            ),
            space as u64,
        )?;
        system_program::assign(
            CpiContext::new_with_signer(
                self.system_program.clone(),
                Assign {
                    account_to_assign: info.clone(),
                },
                signer,
            ),
            self.program_id,
        )?;
        Ok(())
    }
}

impl NonceStore for PdaNonceStore<'_, '_> {
    fn is_consumed(&self, nonce: &[u8; 32]) -> Result<bool> {
        let (info, _) = self.locate(nonce)?;
        Ok(self.is_marked(info))
    }

    fn consume(&mut self, nonce: &[u8; 32]) -> Result<()> {
        let (info, bump) = self.locate(nonce)?;
        require!(!self.is_marked(info), MarketError::ReplayedNonce);

        self.create(info, nonce, bump)?;

        let record = UsedNonce {
            nonce: *nonce,
            consumed_by: self.payer.key(),
            consumed_slot: Clock::get()?.slot,
            bump,
        };
        let mut data = info.try_borrow_mut_data()?;
        let mut writer: &mut [u8] = &mut data[..];
        record.try_serialize(&mut writer)?;

        msg!("Nonce consumed: {}", info.key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_rejects_second_consume() {
        let mut store = MemoryNonceStore::new();
        assert!(!store.is_consumed(&[1u8; 32]).unwrap());
        store.consume(&[1u8; 32]).unwrap();
        assert!(store.is_consumed(&[1u8; 32]).unwrap());

        let err = store.consume(&[1u8; 32]).unwrap_err();
        assert_eq!(err, MarketError::ReplayedNonce.into());
        assert_eq!(store.len(), 1);
    }

    struct RawAccount {
        key: Pubkey,
        owner: Pubkey,
        lamports: u64,
        data: Vec<u8>,
    }

    impl RawAccount {
        fn new(key: Pubkey, owner: Pubkey, lamports: u64, data: Vec<u8>) -> Self {
            Self {
                key,
                owner,
                lamports,
                data,
            }
        }

        fn info(&mut self, is_signer: bool) -> AccountInfo<'_> {
            AccountInfo::new(
                &self.key,
                is_signer,
                true,
                &mut self.lamports,
                &mut self.data,
                &self.owner,
                false,
                0,
            )
        }
    }

    fn payer_and_system() -> (RawAccount, RawAccount) {
        let system = Pubkey::default();
        (
            RawAccount::new(Pubkey::new_unique(), system, 1_000_000_000, Vec::new()),
            RawAccount::new(system, Pubkey::new_unique(), 1, Vec::new()),
        )
    }

    #[test]
    fn pda_store_needs_the_derived_nonce_account() {
        let program = crate::ID;
        let nonce = [3u8; 32];
        let (mut payer, mut system) = payer_and_system();
        let mut stranger = RawAccount::new(Pubkey::new_unique(), Pubkey::default(), 0, Vec::new());

        let none: [AccountInfo; 0] = [];
        let store = PdaNonceStore::new(&program, payer.info(true), system.info(false), &none);
        let err = store.is_consumed(&nonce).unwrap_err();
        assert_eq!(err, MarketError::NonceAccountMismatch.into());

        let (mut payer, mut system) = payer_and_system();
        let wrong = [stranger.info(false)];
        let mut store =
            PdaNonceStore::new(&program, payer.info(true), system.info(false), &wrong);
        let err = store.consume(&nonce).unwrap_err();
        assert_eq!(err, MarketError::NonceAccountMismatch.into());
    }

    #[test]
    fn pda_store_reads_a_fresh_address_as_unused() {
        let program = crate::ID;
        let nonce = [4u8; 32];
        let (address, _) = PdaNonceStore::address(&program, &nonce);
        let (mut payer, mut system) = payer_and_system();
        let mut fresh = RawAccount::new(address, Pubkey::default(), 0, Vec::new());

        let candidates = [fresh.info(false)];
        let store =
            PdaNonceStore::new(&program, payer.info(true), system.info(false), &candidates);
        assert!(!store.is_consumed(&nonce).unwrap());
    }

    #[test]
    fn pda_store_rejects_an_existing_nonce_account() {
        let program = crate::ID;
        let nonce = [5u8; 32];
        let (address, _) = PdaNonceStore::address(&program, &nonce);
        let (mut payer, mut system) = payer_and_system();
        let mut marked = RawAccount::new(
            address,
            program,
            1_000_000,
            vec![1u8; 8 + UsedNonce::INIT_SPACE],
        );

        let candidates = [marked.info(false)];
        let mut store =
            PdaNonceStore::new(&program, payer.info(true), system.info(false), &candidates);
        assert!(store.is_consumed(&nonce).unwrap());

        let err = store.consume(&nonce).unwrap_err();
        assert_eq!(err, MarketError::ReplayedNonce.into());
        assert_eq!(candidates[0].lamports(), 1_000_000);
    }

    #[test]
    fn nonce_addresses_are_distinct_per_nonce() {
        let program = crate::ID;
        let (a, _) = PdaNonceStore::address(&program, &[1u8; 32]);
        let (b, _) = PdaNonceStore::address(&program, &[2u8; 32]);
        assert_ne!(a, b);
    }
}
