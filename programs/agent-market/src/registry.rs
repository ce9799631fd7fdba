//! Validation for the proof-gated ownership operations.
//!
//! Every function here only reads state and talks to the verifier; the
//! instruction handlers commit the returned values in one step once all of
//! them have succeeded.

use anchor_lang::prelude::*;

use crate::constants::{
    MAX_CATEGORY_LEN, MAX_CONTENT_HASHES, MAX_DESCRIPTION_LEN, MAX_NAME_LEN, MAX_PROOFS,
    ZERO_IDENTITY,
};
use crate::errors::MarketError;
use crate::state::AgentAccount;
use crate::verifier::ProofVerifier;

/// New content binding produced by a transfer or clone.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reseal {
    pub content_hashes: Vec<[u8; 32]>,
    pub recipient_pubkeys: Vec<Vec<u8>>,
    pub sealed_keys: Vec<Vec<u8>>,
}

impl Reseal {
    /// True when the payload key was re-sealed for the recipient
    /// (private agents), false for proof-less public hand-overs.
    pub fn is_sealed(&self) -> bool {
        !self.sealed_keys.is_empty()
    }
}

/// Mint needs one description per proof and at least one of each.
pub fn check_arity(proofs: usize, descriptions: usize) -> Result<()> {
    require!(proofs == descriptions, MarketError::ArityMismatch);
    require!(proofs > 0, MarketError::EmptyInput);
    require!(proofs <= MAX_PROOFS, MarketError::TooManyProofs);
    Ok(())
}

pub fn check_metadata(name: &str, category: &str, descriptions: &[String]) -> Result<()> {
    require!(name.len() <= MAX_NAME_LEN, MarketError::NameTooLong);
    require!(category.len() <= MAX_CATEGORY_LEN, MarketError::CategoryTooLong);
    require!(
        descriptions.iter().all(|d| d.len() <= MAX_DESCRIPTION_LEN),
        MarketError::DescriptionTooLong
    );
    Ok(())
}

pub fn check_owner(agent: &AgentAccount, caller: &Pubkey) -> Result<()> {
    require!(agent.owner == *caller, MarketError::NotOwner);
    Ok(())
}

pub fn check_recipient(to: &Pubkey) -> Result<()> {
    require!(*to != ZERO_IDENTITY, MarketError::InvalidRecipient);
    Ok(())
}

/// Verify every ownership proof and concatenate the hashes they declare.
pub fn collect_minted_hashes<V: ProofVerifier + ?Sized>(
    verifier: &mut V,
    proofs: &[Vec<u8>],
) -> Result<Vec<[u8; 32]>> {
    let mut hashes = Vec::new();
    for proof in proofs {
        let verdict = verifier.verify_ownership(proof)?;
        require!(verdict.valid, MarketError::AttestationRejected);
        hashes.extend(verdict.content_hashes);
    }
    require!(
        hashes.len() <= MAX_CONTENT_HASHES,
        MarketError::TooManyContentHashes
    );
    Ok(hashes)
}

/// Work out the content binding for a transfer or clone of `agent`.
///
/// Each proof covers a contiguous run of the agent's hashes: the
/// concatenated `old_hashes` must equal the current list, and the
/// concatenated `new_hashes` replace it. Every proof must name `to` as its
/// recipient. Public agents may omit proofs and keep their hashes.
pub fn reseal_content<V: ProofVerifier + ?Sized>(
    agent: &AgentAccount,
    verifier: &mut V,
    proofs: &[Vec<u8>],
    to: &Pubkey,
) -> Result<Reseal> {
    require!(proofs.len() <= MAX_PROOFS, MarketError::TooManyProofs);
    if proofs.is_empty() {
        require!(agent.is_public, MarketError::EmptyInput);
        return Ok(Reseal {
            content_hashes: agent.content_hashes.clone(),
            ..Reseal::default()
        });
    }

    let mut old_hashes = Vec::new();
    let mut reseal = Reseal::default();
    for proof in proofs {
        let verdict = verifier.verify_transfer_validity(proof)?;
        require!(verdict.valid, MarketError::AttestationRejected);
        require!(verdict.recipient == *to, MarketError::RecipientMismatch);
        old_hashes.extend(verdict.old_hashes);
        reseal.content_hashes.extend(verdict.new_hashes);
        reseal.recipient_pubkeys.push(verdict.recipient_pubkey);
        reseal.sealed_keys.push(verdict.sealed_key);
    }

    require!(old_hashes == agent.content_hashes, MarketError::StaleProof);
    require!(
        reseal.content_hashes.len() <= MAX_CONTENT_HASHES,
        MarketError::TooManyContentHashes
    );
    Ok(reseal)
}

/// Hand-over of a public agent, which never takes proofs.
pub fn public_handover(agent: &AgentAccount) -> Result<Reseal> {
    require!(agent.is_public, MarketError::NotPublic);
    Ok(Reseal {
        content_hashes: agent.content_hashes.clone(),
        ..Reseal::default()
    })
}
