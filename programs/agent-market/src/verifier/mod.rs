//! Proof verification capability.
//!
//! The registry only sees [`ProofVerifier`]: it hands over opaque proof
//! blobs and gets back the declared hashes plus a validity flag. How the
//! attestation is checked ([`Attestor`]) and where consumed nonces live
//! ([`NonceStore`]) are chosen when the verifier is built.

pub mod attestation;
pub mod nonce_store;
pub mod proof;

pub use attestation::*;
pub use nonce_store::*;
pub use proof::*;

use anchor_lang::prelude::*;

use crate::errors::MarketError;
use crate::state::VerifierKind;

/// Result of `verify_ownership`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnershipVerdict {
    pub content_hashes: Vec<[u8; 32]>,
    pub valid: bool,
}

/// Result of `verify_transfer_validity`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferVerdict {
    pub old_hashes: Vec<[u8; 32]>,
    pub new_hashes: Vec<[u8; 32]>,
    pub recipient: Pubkey,
    pub recipient_pubkey: Vec<u8>,
    pub sealed_key: Vec<u8>,
    pub valid: bool,
}

pub trait ProofVerifier {
    /// Decode an [`OwnershipProof`], enforce its nonce and check its
    /// attestation. The nonce is consumed only when the verdict is valid.
    fn verify_ownership(&mut self, proof: &[u8]) -> Result<OwnershipVerdict>;

    /// Decode a [`TransferValidityProof`] under the same nonce discipline.
    fn verify_transfer_validity(&mut self, proof: &[u8]) -> Result<TransferVerdict>;
}

/// The one [`ProofVerifier`] implementation, parameterised by its attestor
/// and nonce store.
pub struct Verifier<'a, S> {
    attestor: Box<dyn Attestor + 'a>,
    nonces: S,
}

impl<'a, S: NonceStore> Verifier<'a, S> {
    pub fn new(attestor: Box<dyn Attestor + 'a>, nonces: S) -> Self {
        Self { attestor, nonces }
    }

    /// Verifier for the backend configured on the market.
    pub fn for_kind(kind: VerifierKind, instructions: AccountInfo<'a>, nonces: S) -> Self {
        let attestor: Box<dyn Attestor + 'a> = match kind {
            VerifierKind::Mock => Box::new(MockAttestor),
            VerifierKind::Enclave { signer } => {
                Box::new(EnclaveAttestor::new(instructions, signer))
            }
        };
        Self::new(attestor, nonces)
    }

    pub fn nonces(&self) -> &S {
        &self.nonces
    }

    pub fn into_nonces(self) -> S {
        self.nonces
    }

    fn admit(&mut self, nonce: &[u8; 32], digest: &[u8; 32], attestation: &[u8]) -> Result<bool> {
        require!(!self.nonces.is_consumed(nonce)?, MarketError::ReplayedNonce);
        let valid = self.attestor.attest(digest, attestation)?;
        if valid {
            self.nonces.consume(nonce)?;
        }
        Ok(valid)
    }
}

impl<S: NonceStore> ProofVerifier for Verifier<'_, S> {
    fn verify_ownership(&mut self, proof: &[u8]) -> Result<OwnershipVerdict> {
        let proof = OwnershipProof::decode(proof)?;
        require!(!proof.content_hashes.is_empty(), MarketError::InvalidProof);

        let valid = self.admit(&proof.nonce, &proof.digest(), &proof.attestation)?;
        Ok(OwnershipVerdict {
            content_hashes: proof.content_hashes,
            valid,
        })
    }

    fn verify_transfer_validity(&mut self, proof: &[u8]) -> Result<TransferVerdict> {
        let proof = TransferValidityProof::decode(proof)?;
        require!(
            !proof.old_hashes.is_empty() && !proof.new_hashes.is_empty(),
            MarketError::InvalidProof
        );

        let valid = self.admit(&proof.nonce, &proof.digest(), &proof.attestation)?;
        Ok(TransferVerdict {
            old_hashes: proof.old_hashes,
            new_hashes: proof.new_hashes,
            recipient: proof.recipient,
            recipient_pubkey: proof.recipient_pubkey,
            sealed_key: proof.sealed_key,
            valid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RejectAll;

    impl Attestor for RejectAll {
        fn attest(&self, _digest: &[u8; 32], _attestation: &[u8]) -> Result<bool> {
            Ok(false)
        }
    }

    fn mock() -> Verifier<'static, MemoryNonceStore> {
        Verifier::new(Box::new(MockAttestor), MemoryNonceStore::new())
    }

    fn ownership(hashes: Vec<[u8; 32]>, nonce: u8) -> Vec<u8> {
        OwnershipProof {
            content_hashes: hashes,
            attestation: vec![],
            nonce: [nonce; 32],
        }
        .encode()
        .unwrap()
    }

    #[test]
    fn ownership_proof_returns_declared_hashes() {
        let mut verifier = mock();
        let verdict = verifier.verify_ownership(&ownership(vec![[1u8; 32]], 1)).unwrap();
        assert!(verdict.valid);
        assert_eq!(verdict.content_hashes, vec![[1u8; 32]]);
        assert!(verifier.nonces().is_consumed(&[1u8; 32]).unwrap());
    }

    #[test]
    fn resubmitted_proof_fails_with_replayed_nonce() {
        let mut verifier = mock();
        let blob = ownership(vec![[1u8; 32]], 1);
        verifier.verify_ownership(&blob).unwrap();
        let err = verifier.verify_ownership(&blob).unwrap_err();
        assert_eq!(err, MarketError::ReplayedNonce.into());
    }

    #[test]
    fn nonce_is_shared_across_proof_kinds() {
        let mut verifier = mock();
        verifier.verify_ownership(&ownership(vec![[1u8; 32]], 7)).unwrap();
        let transfer = TransferValidityProof {
            old_hashes: vec![[1u8; 32]],
            new_hashes: vec![[2u8; 32]],
            recipient: Pubkey::new_unique(),
            recipient_pubkey: vec![],
            sealed_key: vec![],
            attestation: vec![],
            nonce: [7u8; 32],
        }
        .encode()
        .unwrap();
        let err = verifier.verify_transfer_validity(&transfer).unwrap_err();
        assert_eq!(err, MarketError::ReplayedNonce.into());
    }

    #[test]
    fn empty_hash_list_is_invalid_and_keeps_nonce() {
        let mut verifier = mock();
        let err = verifier.verify_ownership(&ownership(vec![], 1)).unwrap_err();
        assert_eq!(err, MarketError::InvalidProof.into());
        assert!(verifier.nonces().is_empty());
    }

    #[test]
    fn rejected_attestation_leaves_nonce_unconsumed() {
        let mut verifier = Verifier::new(Box::new(RejectAll), MemoryNonceStore::new());
        let verdict = verifier.verify_ownership(&ownership(vec![[1u8; 32]], 1)).unwrap();
        assert!(!verdict.valid);
        assert!(verifier.into_nonces().is_empty());
    }

    #[test]
    fn transfer_proof_exposes_sealed_key() {
        let mut verifier = mock();
        let recipient = Pubkey::new_unique();
        let blob = TransferValidityProof {
            old_hashes: vec![[1u8; 32]],
            new_hashes: vec![[2u8; 32]],
            recipient,
            recipient_pubkey: vec![4u8; 32],
            sealed_key: vec![5u8; 48],
            attestation: vec![],
            nonce: [3u8; 32],
        }
        .encode()
        .unwrap();
        let verdict = verifier.verify_transfer_validity(&blob).unwrap();
        assert!(verdict.valid);
        assert_eq!(verdict.new_hashes, vec![[2u8; 32]]);
        assert_eq!(verdict.recipient, recipient);
        assert_eq!(verdict.recipient_pubkey, vec![4u8; 32]);
        assert_eq!(verdict.sealed_key, vec![5u8; 48]);
    }
}
