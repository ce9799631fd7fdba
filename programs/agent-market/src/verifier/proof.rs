//! Wire format of the proofs produced by the off-chain proof service.
//!
//! Both proof kinds are Borsh-encoded. The attestation covers a SHA256
//! digest of a domain tag followed by every other field, so an attestation
//! for one kind can never be replayed as the other.

use anchor_lang::prelude::*;
use solana_sha256_hasher::hash;

use crate::constants::{OWNERSHIP_DOMAIN, TRANSFER_DOMAIN};
use crate::errors::MarketError;

/// Claim that the submitter holds the payload behind `content_hashes`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct OwnershipProof {
    pub content_hashes: Vec<[u8; 32]>,
    pub attestation: Vec<u8>,
    pub nonce: [u8; 32],
}

/// Claim that the payload behind `old_hashes` was re-encrypted as
/// `new_hashes`, with its key sealed to `recipient_pubkey`.
///
/// `recipient_pubkey` is the recipient's encryption key and may differ from
/// its ledger identity; `recipient` is the identity the agent is handed to,
/// so an attested proof cannot be redirected to another holder.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct TransferValidityProof {
    pub old_hashes: Vec<[u8; 32]>,
    pub new_hashes: Vec<[u8; 32]>,
    pub recipient: Pubkey,
    pub recipient_pubkey: Vec<u8>,
    pub sealed_key: Vec<u8>,
    pub attestation: Vec<u8>,
    pub nonce: [u8; 32],
}

impl OwnershipProof {
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        decode_blob(bytes)
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        encode_blob(self)
    }

    /// Digest the attestation must cover.
    pub fn digest(&self) -> [u8; 32] {
        let capacity = OWNERSHIP_DOMAIN.len() + 36 + self.content_hashes.len() * 32;
        let mut body = Vec::with_capacity(capacity);
        body.extend_from_slice(OWNERSHIP_DOMAIN);
        push_hashes(&mut body, &self.content_hashes);
        body.extend_from_slice(&self.nonce);
        hash(&body).to_bytes()
    }
}

impl TransferValidityProof {
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        decode_blob(bytes)
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        encode_blob(self)
    }

    /// Digest the attestation must cover.
    pub fn digest(&self) -> [u8; 32] {
        let mut body = Vec::new();
        body.extend_from_slice(TRANSFER_DOMAIN);
        push_hashes(&mut body, &self.old_hashes);
        push_hashes(&mut body, &self.new_hashes);
        body.extend_from_slice(self.recipient.as_ref());
        push_bytes(&mut body, &self.recipient_pubkey);
        push_bytes(&mut body, &self.sealed_key);
        body.extend_from_slice(&self.nonce);
        hash(&body).to_bytes()
    }
}

fn decode_blob<T: AnchorDeserialize>(bytes: &[u8]) -> Result<T> {
    require!(!bytes.is_empty(), MarketError::InvalidProof);
    T::try_from_slice(bytes).map_err(|_| error!(MarketError::InvalidProof))
}

fn encode_blob<T: AnchorSerialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    value
        .serialize(&mut buf)
        .map_err(|_| error!(MarketError::InvalidProof))?;
    Ok(buf)
}

// Same length-prefix layout Borsh uses for Vec fields
fn push_hashes(body: &mut Vec<u8>, hashes: &[[u8; 32]]) {
    body.extend_from_slice(&(hashes.len() as u32).to_le_bytes());
    for h in hashes {
        body.extend_from_slice(h);
    }
}

fn push_bytes(body: &mut Vec<u8>, bytes: &[u8]) {
    body.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    body.extend_from_slice(bytes);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer_proof() -> TransferValidityProof {
        TransferValidityProof {
            old_hashes: vec![[1u8; 32]],
            new_hashes: vec![[2u8; 32]],
            recipient: Pubkey::new_from_array([6u8; 32]),
            recipient_pubkey: vec![7u8; 32],
            sealed_key: vec![9u8; 48],
            attestation: vec![],
            nonce: [3u8; 32],
        }
    }

    #[test]
    fn empty_blob_is_invalid() {
        let err = OwnershipProof::decode(&[]).unwrap_err();
        assert_eq!(err, MarketError::InvalidProof.into());
    }

    #[test]
    fn garbage_and_trailing_bytes_are_invalid() {
        assert!(OwnershipProof::decode(&[0xff, 0xff, 0xff, 0xff, 1]).is_err());

        let mut bytes = transfer_proof().encode().unwrap();
        bytes.push(0);
        let err = TransferValidityProof::decode(&bytes).unwrap_err();
        assert_eq!(err, MarketError::InvalidProof.into());
    }

    #[test]
    fn transfer_blob_decodes() {
        let proof = transfer_proof();
        let decoded = TransferValidityProof::decode(&proof.encode().unwrap()).unwrap();
        assert_eq!(decoded, proof);
    }

    #[test]
    fn digest_ignores_attestation_but_binds_nonce() {
        let mut a = transfer_proof();
        let digest = a.digest();
        a.attestation = vec![5u8; 64];
        assert_eq!(a.digest(), digest);
        a.nonce = [4u8; 32];
        assert_ne!(a.digest(), digest);
    }

    #[test]
    fn digest_binds_recipient_identity() {
        let mut a = transfer_proof();
        let digest = a.digest();
        a.recipient = Pubkey::new_unique();
        assert_ne!(a.digest(), digest);
    }

    #[test]
    fn proof_kinds_use_distinct_domains() {
        let ownership = OwnershipProof {
            content_hashes: vec![],
            attestation: vec![],
            nonce: [0u8; 32],
        };
        let transfer = TransferValidityProof {
            old_hashes: vec![],
            new_hashes: vec![],
            recipient: Pubkey::default(),
            recipient_pubkey: vec![],
            sealed_key: vec![],
            attestation: vec![],
            nonce: [0u8; 32],
        };
        assert_ne!(ownership.digest(), transfer.digest());
    }
}
