use anchor_lang::prelude::*;
use anchor_lang::solana_program::sysvar::instructions::{
    load_current_index_checked, load_instruction_at_checked,
};
use solana_sdk_ids::ed25519_program;

/// Decides whether an attestation payload vouches for a proof digest.
pub trait Attestor {
    fn attest(&self, digest: &[u8; 32], attestation: &[u8]) -> Result<bool>;
}

/// Accepts every attestation. Used on local/devnet deployments and in tests;
/// nonce replay protection still applies.
pub struct MockAttestor;

impl Attestor for MockAttestor {
    fn attest(&self, _digest: &[u8; 32], _attestation: &[u8]) -> Result<bool> {
        Ok(true)
    }
}

/// Accepts an attestation when it is an Ed25519 signature by the enclave key
/// over the digest, and the transaction carries an Ed25519 precompile
/// instruction that verified exactly that signature.
pub struct EnclaveAttestor<'info> {
    instructions: AccountInfo<'info>,
    enclave: Pubkey,
}

impl<'info> EnclaveAttestor<'info> {
    pub fn new(instructions: AccountInfo<'info>, enclave: Pubkey) -> Self {
        Self {
            instructions,
            enclave,
        }
    }
}

impl Attestor for EnclaveAttestor<'_> {
    fn attest(&self, digest: &[u8; 32], attestation: &[u8]) -> Result<bool> {
        let Ok(signature) = <&[u8; 64]>::try_from(attestation) else {
            return Ok(false);
        };

        let current = load_current_index_checked(&self.instructions)?;
        for idx in 0..current {
            let Ok(ix) = load_instruction_at_checked(idx as usize, &self.instructions) else {
                continue;
            };
            if ix.program_id != ed25519_program::ID {
                continue;
            }
            if precompile_covers(&ix.data, &self.enclave.to_bytes(), digest, signature) {
                return Ok(true);
            }
        }

        Ok(false)
    }
}

/// Check that Ed25519 precompile instruction data verifies `signature` by
/// `pubkey` over `message`, all carried inline.
///
/// Layout: num_signatures (u8), padding (u8), then per signature seven
/// little-endian u16 offsets: signature offset / ix index, pubkey offset /
/// ix index, message offset, message size, message ix index.
pub(crate) fn precompile_covers(
    data: &[u8],
    pubkey: &[u8; 32],
    message: &[u8],
    signature: &[u8; 64],
) -> bool {
    const HEADER: usize = 2;
    const OFFSETS: usize = 14;

    if data.len() < HEADER {
        return false;
    }
    let count = data[0] as usize;

    for n in 0..count {
        let start = HEADER + n * OFFSETS;
        let Some(offsets) = data.get(start..start + OFFSETS) else {
            return false;
        };
        let read = |i: usize| u16::from_le_bytes([offsets[i], offsets[i + 1]]);

        // Only inline data (u16::MAX) is accepted; other indices would let
        // the precompile verify bytes from a different instruction.
        if read(2) != u16::MAX || read(6) != u16::MAX || read(12) != u16::MAX {
            continue;
        }

        let sig_at = read(0) as usize;
        let pk_at = read(4) as usize;
        let msg_at = read(8) as usize;
        let msg_len = read(10) as usize;

        let matches = data.get(sig_at..sig_at + 64) == Some(&signature[..])
            && data.get(pk_at..pk_at + 32) == Some(&pubkey[..])
            && data.get(msg_at..msg_at + msg_len) == Some(message);
        if matches {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Single-signature precompile data with everything inline.
    fn precompile_data(pubkey: &[u8; 32], message: &[u8], signature: &[u8; 64]) -> Vec<u8> {
        let sig_at: u16 = 16;
        let pk_at = sig_at + 64;
        let msg_at = pk_at + 32;
        let mut data = vec![1u8, 0u8];
        for v in [
            sig_at,
            u16::MAX,
            pk_at,
            u16::MAX,
            msg_at,
            message.len() as u16,
            u16::MAX,
        ] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        data.extend_from_slice(signature);
        data.extend_from_slice(pubkey);
        data.extend_from_slice(message);
        data
    }

    #[test]
    fn matching_inline_signature_is_accepted() {
        let data = precompile_data(&[1u8; 32], &[2u8; 32], &[3u8; 64]);
        assert!(precompile_covers(&data, &[1u8; 32], &[2u8; 32], &[3u8; 64]));
    }

    #[test]
    fn wrong_key_message_or_signature_is_rejected() {
        let data = precompile_data(&[1u8; 32], &[2u8; 32], &[3u8; 64]);
        assert!(!precompile_covers(&data, &[9u8; 32], &[2u8; 32], &[3u8; 64]));
        assert!(!precompile_covers(&data, &[1u8; 32], &[9u8; 32], &[3u8; 64]));
        assert!(!precompile_covers(&data, &[1u8; 32], &[2u8; 32], &[9u8; 64]));
    }

    #[test]
    fn cross_instruction_references_are_rejected() {
        let mut data = precompile_data(&[1u8; 32], &[2u8; 32], &[3u8; 64]);
        // signature instruction index -> 0
        data[4] = 0;
        data[5] = 0;
        assert!(!precompile_covers(&data, &[1u8; 32], &[2u8; 32], &[3u8; 64]));
    }

    #[test]
    fn truncated_data_is_rejected() {
        let data = precompile_data(&[1u8; 32], &[2u8; 32], &[3u8; 64]);
        assert!(!precompile_covers(&data[..40], &[1u8; 32], &[2u8; 32], &[3u8; 64]));
        assert!(!precompile_covers(&[], &[1u8; 32], &[2u8; 32], &[3u8; 64]));
    }

    #[test]
    fn mock_accepts_anything() {
        assert!(MockAttestor.attest(&[0u8; 32], &[]).unwrap());
    }
}
