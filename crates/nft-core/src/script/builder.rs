//! Locking-script construction.

use nft_primitives::hash::hash160;
use nft_script::opcodes::*;
use nft_script::Script;

use crate::script::{FLAG_ISSUED, FLAG_MINT_SLOT, PAYLOAD_LEN};
use crate::types::{Outpoint, TokenKind};
use crate::NftError;

/// Digest-expansion preamble: rebuilds the attestation digest from the
/// pushed payload before the per-signer checks run.
const DIGEST_EXPAND: [u8; 7] = [
    OP_SHA256, OP_SWAP, OP_CAT, OP_SHA256, OP_SWAP, OP_CAT, OP_HASH256,
];

/// One Rabin verification round: square the pushed signature, reduce by
/// the signer modulus, and require equality with the expanded digest.
const RABIN_VERIFY_ROUND: [u8; 5] = [OP_2DUP, OP_MUL, OP_SWAP, OP_MOD, OP_EQUALVERIFY];

/// Owner authorization epilogue: the spender's public key must hash to
/// the owner slot in the payload.
const OWNER_CHECK: [u8; 5] = [OP_DUP, OP_HASH160, OP_SWAP, OP_EQUALVERIFY, OP_CHECKSIG];

/// The token state embedded after `OP_RETURN`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NftPayload {
    /// Mint slot or issued token.
    pub kind: TokenKind,
    /// Total supply fixed at genesis.
    pub total_supply: u64,
    /// Token ordinal; for the mint slot, the next ordinal to issue.
    pub token_index: u64,
    /// Owner public key hash.
    pub owner_pkh: [u8; 20],
    /// Genesis identifier of the series.
    pub genesis_id: [u8; 20],
}

impl NftPayload {
    /// Serialize to the fixed [`PAYLOAD_LEN`]-byte layout.
    pub fn to_bytes(&self) -> [u8; PAYLOAD_LEN] {
        let mut out = [0u8; PAYLOAD_LEN];
        out[0] = match self.kind {
            TokenKind::MintSlot => FLAG_MINT_SLOT,
            TokenKind::Issued => FLAG_ISSUED,
        };
        out[1..9].copy_from_slice(&self.total_supply.to_le_bytes());
        out[9..17].copy_from_slice(&self.token_index.to_le_bytes());
        out[17..37].copy_from_slice(&self.owner_pkh);
        out[37..57].copy_from_slice(&self.genesis_id);
        out
    }

    /// Parse from the fixed layout.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != PAYLOAD_LEN {
            return None;
        }
        let kind = match bytes[0] {
            FLAG_MINT_SLOT => TokenKind::MintSlot,
            FLAG_ISSUED => TokenKind::Issued,
            _ => return None,
        };
        let mut owner_pkh = [0u8; 20];
        owner_pkh.copy_from_slice(&bytes[17..37]);
        let mut genesis_id = [0u8; 20];
        genesis_id.copy_from_slice(&bytes[37..57]);
        Some(NftPayload {
            kind,
            total_supply: u64::from_le_bytes(bytes[1..9].try_into().ok()?),
            token_index: u64::from_le_bytes(bytes[9..17].try_into().ok()?),
            owner_pkh,
            genesis_id,
        })
    }
}

/// Build the code part of a protocol locking script.
///
/// The template commits to the oracle signer set (hash160 of the
/// concatenated Rabin moduli) and carries one verification round per
/// required attestation, so series built against the same oracle
/// configuration share a codehash.
pub fn code_part(oracle_set_hash: &[u8; 20], verify_count: usize) -> Vec<u8> {
    let mut code = Vec::with_capacity(code_part_len(verify_count));
    code.push(OP_DUP);
    code.push(OP_HASH160);
    code.push(OP_DATA_20);
    code.extend_from_slice(oracle_set_hash);
    code.push(OP_EQUALVERIFY);
    code.extend_from_slice(&DIGEST_EXPAND);
    for _ in 0..verify_count {
        code.extend_from_slice(&RABIN_VERIFY_ROUND);
    }
    code.extend_from_slice(&OWNER_CHECK);
    code
}

/// Byte length of [`code_part`] for a given verification arity.
pub fn code_part_len(verify_count: usize) -> usize {
    24 + DIGEST_EXPAND.len() + verify_count * RABIN_VERIFY_ROUND.len() + OWNER_CHECK.len()
}

/// Assemble a complete protocol locking script.
pub fn build_locking_script(
    oracle_set_hash: &[u8; 20],
    verify_count: usize,
    payload: &NftPayload,
) -> Result<Script, NftError> {
    let mut script = Script::from_bytes(&code_part(oracle_set_hash, verify_count));
    script.append_opcodes(&[OP_RETURN]);
    script.append_push_data(&payload.to_bytes())?;
    Ok(script)
}

/// Derive a series' genesis identifier.
///
/// Hash160 of the genesis transaction's first input outpoint plus the
/// total supply. Outpoints do not depend on signatures, so the identifier
/// is available as soon as the genesis transaction is assembled and stays
/// stable through signing and broadcast.
pub fn genesis_id(first_input: &Outpoint, total_supply: u64) -> [u8; 20] {
    let mut data = Vec::with_capacity(44);
    data.extend_from_slice(&first_input.to_bytes());
    data.extend_from_slice(&total_supply.to_le_bytes());
    hash160(&data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nft_primitives::chainhash::Hash;

    #[test]
    fn code_part_length_matches_builder() {
        for verify_count in [1usize, 3, 5] {
            let code = code_part(&[0xaa; 20], verify_count);
            assert_eq!(code.len(), code_part_len(verify_count));
        }
    }

    #[test]
    fn code_part_avoids_push_and_return_bytes_outside_commitment() {
        // The reader scans for the first top-level OP_RETURN; every code
        // byte outside the oracle commitment push must stay out of the
        // push-opcode range and must not be OP_RETURN itself.
        let code = code_part(&[0xaa; 20], 3);
        for (i, &b) in code.iter().enumerate() {
            if (2..23).contains(&i) {
                continue; // push prefix + oracle set hash
            }
            assert!(b > 0x4b, "byte {b:#x} at {i} is a push opcode");
            assert_ne!(b, OP_RETURN, "OP_RETURN inside code part at {i}");
        }
    }

    #[test]
    fn payload_roundtrip() {
        let payload = NftPayload {
            kind: TokenKind::Issued,
            total_supply: 3,
            token_index: 2,
            owner_pkh: [0x11; 20],
            genesis_id: [0x22; 20],
        };
        let bytes = payload.to_bytes();
        assert_eq!(bytes.len(), PAYLOAD_LEN);
        assert_eq!(NftPayload::from_bytes(&bytes).unwrap(), payload);
    }

    #[test]
    fn payload_rejects_unknown_flag() {
        let payload = NftPayload {
            kind: TokenKind::MintSlot,
            total_supply: 1,
            token_index: 0,
            owner_pkh: [0; 20],
            genesis_id: [0; 20],
        };
        let mut bytes = payload.to_bytes();
        bytes[0] = 9;
        assert!(NftPayload::from_bytes(&bytes).is_none());
    }

    #[test]
    fn genesis_id_changes_with_inputs() {
        let a = Outpoint {
            txid: Hash::from_bytes(&[1; 32]).unwrap(),
            vout: 0,
        };
        let b = Outpoint {
            txid: Hash::from_bytes(&[1; 32]).unwrap(),
            vout: 1,
        };
        assert_ne!(genesis_id(&a, 3), genesis_id(&b, 3));
        assert_ne!(genesis_id(&a, 3), genesis_id(&a, 4));
        assert_eq!(genesis_id(&a, 3), genesis_id(&a, 3));
    }
}
