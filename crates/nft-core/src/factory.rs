//! Transaction assembly helpers shared by the lifecycle operations.
//!
//! Input ordering is a protocol contract: the token-carrying input (if
//! the operation has one) is always input 0, fee inputs follow in
//! selection order. Output ordering is protocol outputs first, then the
//! optional opreturn output, then change. Signature-hash descriptors are
//! derived from this ordering, so changing it is a breaking change.

use nft_oracle::QuorumAttestation;
use nft_primitives::ec::{PrivateKey, PublicKey};
use nft_script::opcodes::{OP_FALSE, OP_RETURN};
use nft_script::{Address, Script};
use nft_transaction::sighash::SIGHASH_ALL_FORKID;
use nft_transaction::template::p2pkh;
use nft_transaction::template::UnlockingScriptTemplate;
use nft_transaction::{Transaction, TransactionOutput};

use crate::types::{FeeUtxo, Outpoint, SigHashDescriptor};
use crate::NftError;

/// What kind of unlocking script an input will carry, and whose key must
/// sign it.
#[derive(Clone, Debug)]
pub struct InputRole {
    /// Address whose key signs this input.
    pub address: Address,
    /// Plain P2PKH fee input, or a token input with attestation data.
    pub is_p2pkh: bool,
}

/// Append a fee input spending a P2PKH UTXO.
pub fn add_fee_input(tx: &mut Transaction, utxo: &FeeUtxo) {
    tx.add_input_from(
        &utxo.outpoint.txid,
        utxo.outpoint.vout,
        p2pkh::lock(&utxo.address),
        utxo.satoshis,
    );
}

/// Append the token input spending a protocol output.
///
/// `locking_script` is the spent output's script, taken from the prior
/// transaction; the sighash commits to it.
pub fn add_token_input(
    tx: &mut Transaction,
    outpoint: &Outpoint,
    satoshis: u64,
    locking_script: Script,
) {
    tx.add_input_from(&outpoint.txid, outpoint.vout, locking_script, satoshis);
}

/// Build an `OP_FALSE OP_RETURN <data>` output.
pub fn opreturn_output(data: &[u8]) -> Result<TransactionOutput, NftError> {
    let mut script = Script::new();
    script.append_opcodes(&[OP_FALSE, OP_RETURN]);
    script.append_push_data(data)?;
    Ok(TransactionOutput {
        satoshis: 0,
        locking_script: script,
        change: false,
    })
}

/// Build a change output paying back to `address`.
pub fn change_output(satoshis: u64, address: &Address) -> TransactionOutput {
    TransactionOutput {
        satoshis,
        locking_script: p2pkh::lock(address),
        change: true,
    }
}

/// Encode a quorum attestation as unlocking-script pushes.
///
/// Layout: `PUSH(payload)`, then per selected signer in ascending index
/// order `PUSH(signature_le) PUSH(padding)`, then `PUSH(indices)`. In the
/// unsigned flow this suffix is stored on the input as-is; signing
/// prepends the owner signature and public key pushes.
pub fn attestation_suffix(attestation: &QuorumAttestation) -> Result<Script, NftError> {
    let mut script = Script::new();
    script.append_push_data(&attestation.payload)?;
    for entry in &attestation.entries {
        script.append_push_data(&entry.signature_le)?;
        script.append_push_data(&[entry.padding as u8])?;
    }
    let indices: Vec<u8> = attestation
        .entries
        .iter()
        .map(|e| e.signer_index as u8)
        .collect();
    script.append_push_data(&indices)?;
    Ok(script)
}

/// Assemble a token input's full unlocking script from an existing
/// signature, its public key, and the attestation suffix.
pub fn token_unlocking_script(
    sig_with_type: &[u8],
    public_key: &PublicKey,
    suffix: &Script,
) -> Result<Script, NftError> {
    let mut script = Script::new();
    script.append_push_data(sig_with_type)?;
    script.append_push_data(&public_key.to_compressed())?;
    script.append_opcodes(suffix.to_bytes());
    Ok(script)
}

/// Sign one input in-process and return its full unlocking script.
///
/// Token inputs (`suffix` present) get the owner signature and public
/// key prepended to the attestation pushes; fee inputs go through the
/// standard P2PKH template.
pub fn sign_input(
    tx: &Transaction,
    input_index: usize,
    key: &PrivateKey,
    suffix: Option<&Script>,
) -> Result<Script, NftError> {
    match suffix {
        Some(suffix) => {
            let sighash = tx.calc_input_signature_hash(input_index, SIGHASH_ALL_FORKID)?;
            let signature = key.sign(&sighash)?;
            let mut sig_buf = signature.to_der();
            sig_buf.push(SIGHASH_ALL_FORKID as u8);
            token_unlocking_script(&sig_buf, &key.pub_key(), suffix)
        }
        None => Ok(p2pkh::unlock(key.clone(), None).sign(tx, input_index as u32)?),
    }
}

/// Compute the signature-hash descriptor list for a fully structured
/// transaction.
///
/// One descriptor per input, in input order; `roles` must align with the
/// transaction's inputs.
pub fn sighash_descriptors(
    tx: &Transaction,
    roles: &[InputRole],
) -> Result<Vec<SigHashDescriptor>, NftError> {
    debug_assert_eq!(tx.input_count(), roles.len());
    let mut descriptors = Vec::with_capacity(roles.len());
    for (index, role) in roles.iter().enumerate() {
        let sighash = tx.calc_input_signature_hash(index, SIGHASH_ALL_FORKID)?;
        descriptors.push(SigHashDescriptor {
            sighash: hex::encode(sighash),
            sighash_type: SIGHASH_ALL_FORKID,
            address: role.address.address_string.clone(),
            input_index: index as u32,
            is_p2pkh: role.is_p2pkh,
        });
    }
    Ok(descriptors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nft_oracle::AttestationEntry;
    use nft_primitives::chainhash::Hash;
    use nft_script::Network;

    fn address(salt: u8) -> Address {
        Address::from_public_key_hash(&[salt; 20], Network::Mainnet)
    }

    fn fee_utxo(satoshis: u64) -> FeeUtxo {
        FeeUtxo {
            outpoint: Outpoint {
                txid: Hash::from_bytes(&[0xab; 32]).unwrap(),
                vout: 1,
            },
            satoshis,
            address: address(5),
            wif: None,
        }
    }

    fn attestation() -> QuorumAttestation {
        QuorumAttestation {
            payload: [0x17; nft_oracle::attestation::PAYLOAD_LEN],
            entries: vec![
                AttestationEntry {
                    signer_index: 0,
                    signature_le: vec![0x01; 128],
                    padding: 2,
                },
                AttestationEntry {
                    signer_index: 3,
                    signature_le: vec![0x02; 128],
                    padding: 0,
                },
            ],
        }
    }

    #[test]
    fn fee_input_attaches_source_output() {
        let mut tx = Transaction::new();
        add_fee_input(&mut tx, &fee_utxo(9000));
        assert_eq!(tx.input_count(), 1);
        assert_eq!(tx.inputs[0].source_satoshis(), Some(9000));
        assert!(tx.inputs[0]
            .source_output()
            .unwrap()
            .locking_script
            .is_p2pkh());
    }

    #[test]
    fn attestation_suffix_layout() {
        let suffix = attestation_suffix(&attestation()).unwrap();

        let (payload, next) = suffix.read_push_at(0).unwrap();
        assert_eq!(payload, [0x17; nft_oracle::attestation::PAYLOAD_LEN]);

        let (sig0, next) = suffix.read_push_at(next).unwrap();
        assert_eq!(sig0.len(), 128);
        let (pad0, next) = suffix.read_push_at(next).unwrap();
        assert_eq!(pad0, [2]);

        let (_sig1, next) = suffix.read_push_at(next).unwrap();
        let (pad1, next) = suffix.read_push_at(next).unwrap();
        assert_eq!(pad1, [0]);

        let (indices, end) = suffix.read_push_at(next).unwrap();
        assert_eq!(indices, [0, 3]);
        assert_eq!(end, suffix.len());
    }

    #[test]
    fn opreturn_output_is_data() {
        let output = opreturn_output(b"11111111").unwrap();
        assert_eq!(output.satoshis, 0);
        assert!(output.locking_script.is_data());
    }

    #[test]
    fn change_output_pays_address() {
        let output = change_output(777, &address(9));
        assert!(output.change);
        assert_eq!(
            output.locking_script.p2pkh_pubkey_hash(),
            Some([9u8; 20])
        );
    }

    #[test]
    fn descriptors_follow_input_order() {
        let mut tx = Transaction::new();
        add_fee_input(&mut tx, &fee_utxo(1000));
        add_fee_input(&mut tx, &fee_utxo(2000));
        let roles = vec![
            InputRole {
                address: address(1),
                is_p2pkh: true,
            },
            InputRole {
                address: address(2),
                is_p2pkh: true,
            },
        ];
        let descriptors = sighash_descriptors(&tx, &roles).unwrap();
        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[0].input_index, 0);
        assert_eq!(descriptors[1].input_index, 1);
        assert_eq!(descriptors[0].address, address(1).address_string);
        assert_ne!(descriptors[0].sighash, descriptors[1].sighash);
        assert_eq!(descriptors[0].sighash_type, SIGHASH_ALL_FORKID);
    }
}
