//! Pay-to-Public-Key-Hash script template.

use nft_primitives::ec::PrivateKey;
use nft_script::opcodes::*;
use nft_script::{Address, Script};

use crate::sighash::SIGHASH_ALL_FORKID;
use crate::template::UnlockingScriptTemplate;
use crate::transaction::Transaction;
use crate::TransactionError;

/// Standard estimate for a P2PKH scriptSig:
/// push(72-byte DER sig + type) + push(33-byte compressed pubkey).
pub const UNLOCKING_SCRIPT_ESTIMATE: u32 = 106;

/// Build a P2PKH locking script for an address.
///
/// Produces `OP_DUP OP_HASH160 <pkh> OP_EQUALVERIFY OP_CHECKSIG`.
pub fn lock(address: &Address) -> Script {
    let mut bytes = Vec::with_capacity(25);
    bytes.push(OP_DUP);
    bytes.push(OP_HASH160);
    bytes.push(OP_DATA_20);
    bytes.extend_from_slice(&address.public_key_hash);
    bytes.push(OP_EQUALVERIFY);
    bytes.push(OP_CHECKSIG);
    Script::from_bytes(&bytes)
}

/// Create a P2PKH unlocker for the given key.
///
/// `sighash_flag` defaults to `SIGHASH_ALL | SIGHASH_FORKID`.
pub fn unlock(private_key: PrivateKey, sighash_flag: Option<u32>) -> P2pkhUnlocker {
    P2pkhUnlocker {
        private_key,
        sighash_flag: sighash_flag.unwrap_or(SIGHASH_ALL_FORKID),
    }
}

/// Build the unlocking script from an existing signature and public key.
///
/// Used by the external-signing flow where the DER signature (with the
/// sighash type byte already appended) was produced out of process.
pub fn unlocking_script(
    sig_with_type: &[u8],
    compressed_pubkey: &[u8],
) -> Result<Script, TransactionError> {
    let mut script = Script::new();
    script.append_push_data(sig_with_type)?;
    script.append_push_data(compressed_pubkey)?;
    Ok(script)
}

/// P2PKH signing template.
pub struct P2pkhUnlocker {
    private_key: PrivateKey,
    sighash_flag: u32,
}

impl UnlockingScriptTemplate for P2pkhUnlocker {
    fn sign(&self, tx: &Transaction, input_index: u32) -> Result<Script, TransactionError> {
        let idx = input_index as usize;
        if idx >= tx.inputs.len() {
            return Err(TransactionError::SigningError(format!(
                "input index {} out of range (tx has {} inputs)",
                idx,
                tx.inputs.len()
            )));
        }
        if tx.inputs[idx].source_output().is_none() {
            return Err(TransactionError::SigningError(
                "missing source output on input (no previous tx info)".to_string(),
            ));
        }

        let sig_hash = tx.calc_input_signature_hash(idx, self.sighash_flag)?;
        let signature = self.private_key.sign(&sig_hash)?;

        let mut sig_buf = signature.to_der();
        sig_buf.push(self.sighash_flag as u8);

        unlocking_script(&sig_buf, &self.private_key.pub_key().to_compressed())
    }

    fn estimate_length(&self, _tx: &Transaction, _input_index: u32) -> u32 {
        UNLOCKING_SCRIPT_ESTIMATE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::TransactionInput;
    use crate::output::TransactionOutput;
    use nft_script::Network;

    fn key_address() -> (PrivateKey, Address) {
        let key = PrivateKey::new();
        let address = Address::from_public_key_hash(&key.pub_key().hash160(), Network::Mainnet);
        (key, address)
    }

    fn spendable_tx(address: &Address) -> Transaction {
        let mut tx = Transaction::new();
        let mut input = TransactionInput::new();
        input.source_txid = [0xaa; 32];
        input.set_source_output(Some(TransactionOutput {
            satoshis: 10_000,
            locking_script: lock(address),
            change: false,
        }));
        tx.add_input(input);
        tx.add_output(TransactionOutput {
            satoshis: 9_000,
            locking_script: lock(address),
            change: false,
        });
        tx
    }

    #[test]
    fn lock_produces_p2pkh() {
        let (_, address) = key_address();
        let script = lock(&address);
        assert!(script.is_p2pkh());
        assert_eq!(script.p2pkh_pubkey_hash(), Some(address.public_key_hash));
    }

    #[test]
    fn sign_produces_verifiable_signature() {
        let (key, address) = key_address();
        let tx = spendable_tx(&address);

        let script = unlock(key.clone(), None).sign(&tx, 0).unwrap();

        // First push is the DER sig + type byte, second the pubkey.
        let (sig_bytes, next) = script.read_push_at(0).unwrap();
        let (pubkey_bytes, end) = script.read_push_at(next).unwrap();
        assert_eq!(end, script.len());
        assert_eq!(*sig_bytes.last().unwrap() as u32, SIGHASH_ALL_FORKID);
        assert_eq!(pubkey_bytes, key.pub_key().to_compressed());

        let sig = nft_primitives::ec::Signature::from_der(&sig_bytes[..sig_bytes.len() - 1])
            .unwrap();
        let hash = tx.calc_input_signature_hash(0, SIGHASH_ALL_FORKID).unwrap();
        assert!(key.pub_key().verify(&hash, &sig));
    }

    #[test]
    fn sign_without_source_output_fails() {
        let (key, address) = key_address();
        let mut tx = spendable_tx(&address);
        tx.inputs[0].set_source_output(None);
        assert!(unlock(key, None).sign(&tx, 0).is_err());
    }

    #[test]
    fn estimate_covers_real_script() {
        let (key, address) = key_address();
        let tx = spendable_tx(&address);
        let unlocker = unlock(key, None);
        let script = unlocker.sign(&tx, 0).unwrap();
        // DER length varies by a byte or two; the estimate is the standard cap.
        assert!(script.len() as u32 <= UNLOCKING_SCRIPT_ESTIMATE + 1);
    }
}
