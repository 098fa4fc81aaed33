//! Attestation payloads and quorum results.

use nft_primitives::chainhash::Hash;
use nft_primitives::hash::sha256;
use nft_transaction::Transaction;

use crate::OracleError;

/// Byte width of the canonical attestation payload:
/// txid(32) + vout(4) + satoshis(8) + script_hash(32) + height(4).
pub const PAYLOAD_LEN: usize = 80;

/// Canonical reference to the transaction output being attested.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputRef {
    /// Txid of the prior transaction.
    pub txid: Hash,
    /// Output index within the prior transaction.
    pub vout: u32,
    /// Satoshi value of the output.
    pub satoshis: u64,
    /// SHA-256 of the output's locking script.
    pub script_hash: [u8; 32],
    /// Block height of the prior transaction, 0 when unconfirmed.
    pub height: u32,
}

impl OutputRef {
    /// Derive a reference from a parsed prior transaction and output index.
    pub fn from_transaction(
        prior_tx: &Transaction,
        vout: u32,
        height: u32,
    ) -> Result<Self, OracleError> {
        let output = prior_tx.outputs.get(vout as usize).ok_or_else(|| {
            OracleError::AttestationRefused(format!(
                "vout {} out of range (tx has {} outputs)",
                vout,
                prior_tx.outputs.len()
            ))
        })?;
        Ok(OutputRef {
            txid: prior_tx.tx_hash(),
            vout,
            satoshis: output.satoshis,
            script_hash: sha256(output.locking_script.to_bytes()),
            height,
        })
    }

    /// The canonical digest input every signer signs.
    ///
    /// Fixed-width little-endian layout; this exact byte string is also
    /// pushed in the unlocking script so on-chain verification hashes the
    /// same bytes.
    pub fn payload(&self) -> [u8; PAYLOAD_LEN] {
        let mut out = [0u8; PAYLOAD_LEN];
        out[..32].copy_from_slice(self.txid.as_bytes());
        out[32..36].copy_from_slice(&self.vout.to_le_bytes());
        out[36..44].copy_from_slice(&self.satoshis.to_le_bytes());
        out[44..76].copy_from_slice(&self.script_hash);
        out[76..80].copy_from_slice(&self.height.to_le_bytes());
        out
    }
}

/// One signer's request context: the output reference plus the full prior
/// transaction it must be checked against.
#[derive(Clone, Debug)]
pub struct AttestRequest {
    /// The output being attested.
    pub output: OutputRef,
    /// Raw bytes of the prior transaction (wire format).
    pub prior_raw_tx: Vec<u8>,
}

/// One verified signature within a quorum attestation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttestationEntry {
    /// Index of the signer within the configured signer set.
    pub signer_index: usize,
    /// Rabin signature bytes, little-endian, padded to the signer's
    /// modulus width.
    pub signature_le: Vec<u8>,
    /// Zero-padding byte count used during signing.
    pub padding: u64,
}

/// The verified output of a quorum attestation round.
///
/// Entries are ordered by ascending signer index; the transaction builder
/// embeds them in that order so the on-chain layout is deterministic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuorumAttestation {
    /// The canonical payload all signatures cover.
    pub payload: [u8; PAYLOAD_LEN],
    /// One verified entry per selected signer.
    pub entries: Vec<AttestationEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use nft_script::Script;
    use nft_transaction::{TransactionInput, TransactionOutput};

    fn prior_tx() -> Transaction {
        let mut tx = Transaction::new();
        let mut input = TransactionInput::new();
        input.source_txid = [0x11; 32];
        tx.add_input(input);
        tx.add_output(TransactionOutput {
            satoshis: 4000,
            locking_script: Script::from_bytes(&[0x51, 0x52]),
            change: false,
        });
        tx
    }

    #[test]
    fn payload_layout() {
        let tx = prior_tx();
        let output_ref = OutputRef::from_transaction(&tx, 0, 7).unwrap();
        let payload = output_ref.payload();

        assert_eq!(&payload[..32], tx.tx_hash().as_bytes());
        assert_eq!(u32::from_le_bytes(payload[32..36].try_into().unwrap()), 0);
        assert_eq!(
            u64::from_le_bytes(payload[36..44].try_into().unwrap()),
            4000
        );
        assert_eq!(&payload[44..76], &sha256(&[0x51, 0x52]));
        assert_eq!(u32::from_le_bytes(payload[76..80].try_into().unwrap()), 7);
    }

    #[test]
    fn out_of_range_vout_refused() {
        let tx = prior_tx();
        assert!(OutputRef::from_transaction(&tx, 3, 0).is_err());
    }
}
