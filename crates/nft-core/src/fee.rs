//! Deterministic transaction sizing and fee estimation.
//!
//! Every size here is an exact upper bound for the transaction the
//! builder produces with the same parameters: signature pushes are
//! counted at their maximum DER width, everything else is fixed. The
//! estimate is therefore never exceeded by the real transaction, and it
//! is monotonically non-decreasing in the fee-UTXO count and in the
//! opreturn payload length.

use nft_primitives::util::VarInt;
use nft_script::script::push_data_prefix;

use crate::script::{builder::code_part_len, PAYLOAD_LEN};

/// Satoshis carried by every protocol output.
pub const TOKEN_OUTPUT_SATOSHIS: u64 = 546;

/// Outputs below this value are donated to the fee instead of creating
/// dust change.
pub const DUST_LIMIT: u64 = 546;

/// version(4) + input count(1) + output count(1) + locktime(4).
const TX_OVERHEAD: usize = 10;

/// outpoint(36) + script varint(1) + max P2PKH scriptSig(107) + sequence(4).
const P2PKH_INPUT_SIZE: usize = 148;

/// A change output: 8 + varint(25) + 25-byte P2PKH script.
const CHANGE_OUTPUT_SIZE: usize = 34;

/// Maximum DER signature width plus the sighash type byte.
const MAX_SIG_PUSH: usize = 1 + 72 + 1;

/// Compressed public key push.
const PUBKEY_PUSH: usize = 1 + 33;

/// The lifecycle operation being sized.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpKind {
    /// Genesis: fee inputs only; mint-slot output.
    Genesis,
    /// Issue: mint-slot input; mint-slot and token outputs.
    Issue,
    /// Transfer: token input; token output.
    Transfer,
}

/// Fee-relevant quorum shape: the modulus widths of the selected signers.
#[derive(Clone, Debug)]
pub struct QuorumShape {
    /// Verification arity (one Rabin round per selected signer).
    pub verify_count: usize,
    /// Byte width of each selected signer's modulus.
    pub signature_widths: Vec<usize>,
}

impl QuorumShape {
    /// Size of a token input's unlocking script, at maximum signature width.
    pub fn token_unlock_len(&self) -> usize {
        let payload_push = push_len(nft_oracle::attestation::PAYLOAD_LEN);
        let signatures: usize = self
            .signature_widths
            .iter()
            .map(|&w| push_len(w) + push_len(1))
            .sum();
        let indices_push = push_len(self.signature_widths.len());
        MAX_SIG_PUSH + PUBKEY_PUSH + payload_push + signatures + indices_push
    }
}

/// Serialized size of one data push (prefix + payload).
fn push_len(data_len: usize) -> usize {
    // The prefix encoding never fails for the sizes used here.
    push_data_prefix(data_len).map(|p| p.len()).unwrap_or(5) + data_len
}

/// Size of a serialized input with an unlocking script of `unlock_len`.
fn input_size(unlock_len: usize) -> usize {
    36 + VarInt::from(unlock_len).length() + unlock_len + 4
}

/// Size of a protocol output for the given verification arity.
fn token_output_size(verify_count: usize) -> usize {
    let script_len = code_part_len(verify_count) + 1 + push_len(PAYLOAD_LEN);
    8 + VarInt::from(script_len).length() + script_len
}

/// Size of an `OP_FALSE OP_RETURN <data>` output.
fn opreturn_output_size(data_len: usize) -> usize {
    let script_len = 2 + push_len(data_len);
    8 + VarInt::from(script_len).length() + script_len
}

/// Upper-bound serialized size for an operation.
///
/// `fee_input_count` and `opreturn_len` must match what the real build
/// will use; a change output is always included in the bound.
pub fn estimate_size(
    op: OpKind,
    quorum: &QuorumShape,
    fee_input_count: usize,
    opreturn_len: Option<usize>,
) -> usize {
    let mut size = TX_OVERHEAD;

    match op {
        OpKind::Genesis => {
            size += token_output_size(quorum.verify_count);
        }
        OpKind::Issue => {
            size += input_size(quorum.token_unlock_len());
            size += 2 * token_output_size(quorum.verify_count);
        }
        OpKind::Transfer => {
            size += input_size(quorum.token_unlock_len());
            size += token_output_size(quorum.verify_count);
        }
    }

    size += fee_input_count * P2PKH_INPUT_SIZE;
    if let Some(len) = opreturn_len {
        size += opreturn_output_size(len);
    }
    size += CHANGE_OUTPUT_SIZE;
    size
}

/// Satoshis of protocol outputs an operation creates.
pub fn protocol_output_satoshis(op: OpKind) -> u64 {
    match op {
        OpKind::Genesis | OpKind::Transfer => TOKEN_OUTPUT_SATOSHIS,
        OpKind::Issue => 2 * TOKEN_OUTPUT_SATOSHIS,
    }
}

/// Fee in satoshis for a transaction of `size` bytes at `feeb` sat/byte.
pub fn fee_for_size(size: usize, feeb: f64) -> u64 {
    (size as f64 * feeb).ceil() as u64
}

/// Total satoshis a caller must fund for an operation: protocol outputs
/// plus the size fee at the given parameters.
pub fn estimate_funding(
    op: OpKind,
    quorum: &QuorumShape,
    fee_input_count: usize,
    opreturn_len: Option<usize>,
    feeb: f64,
) -> u64 {
    let size = estimate_size(op, quorum, fee_input_count, opreturn_len);
    protocol_output_satoshis(op) + fee_for_size(size, feeb)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quorum() -> QuorumShape {
        QuorumShape {
            verify_count: 3,
            signature_widths: vec![128, 128, 128],
        }
    }

    #[test]
    fn monotonic_in_opreturn_len() {
        let q = quorum();
        let mut last = 0;
        for len in [0usize, 1, 8, 75, 76, 255, 1000] {
            let size = estimate_size(OpKind::Issue, &q, 2, Some(len));
            assert!(size > last);
            last = size;
        }
        // Present-but-empty opreturn still costs more than absent.
        assert!(
            estimate_size(OpKind::Issue, &q, 2, Some(0))
                > estimate_size(OpKind::Issue, &q, 2, None)
        );
    }

    #[test]
    fn monotonic_in_fee_input_count() {
        let q = quorum();
        let mut last = 0;
        for count in 1..=10 {
            let size = estimate_size(OpKind::Transfer, &q, count, None);
            assert!(size > last);
            last = size;
        }
    }

    #[test]
    fn issue_is_largest_operation() {
        let q = quorum();
        let genesis = estimate_size(OpKind::Genesis, &q, 3, None);
        let issue = estimate_size(OpKind::Issue, &q, 3, None);
        let transfer = estimate_size(OpKind::Transfer, &q, 3, None);
        assert!(issue > transfer);
        assert!(transfer > genesis);
    }

    #[test]
    fn fee_rounds_up() {
        assert_eq!(fee_for_size(100, 0.5), 50);
        assert_eq!(fee_for_size(101, 0.5), 51);
        assert_eq!(fee_for_size(3, 1.0), 3);
    }

    #[test]
    fn funding_covers_protocol_outputs() {
        let q = quorum();
        let funding = estimate_funding(OpKind::Issue, &q, 1, None, 0.5);
        assert!(funding > 2 * TOKEN_OUTPUT_SATOSHIS);
    }
}
