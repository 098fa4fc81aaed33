//! BIP-143 (FORKID) signature hash computation.
//!
//! BSV uses the BIP-143 digest algorithm for all post-UAHF transactions;
//! the FORKID bit in the sighash type provides replay protection. The
//! digest commits to the value being spent, so inputs can be signed
//! without the full previous transaction.

use nft_primitives::hash::sha256d;
use nft_primitives::util::{VarInt, WireWriter};

use crate::transaction::Transaction;
use crate::TransactionError;

/// Sign all inputs and all outputs.
pub const SIGHASH_ALL: u32 = 0x01;
/// Sign all inputs, no outputs.
pub const SIGHASH_NONE: u32 = 0x02;
/// Sign all inputs and only the same-index output.
pub const SIGHASH_SINGLE: u32 = 0x03;
/// Sign only the current input.
pub const SIGHASH_ANYONECANPAY: u32 = 0x80;
/// Replay-protection bit required on BSV.
pub const SIGHASH_FORKID: u32 = 0x40;
/// The standard BSV sighash type.
pub const SIGHASH_ALL_FORKID: u32 = SIGHASH_ALL | SIGHASH_FORKID;
/// Mask extracting the base type.
pub const SIGHASH_MASK: u32 = 0x1f;

/// Compute the signature hash for an input.
///
/// # Arguments
/// * `tx` - The transaction being signed.
/// * `input_index` - Index of the input being signed.
/// * `prev_output_script` - Locking script of the output being spent.
/// * `sighash_type` - Combined sighash flags.
/// * `satoshis` - Value of the output being spent.
pub fn signature_hash(
    tx: &Transaction,
    input_index: usize,
    prev_output_script: &[u8],
    sighash_type: u32,
    satoshis: u64,
) -> Result<[u8; 32], TransactionError> {
    let preimage = calc_preimage(tx, input_index, prev_output_script, sighash_type, satoshis)?;
    Ok(sha256d(&preimage))
}

/// Build the BIP-143 preimage bytes (the data that is double-hashed).
///
/// Layout: version, hashPrevouts, hashSequence, outpoint, scriptCode,
/// value, sequence, hashOutputs, locktime, sighash type.
pub fn calc_preimage(
    tx: &Transaction,
    input_index: usize,
    prev_output_script: &[u8],
    sighash_type: u32,
    satoshis: u64,
) -> Result<Vec<u8>, TransactionError> {
    let input = tx.inputs.get(input_index).ok_or_else(|| {
        TransactionError::InvalidTransaction(format!(
            "input index {} out of range (tx has {} inputs)",
            input_index,
            tx.inputs.len()
        ))
    })?;

    let base_type = sighash_type & SIGHASH_MASK;
    let anyone_can_pay = sighash_type & SIGHASH_ANYONECANPAY != 0;

    let hash_prevouts = if anyone_can_pay {
        [0u8; 32]
    } else {
        prevouts_hash(tx)
    };

    let hash_sequence =
        if anyone_can_pay || base_type == SIGHASH_SINGLE || base_type == SIGHASH_NONE {
            [0u8; 32]
        } else {
            sequence_hash(tx)
        };

    let hash_outputs = match base_type {
        SIGHASH_SINGLE if input_index < tx.outputs.len() => {
            let mut writer = WireWriter::new();
            tx.outputs[input_index].write_to(&mut writer);
            sha256d(&writer.into_bytes())
        }
        SIGHASH_SINGLE | SIGHASH_NONE => [0u8; 32],
        _ => outputs_hash(tx),
    };

    let mut writer = WireWriter::with_capacity(180 + prev_output_script.len());
    writer.write_u32_le(tx.version);
    writer.write_bytes(&hash_prevouts);
    writer.write_bytes(&hash_sequence);
    writer.write_bytes(&input.source_txid);
    writer.write_u32_le(input.source_tx_out_index);
    writer.write_varint(VarInt::from(prev_output_script.len()));
    writer.write_bytes(prev_output_script);
    writer.write_u64_le(satoshis);
    writer.write_u32_le(input.sequence_number);
    writer.write_bytes(&hash_outputs);
    writer.write_u32_le(tx.lock_time);
    writer.write_u32_le(sighash_type);

    Ok(writer.into_bytes())
}

/// Double hash of all input outpoints.
fn prevouts_hash(tx: &Transaction) -> [u8; 32] {
    let mut writer = WireWriter::with_capacity(tx.inputs.len() * 36);
    for input in &tx.inputs {
        writer.write_bytes(&input.source_txid);
        writer.write_u32_le(input.source_tx_out_index);
    }
    sha256d(&writer.into_bytes())
}

/// Double hash of all input sequence numbers.
fn sequence_hash(tx: &Transaction) -> [u8; 32] {
    let mut writer = WireWriter::with_capacity(tx.inputs.len() * 4);
    for input in &tx.inputs {
        writer.write_u32_le(input.sequence_number);
    }
    sha256d(&writer.into_bytes())
}

/// Double hash of all serialized outputs.
fn outputs_hash(tx: &Transaction) -> [u8; 32] {
    let mut writer = WireWriter::new();
    for output in &tx.outputs {
        output.write_to(&mut writer);
    }
    sha256d(&writer.into_bytes())
}
