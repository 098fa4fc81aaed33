//! Transaction input referencing a previous output.

use nft_primitives::util::{VarInt, WireReader, WireWriter};
use nft_script::Script;

use crate::output::TransactionOutput;
use crate::TransactionError;

/// Default sequence number for finalized inputs.
pub const DEFAULT_SEQUENCE_NUMBER: u32 = 0xFFFF_FFFF;

/// A single input of a transaction.
///
/// References the output being spent by txid (internal byte order) and
/// index. The optional `source_output` carries the spent output's locking
/// script and satoshi value, which the BIP-143 sighash commits to; it is
/// not serialized.
///
/// # Wire format
///
/// | Field               | Size            |
/// |---------------------|-----------------|
/// | source_txid         | 32 bytes        |
/// | source_tx_out_index | 4 bytes (LE)    |
/// | script length       | VarInt          |
/// | unlocking_script    | variable        |
/// | sequence_number     | 4 bytes (LE)    |
#[derive(Clone, Debug)]
pub struct TransactionInput {
    /// Txid of the output being spent (internal byte order).
    pub source_txid: [u8; 32],
    /// Index of the output within the source transaction.
    pub source_tx_out_index: u32,
    /// Sequence number; defaults to finalized.
    pub sequence_number: u32,
    /// The unlocking script, `None` until signed.
    pub unlocking_script: Option<Script>,
    /// The spent output, needed for sighash computation.
    source_output: Option<TransactionOutput>,
}

impl TransactionInput {
    /// Create an input with default fields.
    pub fn new() -> Self {
        TransactionInput {
            source_txid: [0u8; 32],
            source_tx_out_index: 0,
            sequence_number: DEFAULT_SEQUENCE_NUMBER,
            unlocking_script: None,
            source_output: None,
        }
    }

    /// Attach (or clear) the source output being spent.
    pub fn set_source_output(&mut self, output: Option<TransactionOutput>) {
        self.source_output = output;
    }

    /// The source output, if attached.
    pub fn source_output(&self) -> Option<&TransactionOutput> {
        self.source_output.as_ref()
    }

    /// Satoshi value of the source output, if attached.
    pub fn source_satoshis(&self) -> Option<u64> {
        self.source_output.as_ref().map(|o| o.satoshis)
    }

    /// Deserialize an input from the reader.
    pub fn read_from(reader: &mut WireReader) -> Result<Self, TransactionError> {
        let txid_bytes = reader.read_bytes(32).map_err(|e| {
            TransactionError::SerializationError(format!("reading source txid: {e}"))
        })?;
        let mut source_txid = [0u8; 32];
        source_txid.copy_from_slice(txid_bytes);

        let source_tx_out_index = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading output index: {e}"))
        })?;

        let script_len = reader.read_varint().map_err(|e| {
            TransactionError::SerializationError(format!("reading script length: {e}"))
        })?;
        let script_bytes = reader.read_bytes(script_len.value() as usize).map_err(|e| {
            TransactionError::SerializationError(format!("reading unlocking script: {e}"))
        })?;
        let unlocking_script = if script_bytes.is_empty() {
            None
        } else {
            Some(Script::from_bytes(script_bytes))
        };

        let sequence_number = reader.read_u32_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading sequence number: {e}"))
        })?;

        Ok(TransactionInput {
            source_txid,
            source_tx_out_index,
            sequence_number,
            unlocking_script,
            source_output: None,
        })
    }

    /// Serialize this input to the writer.
    pub fn write_to(&self, writer: &mut WireWriter) {
        writer.write_bytes(&self.source_txid);
        writer.write_u32_le(self.source_tx_out_index);
        match &self.unlocking_script {
            Some(script) => {
                writer.write_varint(VarInt::from(script.len()));
                writer.write_bytes(script.to_bytes());
            }
            None => writer.write_varint(VarInt::from(0u64)),
        }
        writer.write_u32_le(self.sequence_number);
    }
}

impl Default for TransactionInput {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_roundtrip() {
        let mut input = TransactionInput::new();
        input.source_txid = [0x11; 32];
        input.source_tx_out_index = 3;
        input.unlocking_script = Some(Script::from_bytes(&[0x51, 0x52]));

        let mut writer = WireWriter::new();
        input.write_to(&mut writer);
        let bytes = writer.into_bytes();

        let mut reader = WireReader::new(&bytes);
        let restored = TransactionInput::read_from(&mut reader).unwrap();
        assert_eq!(restored.source_txid, [0x11; 32]);
        assert_eq!(restored.source_tx_out_index, 3);
        assert_eq!(restored.sequence_number, DEFAULT_SEQUENCE_NUMBER);
        assert_eq!(
            restored.unlocking_script.unwrap().to_bytes(),
            &[0x51, 0x52]
        );
    }

    #[test]
    fn empty_unlocking_script_reads_as_none() {
        let input = TransactionInput::new();
        let mut writer = WireWriter::new();
        input.write_to(&mut writer);
        let bytes = writer.into_bytes();

        let mut reader = WireReader::new(&bytes);
        let restored = TransactionInput::read_from(&mut reader).unwrap();
        assert!(restored.unlocking_script.is_none());
    }
}
