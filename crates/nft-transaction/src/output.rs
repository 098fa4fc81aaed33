//! Transaction output: a satoshi value locked by a script.

use nft_primitives::util::{VarInt, WireReader, WireWriter};
use nft_script::Script;

use crate::TransactionError;

/// A single output of a transaction.
///
/// # Wire format
///
/// | Field          | Size            |
/// |----------------|-----------------|
/// | satoshis       | 8 bytes (LE)    |
/// | script length  | VarInt          |
/// | locking_script | variable        |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionOutput {
    /// Value in satoshis.
    pub satoshis: u64,
    /// The locking script guarding the value.
    pub locking_script: Script,
    /// Whether this output was added as change (not serialized).
    pub change: bool,
}

impl TransactionOutput {
    /// Deserialize an output from the reader.
    pub fn read_from(reader: &mut WireReader) -> Result<Self, TransactionError> {
        let satoshis = reader.read_u64_le().map_err(|e| {
            TransactionError::SerializationError(format!("reading satoshis: {e}"))
        })?;
        let script_len = reader.read_varint().map_err(|e| {
            TransactionError::SerializationError(format!("reading script length: {e}"))
        })?;
        let script_bytes = reader.read_bytes(script_len.value() as usize).map_err(|e| {
            TransactionError::SerializationError(format!("reading locking script: {e}"))
        })?;

        Ok(TransactionOutput {
            satoshis,
            locking_script: Script::from_bytes(script_bytes),
            change: false,
        })
    }

    /// Serialize this output to the writer.
    pub fn write_to(&self, writer: &mut WireWriter) {
        writer.write_u64_le(self.satoshis);
        writer.write_varint(VarInt::from(self.locking_script.len()));
        writer.write_bytes(self.locking_script.to_bytes());
    }

    /// Serialized byte length of this output.
    pub fn serialized_len(&self) -> usize {
        8 + VarInt::from(self.locking_script.len()).length() + self.locking_script.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_roundtrip() {
        let output = TransactionOutput {
            satoshis: 123_456,
            locking_script: Script::from_hex("76a914000000000000000000000000000000000000000088ac").unwrap(),
            change: false,
        };

        let mut writer = WireWriter::new();
        output.write_to(&mut writer);
        let bytes = writer.into_bytes();
        assert_eq!(bytes.len(), output.serialized_len());

        let mut reader = WireReader::new(&bytes);
        let restored = TransactionOutput::read_from(&mut reader).unwrap();
        assert_eq!(restored.satoshis, 123_456);
        assert_eq!(restored.locking_script, output.locking_script);
    }

    #[test]
    fn truncated_script_is_error() {
        // Claims a 10-byte script but provides 2.
        let mut writer = WireWriter::new();
        writer.write_u64_le(50);
        writer.write_varint(VarInt::from(10u64));
        writer.write_bytes(&[0x00, 0x01]);
        let bytes = writer.into_bytes();
        let mut reader = WireReader::new(&bytes);
        assert!(TransactionOutput::read_from(&mut reader).is_err());
    }
}
