//! The [`Script`] byte-vector newtype.

use std::fmt;

use crate::opcodes::*;
use crate::ScriptError;

/// A Bitcoin script, wrapping the raw byte encoding.
///
/// Locking scripts (outputs) and unlocking scripts (inputs) share the
/// representation; construction helpers append opcodes and push-data
/// operations with the correct prefixes.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Script(Vec<u8>);

impl Script {
    /// Create an empty script.
    pub fn new() -> Self {
        Script(Vec::new())
    }

    /// Create a script from a hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, ScriptError> {
        let bytes =
            hex::decode(hex_str).map_err(|e| ScriptError::InvalidHex(e.to_string()))?;
        Ok(Script(bytes))
    }

    /// Create a script from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Script(bytes.to_vec())
    }

    /// Hex encoding of the script bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// The raw script bytes.
    pub fn to_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume the script, returning the byte vector.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Byte length of the script.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the script has no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append raw opcodes without push semantics.
    pub fn append_opcodes(&mut self, opcodes: &[u8]) {
        self.0.extend_from_slice(opcodes);
    }

    /// Append a data push with the minimal push prefix for its length.
    pub fn append_push_data(&mut self, data: &[u8]) -> Result<(), ScriptError> {
        let prefix = push_data_prefix(data.len())?;
        self.0.extend_from_slice(&prefix);
        self.0.extend_from_slice(data);
        Ok(())
    }

    /// Whether this is a standard P2PKH locking script.
    ///
    /// Pattern: `OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG`.
    pub fn is_p2pkh(&self) -> bool {
        let b = &self.0;
        b.len() == 25
            && b[0] == OP_DUP
            && b[1] == OP_HASH160
            && b[2] == OP_DATA_20
            && b[23] == OP_EQUALVERIFY
            && b[24] == OP_CHECKSIG
    }

    /// Extract the public key hash of a P2PKH locking script.
    pub fn p2pkh_pubkey_hash(&self) -> Option<[u8; 20]> {
        if !self.is_p2pkh() {
            return None;
        }
        let mut pkh = [0u8; 20];
        pkh.copy_from_slice(&self.0[3..23]);
        Some(pkh)
    }

    /// Whether this is a data-carrier (OP_RETURN) output script.
    pub fn is_data(&self) -> bool {
        let b = &self.0;
        (!b.is_empty() && b[0] == OP_RETURN)
            || (b.len() >= 2 && b[0] == OP_FALSE && b[1] == OP_RETURN)
    }

    /// Find the byte offset of the first top-level `OP_RETURN`, skipping
    /// push payloads so data bytes cannot alias the opcode.
    pub fn op_return_offset(&self) -> Option<usize> {
        let b = &self.0;
        let mut pos = 0usize;
        while pos < b.len() {
            let op = b[pos];
            match op {
                OP_RETURN => return Some(pos),
                OP_PUSHDATA1 => {
                    if pos + 2 > b.len() {
                        return None;
                    }
                    pos += 2 + b[pos + 1] as usize;
                }
                OP_PUSHDATA2 => {
                    if pos + 3 > b.len() {
                        return None;
                    }
                    pos += 3 + u16::from_le_bytes([b[pos + 1], b[pos + 2]]) as usize;
                }
                OP_PUSHDATA4 => {
                    if pos + 5 > b.len() {
                        return None;
                    }
                    pos += 5
                        + u32::from_le_bytes([
                            b[pos + 1],
                            b[pos + 2],
                            b[pos + 3],
                            b[pos + 4],
                        ]) as usize;
                }
                0x01..=0x4b => pos += 1 + op as usize,
                _ => pos += 1,
            }
        }
        None
    }

    /// Read the single data push starting at `offset`.
    ///
    /// Returns the payload and the offset one past its end.
    pub fn read_push_at(&self, offset: usize) -> Result<(&[u8], usize), ScriptError> {
        let b = &self.0;
        if offset >= b.len() {
            return Err(ScriptError::DataTooSmall);
        }
        let op = b[offset];
        let (data_start, len) = match op {
            // OP_0 pushes the empty byte array.
            0x00..=0x4b => (offset + 1, op as usize),
            OP_PUSHDATA1 => {
                if offset + 2 > b.len() {
                    return Err(ScriptError::DataTooSmall);
                }
                (offset + 2, b[offset + 1] as usize)
            }
            OP_PUSHDATA2 => {
                if offset + 3 > b.len() {
                    return Err(ScriptError::DataTooSmall);
                }
                (
                    offset + 3,
                    u16::from_le_bytes([b[offset + 1], b[offset + 2]]) as usize,
                )
            }
            _ => return Err(ScriptError::DataTooSmall),
        };
        if data_start + len > b.len() {
            return Err(ScriptError::DataTooSmall);
        }
        Ok((&b[data_start..data_start + len], data_start + len))
    }
}

/// The minimal push prefix for a payload of `data_len` bytes.
pub fn push_data_prefix(data_len: usize) -> Result<Vec<u8>, ScriptError> {
    if data_len <= 75 {
        Ok(vec![data_len as u8])
    } else if data_len <= 0xff {
        Ok(vec![OP_PUSHDATA1, data_len as u8])
    } else if data_len <= 0xffff {
        let mut buf = vec![OP_PUSHDATA2];
        buf.extend_from_slice(&(data_len as u16).to_le_bytes());
        Ok(buf)
    } else if data_len <= 0xffff_ffff {
        let mut buf = vec![OP_PUSHDATA4];
        buf.extend_from_slice(&(data_len as u32).to_le_bytes());
        Ok(buf)
    } else {
        Err(ScriptError::DataTooBig)
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", self.to_hex())
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
