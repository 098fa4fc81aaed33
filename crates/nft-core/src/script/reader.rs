//! Locking-script parsing.

use nft_primitives::hash::hash160;
use nft_script::opcodes::{OP_CHECKSIG, OP_DATA_20, OP_DUP, OP_HASH160, OP_RETURN};
use nft_script::Script;

use crate::script::builder::{code_part_len, NftPayload};
use crate::script::PAYLOAD_LEN;

/// A successfully parsed protocol locking script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedNftScript {
    /// Hash160 of the code part.
    pub codehash: [u8; 20],
    /// The decoded state payload.
    pub payload: NftPayload,
}

/// Parse a locking script as a protocol output.
///
/// Returns `None` for anything that does not match the protocol shape:
/// a code part of at least single-round length opening with the oracle
/// commitment and closing with `OP_CHECKSIG`, a top-level `OP_RETURN`,
/// and exactly one [`PAYLOAD_LEN`]-byte push with nothing after it.
pub fn read_locking_script(script: &Script) -> Option<ParsedNftScript> {
    let offset = script.op_return_offset()?;
    let bytes = script.to_bytes();
    if offset < code_part_len(1) {
        // Too short for any code part; a bare data carrier lands here.
        return None;
    }
    debug_assert_eq!(bytes[offset], OP_RETURN);
    if bytes[0] != OP_DUP
        || bytes[1] != OP_HASH160
        || bytes[2] != OP_DATA_20
        || bytes[offset - 1] != OP_CHECKSIG
    {
        return None;
    }

    let (payload_bytes, end) = script.read_push_at(offset + 1).ok()?;
    if payload_bytes.len() != PAYLOAD_LEN || end != script.len() {
        return None;
    }
    let payload = NftPayload::from_bytes(payload_bytes)?;

    Some(ParsedNftScript {
        codehash: hash160(&script.to_bytes()[..offset]),
        payload,
    })
}
