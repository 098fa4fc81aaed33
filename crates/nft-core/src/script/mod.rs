//! Protocol locking-script construction and parsing.
//!
//! Every protocol output uses the same shape:
//! `CODE_PART || OP_RETURN || PUSH(payload)`. The code part is the fixed
//! verification template (patched with the oracle signer-set commitment),
//! and its hash160 is the series codehash. The payload carries the token
//! state: kind flag, total supply, ordinal, owner, and genesis id.

pub mod builder;
pub mod reader;

pub use builder::{build_locking_script, code_part, code_part_len, genesis_id, NftPayload};
pub use reader::{read_locking_script, ParsedNftScript};

/// Byte width of the state payload:
/// flag(1) + total_supply(8) + token_index(8) + owner_pkh(20) + genesis_id(20).
pub const PAYLOAD_LEN: usize = 57;

/// Flag byte marking the mint-slot output.
pub const FLAG_MINT_SLOT: u8 = 1;

/// Flag byte marking an issued token output.
pub const FLAG_ISSUED: u8 = 0;
