//! Script templates for signing transaction inputs.

pub mod p2pkh;

use nft_script::Script;

use crate::transaction::Transaction;
use crate::TransactionError;

/// A signing strategy that produces unlocking scripts.
///
/// Implementations compute the appropriate signature hash for the input,
/// sign it, and assemble the unlocking script. `estimate_length` supports
/// fee calculation before any signature exists.
pub trait UnlockingScriptTemplate {
    /// Produce the unlocking script for the given input.
    fn sign(&self, tx: &Transaction, input_index: u32) -> Result<Script, TransactionError>;

    /// Estimated byte length of the unlocking script.
    fn estimate_length(&self, tx: &Transaction, input_index: u32) -> u32;
}
