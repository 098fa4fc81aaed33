//! Greedy fee-UTXO selection.

use crate::types::FeeUtxo;
use crate::NftError;

/// The outcome of a selection round.
#[derive(Clone, Debug)]
pub struct Selection {
    /// The chosen UTXOs, in selection order.
    pub utxos: Vec<FeeUtxo>,
    /// Sum of the chosen values.
    pub total: u64,
}

/// Select fee UTXOs to cover a target that grows with each added input.
///
/// Candidates are tried largest-first. `target_for` maps an input count
/// to the satoshis that many inputs must cover (outputs plus the fee for
/// a transaction of that shape); selection stops at the first count whose
/// cumulative value reaches its own target.
///
/// # Errors
/// Returns [`NftError::InsufficientFunds`] when every admissible count up
/// to `max_count` (bounded by the candidate set) falls short. The error
/// carries the final deficit so callers can re-fund precisely.
pub fn select_fee_utxos(
    candidates: &[FeeUtxo],
    max_count: usize,
    target_for: impl Fn(usize) -> u64,
) -> Result<Selection, NftError> {
    let mut sorted: Vec<&FeeUtxo> = candidates.iter().collect();
    sorted.sort_by(|a, b| b.satoshis.cmp(&a.satoshis));

    let limit = max_count.min(sorted.len());
    let mut total = 0u64;
    let mut chosen = Vec::new();

    for (count, utxo) in sorted.iter().take(limit).enumerate() {
        total += utxo.satoshis;
        chosen.push((*utxo).clone());
        if total >= target_for(count + 1) {
            return Ok(Selection {
                utxos: chosen,
                total,
            });
        }
    }

    Err(NftError::InsufficientFunds {
        needed: target_for(limit.max(1)),
        available: total,
    })
}
