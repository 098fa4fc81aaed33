//! The quorum verifier: collect and verify one signature per selected
//! signer.

use crate::attestation::{AttestRequest, AttestationEntry, QuorumAttestation};
use crate::signer::OracleSigner;
use crate::OracleError;

/// A configured oracle signer set with a caller-chosen trusted subset.
///
/// Invariant (checked at construction): `selected` holds exactly
/// `required_verify_count` distinct in-range indices. There is no partial
/// quorum: every selected signer must produce a verifying signature or
/// the whole attestation fails.
pub struct SignerQuorum<S: OracleSigner> {
    signers: Vec<S>,
    selected: Vec<usize>,
}

impl<S: OracleSigner> SignerQuorum<S> {
    /// Build a quorum over `signers`, trusting the `selected` indices.
    ///
    /// `required_verify_count` is the expected size of the selection.
    ///
    /// # Errors
    /// Returns [`OracleError::InvalidSelection`] when the selection is
    /// empty, has the wrong arity, repeats an index, or references a
    /// signer that does not exist.
    pub fn new(
        signers: Vec<S>,
        selected: Vec<usize>,
        required_verify_count: usize,
    ) -> Result<Self, OracleError> {
        if signers.is_empty() {
            return Err(OracleError::InvalidSelection(
                "signer set is empty".to_string(),
            ));
        }
        if required_verify_count == 0 || required_verify_count > signers.len() {
            return Err(OracleError::InvalidSelection(format!(
                "required verify count {} out of range for {} signers",
                required_verify_count,
                signers.len()
            )));
        }
        if selected.len() != required_verify_count {
            return Err(OracleError::InvalidSelection(format!(
                "{} signers selected, {} required",
                selected.len(),
                required_verify_count
            )));
        }
        let mut sorted = selected.clone();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != selected.len() {
            return Err(OracleError::InvalidSelection(
                "selection repeats a signer index".to_string(),
            ));
        }
        if let Some(&bad) = sorted.iter().find(|&&idx| idx >= signers.len()) {
            return Err(OracleError::InvalidSelection(format!(
                "selected index {} out of range for {} signers",
                bad,
                signers.len()
            )));
        }

        // Entries embed in ascending index order regardless of how the
        // caller listed the selection.
        Ok(Self {
            signers,
            selected: sorted,
        })
    }

    /// The selected signer indices, ascending.
    pub fn selected(&self) -> &[usize] {
        &self.selected
    }

    /// The full signer set.
    pub fn signers(&self) -> &[S] {
        &self.signers
    }

    /// Total signature bytes a quorum attestation contributes to an
    /// unlocking script, before push prefixes.
    pub fn signature_bytes_len(&self) -> usize {
        self.selected
            .iter()
            .map(|&idx| self.signers[idx].rabin_public_key().byte_len())
            .sum()
    }

    /// Request an attestation from every selected signer and verify each
    /// returned signature.
    ///
    /// # Errors
    /// Any signer refusal or transport failure aborts the round; a
    /// signature that does not verify against its signer's public key
    /// yields [`OracleError::VerifyFailed`] for that signer.
    pub async fn attest_output(
        &self,
        request: &AttestRequest,
    ) -> Result<QuorumAttestation, OracleError> {
        let payload = request.output.payload();
        let mut entries = Vec::with_capacity(self.selected.len());

        for &signer_index in &self.selected {
            let signer = &self.signers[signer_index];
            let signature = signer.attest(request).await?;

            let public = signer.rabin_public_key();
            if !public.verify(&payload, &signature) {
                return Err(OracleError::VerifyFailed { signer_index });
            }

            entries.push(AttestationEntry {
                signer_index,
                signature_le: signature.to_bytes_le(public.byte_len()),
                padding: signature.padding(),
            });
        }

        Ok(QuorumAttestation { payload, entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attestation::OutputRef;
    use crate::signer::MockOracleSigner;
    use nft_script::Script;
    use nft_transaction::{Transaction, TransactionInput, TransactionOutput};

    const PRIMES: [(&str, &str); 3] = [
        (
            "9097722629658742293420164578669589841085955461180077367949962570265327809330787612920943525832253321016059488904439217610557062309293622829749956284685663",
            "9126947698968185300906443468174075795240339607655376474995985065589996990930531271347872860645128582337718364760483431238305785744054838671606080407999619",
        ),
        (
            "10013370081971838732064932824917489126779544859551628210452373322882599766074628419328363087228144282926181507163047411352342902093561348518988770738794651",
            "13158645327263022664430689347689524371558011089472609974341971392560184982122314889439464550107857266816504095569123077137128140607777943854590772860939827",
        ),
        (
            "13352088763191772085690521886016808102779538554796009145392079117046597834345702050583448331572235884104844739444126661853290185888735819596276130241110339",
            "8212303872810458802270427976413549999192423370370833463652832494890487001606150735044481455982754310609410431949677377369930964474268909911701899464990447",
        ),
    ];

    fn signers() -> Vec<MockOracleSigner> {
        PRIMES
            .iter()
            .map(|(p, q)| MockOracleSigner::from_decimal(p, q).unwrap())
            .collect()
    }

    fn request() -> AttestRequest {
        let mut tx = Transaction::new();
        tx.add_input(TransactionInput::new());
        tx.add_output(TransactionOutput {
            satoshis: 546,
            locking_script: Script::from_bytes(&[0x51]),
            change: false,
        });
        AttestRequest {
            output: OutputRef::from_transaction(&tx, 0, 0).unwrap(),
            prior_raw_tx: tx.to_bytes(),
        }
    }

    #[tokio::test]
    async fn full_round_verifies_every_signer() {
        let quorum = SignerQuorum::new(signers(), vec![2, 0], 2).unwrap();
        let attestation = quorum.attest_output(&request()).await.unwrap();

        assert_eq!(attestation.entries.len(), 2);
        // Ascending order regardless of the selection order given.
        assert_eq!(attestation.entries[0].signer_index, 0);
        assert_eq!(attestation.entries[1].signer_index, 2);
    }

    #[tokio::test]
    async fn refusal_fails_whole_round() {
        let quorum = SignerQuorum::new(signers(), vec![0, 1], 2).unwrap();
        let mut req = request();
        req.output.satoshis += 1;
        assert!(quorum.attest_output(&req).await.is_err());
    }

    #[test]
    fn arity_violations_rejected() {
        assert!(SignerQuorum::new(signers(), vec![0, 1, 2], 2).is_err());
        assert!(SignerQuorum::new(signers(), vec![0, 0], 2).is_err());
        assert!(SignerQuorum::new(signers(), vec![0, 5], 2).is_err());
        assert!(SignerQuorum::new(signers(), vec![], 0).is_err());
        assert!(SignerQuorum::new(Vec::<MockOracleSigner>::new(), vec![], 0).is_err());
    }

    #[test]
    fn signature_bytes_len_sums_selected_widths() {
        let quorum = SignerQuorum::new(signers(), vec![0, 1], 2).unwrap();
        let expected: usize = [0usize, 1]
            .iter()
            .map(|&i| signers()[i].rabin_public_key().byte_len())
            .sum();
        assert_eq!(quorum.signature_bytes_len(), expected);
    }
}
