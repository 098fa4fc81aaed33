//! The oracle signer abstraction and its in-process mock.

use std::future::Future;

use nft_primitives::hash::sha256;
use nft_primitives::rabin::{RabinPrivateKey, RabinPublicKey, RabinSignature};
use nft_transaction::Transaction;

use crate::attestation::AttestRequest;
use crate::OracleError;

/// A single oracle identity that can attest output references.
///
/// Implemented by [`OracleClient`](crate::OracleClient) for remote satotx
/// services and by [`MockOracleSigner`] for tests. The verifier side only
/// needs the Rabin public key; `attest` is the signer-side network call.
pub trait OracleSigner {
    /// The signer's Rabin verification key.
    fn rabin_public_key(&self) -> &RabinPublicKey;

    /// Attest the requested output, returning a Rabin signature over its
    /// canonical payload.
    ///
    /// The signer independently checks the output against the supplied
    /// prior transaction and refuses when they disagree.
    fn attest(
        &self,
        request: &AttestRequest,
    ) -> impl Future<Output = Result<RabinSignature, OracleError>> + Send;
}

/// In-process oracle signer holding its own Rabin primes.
///
/// Performs the same checks a remote satotx signer would: the prior
/// transaction must hash to the referenced txid, the output must exist,
/// and its satoshis and script hash must match the request.
#[derive(Clone, Debug)]
pub struct MockOracleSigner {
    key: RabinPrivateKey,
    public: RabinPublicKey,
}

impl MockOracleSigner {
    /// Create a signer from a Rabin signing key.
    pub fn new(key: RabinPrivateKey) -> Self {
        let public = key.public_key();
        Self { key, public }
    }

    /// Create a signer from decimal prime strings.
    pub fn from_decimal(p: &str, q: &str) -> Result<Self, OracleError> {
        Ok(Self::new(RabinPrivateKey::from_decimal(p, q)?))
    }

    fn check_request(&self, request: &AttestRequest) -> Result<(), OracleError> {
        let prior_tx = Transaction::from_bytes(&request.prior_raw_tx)?;

        if prior_tx.tx_hash() != request.output.txid {
            return Err(OracleError::AttestationRefused(format!(
                "prior tx hashes to {}, request references {}",
                prior_tx.tx_hash(),
                request.output.txid
            )));
        }

        let output = prior_tx
            .outputs
            .get(request.output.vout as usize)
            .ok_or_else(|| {
                OracleError::AttestationRefused(format!(
                    "vout {} out of range in {}",
                    request.output.vout, request.output.txid
                ))
            })?;

        if output.satoshis != request.output.satoshis {
            return Err(OracleError::AttestationRefused(format!(
                "satoshis mismatch: output carries {}, request claims {}",
                output.satoshis, request.output.satoshis
            )));
        }

        let script_hash = sha256(output.locking_script.to_bytes());
        if script_hash != request.output.script_hash {
            return Err(OracleError::AttestationRefused(
                "script hash mismatch".to_string(),
            ));
        }

        Ok(())
    }
}

impl OracleSigner for MockOracleSigner {
    fn rabin_public_key(&self) -> &RabinPublicKey {
        &self.public
    }

    async fn attest(&self, request: &AttestRequest) -> Result<RabinSignature, OracleError> {
        self.check_request(request)?;
        Ok(self.key.sign(&request.output.payload())?)
    }
}
