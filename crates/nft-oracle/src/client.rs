//! HTTP client for a remote satotx-style oracle signer.

use nft_primitives::rabin::{RabinPublicKey, RabinSignature};
use serde::{Deserialize, Serialize};

use crate::attestation::AttestRequest;
use crate::signer::OracleSigner;
use crate::OracleError;

/// Configuration for an [`OracleClient`].
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// Base URL of the oracle service.
    pub base_url: String,
    /// Optional authentication token sent via the `token` header.
    pub token: Option<String>,
}

/// Attestation request body sent to the oracle service.
#[derive(Debug, Serialize)]
struct AttestBody {
    txid: String,
    vout: u32,
    satoshis: u64,
    #[serde(rename = "scriptHash")]
    script_hash: String,
    height: u32,
    #[serde(rename = "priorRawTx")]
    prior_raw_tx: String,
}

/// Attestation response body from the oracle service.
#[derive(Debug, Deserialize)]
struct AttestResponse {
    #[serde(default, rename = "sigLe")]
    sig_le: Option<String>,
    #[serde(default)]
    padding: Option<u64>,
    #[serde(default)]
    error: Option<String>,
}

/// HTTP implementation of [`OracleSigner`].
///
/// The signer's Rabin public key is part of the client configuration;
/// the remote service only ever returns signatures, which the quorum
/// verifier checks against this key.
#[derive(Debug, Clone)]
pub struct OracleClient {
    config: OracleConfig,
    public_key: RabinPublicKey,
    client: reqwest::Client,
}

impl OracleClient {
    /// Create a client for a signer with the given public key.
    pub fn new(config: OracleConfig, public_key: RabinPublicKey) -> Self {
        Self {
            config,
            public_key,
            client: reqwest::Client::new(),
        }
    }
}

impl OracleSigner for OracleClient {
    fn rabin_public_key(&self) -> &RabinPublicKey {
        &self.public_key
    }

    async fn attest(&self, request: &AttestRequest) -> Result<RabinSignature, OracleError> {
        let url = format!("{}/attest", self.config.base_url);
        let body = AttestBody {
            txid: request.output.txid.to_hex(),
            vout: request.output.vout,
            satoshis: request.output.satoshis,
            script_hash: hex::encode(request.output.script_hash),
            height: request.output.height,
            prior_raw_tx: hex::encode(&request.prior_raw_tx),
        };

        let mut builder = self.client.post(&url).json(&body);
        if let Some(ref token) = self.config.token {
            builder = builder.header("token", token);
        }
        let resp = builder.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(OracleError::Server {
                status_code: status.as_u16(),
                message,
            });
        }

        let parsed: AttestResponse = resp.json().await?;
        if let Some(reason) = parsed.error {
            return Err(OracleError::AttestationRefused(reason));
        }
        let sig_hex = parsed.sig_le.ok_or_else(|| {
            OracleError::AttestationRefused("response carried no signature".to_string())
        })?;
        let sig_bytes = hex::decode(&sig_hex)
            .map_err(|e| OracleError::AttestationRefused(format!("bad signature hex: {e}")))?;

        Ok(RabinSignature::from_parts(
            &sig_bytes,
            parsed.padding.unwrap_or(0),
        ))
    }
}
