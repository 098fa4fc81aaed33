//! HTTP chain client for a Sensible-style indexer API.

use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;

use crate::error::ChainError;
use crate::types::{BroadcastResponse, ChainConfig, TokenUtxoRecord, UtxoRecord};
use crate::ChainApi;

/// HTTP implementation of [`ChainApi`].
#[derive(Debug, Clone)]
pub struct ChainClient {
    config: ChainConfig,
    client: reqwest::Client,
}

impl ChainClient {
    /// Create a client with the given configuration.
    pub fn new(config: ChainConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ChainError> {
        let url = format!("{}/{}", self.config.base_url, path);
        let resp = self
            .client
            .get(&url)
            .headers(self.build_headers())
            .send()
            .await?;

        let status = resp.status();
        if status.as_u16() == 404 {
            return Err(ChainError::NotFound);
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ChainError::Server {
                status_code: status.as_u16(),
                message,
            });
        }

        let text = resp.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(ref token) = self.config.token {
            if let Ok(val) = HeaderValue::from_str(token) {
                headers.insert("token", val);
            }
        }
        headers
    }
}

impl ChainApi for ChainClient {
    async fn list_utxos(&self, address: &str) -> Result<Vec<UtxoRecord>, ChainError> {
        self.get_json(&format!("address/{address}/utxo")).await
    }

    async fn list_token_utxos(
        &self,
        codehash: &str,
        genesis: &str,
        address: &str,
    ) -> Result<Vec<TokenUtxoRecord>, ChainError> {
        self.get_json(&format!("nft/utxo/{codehash}/{genesis}/{address}"))
            .await
    }

    async fn get_raw_tx(&self, txid: &str) -> Result<String, ChainError> {
        self.get_json(&format!("rawtx/{txid}")).await
    }

    async fn broadcast(&self, raw_tx_hex: &str) -> Result<String, ChainError> {
        let url = format!("{}/tx/broadcast", self.config.base_url);
        let resp = self
            .client
            .post(&url)
            .headers(self.build_headers())
            .json(&serde_json::json!({ "txHex": raw_tx_hex }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ChainError::Server {
                status_code: status.as_u16(),
                message,
            });
        }

        let body: BroadcastResponse = resp.json().await?;
        if let Some(reason) = body.error {
            return Err(ChainError::Rejected(reason));
        }
        body.txid
            .ok_or_else(|| ChainError::InvalidData("broadcast response had no txid".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json_string, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ChainClient {
        ChainClient::new(ChainConfig {
            base_url: server.uri(),
            token: None,
        })
    }

    #[tokio::test]
    async fn list_utxos_parses_records() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/address/1BitcoinAddr/utxo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "txId": "aa".repeat(32),
                    "outputIndex": 0,
                    "satoshis": 5000,
                    "address": "1BitcoinAddr"
                }
            ])))
            .mount(&server)
            .await;

        let utxos = client_for(&server).list_utxos("1BitcoinAddr").await.unwrap();
        assert_eq!(utxos.len(), 1);
        assert_eq!(utxos[0].satoshis, 5000);
        assert_eq!(utxos[0].output_index, 0);
    }

    #[tokio::test]
    async fn token_utxos_parses_mint_slot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nft/utxo/c0de/9e4e/1Addr"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "txId": "bb".repeat(32),
                    "outputIndex": 0,
                    "satoshis": 546,
                    "codehash": "c0de",
                    "genesis": "9e4e",
                    "address": "1Addr",
                    "tokenIndex": 2,
                    "totalSupply": 3,
                    "isMintSlot": true
                }
            ])))
            .mount(&server)
            .await;

        let utxos = client_for(&server)
            .list_token_utxos("c0de", "9e4e", "1Addr")
            .await
            .unwrap();
        assert_eq!(utxos.len(), 1);
        assert!(utxos[0].is_mint_slot);
        assert_eq!(utxos[0].token_index, 2);
        assert_eq!(utxos[0].total_supply, 3);
    }

    #[tokio::test]
    async fn missing_raw_tx_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rawtx/deadbeef"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server).get_raw_tx("deadbeef").await.unwrap_err();
        assert!(matches!(err, ChainError::NotFound));
    }

    #[tokio::test]
    async fn broadcast_returns_txid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tx/broadcast"))
            .and(body_json_string(r#"{"txHex":"0100"}"#))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "txid": "cc".repeat(32)
            })))
            .mount(&server)
            .await;

        let txid = client_for(&server).broadcast("0100").await.unwrap();
        assert_eq!(txid, "cc".repeat(32));
    }

    #[tokio::test]
    async fn broadcast_rejection_is_mapped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tx/broadcast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": "txn-mempool-conflict"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).broadcast("0100").await.unwrap_err();
        assert!(matches!(err, ChainError::Rejected(reason) if reason.contains("conflict")));
    }

    #[tokio::test]
    async fn server_error_carries_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/address/1Addr/utxo"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client_for(&server).list_utxos("1Addr").await.unwrap_err();
        assert!(matches!(err, ChainError::Server { status_code: 500, .. }));
    }
}
