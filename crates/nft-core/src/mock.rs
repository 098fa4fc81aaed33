//! In-memory chain for tests and examples.
//!
//! Behaves like a one-node network with instant confirmation: broadcast
//! transactions are parsed and indexed, spent outpoints are tracked, and
//! a transaction that re-spends one is rejected exactly the way a real
//! node resolves a double-spend race (first broadcast wins).

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use nft_chain::{ChainApi, ChainError, TokenUtxoRecord, UtxoRecord};
use nft_script::{Address, Network};
use nft_transaction::Transaction;

use crate::script::reader::read_locking_script;
use crate::types::TokenKind;

#[derive(Default)]
struct Inner {
    /// Raw transactions by display txid.
    raw_txs: HashMap<String, Vec<u8>>,
    /// Outpoints consumed by an accepted transaction.
    spent: HashSet<(String, u32)>,
    /// Live P2PKH outputs.
    fee_utxos: HashMap<(String, u32), UtxoRecord>,
    /// Live protocol outputs.
    token_utxos: HashMap<(String, u32), TokenUtxoRecord>,
}

/// In-memory [`ChainApi`] implementation.
pub struct MockChainApi {
    network: Network,
    inner: Mutex<Inner>,
}

impl MockChainApi {
    /// Create an empty chain for the given network.
    pub fn new(network: Network) -> Self {
        MockChainApi {
            network,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Drop all indexed fee UTXOs, keeping token state.
    ///
    /// Test hook for exercising freshly funded fee pools.
    pub fn clean_fee_utxos(&self) {
        self.inner.lock().unwrap().fee_utxos.clear();
    }

    /// Reset the chain to empty.
    pub fn clean_cacheds(&self) {
        *self.inner.lock().unwrap() = Inner::default();
    }

    /// Number of live protocol outputs (all series).
    pub fn token_utxo_count(&self) -> usize {
        self.inner.lock().unwrap().token_utxos.len()
    }

    fn index_outputs(&self, inner: &mut Inner, txid: &str, tx: &Transaction) {
        for (vout, output) in tx.outputs.iter().enumerate() {
            let key = (txid.to_string(), vout as u32);
            if let Some(pkh) = output.locking_script.p2pkh_pubkey_hash() {
                let address = Address::from_public_key_hash(&pkh, self.network);
                inner.fee_utxos.insert(
                    key,
                    UtxoRecord {
                        txid: txid.to_string(),
                        output_index: vout as u32,
                        satoshis: output.satoshis,
                        address: address.address_string,
                    },
                );
            } else if let Some(parsed) = read_locking_script(&output.locking_script) {
                let owner =
                    Address::from_public_key_hash(&parsed.payload.owner_pkh, self.network);
                inner.token_utxos.insert(
                    key,
                    TokenUtxoRecord {
                        txid: txid.to_string(),
                        output_index: vout as u32,
                        satoshis: output.satoshis,
                        codehash: hex::encode(parsed.codehash),
                        genesis: hex::encode(parsed.payload.genesis_id),
                        address: owner.address_string,
                        token_index: parsed.payload.token_index,
                        total_supply: parsed.payload.total_supply,
                        is_mint_slot: parsed.payload.kind == TokenKind::MintSlot,
                    },
                );
            }
            // Data-carrier outputs are not indexed.
        }
    }
}

impl ChainApi for MockChainApi {
    async fn list_utxos(&self, address: &str) -> Result<Vec<UtxoRecord>, ChainError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .fee_utxos
            .values()
            .filter(|u| u.address == address)
            .cloned()
            .collect())
    }

    async fn list_token_utxos(
        &self,
        codehash: &str,
        genesis: &str,
        address: &str,
    ) -> Result<Vec<TokenUtxoRecord>, ChainError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .token_utxos
            .values()
            .filter(|u| {
                u.codehash == codehash
                    && u.genesis == genesis
                    && (address.is_empty() || u.address == address)
            })
            .cloned()
            .collect())
    }

    async fn get_raw_tx(&self, txid: &str) -> Result<String, ChainError> {
        let inner = self.inner.lock().unwrap();
        inner
            .raw_txs
            .get(txid)
            .map(hex::encode)
            .ok_or(ChainError::NotFound)
    }

    async fn broadcast(&self, raw_tx_hex: &str) -> Result<String, ChainError> {
        let bytes = hex::decode(raw_tx_hex)
            .map_err(|e| ChainError::InvalidData(format!("invalid tx hex: {e}")))?;
        let tx = Transaction::from_bytes(&bytes)
            .map_err(|e| ChainError::InvalidData(format!("invalid tx: {e}")))?;
        let txid = tx.tx_id_hex();

        let mut inner = self.inner.lock().unwrap();

        // Validate every input before mutating anything.
        for input in &tx.inputs {
            let mut source = input.source_txid;
            source.reverse();
            let key = (hex::encode(source), input.source_tx_out_index);
            if inner.spent.contains(&key) {
                return Err(ChainError::Rejected(format!(
                    "txn-mempool-conflict: {}:{} already spent",
                    key.0, key.1
                )));
            }
            if !inner.fee_utxos.contains_key(&key) && !inner.token_utxos.contains_key(&key) {
                return Err(ChainError::Rejected(format!(
                    "missing-inputs: {}:{} unknown",
                    key.0, key.1
                )));
            }
        }

        for input in &tx.inputs {
            let mut source = input.source_txid;
            source.reverse();
            let key = (hex::encode(source), input.source_tx_out_index);
            inner.fee_utxos.remove(&key);
            inner.token_utxos.remove(&key);
            inner.spent.insert(key);
        }

        self.index_outputs(&mut inner, &txid, &tx);
        inner.raw_txs.insert(txid.clone(), bytes);
        Ok(txid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::builder::{build_locking_script, NftPayload};
    use nft_transaction::template::p2pkh;
    use nft_transaction::{TransactionInput, TransactionOutput};

    fn address(salt: u8) -> Address {
        Address::from_public_key_hash(&[salt; 20], Network::Mainnet)
    }

    /// A funding transaction with no inputs, like a test faucet.
    fn faucet_tx(addr: &Address, satoshis: u64) -> Transaction {
        let mut tx = Transaction::new();
        tx.add_output(TransactionOutput {
            satoshis,
            locking_script: p2pkh::lock(addr),
            change: false,
        });
        tx
    }

    #[tokio::test]
    async fn indexes_p2pkh_outputs() {
        let chain = MockChainApi::new(Network::Mainnet);
        let addr = address(1);
        let tx = faucet_tx(&addr, 50_000);
        let txid = chain.broadcast(&tx.to_hex()).await.unwrap();

        let utxos = chain.list_utxos(addr.as_str()).await.unwrap();
        assert_eq!(utxos.len(), 1);
        assert_eq!(utxos[0].txid, txid);
        assert_eq!(utxos[0].satoshis, 50_000);
        assert!(chain.list_utxos(address(2).as_str()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn indexes_token_outputs() {
        let chain = MockChainApi::new(Network::Mainnet);
        let payload = NftPayload {
            kind: TokenKind::MintSlot,
            total_supply: 3,
            token_index: 0,
            owner_pkh: [0x05; 20],
            genesis_id: [0x06; 20],
        };
        let mut tx = Transaction::new();
        tx.add_output(TransactionOutput {
            satoshis: 546,
            locking_script: build_locking_script(&[0xaa; 20], 3, &payload).unwrap(),
            change: false,
        });
        chain.broadcast(&tx.to_hex()).await.unwrap();

        let codehash = nft_primitives::hash::hash160(&crate::script::builder::code_part(
            &[0xaa; 20],
            3,
        ));
        let records = chain
            .list_token_utxos(&hex::encode(codehash), &hex::encode([0x06; 20]), "")
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].is_mint_slot);
        assert_eq!(records[0].total_supply, 3);
    }

    #[tokio::test]
    async fn rejects_double_spend() {
        let chain = MockChainApi::new(Network::Mainnet);
        let addr = address(1);
        let funding = faucet_tx(&addr, 50_000);
        let funding_txid = chain.broadcast(&funding.to_hex()).await.unwrap();

        let spend = |salt: u8| {
            let mut tx = Transaction::new();
            let mut input = TransactionInput::new();
            let mut txid_bytes = hex::decode(&funding_txid).unwrap();
            txid_bytes.reverse();
            input.source_txid = txid_bytes.try_into().unwrap();
            input.source_tx_out_index = 0;
            tx.add_input(input);
            tx.add_output(TransactionOutput {
                satoshis: 49_000,
                locking_script: p2pkh::lock(&address(salt)),
                change: false,
            });
            tx
        };

        chain.broadcast(&spend(2).to_hex()).await.unwrap();
        let err = chain.broadcast(&spend(3).to_hex()).await.unwrap_err();
        assert!(matches!(err, ChainError::Rejected(r) if r.contains("conflict")));
    }

    #[tokio::test]
    async fn rejects_unknown_inputs() {
        let chain = MockChainApi::new(Network::Mainnet);
        let mut tx = Transaction::new();
        let mut input = TransactionInput::new();
        input.source_txid = [0x77; 32];
        tx.add_input(input);
        let err = chain.broadcast(&tx.to_hex()).await.unwrap_err();
        assert!(matches!(err, ChainError::Rejected(r) if r.contains("missing-inputs")));
    }

    #[tokio::test]
    async fn raw_tx_roundtrip() {
        let chain = MockChainApi::new(Network::Mainnet);
        let tx = faucet_tx(&address(1), 1000);
        let txid = chain.broadcast(&tx.to_hex()).await.unwrap();
        assert_eq!(chain.get_raw_tx(&txid).await.unwrap(), tx.to_hex());
        assert!(matches!(
            chain.get_raw_tx(&"00".repeat(32)).await,
            Err(ChainError::NotFound)
        ));
    }

    #[tokio::test]
    async fn clean_fee_utxos_keeps_tokens() {
        let chain = MockChainApi::new(Network::Mainnet);
        chain.broadcast(&faucet_tx(&address(1), 1000).to_hex()).await.unwrap();
        chain.clean_fee_utxos();
        assert!(chain.list_utxos(address(1).as_str()).await.unwrap().is_empty());
    }
}
