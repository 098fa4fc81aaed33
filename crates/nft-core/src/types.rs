//! Protocol data types.

use std::fmt;

use nft_chain::{TokenUtxoRecord, UtxoRecord};
use nft_primitives::chainhash::Hash;
use nft_primitives::ec::{PublicKey, Signature};
use nft_script::{Address, Network};
use serde::{Deserialize, Serialize};

use crate::NftError;

/// A reference to a transaction output.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Outpoint {
    /// Txid of the transaction carrying the output.
    pub txid: nft_primitives::chainhash::Hash,
    /// Output index.
    pub vout: u32,
}

impl Outpoint {
    /// The 36-byte wire encoding: txid (internal order) plus vout LE.
    pub fn to_bytes(&self) -> [u8; 36] {
        let mut out = [0u8; 36];
        out[..32].copy_from_slice(self.txid.as_bytes());
        out[32..].copy_from_slice(&self.vout.to_le_bytes());
        out
    }
}

impl fmt::Display for Outpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.vout)
    }
}

/// The immutable identity of one token series.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenIdentity {
    /// Hash160 of the series' locking-script code part (hex).
    pub codehash: String,
    /// The series' genesis identifier (hex).
    pub genesis: String,
}

/// Whether a protocol output is the series' mint slot or an issued token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// The supply-defining output consumed and re-emitted by each issue.
    MintSlot,
    /// A minted token carrying a permanent ordinal.
    Issued,
}

/// A live protocol token UTXO.
#[derive(Clone, Debug)]
pub struct TokenUtxo {
    /// Series identity.
    pub identity: TokenIdentity,
    /// Mint slot or issued token.
    pub kind: TokenKind,
    /// Token ordinal. For the mint slot, the next ordinal to issue.
    pub token_index: u64,
    /// Current owner.
    pub owner: Address,
    /// Carried satoshis.
    pub satoshis: u64,
    /// Location on chain.
    pub outpoint: Outpoint,
}

impl TokenUtxo {
    /// Build from an indexer record.
    pub fn from_record(record: &TokenUtxoRecord) -> Result<Self, NftError> {
        Ok(TokenUtxo {
            identity: TokenIdentity {
                codehash: record.codehash.clone(),
                genesis: record.genesis.clone(),
            },
            kind: if record.is_mint_slot {
                TokenKind::MintSlot
            } else {
                TokenKind::Issued
            },
            token_index: record.token_index,
            owner: Address::from_string(&record.address)?,
            satoshis: record.satoshis,
            outpoint: Outpoint {
                txid: Hash::from_hex(&record.txid)?,
                vout: record.output_index,
            },
        })
    }
}

/// A plain P2PKH UTXO used to pay fees.
///
/// The spending credential is a WIF in the automatic flow; the unsigned
/// flow leaves it empty and signs through the descriptor list instead.
#[derive(Clone, Debug)]
pub struct FeeUtxo {
    /// Location on chain.
    pub outpoint: Outpoint,
    /// Carried satoshis.
    pub satoshis: u64,
    /// The owning address.
    pub address: Address,
    /// WIF of the owning key, when available in-process.
    pub wif: Option<String>,
}

impl FeeUtxo {
    /// Build from an indexer record, attaching the purse WIF.
    pub fn from_record(record: &UtxoRecord, wif: Option<String>) -> Result<Self, NftError> {
        Ok(FeeUtxo {
            outpoint: Outpoint {
                txid: Hash::from_hex(&record.txid)?,
                vout: record.output_index,
            },
            satoshis: record.satoshis,
            address: Address::from_string(&record.address)?,
            wif,
        })
    }
}

/// One unsigned input awaiting an external signature.
///
/// Ordering matches transaction input order and must be preserved
/// between unsigned construction and [`sign`](crate::NonFungibleToken::sign).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigHashDescriptor {
    /// The 32-byte signature hash, hex encoded.
    pub sighash: String,
    /// The sighash flags the signature must commit to.
    #[serde(rename = "sighashType")]
    pub sighash_type: u32,
    /// Address whose key must produce the signature.
    pub address: String,
    /// Index of the input within the transaction.
    #[serde(rename = "inputIndex")]
    pub input_index: u32,
    /// Whether the input is plain P2PKH (fee input) rather than a token
    /// input with an attestation-carrying unlocking script.
    #[serde(rename = "isP2PKH")]
    pub is_p2pkh: bool,
}

impl SigHashDescriptor {
    /// Decode the sighash hex into its 32 bytes.
    pub fn sighash_bytes(&self) -> Result<[u8; 32], NftError> {
        let bytes = hex::decode(&self.sighash)
            .map_err(|e| NftError::InvalidConfig(format!("bad sighash hex: {e}")))?;
        bytes.try_into().map_err(|_| {
            NftError::InvalidConfig("sighash must be 32 bytes".to_string())
        })
    }
}

/// An externally produced signature answering one descriptor.
#[derive(Clone, Debug)]
pub struct SignatureItem {
    /// The ECDSA signature.
    pub signature: Signature,
    /// The signing public key.
    pub public_key: PublicKey,
}

/// Engine configuration.
///
/// All fields are explicit; mock collaborators are injected as ordinary
/// [`ChainApi`](nft_chain::ChainApi)/[`OracleSigner`](nft_oracle::OracleSigner)
/// implementations rather than through configuration switches.
#[derive(Clone, Debug)]
pub struct NftConfig {
    /// Indices of the oracle signers trusted for this engine's calls.
    pub signer_selecteds: Vec<usize>,
    /// Number of attestations required per operation.
    pub required_verify_count: usize,
    /// Fee rate in satoshis per byte.
    pub feeb: f64,
    /// Network for address encoding.
    pub network: Network,
    /// WIF of the fee-paying purse key.
    pub purse: String,
    /// Upper bound on fee UTXOs consumed per transaction.
    pub utxo_max_count: usize,
}

impl NftConfig {
    /// A mainnet configuration with the standard fee rate and bounds.
    pub fn new(purse: String, signer_selecteds: Vec<usize>) -> Self {
        NftConfig {
            required_verify_count: signer_selecteds.len(),
            signer_selecteds,
            feeb: 0.5,
            network: Network::Mainnet,
            purse,
            utxo_max_count: 10,
        }
    }
}

/// Parse a decimal total-supply string from the caller boundary.
pub fn parse_total_supply(value: &str) -> Result<u64, NftError> {
    let supply: u64 = value
        .trim()
        .parse()
        .map_err(|_| NftError::InvalidSupply(format!("'{value}' is not a decimal integer")))?;
    if supply == 0 {
        return Err(NftError::InvalidSupply("total supply must be positive".to_string()));
    }
    Ok(supply)
}

/// Parse a decimal token-index string from the caller boundary.
pub fn parse_token_index(value: &str) -> Result<u64, NftError> {
    value.trim().parse().map_err(|_| {
        NftError::InvalidTokenIndex(format!("'{value}' is not a decimal integer"))
    })
}
