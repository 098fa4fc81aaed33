//! Base58Check P2PKH addresses.

use std::fmt;

use nft_primitives::hash::sha256d;

use crate::ScriptError;

/// Mainnet P2PKH version byte.
const MAINNET_P2PKH: u8 = 0x00;
/// Testnet P2PKH version byte.
const TESTNET_P2PKH: u8 = 0x6f;

/// Network discriminator for address encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Network {
    /// Mainnet (version byte 0x00, addresses start with '1').
    Mainnet,
    /// Testnet (version byte 0x6f, addresses start with 'm' or 'n').
    Testnet,
}

/// A P2PKH address: the 20-byte public key hash plus its network.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Address {
    /// The Base58Check string form.
    pub address_string: String,
    /// The RIPEMD-160(SHA-256(pubkey)) hash.
    pub public_key_hash: [u8; 20],
    /// The network the address encodes for.
    pub network: Network,
}

impl Address {
    /// Parse a Base58Check address string, validating the checksum and
    /// detecting the network from the version byte.
    pub fn from_string(addr: &str) -> Result<Self, ScriptError> {
        let decoded = bs58::decode(addr)
            .into_vec()
            .map_err(|_| ScriptError::InvalidAddress(format!("bad character in '{addr}'")))?;

        if decoded.len() != 25 {
            return Err(ScriptError::InvalidAddressLength(addr.to_string()));
        }

        let checksum = sha256d(&decoded[..21]);
        if decoded[21..25] != checksum[..4] {
            return Err(ScriptError::ChecksumFailed);
        }

        let network = match decoded[0] {
            MAINNET_P2PKH => Network::Mainnet,
            TESTNET_P2PKH => Network::Testnet,
            _ => return Err(ScriptError::UnsupportedAddress(addr.to_string())),
        };

        let mut pkh = [0u8; 20];
        pkh.copy_from_slice(&decoded[1..21]);

        Ok(Address {
            address_string: addr.to_string(),
            public_key_hash: pkh,
            network,
        })
    }

    /// Build an address from a 20-byte public key hash.
    pub fn from_public_key_hash(hash: &[u8; 20], network: Network) -> Self {
        let version = match network {
            Network::Mainnet => MAINNET_P2PKH,
            Network::Testnet => TESTNET_P2PKH,
        };

        let mut payload = Vec::with_capacity(25);
        payload.push(version);
        payload.extend_from_slice(hash);
        let checksum = sha256d(&payload);
        payload.extend_from_slice(&checksum[..4]);

        Address {
            address_string: bs58::encode(&payload).into_string(),
            public_key_hash: *hash,
            network,
        }
    }

    /// The Base58Check string form.
    pub fn as_str(&self) -> &str {
        &self.address_string
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mainnet_roundtrip() {
        let addr = Address::from_public_key_hash(&[0x42; 20], Network::Mainnet);
        let parsed = Address::from_string(addr.as_str()).unwrap();
        assert_eq!(parsed, addr);
        assert_eq!(parsed.network, Network::Mainnet);
    }

    #[test]
    fn testnet_roundtrip() {
        let addr = Address::from_public_key_hash(&[0x42; 20], Network::Testnet);
        let parsed = Address::from_string(addr.as_str()).unwrap();
        assert_eq!(parsed.network, Network::Testnet);
        assert_ne!(
            addr.as_str(),
            Address::from_public_key_hash(&[0x42; 20], Network::Mainnet).as_str()
        );
    }

    #[test]
    fn genesis_block_address_parses() {
        // The well-known mainnet address from block 0's coinbase.
        let addr = Address::from_string("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa").unwrap();
        assert_eq!(addr.network, Network::Mainnet);
        assert_eq!(
            hex::encode(addr.public_key_hash),
            "62e907b15cbf27d5425399ebf6f0fb50ebb88f18"
        );
    }

    #[test]
    fn corrupted_checksum_rejected() {
        let addr = Address::from_public_key_hash(&[0x42; 20], Network::Mainnet);
        let mut s = addr.address_string.clone();
        let last = s.pop().unwrap();
        s.push(if last == '1' { '2' } else { '1' });
        assert!(Address::from_string(&s).is_err());
    }

    #[test]
    fn wrong_length_rejected() {
        assert!(Address::from_string("1abc").is_err());
    }
}
