use proptest::prelude::*;

use nft_primitives::chainhash::Hash;
use nft_primitives::ec::{PrivateKey, Signature};
use nft_primitives::hash::sha256;
use nft_primitives::rabin::RabinPrivateKey;
use nft_primitives::util::{VarInt, WireReader};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn wif_roundtrip(seed in prop::array::uniform32(any::<u8>())) {
        // Not all 32-byte arrays are valid scalars (nonzero, < curve order).
        if let Ok(key) = PrivateKey::from_bytes(&seed) {
            let restored = PrivateKey::from_wif(&key.to_wif()).unwrap();
            prop_assert_eq!(key.to_bytes(), restored.to_bytes());
        }
    }

    #[test]
    fn ecdsa_sign_verify_roundtrip(
        seed in prop::array::uniform32(any::<u8>()),
        msg in prop::collection::vec(any::<u8>(), 0..256)
    ) {
        if let Ok(key) = PrivateKey::from_bytes(&seed) {
            let hash = sha256(&msg);
            let sig = key.sign(&hash).unwrap();
            prop_assert!(key.pub_key().verify(&hash, &sig));

            let restored = Signature::from_der(&sig.to_der()).unwrap();
            prop_assert!(key.pub_key().verify(&hash, &restored));
        }
    }

    #[test]
    fn hash_hex_roundtrip(bytes in prop::array::uniform32(any::<u8>())) {
        let hash = Hash::from_bytes(&bytes).unwrap();
        let restored = Hash::from_hex(&hash.to_hex()).unwrap();
        prop_assert_eq!(hash.as_bytes(), restored.as_bytes());
    }

    #[test]
    fn varint_wire_roundtrip(value in any::<u64>()) {
        let bytes = VarInt::from(value).to_bytes();
        let mut reader = WireReader::new(&bytes);
        prop_assert_eq!(reader.read_varint().unwrap().value(), value);
        prop_assert_eq!(reader.remaining(), 0);
    }
}

proptest! {
    // Rabin signing does 512-bit modular exponentiation per case; keep
    // the case count low.
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn rabin_sign_verify_roundtrip(msg in prop::collection::vec(any::<u8>(), 0..128)) {
        let key = RabinPrivateKey::from_decimal(
            "9097722629658742293420164578669589841085955461180077367949962570265327809330787612920943525832253321016059488904439217610557062309293622829749956284685663",
            "9126947698968185300906443468174075795240339607655376474995985065589996990930531271347872860645128582337718364760483431238305785744054838671606080407999619",
        )
        .unwrap();
        let sig = key.sign(&msg).unwrap();
        prop_assert!(key.public_key().verify(&msg, &sig));

        // A flipped byte must not verify.
        if !msg.is_empty() {
            let mut tampered = msg.clone();
            tampered[0] ^= 0x01;
            prop_assert!(!key.public_key().verify(&tampered, &sig));
        }
    }
}
