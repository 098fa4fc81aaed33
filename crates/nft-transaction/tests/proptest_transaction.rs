use proptest::prelude::*;

use nft_script::Script;
use nft_transaction::{Transaction, TransactionInput, TransactionOutput};

prop_compose! {
    fn arb_input()(
        txid in prop::array::uniform32(any::<u8>()),
        vout in any::<u32>(),
        script in prop::collection::vec(any::<u8>(), 0..64),
        sequence in any::<u32>(),
    ) -> TransactionInput {
        let mut input = TransactionInput::new();
        input.source_txid = txid;
        input.source_tx_out_index = vout;
        input.sequence_number = sequence;
        input.unlocking_script = if script.is_empty() {
            None
        } else {
            Some(Script::from_bytes(&script))
        };
        input
    }
}

prop_compose! {
    fn arb_output()(
        satoshis in any::<u64>(),
        script in prop::collection::vec(any::<u8>(), 0..64),
    ) -> TransactionOutput {
        TransactionOutput {
            satoshis,
            locking_script: Script::from_bytes(&script),
            change: false,
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn wire_roundtrip(
        version in any::<u32>(),
        lock_time in any::<u32>(),
        inputs in prop::collection::vec(arb_input(), 0..8),
        outputs in prop::collection::vec(arb_output(), 0..8),
    ) {
        let mut tx = Transaction::new();
        tx.version = version;
        tx.lock_time = lock_time;
        for input in inputs {
            tx.add_input(input);
        }
        for output in outputs {
            tx.add_output(output);
        }

        let bytes = tx.to_bytes();
        let restored = Transaction::from_bytes(&bytes).unwrap();
        prop_assert_eq!(restored.to_bytes(), bytes);
        prop_assert_eq!(restored.tx_id(), tx.tx_id());
        prop_assert_eq!(restored.input_count(), tx.input_count());
        prop_assert_eq!(restored.output_count(), tx.output_count());
    }

    #[test]
    fn hex_roundtrip(outputs in prop::collection::vec(arb_output(), 0..4)) {
        let mut tx = Transaction::new();
        for output in outputs {
            tx.add_output(output);
        }
        let restored = Transaction::from_hex(&tx.to_hex()).unwrap();
        prop_assert_eq!(restored.to_hex(), tx.to_hex());
    }
}
