//! One-call payments.
//!
//! Fetches the sender's UTXOs, picks enough of them to cover the amount and
//! fee, builds a recipient-plus-change transaction, signs it and hands it to
//! a broadcaster.

use kas_script::{Address, KeyPair};
use kas_transaction::broadcaster::filter_mature;
use kas_transaction::{
    BuilderConfig, Broadcaster, MassCalculator, SubmitSuccess, Transaction, TransactionBuilder,
    TransactionError, UtxoEntry, UtxoSource,
};

/// Choose UTXOs, largest first, until they cover `amount` plus the fee of
/// a transaction with that many inputs and two outputs.
///
/// Entries not locked to `sender`'s script are ignored. When the config
/// carries a current DAA score, immature coinbase entries are skipped too.
///
/// # Returns
/// The chosen entries, or `InsufficientFunds` when all of them together
/// fall short.
pub fn select_utxos(
    config: &BuilderConfig,
    sender: &KeyPair,
    utxos: Vec<UtxoEntry>,
    amount: u64,
) -> Result<Vec<UtxoEntry>, TransactionError> {
    let spk = sender.script_public_key();
    let mut candidates: Vec<UtxoEntry> = utxos.into_iter().filter(|u| u.script_public_key == spk).collect();
    if let Some(current) = config.current_daa_score {
        candidates = filter_mature(candidates, current, config.coinbase_maturity);
    }
    candidates.sort_by(|a, b| b.amount.cmp(&a.amount));

    let mass = MassCalculator::new(config.mass);
    let mut selected = Vec::new();
    let mut total: u64 = 0;
    let mut needed = amount;
    for entry in candidates {
        total = total.checked_add(entry.amount).ok_or(TransactionError::AmountOverflow)?;
        selected.push(entry);
        let fee = mass.minimum_fee(mass.standard_mass(selected.len(), 2, 0), config.fee_rate)?;
        needed = amount.checked_add(fee).ok_or(TransactionError::AmountOverflow)?;
        if total >= needed {
            log::debug!("selected {} UTXOs totalling {} sompi", selected.len(), total);
            return Ok(selected);
        }
    }
    Err(TransactionError::InsufficientFunds {
        needed,
        available: total,
    })
}

/// Build and sign a payment of `amount` sompi from `sender` to `recipient`.
///
/// Change goes back to the sender's address unless it would be dust.
pub fn build_payment(
    config: &BuilderConfig,
    sender: &KeyPair,
    utxos: Vec<UtxoEntry>,
    recipient: &Address,
    amount: u64,
) -> Result<Transaction, TransactionError> {
    let selected = select_utxos(config, sender, utxos, amount)?;

    let mut builder = TransactionBuilder::new(config.clone());
    for entry in selected {
        builder.add_input(entry, None)?;
    }
    builder.add_output(recipient, amount)?;
    builder.set_minimum_fee()?;
    builder.add_change_output(sender.address())?;
    builder.build_and_sign(Some(sender.private_key()))
}

/// Pay `amount` sompi to `recipient` using UTXOs from `source` and submit
/// the result through `broadcaster`.
pub fn send<S: UtxoSource, B: Broadcaster>(
    source: &S,
    broadcaster: &B,
    config: &BuilderConfig,
    sender: &KeyPair,
    recipient: &Address,
    amount: u64,
) -> Result<SubmitSuccess, TransactionError> {
    let utxos = source.utxos_by_addresses(std::slice::from_ref(sender.address()))?;
    let tx = build_payment(config, sender, utxos, recipient, amount)?;
    log::debug!("submitting {}", tx.id());
    broadcaster.submit(&tx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use kas_primitives::chainhash::Hash;
    use kas_primitives::ec::SignatureScheme;
    use kas_script::Network;
    use kas_transaction::template::p2pk;
    use kas_transaction::TransactionOutpoint;

    struct MemorySource(Vec<UtxoEntry>);

    impl UtxoSource for MemorySource {
        fn utxos_by_addresses(&self, addresses: &[Address]) -> Result<Vec<UtxoEntry>, TransactionError> {
            let scripts: Vec<_> = addresses.iter().map(|a| a.to_script_public_key()).collect();
            Ok(self
                .0
                .iter()
                .filter(|u| scripts.contains(&u.script_public_key))
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    struct RecordingBroadcaster {
        submitted: RefCell<Vec<Transaction>>,
    }

    impl Broadcaster for RecordingBroadcaster {
        fn submit(&self, tx: &Transaction) -> Result<SubmitSuccess, TransactionError> {
            self.submitted.borrow_mut().push(tx.clone());
            Ok(SubmitSuccess {
                transaction_id: tx.id(),
                message: "accepted".to_string(),
            })
        }
    }

    struct RejectingBroadcaster;

    impl Broadcaster for RejectingBroadcaster {
        fn submit(&self, _tx: &Transaction) -> Result<SubmitSuccess, TransactionError> {
            Err(TransactionError::Broadcast("orphan transaction".to_string()))
        }
    }

    fn keys(secret: &str) -> KeyPair {
        KeyPair::import(secret, Network::Mainnet, SignatureScheme::Schnorr).unwrap()
    }

    fn sender() -> KeyPair {
        keys("0000000000000000000000000000000000000000000000000000000000000003")
    }

    fn recipient() -> KeyPair {
        keys("b7e151628aed2a6abf7158809cf4f3c762e7160f38b4da56a784d9045190cfef")
    }

    fn utxo(owner: &KeyPair, tag: u8, amount: u64) -> UtxoEntry {
        UtxoEntry::new(
            TransactionOutpoint::new(Hash::new([tag; 32]), 0),
            amount,
            owner.script_public_key(),
        )
    }

    #[test]
    fn test_select_largest_first() {
        let s = sender();
        let utxos = vec![utxo(&s, 1, 10_000_000), utxo(&s, 2, 60_000_000), utxo(&s, 3, 30_000_000)];
        let picked = select_utxos(&BuilderConfig::default(), &s, utxos, 50_000_000).unwrap();
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].amount, 60_000_000);
    }

    #[test]
    fn test_select_skips_foreign_and_immature() {
        let s = sender();
        let r = recipient();
        let utxos = vec![
            utxo(&r, 1, 900_000_000),
            utxo(&s, 2, 900_000_000).with_coinbase(1_000),
            utxo(&s, 3, 20_000_000),
        ];
        let config = BuilderConfig::default().with_current_daa_score(1_010);
        let picked = select_utxos(&config, &s, utxos, 10_000_000).unwrap();
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].outpoint.transaction_id, Hash::new([3; 32]));
    }

    #[test]
    fn test_select_insufficient() {
        let s = sender();
        let result = select_utxos(&BuilderConfig::default(), &s, vec![utxo(&s, 1, 1_000)], 1_000);
        assert!(matches!(
            result,
            Err(TransactionError::InsufficientFunds { needed: 4_250, available: 1_000 })
        ));
    }

    #[test]
    fn test_send() {
        let s = sender();
        let r = recipient();
        let source = MemorySource(vec![utxo(&s, 1, 30_000_000), utxo(&s, 2, 30_000_000), utxo(&r, 3, 1)]);
        let broadcaster = RecordingBroadcaster::default();

        let ok = send(&source, &broadcaster, &BuilderConfig::default(), &s, r.address(), 50_000_000).unwrap();

        let submitted = broadcaster.submitted.borrow();
        assert_eq!(submitted.len(), 1);
        let tx = &submitted[0];
        assert_eq!(ok.transaction_id, tx.id());
        assert_eq!(tx.inputs.len(), 2);
        assert_eq!(tx.outputs.len(), 2);
        assert_eq!(tx.outputs[0].value, 50_000_000);
        assert_eq!(tx.outputs[0].script_public_key, r.script_public_key());
        assert_eq!(tx.outputs[1].script_public_key, s.script_public_key());
        assert!(tx.total_output_value().unwrap() < 60_000_000);

        for (i, entry) in source.0[..2].iter().enumerate() {
            assert!(p2pk::verify_input(tx, entry, i).unwrap());
        }
    }

    #[test]
    fn test_send_rejected() {
        let s = sender();
        let source = MemorySource(vec![utxo(&s, 1, 30_000_000)]);
        let result = send(
            &source,
            &RejectingBroadcaster,
            &BuilderConfig::default(),
            &s,
            recipient().address(),
            1_000_000,
        );
        assert!(matches!(result, Err(TransactionError::Broadcast(_))));
    }
}
