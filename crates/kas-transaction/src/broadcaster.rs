//! Interfaces to the outside world: where UTXOs come from and where signed
//! transactions go.
//!
//! The SDK performs no I/O itself. Callers implement these traits over
//! whatever transport they use (node RPC, an indexer, a test double).

use kas_primitives::chainhash::Hash;
use kas_script::Address;

use crate::transaction::Transaction;
use crate::utxo::UtxoEntry;
use crate::TransactionError;

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitSuccess {
    /// The transaction id acknowledged by the network.
    pub transaction_id: Hash,
    /// Human-readable status message from the transport.
    pub message: String,
}

/// Trait for submitting signed transactions to the network.
pub trait Broadcaster {
    /// Submit a transaction.
    ///
    /// # Returns
    /// `Ok(SubmitSuccess)` when accepted, or `Err(TransactionError::Broadcast)`
    /// carrying the transport's reason.
    fn submit(&self, tx: &Transaction) -> Result<SubmitSuccess, TransactionError>;
}

/// Trait for looking up spendable outputs.
pub trait UtxoSource {
    /// Return every UTXO currently paying to any of `addresses`.
    fn utxos_by_addresses(&self, addresses: &[Address]) -> Result<Vec<UtxoEntry>, TransactionError>;
}

/// Keep only entries spendable at `current_daa_score`.
///
/// Non-coinbase entries always pass; coinbase entries pass once
/// `maturity` DAA score has elapsed since their block.
pub fn filter_mature(entries: Vec<UtxoEntry>, current_daa_score: u64, maturity: u64) -> Vec<UtxoEntry> {
    entries
        .into_iter()
        .filter(|e| e.is_mature(current_daa_score, maturity))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utxo::TransactionOutpoint;
    use kas_script::ScriptPublicKey;

    fn entry(index: u32) -> UtxoEntry {
        UtxoEntry::new(
            TransactionOutpoint::new(Hash::new([index as u8; 32]), index),
            1_000,
            ScriptPublicKey::pay_to_pubkey(&[1u8; 32]),
        )
    }

    #[test]
    fn test_filter_mature() {
        let entries = vec![
            entry(0),
            entry(1).with_coinbase(500),
            entry(2).with_coinbase(950),
        ];
        let kept = filter_mature(entries, 1_000, 100);
        let indices: Vec<u32> = kept.iter().map(|e| e.outpoint.index).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn test_filter_mature_boundary() {
        let kept = filter_mature(vec![entry(1).with_coinbase(900)], 1_000, 100);
        assert_eq!(kept.len(), 1);
        let kept = filter_mature(vec![entry(1).with_coinbase(901)], 1_000, 100);
        assert!(kept.is_empty());
    }
}
