//! Outpoints and the UTXO entries they reference.

use std::fmt;

use kas_primitives::chainhash::Hash;
use kas_primitives::util::{ByteReader, ByteWriter};
use kas_script::ScriptPublicKey;
use serde::{Deserialize, Serialize};

use crate::amount::serde_u64_string;
use crate::TransactionError;

/// Reference to an output of a previous transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOutpoint {
    /// Id of the transaction holding the output.
    pub transaction_id: Hash,
    /// Index of the output within that transaction.
    pub index: u32,
}

impl TransactionOutpoint {
    /// Encoded size: 32-byte transaction id plus u32 index.
    pub const SERIALIZED_SIZE: usize = 36;

    pub fn new(transaction_id: Hash, index: u32) -> Self {
        TransactionOutpoint { transaction_id, index }
    }

    /// Append the consensus encoding.
    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer
            .write_bytes(self.transaction_id.as_bytes())
            .write_u32_le(self.index);
    }

    /// Read the consensus encoding.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let txid = reader
            .read_array::<32>()
            .map_err(|e| TransactionError::SerializationError(format!("reading outpoint txid: {}", e)))?;
        let index = reader
            .read_u32_le()
            .map_err(|e| TransactionError::SerializationError(format!("reading outpoint index: {}", e)))?;
        Ok(TransactionOutpoint { transaction_id: Hash::new(txid), index })
    }
}

impl fmt::Display for TransactionOutpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.transaction_id, self.index)
    }
}

/// An unspent output as reported by a node or indexer.
///
/// Carries everything needed to sign a spend of it: the amount and locking
/// script commit into the signature hash, and the coinbase flag with its
/// DAA score decide maturity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtxoEntry {
    /// The output being referenced.
    pub outpoint: TransactionOutpoint,
    /// Value in sompi.
    #[serde(with = "serde_u64_string")]
    pub amount: u64,
    /// Locking script of the output.
    pub script_public_key: ScriptPublicKey,
    /// DAA score of the block that accepted the output.
    #[serde(default, with = "serde_u64_string")]
    pub block_daa_score: u64,
    /// Whether the output was created by a coinbase transaction.
    #[serde(default)]
    pub is_coinbase: bool,
}

impl UtxoEntry {
    pub fn new(outpoint: TransactionOutpoint, amount: u64, script_public_key: ScriptPublicKey) -> Self {
        UtxoEntry {
            outpoint,
            amount,
            script_public_key,
            block_daa_score: 0,
            is_coinbase: false,
        }
    }

    /// Mark the entry as a coinbase output accepted at `block_daa_score`.
    pub fn with_coinbase(mut self, block_daa_score: u64) -> Self {
        self.is_coinbase = true;
        self.block_daa_score = block_daa_score;
        self
    }

    /// DAA score from which the entry may be spent.
    ///
    /// Non-coinbase entries are spendable immediately (returns 0).
    pub fn mature_at(&self, coinbase_maturity: u64) -> u64 {
        if self.is_coinbase {
            self.block_daa_score.saturating_add(coinbase_maturity)
        } else {
            0
        }
    }

    /// Whether the entry can be spent at `current_daa_score`.
    pub fn is_mature(&self, current_daa_score: u64, coinbase_maturity: u64) -> bool {
        current_daa_score >= self.mature_at(coinbase_maturity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> UtxoEntry {
        UtxoEntry::new(
            TransactionOutpoint::new(Hash::new([7u8; 32]), 3),
            1_000,
            ScriptPublicKey::pay_to_pubkey(&[1u8; 32]),
        )
    }

    #[test]
    fn test_outpoint_encoding() {
        let op = TransactionOutpoint::new(Hash::new([0xab; 32]), 0x0102_0304);
        let mut w = ByteWriter::new();
        op.write_to(&mut w);
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), TransactionOutpoint::SERIALIZED_SIZE);
        assert_eq!(&bytes[32..], &[0x04, 0x03, 0x02, 0x01]);

        let mut r = ByteReader::new(&bytes);
        assert_eq!(TransactionOutpoint::read_from(&mut r).unwrap(), op);
    }

    #[test]
    fn test_outpoint_display() {
        let op = TransactionOutpoint::new(Hash::ZERO, 5);
        assert_eq!(op.to_string(), format!("{}:5", "00".repeat(32)));
    }

    #[test]
    fn test_maturity() {
        let plain = entry();
        assert!(plain.is_mature(0, 100));

        let coinbase = entry().with_coinbase(1_000);
        assert_eq!(coinbase.mature_at(100), 1_100);
        assert!(!coinbase.is_mature(1_099, 100));
        assert!(coinbase.is_mature(1_100, 100));
    }

    #[test]
    fn test_utxo_entry_json() {
        let e = entry();
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["amount"], "1000");
        assert_eq!(json["outpoint"]["index"], 3);
        assert_eq!(json["isCoinbase"], false);

        let numeric = serde_json::json!({
            "outpoint": json["outpoint"],
            "amount": 1000,
            "scriptPublicKey": json["scriptPublicKey"],
        });
        let back: UtxoEntry = serde_json::from_value(numeric).unwrap();
        assert_eq!(back, e);
    }
}
