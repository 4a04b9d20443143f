//! Script templates for signing transaction inputs.
//!
//! Provides the `SignatureScriptTemplate` trait and the pay-to-public-key
//! implementation covering both Schnorr and ECDSA key scripts.

pub mod p2pk;

use crate::transaction::Transaction;
use crate::utxo::UtxoEntry;
use crate::TransactionError;

/// Trait for templates that produce signature scripts.
///
/// `sign` receives the transaction, the UTXO entry the input spends and the
/// input index, computes the signature hash, signs it and returns the
/// signature script.
pub trait SignatureScriptTemplate {
    /// Produce a signature script for the given input.
    ///
    /// # Arguments
    /// * `tx` - The transaction being signed.
    /// * `entry` - The UTXO the input spends.
    /// * `input_index` - The index of the input to sign.
    fn sign(&self, tx: &Transaction, entry: &UtxoEntry, input_index: usize) -> Result<Vec<u8>, TransactionError>;

    /// Byte length of the signature script this template produces.
    fn estimate_length(&self) -> usize;
}
