//! Signature hash computation for transaction signing.
//!
//! Each input signs a digest that commits to the transaction's version,
//! summaries of all inputs and outputs, the outpoint and script being spent,
//! its amount, and the transaction's lock-time, subnetwork, gas and payload.
//! The summaries collapse to zero as the sighash type relaxes what is signed.
//! All hashing uses blake2b-256 keyed with `TransactionSigningHash`; ECDSA
//! signatures sign a SHA-256 rehash of that digest.

use kas_primitives::hash::{transaction_signing_hash, transaction_signing_hash_ecdsa, DomainHasher, HashDomain};
use kas_primitives::util::ByteWriter;
use kas_script::ScriptPublicKey;

use crate::output::TransactionOutput;
use crate::transaction::Transaction;
use crate::TransactionError;

// -----------------------------------------------------------------------
// Sighash flag constants
// -----------------------------------------------------------------------

/// Sign all inputs and all outputs (the default).
pub const SIG_HASH_ALL: SigHashType = SigHashType(0x01);

/// Sign all inputs and no outputs.
pub const SIG_HASH_NONE: SigHashType = SigHashType(0x02);

/// Sign all inputs and only the output with the same index as the signed input.
pub const SIG_HASH_SINGLE: SigHashType = SigHashType(0x04);

/// Modifier: sign only the current input, allowing others to be added.
pub const SIG_HASH_ANYONECANPAY: u8 = 0x80;

/// Mask extracting the base type (ALL, NONE, SINGLE).
pub const SIG_HASH_MASK: u8 = 0x07;

/// A validated sighash type byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SigHashType(u8);

impl SigHashType {
    /// Validate a raw byte. Only ALL, NONE and SINGLE, each optionally
    /// combined with ANYONECANPAY, are accepted.
    pub fn from_u8(value: u8) -> Result<Self, TransactionError> {
        match value & !SIG_HASH_ANYONECANPAY {
            0x01 | 0x02 | 0x04 => Ok(SigHashType(value)),
            _ => Err(TransactionError::InvalidSigHashType(value)),
        }
    }

    /// The same base type with ANYONECANPAY set.
    pub fn with_anyone_can_pay(self) -> Self {
        SigHashType(self.0 | SIG_HASH_ANYONECANPAY)
    }

    pub fn to_u8(self) -> u8 {
        self.0
    }

    pub fn is_all(self) -> bool {
        self.0 & SIG_HASH_MASK == SIG_HASH_ALL.0
    }

    pub fn is_none(self) -> bool {
        self.0 & SIG_HASH_MASK == SIG_HASH_NONE.0
    }

    pub fn is_single(self) -> bool {
        self.0 & SIG_HASH_MASK == SIG_HASH_SINGLE.0
    }

    pub fn is_anyone_can_pay(self) -> bool {
        self.0 & SIG_HASH_ANYONECANPAY != 0
    }
}

impl Default for SigHashType {
    fn default() -> Self {
        SIG_HASH_ALL
    }
}

// -----------------------------------------------------------------------
// Signature hash
// -----------------------------------------------------------------------

/// Compute the Schnorr signature hash for one input.
///
/// # Arguments
/// * `tx`           - The transaction being signed.
/// * `input_index`  - Index of the input being signed.
/// * `spent_script` - Locking script of the output being spent.
/// * `spent_amount` - Value in sompi of the output being spent.
/// * `hash_type`    - Which parts of the transaction the signature commits to.
///
/// # Returns
/// The 32-byte digest to sign, or `InvalidTransaction` if the index is out
/// of range.
pub fn signature_hash(
    tx: &Transaction,
    input_index: usize,
    spent_script: &ScriptPublicKey,
    spent_amount: u64,
    hash_type: SigHashType,
) -> Result<[u8; 32], TransactionError> {
    let preimage = calc_preimage(tx, input_index, spent_script, spent_amount, hash_type)?;
    Ok(transaction_signing_hash(&preimage))
}

/// Compute the ECDSA signature hash for one input.
///
/// `SHA256(SHA256("TransactionSigningHashECDSA") || schnorr_sighash)`.
pub fn ecdsa_signature_hash(
    tx: &Transaction,
    input_index: usize,
    spent_script: &ScriptPublicKey,
    spent_amount: u64,
    hash_type: SigHashType,
) -> Result<[u8; 32], TransactionError> {
    let schnorr = signature_hash(tx, input_index, spent_script, spent_amount, hash_type)?;
    Ok(transaction_signing_hash_ecdsa(&schnorr))
}

/// Build the bytes that [`signature_hash`] hashes.
///
/// The preimage consists of:
/// 1. version (2 bytes LE)
/// 2. previous outputs hash (32 bytes)
/// 3. sequences hash (32 bytes)
/// 4. sig op counts hash (32 bytes)
/// 5. outpoint being spent (36 bytes)
/// 6. spent script version (2 bytes LE) and length-prefixed script
/// 7. spent amount (8 bytes LE)
/// 8. input sequence (8 bytes LE)
/// 9. input sig op count (1 byte)
/// 10. outputs hash (32 bytes)
/// 11. lock time (8 bytes LE)
/// 12. subnetwork id (20 bytes)
/// 13. gas (8 bytes LE)
/// 14. payload hash (32 bytes)
/// 15. sighash type (1 byte)
pub fn calc_preimage(
    tx: &Transaction,
    input_index: usize,
    spent_script: &ScriptPublicKey,
    spent_amount: u64,
    hash_type: SigHashType,
) -> Result<Vec<u8>, TransactionError> {
    let input = tx.inputs.get(input_index).ok_or_else(|| {
        TransactionError::InvalidTransaction(format!(
            "input index {} out of range (tx has {} inputs)",
            input_index,
            tx.inputs.len()
        ))
    })?;

    let mut w = ByteWriter::with_capacity(256);
    w.write_u16_le(tx.version)
        .write_bytes(&previous_outputs_hash(tx, hash_type))
        .write_bytes(&sequences_hash(tx, hash_type))
        .write_bytes(&sig_op_counts_hash(tx, hash_type));
    input.previous_outpoint.write_to(&mut w);
    w.write_u16_le(spent_script.version)
        .write_var_bytes(&spent_script.script)
        .write_u64_le(spent_amount)
        .write_u64_le(input.sequence)
        .write_u8(input.sig_op_count)
        .write_bytes(&outputs_hash(tx, hash_type, input_index))
        .write_u64_le(tx.lock_time)
        .write_bytes(tx.subnetwork_id.as_bytes())
        .write_u64_le(tx.gas)
        .write_bytes(&payload_hash(tx))
        .write_u8(hash_type.to_u8());

    log::trace!(
        "sighash preimage for input {} (type {:#04x}): {} bytes",
        input_index,
        hash_type.to_u8(),
        w.len()
    );
    Ok(w.into_bytes())
}

// -----------------------------------------------------------------------
// Component hashes
// -----------------------------------------------------------------------

const ZERO_HASH: [u8; 32] = [0u8; 32];

fn previous_outputs_hash(tx: &Transaction, hash_type: SigHashType) -> [u8; 32] {
    if hash_type.is_anyone_can_pay() {
        return ZERO_HASH;
    }
    let mut w = ByteWriter::with_capacity(tx.inputs.len() * 36);
    for input in &tx.inputs {
        input.previous_outpoint.write_to(&mut w);
    }
    transaction_signing_hash(w.as_bytes())
}

fn sequences_hash(tx: &Transaction, hash_type: SigHashType) -> [u8; 32] {
    if hash_type.is_anyone_can_pay() || hash_type.is_single() || hash_type.is_none() {
        return ZERO_HASH;
    }
    let mut hasher = DomainHasher::new(HashDomain::TransactionSigning);
    for input in &tx.inputs {
        hasher.update(&input.sequence.to_le_bytes());
    }
    hasher.finalize()
}

fn sig_op_counts_hash(tx: &Transaction, hash_type: SigHashType) -> [u8; 32] {
    if hash_type.is_anyone_can_pay() {
        return ZERO_HASH;
    }
    let counts: Vec<u8> = tx.inputs.iter().map(|i| i.sig_op_count).collect();
    transaction_signing_hash(&counts)
}

fn outputs_hash(tx: &Transaction, hash_type: SigHashType, input_index: usize) -> [u8; 32] {
    if hash_type.is_none() {
        return ZERO_HASH;
    }
    if hash_type.is_single() {
        return match tx.outputs.get(input_index) {
            Some(output) => hash_outputs(std::slice::from_ref(output)),
            None => ZERO_HASH,
        };
    }
    hash_outputs(&tx.outputs)
}

fn hash_outputs(outputs: &[TransactionOutput]) -> [u8; 32] {
    let mut w = ByteWriter::new();
    for output in outputs {
        output.write_to(&mut w);
    }
    transaction_signing_hash(w.as_bytes())
}

fn payload_hash(tx: &Transaction) -> [u8; 32] {
    if tx.subnetwork_id.is_native() && tx.payload.is_empty() {
        return ZERO_HASH;
    }
    let mut w = ByteWriter::with_capacity(8 + tx.payload.len());
    w.write_var_bytes(&tx.payload);
    transaction_signing_hash(w.as_bytes())
}
