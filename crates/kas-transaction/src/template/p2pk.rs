//! Pay-to-public-key script template.
//!
//! Locking scripts are `OP_DATA_32 <x-only key> OP_CHECKSIG` (Schnorr) or
//! `OP_DATA_33 <compressed key> OP_CHECKSIG_ECDSA`; both are unlocked by
//! `OP_DATA_65 <64-byte signature || sighash type>`.

use kas_primitives::ec::{PrivateKey, PublicKey, SignatureScheme};
use kas_script::script::{parse_signature_script, signature_script, SIGNATURE_SCRIPT_LEN};
use kas_script::{Address, ScriptPublicKey};

use crate::sighash::{ecdsa_signature_hash, signature_hash, SigHashType};
use crate::template::SignatureScriptTemplate;
use crate::transaction::Transaction;
use crate::utxo::UtxoEntry;
use crate::TransactionError;

/// Create the locking script paying to `address`.
pub fn lock(address: &Address) -> ScriptPublicKey {
    address.to_script_public_key()
}

/// Create a P2PK unlocker for signing transaction inputs.
///
/// The key is borrowed; the unlocker never copies secret material.
pub fn unlock(private_key: &PrivateKey, sighash_type: SigHashType) -> P2PK<'_> {
    P2PK { private_key, sighash_type }
}

/// P2PK signing template holding a borrowed private key and sighash type.
pub struct P2PK<'a> {
    private_key: &'a PrivateKey,
    sighash_type: SigHashType,
}

impl SignatureScriptTemplate for P2PK<'_> {
    /// Sign the input spending `entry`.
    ///
    /// The scheme follows the spent script: P2PK scripts get a Schnorr
    /// signature, P2PK-ECDSA scripts an ECDSA one. The key must be the one
    /// the script pays to (`KeyMismatch` otherwise).
    fn sign(&self, tx: &Transaction, entry: &UtxoEntry, input_index: usize) -> Result<Vec<u8>, TransactionError> {
        let input = tx.inputs.get(input_index).ok_or_else(|| {
            TransactionError::SigningError(format!(
                "input index {} out of range (tx has {} inputs)",
                input_index,
                tx.inputs.len()
            ))
        })?;
        if input.previous_outpoint != entry.outpoint {
            return Err(TransactionError::SigningError(format!(
                "input {} spends {} but entry is for {}",
                input_index, input.previous_outpoint, entry.outpoint
            )));
        }

        let spent = &entry.script_public_key;
        let scheme = spent
            .class()
            .signature_scheme()
            .ok_or(TransactionError::UnsupportedScript { index: input_index })?;

        let expected = ScriptPublicKey::for_public_key(&self.private_key.pub_key(), scheme);
        if &expected != spent {
            return Err(TransactionError::KeyMismatch { index: input_index });
        }

        let hash = scheme_hash(tx, input_index, entry, self.sighash_type, scheme)?;
        let signature = self.private_key.sign(&hash, scheme)?;
        Ok(signature_script(&signature, self.sighash_type.to_u8()))
    }

    fn estimate_length(&self) -> usize {
        SIGNATURE_SCRIPT_LEN
    }
}

/// Check the signature script of `input_index` against the key in the
/// script it spends.
///
/// # Returns
/// `Ok(false)` for a well-formed but invalid signature; an error when the
/// script cannot be parsed or the spent script is not P2PK.
pub fn verify_input(tx: &Transaction, entry: &UtxoEntry, input_index: usize) -> Result<bool, TransactionError> {
    let input = tx.inputs.get(input_index).ok_or_else(|| {
        TransactionError::InvalidTransaction(format!(
            "input index {} out of range (tx has {} inputs)",
            input_index,
            tx.inputs.len()
        ))
    })?;
    let (signature, hash_type) = parse_signature_script(&input.signature_script)?;
    let hash_type = SigHashType::from_u8(hash_type)?;

    let spent = &entry.script_public_key;
    let scheme = spent
        .class()
        .signature_scheme()
        .ok_or(TransactionError::UnsupportedScript { index: input_index })?;
    let key_bytes = spent
        .payload()
        .ok_or(TransactionError::UnsupportedScript { index: input_index })?;

    let hash = scheme_hash(tx, input_index, entry, hash_type, scheme)?;
    Ok(match scheme {
        SignatureScheme::Schnorr => signature.verify_schnorr_x_only(&hash, key_bytes),
        SignatureScheme::Ecdsa => {
            let public_key = PublicKey::from_bytes(key_bytes)?;
            signature.verify(&hash, &public_key, SignatureScheme::Ecdsa)
        }
    })
}

fn scheme_hash(
    tx: &Transaction,
    input_index: usize,
    entry: &UtxoEntry,
    hash_type: SigHashType,
    scheme: SignatureScheme,
) -> Result<[u8; 32], TransactionError> {
    match scheme {
        SignatureScheme::Schnorr => {
            signature_hash(tx, input_index, &entry.script_public_key, entry.amount, hash_type)
        }
        SignatureScheme::Ecdsa => {
            ecdsa_signature_hash(tx, input_index, &entry.script_public_key, entry.amount, hash_type)
        }
    }
}
