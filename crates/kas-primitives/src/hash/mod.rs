//! Hash function primitives for the Kaspa SDK.
//!
//! Every consensus hash is BLAKE2b-256 keyed with a domain string, so a digest
//! computed for one purpose can never be replayed as a digest for another.
//! SHA-256 is kept for the ECDSA signing-hash wrapper.

use blake2b_simd::Params;
use sha2::{Digest, Sha256};

use crate::util::VarInt;

/// Key for transaction identifiers (signature scripts excluded).
pub const TRANSACTION_ID_DOMAIN: &[u8] = b"TransactionID";

/// Key for the full transaction hash (signature scripts included).
pub const TRANSACTION_HASH_DOMAIN: &[u8] = b"TransactionHash";

/// Key for per-input signature hashes and their sub-hashes.
pub const TRANSACTION_SIGNING_DOMAIN: &[u8] = b"TransactionSigningHash";

/// Prefix hashed into the ECDSA signing hash.
pub const TRANSACTION_SIGNING_ECDSA_DOMAIN: &[u8] = b"TransactionSigningHashECDSA";

/// Key for off-chain personal messages.
pub const PERSONAL_MESSAGE_DOMAIN: &[u8] = b"PersonalMessageSigningHash";

/// Output size of every domain hash in bytes.
pub const DOMAIN_HASH_SIZE: usize = 32;

/// The purpose a digest is computed for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HashDomain {
    /// Transaction identifier.
    TransactionId,
    /// Full transaction hash, committing to signatures.
    TransactionHash,
    /// Signature hash of a single input.
    TransactionSigning,
    /// Off-chain personal message.
    PersonalMessage,
}

impl HashDomain {
    /// The BLAKE2b key bytes for this domain.
    pub fn key(&self) -> &'static [u8] {
        match self {
            HashDomain::TransactionId => TRANSACTION_ID_DOMAIN,
            HashDomain::TransactionHash => TRANSACTION_HASH_DOMAIN,
            HashDomain::TransactionSigning => TRANSACTION_SIGNING_DOMAIN,
            HashDomain::PersonalMessage => PERSONAL_MESSAGE_DOMAIN,
        }
    }
}

/// Incremental BLAKE2b-256 hasher bound to one [`HashDomain`].
///
/// Used where the preimage is produced piecewise, e.g. the signature hash
/// sub-hashes over all inputs or outputs.
#[derive(Clone)]
pub struct DomainHasher {
    state: blake2b_simd::State,
}

impl DomainHasher {
    /// Create a hasher keyed with the given domain.
    pub fn new(domain: HashDomain) -> Self {
        let state = Params::new()
            .hash_length(DOMAIN_HASH_SIZE)
            .key(domain.key())
            .to_state();
        DomainHasher { state }
    }

    /// Feed more bytes into the hasher.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.state.update(data);
        self
    }

    /// Finish hashing and return the 32-byte digest.
    pub fn finalize(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(self.state.finalize().as_bytes());
        out
    }
}

/// Compute a BLAKE2b-256 digest keyed with `key`.
///
/// # Arguments
/// * `key` - The domain key (at most 64 bytes).
/// * `data` - Byte slice to hash.
///
/// # Returns
/// A 32-byte keyed BLAKE2b digest.
pub fn blake2b_256_keyed(key: &[u8], data: &[u8]) -> [u8; 32] {
    let hash = Params::new()
        .hash_length(DOMAIN_HASH_SIZE)
        .key(key)
        .hash(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(hash.as_bytes());
    out
}

/// Compute an unkeyed BLAKE2b-256 digest (pay-to-script-hash commitments).
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let hash = Params::new().hash_length(DOMAIN_HASH_SIZE).hash(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(hash.as_bytes());
    out
}

/// Hash an identity serialization into a transaction id.
pub fn transaction_id_hash(data: &[u8]) -> [u8; 32] {
    blake2b_256_keyed(TRANSACTION_ID_DOMAIN, data)
}

/// Hash a full serialization into a transaction hash.
pub fn transaction_hash(data: &[u8]) -> [u8; 32] {
    blake2b_256_keyed(TRANSACTION_HASH_DOMAIN, data)
}

/// Hash a signature-hash preimage.
pub fn transaction_signing_hash(data: &[u8]) -> [u8; 32] {
    blake2b_256_keyed(TRANSACTION_SIGNING_DOMAIN, data)
}

/// Derive the ECDSA signing hash from a Schnorr signing hash.
///
/// Computes `SHA-256(SHA-256("TransactionSigningHashECDSA") || sighash)`.
///
/// # Arguments
/// * `sighash` - The 32-byte digest produced by [`transaction_signing_hash`].
///
/// # Returns
/// The 32-byte digest an ECDSA input signs.
pub fn transaction_signing_hash_ecdsa(sighash: &[u8; 32]) -> [u8; 32] {
    let domain = sha256(TRANSACTION_SIGNING_ECDSA_DOMAIN);
    let mut hasher = Sha256::new();
    hasher.update(domain);
    hasher.update(sighash);
    hasher.finalize().into()
}

/// Hash an off-chain message for signing.
///
/// The preimage is the VarInt-encoded message length followed by the
/// message bytes, keyed with `"PersonalMessageSigningHash"`.
///
/// # Arguments
/// * `message` - Raw message bytes.
///
/// # Returns
/// The 32-byte message hash.
pub fn personal_message_hash(message: &[u8]) -> [u8; 32] {
    let mut hasher = DomainHasher::new(HashDomain::PersonalMessage);
    hasher.update(&VarInt(message.len() as u64).to_bytes());
    hasher.update(message);
    hasher.finalize()
}

/// Compute SHA-256 hash of the input data.
///
/// # Arguments
/// * `data` - Byte slice to hash.
///
/// # Returns
/// A 32-byte SHA-256 digest.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}
