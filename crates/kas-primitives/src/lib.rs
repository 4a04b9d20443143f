/// Kaspa SDK - Cryptographic primitives, hashing, and utilities.
///
/// This crate provides the foundational building blocks for the Kaspa SDK:
/// - Domain-separated BLAKE2b-256 hashing (transaction ids, signing hashes,
///   personal messages) and SHA-256
/// - Hash type for transaction identification
/// - secp256k1 keys with Schnorr (BIP-340) and ECDSA (RFC 6979) signatures
/// - Little-endian byte writer/reader and variable-length integers

pub mod hash;
pub mod chainhash;
pub mod util;
pub mod ec;

mod error;
pub use error::PrimitivesError;
