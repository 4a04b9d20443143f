/// Elliptic curve cryptography on secp256k1.
///
/// Provides private keys, public keys, and 64-byte Schnorr (BIP-340) and
/// ECDSA (RFC 6979) signatures over precomputed 32-byte hashes.

pub mod private_key;
pub mod public_key;
pub mod signature;

pub use private_key::PrivateKey;
pub use public_key::PublicKey;
pub use signature::{Signature, SignatureScheme};
