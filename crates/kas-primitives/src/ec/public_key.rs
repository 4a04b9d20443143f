//! secp256k1 public key.
//!
//! Supports compressed SEC1 serialization (the ECDSA address payload), the
//! 32-byte x-only form (the Schnorr address payload), and verification under
//! either signature scheme.

use std::fmt;

use k256::ecdsa::VerifyingKey;

use crate::ec::signature::{Signature, SignatureScheme};
use crate::PrimitivesError;

/// Length of a compressed public key in bytes (prefix + 32 byte x-coordinate).
pub const COMPRESSED_LEN: usize = 33;

/// Length of an x-only public key in bytes.
pub const X_ONLY_LEN: usize = 32;

/// A secp256k1 public key.
#[derive(Clone, Debug)]
pub struct PublicKey {
    /// The underlying k256 verifying key.
    inner: VerifyingKey,
}

impl PublicKey {
    /// Create a PublicKey from SEC1 encoded bytes (33 or 65 bytes).
    ///
    /// # Returns
    /// `Ok(PublicKey)` on success, or `InvalidPublicKey` if the bytes do not
    /// encode a point on the curve.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.is_empty() {
            return Err(PrimitivesError::InvalidPublicKey(
                "pubkey bytes are empty".to_string(),
            ));
        }
        let vk = VerifyingKey::from_sec1_bytes(bytes)
            .map_err(|e| PrimitivesError::InvalidPublicKey(e.to_string()))?;
        Ok(PublicKey { inner: vk })
    }

    /// Create a PublicKey from a hex-encoded SEC1 string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Serialize the public key in compressed SEC1 format (33 bytes).
    ///
    /// The first byte is 0x02 (even Y) or 0x03 (odd Y), followed by the
    /// 32-byte X coordinate.
    pub fn to_compressed(&self) -> [u8; COMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(true);
        let mut out = [0u8; COMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Serialize the X coordinate only (BIP-340 public key, 32 bytes).
    pub fn to_x_only(&self) -> [u8; X_ONLY_LEN] {
        let compressed = self.to_compressed();
        let mut out = [0u8; X_ONLY_LEN];
        out.copy_from_slice(&compressed[1..]);
        out
    }

    /// The key bytes a given scheme commits to: x-only for Schnorr,
    /// compressed SEC1 for ECDSA.
    pub fn to_scheme_bytes(&self, scheme: SignatureScheme) -> Vec<u8> {
        match scheme {
            SignatureScheme::Schnorr => self.to_x_only().to_vec(),
            SignatureScheme::Ecdsa => self.to_compressed().to_vec(),
        }
    }

    /// Serialize the public key as lowercase hex (compressed format).
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_compressed())
    }

    /// Verify a signature against a 32-byte hash.
    ///
    /// # Returns
    /// `true` if the signature is valid for this key under `scheme`.
    pub fn verify(&self, hash: &[u8; 32], sig: &Signature, scheme: SignatureScheme) -> bool {
        sig.verify(hash, self, scheme)
    }

    /// Construct a PublicKey from a k256 `VerifyingKey`.
    pub(crate) fn from_k256_verifying_key(vk: &VerifyingKey) -> Self {
        PublicKey { inner: *vk }
    }

    /// Access the underlying k256 verifying key.
    pub(crate) fn verifying_key(&self) -> &VerifyingKey {
        &self.inner
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_compressed() == other.to_compressed()
    }
}

impl Eq for PublicKey {}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
