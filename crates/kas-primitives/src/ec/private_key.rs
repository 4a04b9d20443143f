//! secp256k1 private key.
//!
//! Wraps the k256 signing key, which zeroizes its scalar on drop. Byte and
//! hex exports are returned inside `Zeroizing` so temporary copies are wiped
//! as well.

use std::fmt;

use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;
use zeroize::{Zeroize, Zeroizing};

use crate::ec::public_key::PublicKey;
use crate::ec::signature::{Signature, SignatureScheme};
use crate::PrimitivesError;

/// Length of a serialized private key in bytes.
const PRIVATE_KEY_BYTES_LEN: usize = 32;

/// A secp256k1 private key for Schnorr and ECDSA signing.
#[derive(Clone)]
pub struct PrivateKey {
    /// The underlying k256 signing key.
    inner: SigningKey,
}

impl PrivateKey {
    /// Generate a new random private key from the OS CSPRNG.
    pub fn new() -> Self {
        PrivateKey {
            inner: SigningKey::random(&mut OsRng),
        }
    }

    /// Create a private key from a raw 32-byte big-endian scalar.
    ///
    /// # Arguments
    /// * `bytes` - A 32-byte slice representing the private key scalar.
    ///
    /// # Returns
    /// `Ok(PrivateKey)` if the scalar is in `[1, n)`, or `InvalidPrivateKey`
    /// for a wrong length, zero, or a value at or above the curve order.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != PRIVATE_KEY_BYTES_LEN {
            return Err(PrimitivesError::InvalidPrivateKey(format!(
                "expected {} bytes, got {}",
                PRIVATE_KEY_BYTES_LEN,
                bytes.len()
            )));
        }
        let signing_key = SigningKey::from_slice(bytes)
            .map_err(|_| PrimitivesError::InvalidPrivateKey("scalar out of range".to_string()))?;
        Ok(PrivateKey { inner: signing_key })
    }

    /// Create a private key from a 64-character hex string.
    ///
    /// # Returns
    /// `Ok(PrivateKey)` on success, `InvalidPrivateKey` for empty or non-hex
    /// input and for invalid scalars.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        if hex_str.is_empty() {
            return Err(PrimitivesError::InvalidPrivateKey(
                "private key hex is empty".to_string(),
            ));
        }
        let bytes = Zeroizing::new(
            hex::decode(hex_str)
                .map_err(|e| PrimitivesError::InvalidPrivateKey(e.to_string()))?,
        );
        Self::from_bytes(&bytes)
    }

    /// Serialize the private key as a 32-byte big-endian array.
    pub fn to_bytes(&self) -> Zeroizing<[u8; 32]> {
        let mut field = self.inner.to_bytes();
        let mut out = Zeroizing::new([0u8; 32]);
        out.copy_from_slice(&field);
        field.as_mut_slice().zeroize();
        out
    }

    /// Serialize the private key as lowercase hex.
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(&*self.to_bytes()))
    }

    /// Derive the corresponding public key.
    pub fn pub_key(&self) -> PublicKey {
        PublicKey::from_k256_verifying_key(self.inner.verifying_key())
    }

    /// Sign a 32-byte hash with the given scheme.
    ///
    /// Both schemes are deterministic: Schnorr uses BIP-340 with all-zero
    /// auxiliary randomness, ECDSA uses RFC 6979 nonces with low-S output.
    ///
    /// # Arguments
    /// * `hash` - The 32-byte message hash to sign.
    /// * `scheme` - Schnorr or ECDSA.
    ///
    /// # Returns
    /// `Ok(Signature)` on success, or an error if signing fails.
    pub fn sign(&self, hash: &[u8; 32], scheme: SignatureScheme) -> Result<Signature, PrimitivesError> {
        match scheme {
            SignatureScheme::Schnorr => Signature::sign_schnorr(hash, self),
            SignatureScheme::Ecdsa => Signature::sign_ecdsa(hash, self),
        }
    }

    /// Access the underlying k256 signing key.
    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.inner
    }
}

impl Default for PrivateKey {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        *self.to_bytes() == *other.to_bytes()
    }
}

impl Eq for PrivateKey {}

/// Never prints the scalar.
impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("public_key", &self.pub_key().to_hex())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// secp256k1 curve order n.
    const CURVE_ORDER_HEX: &str =
        "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141";

    #[test]
    fn test_hex_round_trip() {
        let key_hex = "b7e151628aed2a6abf7158809cf4f3c762e7160f38b4da56a784d9045190cfef";
        let key = PrivateKey::from_hex(key_hex).unwrap();
        assert_eq!(key.to_hex().as_str(), key_hex);
        assert_eq!(PrivateKey::from_bytes(&*key.to_bytes()).unwrap(), key);
    }

    #[test]
    fn test_to_bytes_matches_scalar() {
        let key = PrivateKey::from_hex(&format!("{}2a", "00".repeat(31))).unwrap();
        let bytes = key.to_bytes();
        assert_eq!(bytes[31], 0x2a);
        assert!(bytes[..31].iter().all(|b| *b == 0));
        assert_eq!(*key.to_bytes(), *bytes);
    }

    #[test]
    fn test_invalid_private_keys() {
        let tests = vec![
            ("empty", String::new()),
            ("not hex", "zz".repeat(32)),
            ("short", "01".repeat(31)),
            ("long", "01".repeat(33)),
            ("zero", "00".repeat(32)),
            ("curve order", CURVE_ORDER_HEX.to_string()),
            ("above order", "ff".repeat(32)),
        ];
        for (name, input) in tests {
            let err = PrivateKey::from_hex(&input).expect_err(name);
            assert!(
                matches!(err, PrimitivesError::InvalidPrivateKey(_)),
                "{}: unexpected error {:?}",
                name,
                err
            );
        }
    }

    #[test]
    fn test_max_valid_scalar() {
        let key = PrivateKey::from_hex(
            "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364140",
        );
        assert!(key.is_ok());
    }

    #[test]
    fn test_random_keys_differ() {
        let a = PrivateKey::new();
        let b = PrivateKey::new();
        assert_ne!(a, b);
        assert_ne!(a.pub_key().to_compressed(), b.pub_key().to_compressed());
    }

    #[test]
    fn test_debug_hides_scalar() {
        let key_hex = "0000000000000000000000000000000000000000000000000000000000000003";
        let key = PrivateKey::from_hex(key_hex).unwrap();
        let debug = format!("{:?}", key);
        assert!(!debug.contains(key_hex));
        assert!(debug.contains(&key.pub_key().to_hex()));
    }
}
