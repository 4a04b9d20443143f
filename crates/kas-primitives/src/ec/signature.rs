//! 64-byte secp256k1 signatures.
//!
//! Schnorr signatures follow BIP-340 and are `R.x || s`. ECDSA signatures
//! are the compact `r || s` form with RFC 6979 nonces and low-S
//! normalization. Signing never draws randomness, so identical inputs always
//! produce identical signatures.

use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{self, RecoveryId, VerifyingKey};
use k256::schnorr;
use serde::{Deserialize, Serialize};

use crate::ec::private_key::PrivateKey;
use crate::ec::public_key::PublicKey;
use crate::PrimitivesError;

/// Length of a serialized signature in bytes.
pub const SIGNATURE_LEN: usize = 64;

/// Length of a recoverable ECDSA signature (header byte + r + s).
pub const COMPACT_SIGNATURE_LEN: usize = 65;

/// Header base for recoverable signatures over compressed keys.
const COMPACT_HEADER_BASE: u8 = 27 + 4;

/// The signature algorithm an input or message is signed with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureScheme {
    /// BIP-340 Schnorr over the x-only key.
    #[default]
    Schnorr,
    /// ECDSA over the compressed key.
    Ecdsa,
}

/// A 64-byte signature with R and S halves.
///
/// For Schnorr, `r` holds the x-coordinate of the nonce point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    /// The R component (32 bytes, big-endian).
    r: [u8; 32],
    /// The S component (32 bytes, big-endian).
    s: [u8; 32],
}

impl Signature {
    /// Create a signature from raw R and S arrays.
    pub fn new(r: [u8; 32], s: [u8; 32]) -> Self {
        Signature { r, s }
    }

    /// Access the R component of the signature.
    pub fn r(&self) -> &[u8; 32] {
        &self.r
    }

    /// Access the S component of the signature.
    pub fn s(&self) -> &[u8; 32] {
        &self.s
    }

    /// Parse a 64-byte `r || s` signature.
    ///
    /// # Returns
    /// `Ok(Signature)` on success, or `InvalidSignature` for any other length.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != SIGNATURE_LEN {
            return Err(PrimitivesError::InvalidSignature(format!(
                "expected {} bytes, got {}",
                SIGNATURE_LEN,
                bytes.len()
            )));
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        Ok(Signature { r, s })
    }

    /// Parse a 128-character hex signature.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        Self::from_bytes(&hex::decode(hex_str)?)
    }

    /// Serialize as `r || s`.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LEN] {
        let mut out = [0u8; SIGNATURE_LEN];
        out[..32].copy_from_slice(&self.r);
        out[32..].copy_from_slice(&self.s);
        out
    }

    /// Serialize as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Sign a 32-byte hash with BIP-340 Schnorr and zero auxiliary randomness.
    ///
    /// # Arguments
    /// * `hash` - The message hash to sign.
    /// * `priv_key` - The private key to sign with.
    ///
    /// # Returns
    /// `Ok(Signature)` on success, or an error if signing fails.
    pub fn sign_schnorr(hash: &[u8; 32], priv_key: &PrivateKey) -> Result<Self, PrimitivesError> {
        let secret = priv_key.to_bytes();
        let signing_key = schnorr::SigningKey::from_bytes(&secret[..])
            .map_err(|e| PrimitivesError::InvalidPrivateKey(e.to_string()))?;
        let sig: schnorr::Signature = signing_key
            .sign_prehash(hash)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        Self::from_bytes(&sig.to_bytes())
    }

    /// Sign a 32-byte hash with ECDSA using RFC 6979 nonces.
    ///
    /// The S value is normalized to the lower half of the curve order.
    pub fn sign_ecdsa(hash: &[u8; 32], priv_key: &PrivateKey) -> Result<Self, PrimitivesError> {
        let (sig, _) = sign_ecdsa_recoverable(hash, priv_key)?;
        let (r, s) = sig.split_bytes();
        let mut out = Signature { r: [0u8; 32], s: [0u8; 32] };
        out.r.copy_from_slice(&r);
        out.s.copy_from_slice(&s);
        Ok(out)
    }

    /// Sign with ECDSA and return the 65-byte recoverable form.
    ///
    /// Format: `<header> <32-byte R> <32-byte S>` where the header is
    /// `31 + recovery_id`.
    pub fn sign_compact(
        hash: &[u8; 32],
        priv_key: &PrivateKey,
    ) -> Result<[u8; COMPACT_SIGNATURE_LEN], PrimitivesError> {
        let (sig, recovery_id) = sign_ecdsa_recoverable(hash, priv_key)?;
        let mut out = [0u8; COMPACT_SIGNATURE_LEN];
        out[0] = COMPACT_HEADER_BASE + recovery_id.to_byte();
        out[1..].copy_from_slice(&sig.to_bytes());
        Ok(out)
    }

    /// Verify this signature against a 32-byte hash and public key.
    ///
    /// # Returns
    /// `true` if the signature is valid under `scheme`, `false` otherwise.
    pub fn verify(&self, hash: &[u8; 32], pub_key: &PublicKey, scheme: SignatureScheme) -> bool {
        match scheme {
            SignatureScheme::Schnorr => self.verify_schnorr_x_only(hash, &pub_key.to_x_only()),
            SignatureScheme::Ecdsa => self.verify_ecdsa(hash, pub_key.verifying_key()),
        }
    }

    /// Verify a Schnorr signature against a 32-byte x-only key.
    ///
    /// Returns `false` when the key bytes are not a valid x-coordinate.
    pub fn verify_schnorr_x_only(&self, hash: &[u8; 32], x_only: &[u8]) -> bool {
        let Ok(verifying_key) = schnorr::VerifyingKey::from_bytes(x_only) else {
            return false;
        };
        let Ok(sig) = schnorr::Signature::try_from(&self.to_bytes()[..]) else {
            return false;
        };
        verifying_key.verify_prehash(hash, &sig).is_ok()
    }

    fn verify_ecdsa(&self, hash: &[u8; 32], verifying_key: &VerifyingKey) -> bool {
        let Ok(sig) = ecdsa::Signature::from_scalars(
            k256::FieldBytes::from(self.r),
            k256::FieldBytes::from(self.s),
        ) else {
            return false;
        };
        verifying_key.verify_prehash(hash, &sig).is_ok()
    }

    /// Recover the signer's public key from a recoverable ECDSA signature.
    ///
    /// Best effort: `None` means recovery was not possible (malformed input
    /// or no valid point), not that some signature is invalid.
    pub fn recover_public_key(compact_sig: &[u8], hash: &[u8; 32]) -> Option<PublicKey> {
        if compact_sig.len() != COMPACT_SIGNATURE_LEN {
            return None;
        }
        let header = compact_sig[0].checked_sub(27)?;
        let recovery_id = RecoveryId::from_byte(header & !4u8)?;
        let sig = ecdsa::Signature::from_slice(&compact_sig[1..]).ok()?;
        let recovered = VerifyingKey::recover_from_prehash(hash, &sig, recovery_id).ok()?;
        Some(PublicKey::from_k256_verifying_key(&recovered))
    }
}

/// RFC 6979 signature with a recovery id matching the low-S form.
fn sign_ecdsa_recoverable(
    hash: &[u8; 32],
    priv_key: &PrivateKey,
) -> Result<(ecdsa::Signature, RecoveryId), PrimitivesError> {
    let (sig, recovery_id) = priv_key
        .signing_key()
        .sign_prehash_recoverable(hash)
        .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
    // Negating s mirrors R, which flips the parity bit of the recovery id.
    Ok(match sig.normalize_s() {
        Some(normalized) => (
            normalized,
            RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced()),
        ),
        None => (sig, recovery_id),
    })
}

impl Serialize for Signature {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Signature::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha256;

    /// secp256k1 curve order n minus one.
    const MAX_SCALAR_HEX: &str =
        "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364140";

    fn key(hex_str: &str) -> PrivateKey {
        PrivateKey::from_hex(hex_str).expect("valid test key")
    }

    // ---- Schnorr ----

    /// BIP-340 test vector 0: the only official vector with zero aux randomness.
    #[test]
    fn test_bip340_vector_zero() {
        let priv_key = key("0000000000000000000000000000000000000000000000000000000000000003");
        let hash = [0u8; 32];
        let sig = Signature::sign_schnorr(&hash, &priv_key).unwrap();
        assert_eq!(
            sig.to_hex(),
            "e907831f80848d1069a5371b402410364bdf1c5f8307b0084c55f1ce2dca8215\
             25f66a4a85ea8b71e482a74f382d2ce5ebeee8fdb2172f477df4900d310536c0"
        );
        assert!(sig.verify(&hash, &priv_key.pub_key(), SignatureScheme::Schnorr));
    }

    // ---- ECDSA ----

    /// RFC 6979 vectors (Trezor / CoreBitcoin set), r and s after low-S.
    #[test]
    fn test_rfc6979() {
        let tests = vec![
            (
                "cca9fbcc1b41e5a95d369eaa6ddcff73b61a4efaa279cfc6567e8daa39cbaf50",
                "sample",
                "af340daf02cc15c8d5d08d7735dfe6b98a474ed373bdb5fbecf7571be52b3842",
                "5009fb27f37034a9b24b707b7c6b79ca23ddef9e25f7282e8a797efe53a8f124",
            ),
            (
                "0000000000000000000000000000000000000000000000000000000000000001",
                "Satoshi Nakamoto",
                "934b1ea10a4b3c1757e2b0c017d0b6143ce3c9a7e6a4a49860d7a6ab210ee3d8",
                "2442ce9d2b916064108014783e923ec36b49743e2ffa1c4496f01a512aafd9e5",
            ),
            (
                MAX_SCALAR_HEX,
                "Satoshi Nakamoto",
                "fd567d121db66e382991534ada77a6bd3106f0a1098c231e47993447cd6af2d0",
                "6b39cd0eb1bc8603e159ef5c20a5c8ad685a45b06ce9bebed3f153d10d93bed5",
            ),
            (
                "f8b8af8ce3c7cca5e300d33939540c10d45ce001b8f252bfbc57ba0342904181",
                "Alan Turing",
                "7063ae83e7f62bbb171798131b4a0564b956930092b33b07b395615d9ec7e15c",
                "58dfcc1e00a35e1572f366ffe34ba0fc47db1e7189759b9fb233c5b05ab388ea",
            ),
        ];

        for (key_hex, msg, r_hex, s_hex) in &tests {
            let priv_key = key(key_hex);
            let hash = sha256(msg.as_bytes());
            let sig = Signature::sign_ecdsa(&hash, &priv_key).unwrap();
            assert_eq!(hex::encode(sig.r()), *r_hex, "r for message '{}'", msg);
            assert_eq!(hex::encode(sig.s()), *s_hex, "s for message '{}'", msg);
            assert!(sig.verify(&hash, &priv_key.pub_key(), SignatureScheme::Ecdsa));
        }
    }

    // ---- Both schemes ----

    #[test]
    fn test_signing_is_deterministic() {
        let priv_key = PrivateKey::new();
        let hash = sha256(b"determinism");
        for scheme in [SignatureScheme::Schnorr, SignatureScheme::Ecdsa] {
            let a = priv_key.sign(&hash, scheme).unwrap();
            let b = priv_key.sign(&hash, scheme).unwrap();
            assert_eq!(a, b, "{:?} signatures must be identical", scheme);
        }
    }

    #[test]
    fn test_verify_rejects_wrong_inputs() {
        let priv_key = PrivateKey::new();
        let other_key = PrivateKey::new();
        let hash = sha256(b"pay 1 KAS");
        let other_hash = sha256(b"pay 2 KAS");

        for scheme in [SignatureScheme::Schnorr, SignatureScheme::Ecdsa] {
            let sig = priv_key.sign(&hash, scheme).unwrap();
            assert!(priv_key.pub_key().verify(&hash, &sig, scheme), "{:?} valid", scheme);
            assert!(!other_key.pub_key().verify(&hash, &sig, scheme), "{:?} wrong key", scheme);
            assert!(!priv_key.pub_key().verify(&other_hash, &sig, scheme), "{:?} wrong hash", scheme);

            for bit in [0usize, 100, 300, 511] {
                let mut bytes = sig.to_bytes();
                bytes[bit / 8] ^= 1 << (bit % 8);
                let flipped = Signature::from_bytes(&bytes).unwrap();
                assert!(
                    !priv_key.pub_key().verify(&hash, &flipped, scheme),
                    "{:?} bit {} flipped",
                    scheme,
                    bit
                );
            }
        }
    }

    #[test]
    fn test_schemes_are_not_interchangeable() {
        let priv_key = PrivateKey::new();
        let hash = sha256(b"scheme");
        let schnorr_sig = priv_key.sign(&hash, SignatureScheme::Schnorr).unwrap();
        assert!(!priv_key.pub_key().verify(&hash, &schnorr_sig, SignatureScheme::Ecdsa));
    }

    #[test]
    fn test_from_bytes_length() {
        assert!(Signature::from_bytes(&[0u8; 63]).is_err());
        assert!(Signature::from_bytes(&[0u8; 65]).is_err());
        assert!(Signature::from_bytes(&[0u8; 64]).is_ok());
    }

    #[test]
    fn test_serde_hex() {
        let sig = Signature::new([1u8; 32], [2u8; 32]);
        let json = serde_json::to_string(&sig).unwrap();
        assert_eq!(json, format!("\"{}{}\"", "01".repeat(32), "02".repeat(32)));
        let back: Signature = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sig);
    }

    // ---- Recovery ----

    #[test]
    fn test_recover_public_key() {
        for _ in 0..10 {
            let priv_key = PrivateKey::new();
            let hash = sha256(b"test data for compact signature");
            let compact = Signature::sign_compact(&hash, &priv_key).unwrap();
            let recovered = Signature::recover_public_key(&compact, &hash)
                .expect("recovery should succeed");
            assert_eq!(recovered, priv_key.pub_key());

            let plain = Signature::sign_ecdsa(&hash, &priv_key).unwrap();
            assert_eq!(&compact[1..], &plain.to_bytes()[..]);
        }
    }

    #[test]
    fn test_recover_malformed_is_none() {
        let hash = [7u8; 32];
        assert!(Signature::recover_public_key(&[0u8; 64], &hash).is_none());
        assert!(Signature::recover_public_key(&[0u8; 65], &hash).is_none());
        let mut bad_header = [1u8; 65];
        bad_header[0] = 99;
        assert!(Signature::recover_public_key(&bad_header, &hash).is_none());
    }
}
