//! Personal message signing and verification.
//!
//! The signed digest is the `PersonalMessageSigningHash`-keyed blake2b of
//! the VarInt message length followed by the UTF-8 message bytes. Signatures
//! are 64-byte BIP-340 Schnorr, verified against the signer's x-only key.

use kas_primitives::ec::{PrivateKey, PublicKey, Signature, SignatureScheme};
use kas_primitives::hash::personal_message_hash;

use crate::MessageError;

/// Sign `message` with `key`.
///
/// Deterministic: the same key and message always give the same signature.
pub fn sign_message(key: &PrivateKey, message: &str) -> Result<Signature, MessageError> {
    let hash = personal_message_hash(message.as_bytes());
    Ok(key.sign(&hash, SignatureScheme::Schnorr)?)
}

/// Check `signature` over `message` against `public_key`.
pub fn verify_message(signature: &Signature, message: &str, public_key: &PublicKey) -> bool {
    let hash = personal_message_hash(message.as_bytes());
    signature.verify(&hash, public_key, SignatureScheme::Schnorr)
}

/// Sign `message` with a hex-encoded secret key, returning the signature
/// as hex.
pub fn sign_message_hex(secret_hex: &str, message: &str) -> Result<String, MessageError> {
    let key = PrivateKey::from_hex(secret_hex)?;
    Ok(sign_message(&key, message)?.to_hex())
}

/// Verify a hex signature against a hex public key.
///
/// The key may be x-only (32 bytes) or compressed (33 bytes).
///
/// # Returns
/// `Ok(false)` for a well-formed signature that does not verify; an error
/// when either input cannot be decoded.
pub fn verify_message_hex(signature_hex: &str, message: &str, public_key_hex: &str) -> Result<bool, MessageError> {
    let signature = Signature::from_hex(signature_hex)?;
    let key_bytes = hex::decode(public_key_hex)
        .map_err(|e| MessageError::InvalidEncoding(format!("public key: {}", e)))?;
    let hash = personal_message_hash(message.as_bytes());

    match key_bytes.len() {
        32 => Ok(signature.verify_schnorr_x_only(&hash, &key_bytes)),
        33 => {
            let public_key = PublicKey::from_bytes(&key_bytes)?;
            Ok(signature.verify(&hash, &public_key, SignatureScheme::Schnorr))
        }
        n => Err(MessageError::InvalidEncoding(format!(
            "public key must be 32 or 33 bytes, got {}",
            n
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "b7e151628aed2a6abf7158809cf4f3c762e7160f38b4da56a784d9045190cfef";
    const X_ONLY: &str = "dff1d77f2a671c5f36183726db2341be58feae1da2deced843240f7b502ba659";
    const HELLO_SIGNATURE: &str = "743f94a27d7d9ebaa0adf276e10d490c8056bd3f5e1e0dbf72f3383ab9da4fa67bca493024ec1db7472268eb8c0c82b9428ab40144501c42722e9883ac362851";

    fn key() -> PrivateKey {
        PrivateKey::from_hex(SECRET).unwrap()
    }

    #[test]
    fn test_known_signature() {
        let sig = sign_message(&key(), "Hello Kaspa!").unwrap();
        assert_eq!(sig.to_hex(), HELLO_SIGNATURE);
        assert_eq!(sign_message_hex(SECRET, "Hello Kaspa!").unwrap(), HELLO_SIGNATURE);
    }

    #[test]
    fn test_verify() {
        let k = key();
        let sig = sign_message(&k, "Hello Kaspa!").unwrap();
        assert!(verify_message(&sig, "Hello Kaspa!", &k.pub_key()));
        assert!(!verify_message(&sig, "Hello Kaspa?", &k.pub_key()));

        let other = PrivateKey::from_hex("0000000000000000000000000000000000000000000000000000000000000003").unwrap();
        assert!(!verify_message(&sig, "Hello Kaspa!", &other.pub_key()));
    }

    #[test]
    fn test_verify_hex() {
        assert!(verify_message_hex(HELLO_SIGNATURE, "Hello Kaspa!", X_ONLY).unwrap());
        let compressed = key().pub_key().to_hex();
        assert!(verify_message_hex(HELLO_SIGNATURE, "Hello Kaspa!", &compressed).unwrap());
        assert!(!verify_message_hex(HELLO_SIGNATURE, "Goodbye", X_ONLY).unwrap());
    }

    #[test]
    fn test_verify_hex_bad_input() {
        assert!(verify_message_hex("zz", "m", X_ONLY).is_err());
        assert!(verify_message_hex(HELLO_SIGNATURE, "m", "abcd").is_err());
        assert!(verify_message_hex(&HELLO_SIGNATURE[..64], "m", X_ONLY).is_err());
        assert!(sign_message_hex("", "m").is_err());
    }

    #[test]
    fn test_empty_and_long_messages() {
        let k = key();
        let long = "k".repeat(70_000);
        for message in ["", long.as_str()] {
            let sig = sign_message(&k, message).unwrap();
            assert!(verify_message(&sig, message, &k.pub_key()));
        }
    }

    #[test]
    fn test_not_a_transaction_signature() {
        let k = key();
        let sig = sign_message(&k, "Hello Kaspa!").unwrap();
        let raw = kas_primitives::hash::transaction_signing_hash(b"Hello Kaspa!");
        assert!(!sig.verify(&raw, &k.pub_key(), SignatureScheme::Schnorr));
    }
}
