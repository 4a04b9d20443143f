use proptest::prelude::*;

use kas_primitives::chainhash::Hash;
use kas_primitives::ec::{PrivateKey, Signature, SignatureScheme};
use kas_primitives::hash::{transaction_signing_hash, DomainHasher, HashDomain};
use kas_primitives::util::{ByteReader, ByteWriter};

fn scheme() -> impl Strategy<Value = SignatureScheme> {
    prop_oneof![Just(SignatureScheme::Schnorr), Just(SignatureScheme::Ecdsa)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn sign_verify_and_determinism(
        seed in prop::array::uniform32(any::<u8>()),
        msg in prop::collection::vec(any::<u8>(), 0..256),
        scheme in scheme(),
    ) {
        // Not all 32-byte arrays are valid private keys (must be < curve order, nonzero).
        if let Ok(pk) = PrivateKey::from_bytes(&seed) {
            let hash = transaction_signing_hash(&msg);
            let sig = pk.sign(&hash, scheme).unwrap();
            prop_assert!(pk.pub_key().verify(&hash, &sig, scheme));
            prop_assert_eq!(sig, pk.sign(&hash, scheme).unwrap());

            let parsed = Signature::from_bytes(&sig.to_bytes()).unwrap();
            prop_assert_eq!(parsed, sig);
        }
    }

    #[test]
    fn hash_hex_roundtrip(bytes in prop::array::uniform32(any::<u8>())) {
        let hash = Hash::new(bytes);
        let hash2 = Hash::from_hex(&hash.to_string()).unwrap();
        prop_assert_eq!(hash, hash2);
    }

    #[test]
    fn incremental_hash_split_anywhere(
        data in prop::collection::vec(any::<u8>(), 0..512),
        split in any::<prop::sample::Index>(),
    ) {
        let at = split.index(data.len() + 1);
        let mut hasher = DomainHasher::new(HashDomain::TransactionSigning);
        hasher.update(&data[..at]).update(&data[at..]);
        prop_assert_eq!(hasher.finalize(), transaction_signing_hash(&data));
    }

    #[test]
    fn truncated_var_bytes_never_panics(
        payload in prop::collection::vec(any::<u8>(), 0..64),
        cut in any::<prop::sample::Index>(),
    ) {
        let mut writer = ByteWriter::new();
        writer.write_var_bytes(&payload);
        let bytes = writer.into_bytes();
        let truncated = &bytes[..cut.index(bytes.len())];
        prop_assert!(ByteReader::new(truncated).read_var_bytes().is_err());
    }
}
