use proptest::prelude::*;

use kas_script::{Address, AddressVersion, Network, ScriptPublicKey};

fn network() -> impl Strategy<Value = Network> {
    prop_oneof![Just(Network::Mainnet), Just(Network::Testnet)]
}

fn version_and_payload() -> impl Strategy<Value = (AddressVersion, Vec<u8>)> {
    prop_oneof![
        prop::collection::vec(any::<u8>(), 32).prop_map(|p| (AddressVersion::PubKey, p)),
        prop::collection::vec(any::<u8>(), 33).prop_map(|p| (AddressVersion::PubKeyEcdsa, p)),
        prop::collection::vec(any::<u8>(), 32).prop_map(|p| (AddressVersion::ScriptHash, p)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn address_text_roundtrip(network in network(), (version, payload) in version_and_payload()) {
        let addr = Address::new(network, version, &payload).unwrap();
        let decoded = Address::decode(&addr.to_string()).unwrap();
        prop_assert_eq!(decoded, addr);
    }

    #[test]
    fn single_character_substitution_is_detected(
        (version, payload) in version_and_payload(),
        position in any::<prop::sample::Index>(),
        replacement in prop::sample::select(b"qpzry9x8gf2tvdw0s3jn54khce6mua7l".to_vec()),
    ) {
        let text = Address::new(Network::Mainnet, version, &payload).unwrap().to_string();
        let data_start = text.find(':').unwrap() + 1;
        let i = data_start + position.index(text.len() - data_start);
        let mut bytes = text.clone().into_bytes();
        prop_assume!(bytes[i] != replacement);
        bytes[i] = replacement;
        let mutated = String::from_utf8(bytes).unwrap();
        prop_assert!(Address::decode(&mutated).is_err());
    }

    #[test]
    fn script_public_key_recovers_address(network in network(), (version, payload) in version_and_payload()) {
        let addr = Address::new(network, version, &payload).unwrap();
        let spk: ScriptPublicKey = addr.to_script_public_key();
        prop_assert_eq!(Address::from_script_public_key(&spk, network).unwrap(), addr);
    }
}
