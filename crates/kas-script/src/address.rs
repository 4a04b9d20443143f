/// Kaspa address handling.
///
/// An address is a network prefix, a version byte naming the locking
/// template, and the template payload (x-only key, compressed key or script
/// hash). Text encoding uses the CashAddr-style codec in [`crate::cashaddr`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use kas_primitives::ec::{PublicKey, SignatureScheme};

use crate::cashaddr;
use crate::script::{ScriptClass, ScriptPublicKey};
use crate::ScriptError;

/// Mainnet address prefix.
pub const MAINNET_PREFIX: &str = "kaspa";
/// Testnet address prefix.
pub const TESTNET_PREFIX: &str = "kaspatest";

/// Network an address belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Kaspa mainnet (`kaspa:` prefix).
    #[default]
    Mainnet,
    /// Kaspa testnet (`kaspatest:` prefix).
    Testnet,
}

impl Network {
    /// The human-readable address prefix.
    pub fn prefix(&self) -> &'static str {
        match self {
            Network::Mainnet => MAINNET_PREFIX,
            Network::Testnet => TESTNET_PREFIX,
        }
    }

    /// Look up a network by its lowercase prefix.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            MAINNET_PREFIX => Some(Network::Mainnet),
            TESTNET_PREFIX => Some(Network::Testnet),
            _ => None,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// The locking template an address pays to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AddressVersion {
    /// Schnorr x-only public key (32 bytes).
    PubKey = 0,
    /// ECDSA compressed public key (33 bytes).
    PubKeyEcdsa = 1,
    /// BLAKE2b-256 script hash (32 bytes).
    ScriptHash = 8,
}

impl AddressVersion {
    /// Parse a version byte.
    pub fn from_u8(version: u8) -> Option<Self> {
        match version {
            0 => Some(AddressVersion::PubKey),
            1 => Some(AddressVersion::PubKeyEcdsa),
            8 => Some(AddressVersion::ScriptHash),
            _ => None,
        }
    }

    /// Required payload length in bytes.
    pub fn payload_len(&self) -> usize {
        match self {
            AddressVersion::PubKey | AddressVersion::ScriptHash => 32,
            AddressVersion::PubKeyEcdsa => 33,
        }
    }

    /// The signature scheme that spends this version, if it is a key address.
    pub fn signature_scheme(&self) -> Option<SignatureScheme> {
        match self {
            AddressVersion::PubKey => Some(SignatureScheme::Schnorr),
            AddressVersion::PubKeyEcdsa => Some(SignatureScheme::Ecdsa),
            AddressVersion::ScriptHash => None,
        }
    }
}

/// A validated Kaspa address.
///
/// The payload length always matches the version.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Address {
    network: Network,
    version: AddressVersion,
    payload: Vec<u8>,
}

impl Address {
    /// Create an address, checking the payload length against the version.
    ///
    /// # Returns
    /// `Ok(Address)`, or `InvalidAddress` if the payload has the wrong length.
    pub fn new(network: Network, version: AddressVersion, payload: &[u8]) -> Result<Self, ScriptError> {
        if payload.len() != version.payload_len() {
            return Err(ScriptError::InvalidAddress(format!(
                "{:?} payload must be {} bytes, got {}",
                version,
                version.payload_len(),
                payload.len()
            )));
        }
        Ok(Address { network, version, payload: payload.to_vec() })
    }

    /// Address for a public key spent with `scheme`.
    pub fn from_public_key(public_key: &PublicKey, scheme: SignatureScheme, network: Network) -> Self {
        let (version, payload) = match scheme {
            SignatureScheme::Schnorr => (AddressVersion::PubKey, public_key.to_x_only().to_vec()),
            SignatureScheme::Ecdsa => (AddressVersion::PubKeyEcdsa, public_key.to_compressed().to_vec()),
        };
        Address { network, version, payload }
    }

    /// Recover the address a standard locking script pays to.
    ///
    /// # Returns
    /// `Ok(Address)`, or `NonStandard` if the script matches no template.
    pub fn from_script_public_key(spk: &ScriptPublicKey, network: Network) -> Result<Self, ScriptError> {
        let version = match spk.class() {
            ScriptClass::PubKey => AddressVersion::PubKey,
            ScriptClass::PubKeyEcdsa => AddressVersion::PubKeyEcdsa,
            ScriptClass::ScriptHash => AddressVersion::ScriptHash,
            ScriptClass::NonStandard => return Err(ScriptError::NonStandard),
        };
        let payload = spk.payload().ok_or(ScriptError::NonStandard)?;
        Address::new(network, version, payload)
    }

    /// Parse address text.
    ///
    /// Fails with `InvalidAddress` for an unknown network prefix, an
    /// unrecognized version byte, a wrong payload length, or a bad checksum.
    pub fn decode(text: &str) -> Result<Self, ScriptError> {
        let (prefix, version, payload) = cashaddr::decode(text)?;
        let network = Network::from_prefix(&prefix)
            .ok_or_else(|| ScriptError::InvalidAddress(format!("unknown network prefix '{}'", prefix)))?;
        let version = AddressVersion::from_u8(version)
            .ok_or_else(|| ScriptError::InvalidAddress(format!("unknown version {}", version)))?;
        Address::new(network, version, &payload)
    }

    /// Encode the address as text.
    pub fn encode(&self) -> String {
        cashaddr::encode(self.network.prefix(), self.version as u8, &self.payload)
    }

    /// The locking script this address stands for.
    pub fn to_script_public_key(&self) -> ScriptPublicKey {
        match self.version {
            AddressVersion::PubKey => ScriptPublicKey::pay_to_pubkey(&fixed(&self.payload)),
            AddressVersion::PubKeyEcdsa => ScriptPublicKey::pay_to_pubkey_ecdsa(&fixed(&self.payload)),
            AddressVersion::ScriptHash => ScriptPublicKey::pay_to_script_hash(&fixed(&self.payload)),
        }
    }

    /// The network this address belongs to.
    pub fn network(&self) -> Network {
        self.network
    }

    /// The address version.
    pub fn version(&self) -> AddressVersion {
        self.version
    }

    /// The key or script-hash payload.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// Copy a payload whose length `Address::new` already checked.
fn fixed<const N: usize>(payload: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(payload);
    out
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for Address {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::decode(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::decode(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kas_primitives::ec::PrivateKey;

    const BIP340_SECRET: &str = "b7e151628aed2a6abf7158809cf4f3c762e7160f38b4da56a784d9045190cfef";
    const BIP340_ADDRESS: &str = "kaspa:qr0lr4ml9fn3chekrqmjdkergxl93l4wrk3dankcgvjq776s9wn9jkdskewva";

    // -----------------------------------------------------------------------
    // Known vectors
    // -----------------------------------------------------------------------

    #[test]
    fn test_address_from_bip340_key() {
        let key = PrivateKey::from_hex(BIP340_SECRET).expect("valid key");
        let addr = Address::from_public_key(&key.pub_key(), SignatureScheme::Schnorr, Network::Mainnet);
        assert_eq!(addr.to_string(), BIP340_ADDRESS);
        assert_eq!(
            hex::encode(addr.payload()),
            "dff1d77f2a671c5f36183726db2341be58feae1da2deced843240f7b502ba659"
        );
    }

    #[test]
    fn test_testnet_address_for_secret_three() {
        let key = PrivateKey::from_hex(
            "0000000000000000000000000000000000000000000000000000000000000003",
        )
        .expect("valid key");
        let addr = Address::from_public_key(&key.pub_key(), SignatureScheme::Schnorr, Network::Testnet);
        assert_eq!(
            addr.to_string(),
            "kaspatest:qrunpzspjfvvxyzfx38ct7ya2g5m2vwggkpklxdsscqlzyauuqm0jaux3xvse"
        );
    }

    #[test]
    fn test_decode_known_address() {
        let addr: Address = BIP340_ADDRESS.parse().expect("should decode");
        assert_eq!(addr.network(), Network::Mainnet);
        assert_eq!(addr.version(), AddressVersion::PubKey);
        assert_eq!(addr.version().signature_scheme(), Some(SignatureScheme::Schnorr));
    }

    // -----------------------------------------------------------------------
    // Round trips
    // -----------------------------------------------------------------------

    #[test]
    fn test_round_trip_all_versions_and_networks() {
        let key = PrivateKey::new();
        for network in [Network::Mainnet, Network::Testnet] {
            let addrs = vec![
                Address::from_public_key(&key.pub_key(), SignatureScheme::Schnorr, network),
                Address::from_public_key(&key.pub_key(), SignatureScheme::Ecdsa, network),
                Address::new(network, AddressVersion::ScriptHash, &[0x5a; 32]).unwrap(),
            ];
            for addr in addrs {
                let text = addr.to_string();
                assert!(text.starts_with(&format!("{}:", network.prefix())));
                assert_eq!(Address::decode(&text).expect("round trip"), addr);
            }
        }
    }

    #[test]
    fn test_script_public_key_round_trip() {
        let key = PrivateKey::new();
        for scheme in [SignatureScheme::Schnorr, SignatureScheme::Ecdsa] {
            let addr = Address::from_public_key(&key.pub_key(), scheme, Network::Mainnet);
            let spk = addr.to_script_public_key();
            assert_eq!(spk, ScriptPublicKey::for_public_key(&key.pub_key(), scheme));
            assert_eq!(Address::from_script_public_key(&spk, Network::Mainnet).unwrap(), addr);
        }
        let p2sh = Address::new(Network::Testnet, AddressVersion::ScriptHash, &[7u8; 32]).unwrap();
        let spk = p2sh.to_script_public_key();
        assert_eq!(spk.class(), ScriptClass::ScriptHash);
        assert_eq!(Address::from_script_public_key(&spk, Network::Testnet).unwrap(), p2sh);
    }

    // -----------------------------------------------------------------------
    // Error cases
    // -----------------------------------------------------------------------

    #[test]
    fn test_every_single_character_flip_is_rejected() {
        let data_start = BIP340_ADDRESS.find(':').unwrap() + 1;
        let bytes = BIP340_ADDRESS.as_bytes();
        for i in data_start..bytes.len() {
            let replacement = if bytes[i] == b'q' { 'p' } else { 'q' };
            let mut mutated: Vec<char> = BIP340_ADDRESS.chars().collect();
            mutated[i] = replacement;
            let mutated: String = mutated.into_iter().collect();
            assert!(
                matches!(Address::decode(&mutated), Err(ScriptError::InvalidAddress(_))),
                "flip at {} accepted: {}",
                i,
                mutated
            );
        }
    }

    #[test]
    fn test_unknown_prefix() {
        let text = cashaddr::encode("bitcoincash", 0, &[0u8; 32]);
        assert!(matches!(Address::decode(&text), Err(ScriptError::InvalidAddress(_))));
    }

    #[test]
    fn test_unknown_version() {
        let text = cashaddr::encode(MAINNET_PREFIX, 2, &[0u8; 32]);
        assert!(matches!(Address::decode(&text), Err(ScriptError::InvalidAddress(_))));
    }

    #[test]
    fn test_wrong_payload_length() {
        let text = cashaddr::encode(MAINNET_PREFIX, 0, &[0u8; 33]);
        assert!(matches!(Address::decode(&text), Err(ScriptError::InvalidAddress(_))));
        let text = cashaddr::encode(MAINNET_PREFIX, 1, &[0u8; 32]);
        assert!(matches!(Address::decode(&text), Err(ScriptError::InvalidAddress(_))));
        assert!(Address::new(Network::Mainnet, AddressVersion::PubKey, &[0u8; 20]).is_err());
    }

    #[test]
    fn test_non_standard_script_has_no_address() {
        let spk = ScriptPublicKey::new(0, vec![0x51]);
        assert!(matches!(
            Address::from_script_public_key(&spk, Network::Mainnet),
            Err(ScriptError::NonStandard)
        ));
    }

    #[test]
    fn test_serde_as_text() {
        let addr: Address = BIP340_ADDRESS.parse().unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", BIP340_ADDRESS));
        assert_eq!(serde_json::from_str::<Address>(&json).unwrap(), addr);
        assert!(serde_json::from_str::<Address>("\"kaspa:nope\"").is_err());
    }
}
