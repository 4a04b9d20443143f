/// Kaspa SDK - Script public keys, opcodes, addresses and key pairs.
///
/// Provides the versioned `ScriptPublicKey` type with the standard
/// pay-to-public-key (Schnorr and ECDSA) and pay-to-script-hash templates,
/// the CashAddr-style address codec, and key pair generation/import.

pub mod opcodes;
pub mod script;
pub mod cashaddr;
pub mod address;
pub mod keypair;

mod error;
pub use error::ScriptError;
pub use script::{ScriptClass, ScriptPublicKey};
pub use address::{Address, AddressVersion, Network};
pub use keypair::KeyPair;
