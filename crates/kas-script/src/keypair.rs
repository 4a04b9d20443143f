//! Key pairs: a private key with its derived public key and address.

use kas_primitives::ec::{PrivateKey, PublicKey, SignatureScheme};

use crate::address::{Address, Network};
use crate::script::ScriptPublicKey;
use crate::ScriptError;

/// A private key together with the public key and address derived from it.
///
/// The private key is owned by the pair and zeroized when it is dropped.
#[derive(Clone, Debug)]
pub struct KeyPair {
    private_key: PrivateKey,
    public_key: PublicKey,
    scheme: SignatureScheme,
    address: Address,
}

impl KeyPair {
    /// Generate a fresh key pair from the OS CSPRNG.
    pub fn generate(network: Network, scheme: SignatureScheme) -> Self {
        Self::from_private_key(PrivateKey::new(), network, scheme)
    }

    /// Import a key pair from a 64-character hex secret.
    ///
    /// # Returns
    /// `Ok(KeyPair)`, or an `InvalidPrivateKey` error (wrapped) for wrong
    /// length, non-hex input, zero, or a scalar at or above the curve order.
    pub fn import(secret_hex: &str, network: Network, scheme: SignatureScheme) -> Result<Self, ScriptError> {
        let private_key = PrivateKey::from_hex(secret_hex)?;
        Ok(Self::from_private_key(private_key, network, scheme))
    }

    /// Wrap an existing private key.
    pub fn from_private_key(private_key: PrivateKey, network: Network, scheme: SignatureScheme) -> Self {
        let public_key = derive_public_key(&private_key);
        let address = Address::from_public_key(&public_key, scheme, network);
        KeyPair { private_key, public_key, scheme, address }
    }

    /// The private key.
    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    /// The public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// The scheme this pair's address is spent with.
    pub fn scheme(&self) -> SignatureScheme {
        self.scheme
    }

    /// The address paying to this pair.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// The locking script paying to this pair.
    pub fn script_public_key(&self) -> ScriptPublicKey {
        ScriptPublicKey::for_public_key(&self.public_key, self.scheme)
    }

    /// Give up the pair and keep only the private key.
    pub fn into_private_key(self) -> PrivateKey {
        self.private_key
    }
}

/// Derive the public key for a private key. Pure and deterministic.
pub fn derive_public_key(private_key: &PrivateKey) -> PublicKey {
    private_key.pub_key()
}
