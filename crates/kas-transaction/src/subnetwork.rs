//! Subnetwork identifiers.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::TransactionError;

/// Length of a subnetwork id in bytes.
pub const SUBNETWORK_ID_SIZE: usize = 20;

/// Identifies the subnetwork a transaction belongs to.
///
/// Ordinary payments use the native subnetwork (all zero bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SubnetworkId([u8; SUBNETWORK_ID_SIZE]);

impl SubnetworkId {
    /// The native subnetwork.
    pub const NATIVE: SubnetworkId = SubnetworkId([0u8; SUBNETWORK_ID_SIZE]);

    /// Wrap raw bytes.
    pub const fn new(bytes: [u8; SUBNETWORK_ID_SIZE]) -> Self {
        SubnetworkId(bytes)
    }

    /// Parse 40 hex characters.
    pub fn from_hex(hex_str: &str) -> Result<Self, TransactionError> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| TransactionError::SerializationError(format!("subnetwork id: {}", e)))?;
        if bytes.len() != SUBNETWORK_ID_SIZE {
            return Err(TransactionError::SerializationError(format!(
                "subnetwork id must be {} bytes, got {}",
                SUBNETWORK_ID_SIZE,
                bytes.len()
            )));
        }
        let mut out = [0u8; SUBNETWORK_ID_SIZE];
        out.copy_from_slice(&bytes);
        Ok(SubnetworkId(out))
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8; SUBNETWORK_ID_SIZE] {
        &self.0
    }

    /// Whether this is the native subnetwork.
    pub fn is_native(&self) -> bool {
        *self == Self::NATIVE
    }
}

impl fmt::Display for SubnetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for SubnetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubnetworkId({})", self)
    }
}

impl Serialize for SubnetworkId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SubnetworkId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        SubnetworkId::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
