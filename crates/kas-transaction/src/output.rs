//! Transaction output with a sompi value and locking script.

use kas_primitives::util::{ByteReader, ByteWriter};
use kas_script::ScriptPublicKey;
use serde::{Deserialize, Serialize};

use crate::amount::serde_u64_string;
use crate::TransactionError;

/// A single output in a Kaspa transaction.
///
/// # Wire format
///
/// | Field              | Size          |
/// |--------------------|---------------|
/// | value              | 8 bytes (LE)  |
/// | script version     | 2 bytes (LE)  |
/// | script length      | 8 bytes (LE)  |
/// | script             | variable      |
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOutput {
    /// Value in sompi.
    #[serde(with = "serde_u64_string")]
    pub value: u64,

    /// Spending conditions for the value.
    pub script_public_key: ScriptPublicKey,
}

impl TransactionOutput {
    pub fn new(value: u64, script_public_key: ScriptPublicKey) -> Self {
        TransactionOutput { value, script_public_key }
    }

    /// Serialized size in bytes.
    pub fn serialized_size(&self) -> usize {
        8 + 2 + 8 + self.script_public_key.len()
    }

    /// Append the consensus encoding.
    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer
            .write_u64_le(self.value)
            .write_u16_le(self.script_public_key.version)
            .write_var_bytes(&self.script_public_key.script);
    }

    /// Deserialize an output.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let value = reader
            .read_u64_le()
            .map_err(|e| TransactionError::SerializationError(format!("reading value: {}", e)))?;
        let version = reader
            .read_u16_le()
            .map_err(|e| TransactionError::SerializationError(format!("reading script version: {}", e)))?;
        let script = reader
            .read_var_bytes()
            .map_err(|e| TransactionError::SerializationError(format!("reading script: {}", e)))?
            .to_vec();
        Ok(TransactionOutput {
            value,
            script_public_key: ScriptPublicKey::new(version, script),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding() {
        let out = TransactionOutput::new(600, ScriptPublicKey::pay_to_pubkey(&[2u8; 32]));
        let mut w = ByteWriter::new();
        out.write_to(&mut w);
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), out.serialized_size());
        assert_eq!(bytes.len(), 52);
        assert_eq!(&bytes[..8], &600u64.to_le_bytes());
        assert_eq!(&bytes[8..10], &[0, 0]);
        assert_eq!(bytes[18], 0x20);

        let mut r = ByteReader::new(&bytes);
        assert_eq!(TransactionOutput::read_from(&mut r).unwrap(), out);
    }

    #[test]
    fn test_oversized_script_length() {
        let mut w = ByteWriter::new();
        w.write_u64_le(1).write_u16_le(0).write_u64_le(u64::MAX);
        let bytes = w.into_bytes();
        let mut r = ByteReader::new(&bytes);
        assert!(TransactionOutput::read_from(&mut r).is_err());
    }

    #[test]
    fn test_json_shape() {
        let out = TransactionOutput::new(50_000_000, ScriptPublicKey::pay_to_pubkey(&[2u8; 32]));
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["value"], "50000000");
        assert_eq!(json["scriptPublicKey"]["version"], 0);
    }
}
