//! Kaspa transaction type with consensus serialization and identifiers.
//!
//! The transaction id hashes the identity encoding, which leaves out
//! signature scripts, so the id is fixed before signing and unchanged by it.
//! The transaction hash covers the full encoding.

use std::fmt;

use kas_primitives::chainhash::Hash;
use kas_primitives::hash::{transaction_hash, transaction_id_hash};
use kas_primitives::util::{serde_hex, ByteReader, ByteWriter};
use serde::{Deserialize, Serialize};

use crate::amount::serde_u64_string;
use crate::input::TransactionInput;
use crate::output::TransactionOutput;
use crate::subnetwork::{SubnetworkId, SUBNETWORK_ID_SIZE};
use crate::TransactionError;

/// Current transaction version.
pub const TX_VERSION: u16 = 0;

// Smallest possible encoded input and output, used to bound declared counts.
const MIN_INPUT_SIZE: usize = 36 + 8 + 1 + 8;
const MIN_OUTPUT_SIZE: usize = 8 + 2 + 8;

/// Selects which bytes of an input are written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxEncoding {
    /// Everything, as sent over the wire.
    Full,
    /// Signature scripts replaced by an empty string and sig-op counts
    /// omitted; used for the transaction id.
    ExcludeSignatureScript,
}

/// A Kaspa transaction.
///
/// # Wire format
///
/// | Field          | Size                     |
/// |----------------|--------------------------|
/// | version        | 2 bytes (LE)             |
/// | input count    | 8 bytes (LE)             |
/// | inputs         | variable                 |
/// | output count   | 8 bytes (LE)             |
/// | outputs        | variable                 |
/// | lock_time      | 8 bytes (LE)             |
/// | subnetwork_id  | 20 bytes                 |
/// | gas            | 8 bytes (LE)             |
/// | payload length | 8 bytes (LE)             |
/// | payload        | variable                 |
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub version: u16,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    /// Absolute lock-time (DAA score or timestamp); 0 disables it.
    #[serde(with = "serde_u64_string")]
    pub lock_time: u64,
    pub subnetwork_id: SubnetworkId,
    #[serde(with = "serde_u64_string")]
    pub gas: u64,
    #[serde(with = "serde_hex")]
    pub payload: Vec<u8>,
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

impl Transaction {
    /// Create an empty native-subnetwork transaction.
    pub fn new() -> Self {
        Transaction {
            version: TX_VERSION,
            inputs: Vec::new(),
            outputs: Vec::new(),
            lock_time: 0,
            subnetwork_id: SubnetworkId::NATIVE,
            gas: 0,
            payload: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    /// Append the encoding selected by `encoding`.
    pub fn write_to(&self, writer: &mut ByteWriter, encoding: TxEncoding) {
        writer.write_u16_le(self.version);
        writer.write_u64_le(self.inputs.len() as u64);
        for input in &self.inputs {
            input.write_to(writer, encoding);
        }
        writer.write_u64_le(self.outputs.len() as u64);
        for output in &self.outputs {
            output.write_to(writer);
        }
        writer
            .write_u64_le(self.lock_time)
            .write_bytes(self.subnetwork_id.as_bytes())
            .write_u64_le(self.gas)
            .write_var_bytes(&self.payload);
    }

    /// Full consensus encoding.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.encode(TxEncoding::Full)
    }

    /// Full consensus encoding as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    fn encode(&self, encoding: TxEncoding) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(256);
        self.write_to(&mut writer, encoding);
        writer.into_bytes()
    }

    /// Parse a full encoding. Trailing bytes are rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = ByteReader::new(bytes);
        let tx = Self::read_from(&mut reader)?;
        if reader.remaining() != 0 {
            return Err(TransactionError::SerializationError(format!(
                "{} trailing bytes after transaction",
                reader.remaining()
            )));
        }
        Ok(tx)
    }

    /// Parse a full encoding from hex.
    pub fn from_hex(hex_str: &str) -> Result<Self, TransactionError> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| TransactionError::SerializationError(format!("invalid hex: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    /// Read a full encoding from `reader`.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let ser = |what: &str, e: kas_primitives::PrimitivesError| {
            TransactionError::SerializationError(format!("reading {}: {}", what, e))
        };

        let version = reader.read_u16_le().map_err(|e| ser("version", e))?;

        let input_count = reader.read_count(MIN_INPUT_SIZE).map_err(|e| ser("input count", e))?;
        let mut inputs = Vec::with_capacity(input_count);
        for _ in 0..input_count {
            inputs.push(TransactionInput::read_from(reader)?);
        }

        let output_count = reader.read_count(MIN_OUTPUT_SIZE).map_err(|e| ser("output count", e))?;
        let mut outputs = Vec::with_capacity(output_count);
        for _ in 0..output_count {
            outputs.push(TransactionOutput::read_from(reader)?);
        }

        let lock_time = reader.read_u64_le().map_err(|e| ser("lock time", e))?;
        let subnetwork_id = SubnetworkId::new(
            reader
                .read_array::<SUBNETWORK_ID_SIZE>()
                .map_err(|e| ser("subnetwork id", e))?,
        );
        let gas = reader.read_u64_le().map_err(|e| ser("gas", e))?;
        let payload = reader.read_var_bytes().map_err(|e| ser("payload", e))?.to_vec();

        Ok(Transaction {
            version,
            inputs,
            outputs,
            lock_time,
            subnetwork_id,
            gas,
            payload,
        })
    }

    // -----------------------------------------------------------------------
    // Identifiers
    // -----------------------------------------------------------------------

    /// Transaction id: `TransactionID`-keyed hash of the identity encoding.
    pub fn id(&self) -> Hash {
        Hash::new(transaction_id_hash(&self.encode(TxEncoding::ExcludeSignatureScript)))
    }

    /// Transaction hash: `TransactionHash`-keyed hash of the full encoding.
    pub fn hash(&self) -> Hash {
        Hash::new(transaction_hash(&self.to_bytes()))
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Sum of output values, or `AmountOverflow`.
    pub fn total_output_value(&self) -> Result<u64, TransactionError> {
        self.outputs
            .iter()
            .try_fold(0u64, |acc, o| acc.checked_add(o.value))
            .ok_or(TransactionError::AmountOverflow)
    }

    /// Whether every input carries a signature script.
    pub fn is_fully_signed(&self) -> bool {
        !self.inputs.is_empty() && self.inputs.iter().all(|i| i.is_signed())
    }

    /// Render as the JSON object used by node RPC and wallets.
    pub fn to_json(&self) -> Result<String, TransactionError> {
        serde_json::to_string(self).map_err(|e| TransactionError::SerializationError(e.to_string()))
    }

    /// Parse the JSON object produced by [`Transaction::to_json`].
    pub fn from_json(json: &str) -> Result<Self, TransactionError> {
        serde_json::from_str(json).map_err(|e| TransactionError::SerializationError(e.to_string()))
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tx {} ({} inputs, {} outputs)",
            self.id(),
            self.inputs.len(),
            self.outputs.len()
        )
    }
}
