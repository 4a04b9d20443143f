//! Transaction input spending a previous output.
//!
//! Contains the outpoint being spent, the signature script that unlocks it,
//! the sequence, and the declared signature-operation count. Provides the
//! consensus serialization in both full and identity form.

use kas_primitives::util::{serde_hex, ByteReader, ByteWriter};
use serde::{Deserialize, Serialize};

use crate::amount::serde_u64_string;
use crate::transaction::TxEncoding;
use crate::utxo::TransactionOutpoint;
use crate::TransactionError;

/// Sequence used by the builder (no relative lock-time).
pub const DEFAULT_SEQUENCE: u64 = 0;

/// Signature operations consumed by a single-key P2PK spend.
pub const DEFAULT_SIG_OP_COUNT: u8 = 1;

/// A single input in a Kaspa transaction.
///
/// # Wire format (full)
///
/// | Field             | Size                   |
/// |-------------------|------------------------|
/// | transaction id    | 32 bytes               |
/// | index             | 4 bytes (LE)           |
/// | script length     | 8 bytes (LE)           |
/// | signature_script  | variable               |
/// | sig_op_count      | 1 byte                 |
/// | sequence          | 8 bytes (LE)           |
///
/// The identity encoding writes an empty script and omits `sig_op_count`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInput {
    /// The output being spent.
    pub previous_outpoint: TransactionOutpoint,

    /// Unlocking data. Empty until the input is signed.
    #[serde(with = "serde_hex")]
    pub signature_script: Vec<u8>,

    /// Relative lock-time sequence.
    #[serde(with = "serde_u64_string")]
    pub sequence: u64,

    /// Number of signature operations the script performs.
    pub sig_op_count: u8,
}

impl TransactionInput {
    /// Create an unsigned input with the default sequence and sig-op count.
    pub fn new(previous_outpoint: TransactionOutpoint) -> Self {
        TransactionInput {
            previous_outpoint,
            signature_script: Vec::new(),
            sequence: DEFAULT_SEQUENCE,
            sig_op_count: DEFAULT_SIG_OP_COUNT,
        }
    }

    /// Whether a signature script has been attached.
    pub fn is_signed(&self) -> bool {
        !self.signature_script.is_empty()
    }

    /// Append this input using the given encoding.
    pub fn write_to(&self, writer: &mut ByteWriter, encoding: TxEncoding) {
        self.previous_outpoint.write_to(writer);
        match encoding {
            TxEncoding::Full => {
                writer
                    .write_var_bytes(&self.signature_script)
                    .write_u8(self.sig_op_count);
            }
            TxEncoding::ExcludeSignatureScript => {
                writer.write_var_bytes(&[]);
            }
        }
        writer.write_u64_le(self.sequence);
    }

    /// Deserialize a fully encoded input.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let previous_outpoint = TransactionOutpoint::read_from(reader)?;
        let signature_script = reader
            .read_var_bytes()
            .map_err(|e| TransactionError::SerializationError(format!("reading signature script: {}", e)))?
            .to_vec();
        let sig_op_count = reader
            .read_u8()
            .map_err(|e| TransactionError::SerializationError(format!("reading sig op count: {}", e)))?;
        let sequence = reader
            .read_u64_le()
            .map_err(|e| TransactionError::SerializationError(format!("reading sequence: {}", e)))?;
        Ok(TransactionInput {
            previous_outpoint,
            signature_script,
            sequence,
            sig_op_count,
        })
    }
}
