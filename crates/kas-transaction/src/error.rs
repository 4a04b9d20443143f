use crate::builder::BuilderState;
use crate::utxo::TransactionOutpoint;

/// Error types for transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// The transaction structure is invalid (e.g. input index out of range).
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),
    /// An error occurred during binary/hex serialization or deserialization.
    #[error("serialization error: {0}")]
    SerializationError(String),
    /// Signing produced no usable signature.
    #[error("signing error: {0}")]
    SigningError(String),
    /// A value is not a valid amount (zero, malformed text, dust).
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    /// Summing amounts or mass overflowed `u64`.
    #[error("amount overflow")]
    AmountOverflow,
    /// An address is valid text but unusable here (e.g. wrong network).
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    /// A sighash type byte is not one of the defined combinations.
    #[error("invalid sighash type: {0:#04x}")]
    InvalidSigHashType(u8),
    /// More recipient outputs than the protocol allows.
    #[error("too many recipients (max {max})")]
    TooManyRecipients { max: usize },
    /// More outputs (recipients plus change) than the protocol allows.
    #[error("too many outputs (max {max})")]
    TooManyOutputs { max: usize },
    /// Outputs plus fee exceed the inputs.
    #[error("insufficient funds: need {needed} sompi, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },
    /// `build()` called without inputs.
    #[error("transaction has no inputs")]
    NoInputs,
    /// `build()` called without outputs.
    #[error("transaction has no outputs")]
    NoOutputs,
    /// The same outpoint was added twice.
    #[error("duplicate outpoint {0}")]
    DuplicateOutpoint(TransactionOutpoint),
    /// A coinbase UTXO has not reached maturity yet.
    #[error("coinbase output {outpoint} is immature until DAA score {mature_at}")]
    ImmatureCoinbase { outpoint: TransactionOutpoint, mature_at: u64 },
    /// The signing key does not control the script being spent.
    #[error("key does not match the script spent by input {index}")]
    KeyMismatch { index: usize },
    /// No key was supplied for an input.
    #[error("no key supplied for input {index}")]
    MissingKey { index: usize },
    /// The script being spent is not a key template this SDK can sign.
    #[error("input {index} spends a script that cannot be signed with a single key")]
    UnsupportedScript { index: usize },
    /// A builder operation was called in the wrong state.
    #[error("cannot {operation} in state {state:?}")]
    InvalidState { operation: &'static str, state: BuilderState },
    /// The transport rejected a submitted transaction.
    #[error("broadcast failed: {0}")]
    Broadcast(String),
    /// An underlying script error (forwarded from `kas-script`).
    #[error("script error: {0}")]
    Script(#[from] kas_script::ScriptError),
    /// An underlying primitives error (forwarded from `kas-primitives`).
    #[error("primitives error: {0}")]
    Primitives(#[from] kas_primitives::PrimitivesError),
}
