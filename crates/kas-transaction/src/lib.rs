/// Kaspa SDK - Transaction construction, fees, and signing.
///
/// Provides the Transaction type with its consensus serialization and
/// identifier, per-input signature hashing, the mass-based fee model, P2PK
/// signing templates, and a state-machine builder that turns UTXOs and a
/// payment intent into a signed transaction.

pub mod amount;
pub mod subnetwork;
pub mod utxo;
pub mod input;
pub mod output;
pub mod transaction;
pub mod sighash;
pub mod mass;
pub mod config;
pub mod template;
pub mod builder;
pub mod broadcaster;

mod error;
pub use error::TransactionError;
pub use subnetwork::SubnetworkId;
pub use utxo::{TransactionOutpoint, UtxoEntry};
pub use input::TransactionInput;
pub use output::TransactionOutput;
pub use transaction::{Transaction, TxEncoding};
pub use sighash::SigHashType;
pub use mass::{calculate_min_fee, MassCalculator, MassParams};
pub use config::BuilderConfig;
pub use builder::{BuilderState, TransactionBuilder};
pub use broadcaster::{Broadcaster, SubmitSuccess, UtxoSource};
