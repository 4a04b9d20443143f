#![deny(missing_docs)]

//! Kaspa SDK - Complete SDK.
//!
//! Re-exports all Kaspa SDK components for convenient single-crate usage,
//! plus a payment flow tying a UTXO source, the builder and a broadcaster
//! together.

pub use kas_primitives as primitives;
pub use kas_script as script;
pub use kas_transaction as transaction;
pub use kas_message as message;

pub mod payment;
