#![deny(missing_docs)]

//! Kaspa SDK - personal message signing.
//!
//! Signs and verifies off-chain text with a Kaspa key. Messages are hashed
//! under the personal-message domain, so a message signature can never be
//! replayed as a transaction signature.

mod error;
pub mod signed;

pub use error::MessageError;
pub use signed::{sign_message, sign_message_hex, verify_message, verify_message_hex};
