/// Error types for script and address operations.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// Generic invalid script error.
    #[error("invalid script: {0}")]
    InvalidScript(String),

    /// Script is not one of the standard templates.
    #[error("non-standard script")]
    NonStandard,

    /// Address text or payload could not be decoded or encoded.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Hex decoding error.
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),

    /// Error from primitives crate.
    #[error("primitives error: {0}")]
    Primitives(#[from] kas_primitives::PrimitivesError),
}
