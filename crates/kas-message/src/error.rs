/// Error types for message operations.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    /// Malformed hex or a signature/key of the wrong length.
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),
    /// An underlying primitives error.
    #[error("{0}")]
    Primitives(#[from] kas_primitives::PrimitivesError),
}
