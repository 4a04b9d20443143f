//! Opcode values used by the standard Kaspa script templates.

/// Push the next 32 bytes.
pub const OP_DATA_32: u8 = 0x20;
/// Push the next 33 bytes.
pub const OP_DATA_33: u8 = 0x21;
/// Push the next 65 bytes (64-byte signature + sighash type).
pub const OP_DATA_65: u8 = 0x41;
/// Compare the top two stack items for equality.
pub const OP_EQUAL: u8 = 0x87;
/// Hash the top stack item with BLAKE2b-256.
pub const OP_BLAKE2B: u8 = 0xaa;
/// Verify an ECDSA signature against a compressed key.
pub const OP_CHECKSIG_ECDSA: u8 = 0xab;
/// Verify a Schnorr signature against an x-only key.
pub const OP_CHECKSIG: u8 = 0xac;

/// Return the opcode name, or `None` for values the templates never emit.
pub fn opcode_name(op: u8) -> Option<&'static str> {
    match op {
        OP_DATA_32 => Some("OP_DATA_32"),
        OP_DATA_33 => Some("OP_DATA_33"),
        OP_DATA_65 => Some("OP_DATA_65"),
        OP_EQUAL => Some("OP_EQUAL"),
        OP_BLAKE2B => Some("OP_BLAKE2B"),
        OP_CHECKSIG_ECDSA => Some("OP_CHECKSIGECDSA"),
        OP_CHECKSIG => Some("OP_CHECKSIG"),
        _ => None,
    }
}
