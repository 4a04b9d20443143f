/// Versioned locking scripts.
///
/// Kaspa outputs lock funds with a `ScriptPublicKey`: a u16 script version
/// plus the script bytes. The wallet layer only produces and spends the
/// three standard templates below; anything else is classified as
/// non-standard.

use std::fmt;

use serde::{Deserialize, Serialize};

use kas_primitives::ec::{PublicKey, Signature, SignatureScheme};
use kas_primitives::hash::blake2b_256;

use crate::opcodes::*;
use crate::ScriptError;

/// The only script version the standard templates use.
pub const SCRIPT_PUBLIC_KEY_VERSION: u16 = 0;

/// `OP_DATA_32 <x-only key> OP_CHECKSIG`
pub const P2PK_SCRIPT_LEN: usize = 34;

/// `OP_DATA_33 <compressed key> OP_CHECKSIGECDSA`
pub const P2PK_ECDSA_SCRIPT_LEN: usize = 35;

/// `OP_BLAKE2B OP_DATA_32 <script hash> OP_EQUAL`
pub const P2SH_SCRIPT_LEN: usize = 35;

/// `OP_DATA_65 <64-byte signature> <sighash type>`
pub const SIGNATURE_SCRIPT_LEN: usize = 66;

/// The standard template a script public key follows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScriptClass {
    /// Pay to an x-only Schnorr key.
    PubKey,
    /// Pay to a compressed ECDSA key.
    PubKeyEcdsa,
    /// Pay to the BLAKE2b-256 hash of a redeem script.
    ScriptHash,
    /// Anything else.
    NonStandard,
}

impl ScriptClass {
    /// The signature scheme that spends this class, if it is a key template.
    pub fn signature_scheme(&self) -> Option<SignatureScheme> {
        match self {
            ScriptClass::PubKey => Some(SignatureScheme::Schnorr),
            ScriptClass::PubKeyEcdsa => Some(SignatureScheme::Ecdsa),
            ScriptClass::ScriptHash | ScriptClass::NonStandard => None,
        }
    }
}

/// A versioned locking script.
#[derive(Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ScriptPublicKey {
    /// Script version (0 for every standard template).
    pub version: u16,
    /// Raw script bytes.
    #[serde(with = "kas_primitives::util::serde_hex")]
    pub script: Vec<u8>,
}

impl ScriptPublicKey {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Wrap raw script bytes with a version.
    pub fn new(version: u16, script: Vec<u8>) -> Self {
        ScriptPublicKey { version, script }
    }

    /// Parse hex script bytes with the given version.
    pub fn from_hex(version: u16, hex_str: &str) -> Result<Self, ScriptError> {
        Ok(ScriptPublicKey::new(version, hex::decode(hex_str)?))
    }

    /// Build `OP_DATA_32 <x-only key> OP_CHECKSIG`.
    pub fn pay_to_pubkey(x_only: &[u8; 32]) -> Self {
        let mut script = Vec::with_capacity(P2PK_SCRIPT_LEN);
        script.push(OP_DATA_32);
        script.extend_from_slice(x_only);
        script.push(OP_CHECKSIG);
        ScriptPublicKey::new(SCRIPT_PUBLIC_KEY_VERSION, script)
    }

    /// Build `OP_DATA_33 <compressed key> OP_CHECKSIGECDSA`.
    pub fn pay_to_pubkey_ecdsa(compressed: &[u8; 33]) -> Self {
        let mut script = Vec::with_capacity(P2PK_ECDSA_SCRIPT_LEN);
        script.push(OP_DATA_33);
        script.extend_from_slice(compressed);
        script.push(OP_CHECKSIG_ECDSA);
        ScriptPublicKey::new(SCRIPT_PUBLIC_KEY_VERSION, script)
    }

    /// Build `OP_BLAKE2B OP_DATA_32 <hash> OP_EQUAL` from a script hash.
    pub fn pay_to_script_hash(script_hash: &[u8; 32]) -> Self {
        let mut script = Vec::with_capacity(P2SH_SCRIPT_LEN);
        script.push(OP_BLAKE2B);
        script.push(OP_DATA_32);
        script.extend_from_slice(script_hash);
        script.push(OP_EQUAL);
        ScriptPublicKey::new(SCRIPT_PUBLIC_KEY_VERSION, script)
    }

    /// Build a pay-to-script-hash lock for a redeem script.
    pub fn pay_to_redeem_script(redeem_script: &[u8]) -> Self {
        Self::pay_to_script_hash(&blake2b_256(redeem_script))
    }

    /// Build the key template a public key is spent with under `scheme`.
    pub fn for_public_key(public_key: &PublicKey, scheme: SignatureScheme) -> Self {
        match scheme {
            SignatureScheme::Schnorr => Self::pay_to_pubkey(&public_key.to_x_only()),
            SignatureScheme::Ecdsa => Self::pay_to_pubkey_ecdsa(&public_key.to_compressed()),
        }
    }

    // -----------------------------------------------------------------------
    // Classification
    // -----------------------------------------------------------------------

    /// Classify the script against the standard templates.
    pub fn class(&self) -> ScriptClass {
        if self.version != SCRIPT_PUBLIC_KEY_VERSION {
            return ScriptClass::NonStandard;
        }
        let s = &self.script;
        match s.len() {
            P2PK_SCRIPT_LEN if s[0] == OP_DATA_32 && s[33] == OP_CHECKSIG => ScriptClass::PubKey,
            P2PK_ECDSA_SCRIPT_LEN if s[0] == OP_DATA_33 && s[34] == OP_CHECKSIG_ECDSA => {
                ScriptClass::PubKeyEcdsa
            }
            P2SH_SCRIPT_LEN if s[0] == OP_BLAKE2B && s[1] == OP_DATA_32 && s[34] == OP_EQUAL => {
                ScriptClass::ScriptHash
            }
            _ => ScriptClass::NonStandard,
        }
    }

    /// The key or script hash committed to by a standard template.
    pub fn payload(&self) -> Option<&[u8]> {
        match self.class() {
            ScriptClass::PubKey => Some(&self.script[1..33]),
            ScriptClass::PubKeyEcdsa => Some(&self.script[1..34]),
            ScriptClass::ScriptHash => Some(&self.script[2..34]),
            ScriptClass::NonStandard => None,
        }
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    /// Encode the script bytes as hex (version excluded).
    pub fn to_hex(&self) -> String {
        hex::encode(&self.script)
    }

    /// Human-readable form of the script.
    ///
    /// Named opcodes appear by name, pushed data as hex. Unknown bytes are
    /// shown as `0x..`.
    pub fn to_asm(&self) -> String {
        let mut parts = Vec::new();
        let mut pos = 0;
        while pos < self.script.len() {
            let op = self.script[pos];
            pos += 1;
            let push_len = match op {
                OP_DATA_32 => 32,
                OP_DATA_33 => 33,
                OP_DATA_65 => 65,
                _ => 0,
            };
            if push_len > 0 && pos + push_len <= self.script.len() {
                parts.push(hex::encode(&self.script[pos..pos + push_len]));
                pos += push_len;
                continue;
            }
            match opcode_name(op) {
                Some(name) => parts.push(name.to_string()),
                None => parts.push(format!("0x{:02x}", op)),
            }
        }
        parts.join(" ")
    }

    /// Length of the script bytes.
    pub fn len(&self) -> usize {
        self.script.len()
    }

    /// Whether the script is empty.
    pub fn is_empty(&self) -> bool {
        self.script.is_empty()
    }
}

impl fmt::Debug for ScriptPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScriptPublicKey(v{}, {})", self.version, self.to_hex())
    }
}

impl fmt::Display for ScriptPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_asm())
    }
}

// ---------------------------------------------------------------------------
// Signature scripts
// ---------------------------------------------------------------------------

/// Build the unlocking script for a key template input.
pub fn signature_script(signature: &Signature, sighash_type: u8) -> Vec<u8> {
    let mut script = Vec::with_capacity(SIGNATURE_SCRIPT_LEN);
    script.push(OP_DATA_65);
    script.extend_from_slice(&signature.to_bytes());
    script.push(sighash_type);
    script
}

/// Split a key template unlocking script into signature and sighash type.
pub fn parse_signature_script(script: &[u8]) -> Result<(Signature, u8), ScriptError> {
    if script.len() != SIGNATURE_SCRIPT_LEN || script[0] != OP_DATA_65 {
        return Err(ScriptError::InvalidScript(format!(
            "expected a {}-byte signature push, got {} bytes",
            SIGNATURE_SCRIPT_LEN,
            script.len()
        )));
    }
    let signature = Signature::from_bytes(&script[1..65])?;
    Ok((signature, script[65]))
}
