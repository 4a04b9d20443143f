//! CashAddr-style bech32 codec used by Kaspa addresses.
//!
//! Text form is `<prefix>:<base32 data><8 base32 checksum chars>`. The
//! checksum is a 40-bit BCH code over the lower five bits of each prefix
//! character, a zero separator, and the data, which detects any single
//! character substitution.

use crate::ScriptError;

/// The bech32 alphabet.
const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// Number of base32 characters carrying the checksum.
const CHECKSUM_LEN: usize = 8;

const GENERATORS: [u64; 5] = [
    0x98f2bc8e61,
    0x79b76d99e2,
    0xf33e5fb3c4,
    0xae2eabe2a8,
    0x1e4f43e470,
];

/// Encode a version byte and payload under `prefix`.
///
/// # Arguments
/// * `prefix` - Lowercase human-readable network prefix, e.g. `"kaspa"`.
/// * `version` - The address version byte.
/// * `payload` - Key or script-hash bytes.
///
/// # Returns
/// The full address text including the prefix and separator.
pub fn encode(prefix: &str, version: u8, payload: &[u8]) -> String {
    let mut raw = Vec::with_capacity(payload.len() + 1);
    raw.push(version);
    raw.extend_from_slice(payload);
    let data = convert_bits(&raw, 8, 5, true).unwrap_or_default();

    let checksum = checksum(prefix, &data);
    let mut out = String::with_capacity(prefix.len() + 1 + data.len() + CHECKSUM_LEN);
    out.push_str(prefix);
    out.push(':');
    for d in data.iter().chain(checksum.iter()) {
        out.push(CHARSET[*d as usize] as char);
    }
    out
}

/// Decode address text into `(prefix, version, payload)`.
///
/// Accepts all-lowercase or all-uppercase text. The prefix is returned in
/// lowercase and is not validated against known networks here.
pub fn decode(text: &str) -> Result<(String, u8, Vec<u8>), ScriptError> {
    let has_lower = text.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = text.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        return Err(ScriptError::InvalidAddress("mixed case".to_string()));
    }
    let text = text.to_ascii_lowercase();

    let (prefix, encoded) = text
        .split_once(':')
        .ok_or_else(|| ScriptError::InvalidAddress("missing prefix separator".to_string()))?;
    if prefix.is_empty() {
        return Err(ScriptError::InvalidAddress("empty prefix".to_string()));
    }
    if encoded.len() <= CHECKSUM_LEN {
        return Err(ScriptError::InvalidAddress("too short".to_string()));
    }

    let mut values = Vec::with_capacity(encoded.len());
    for c in encoded.bytes() {
        let v = CHARSET
            .iter()
            .position(|&x| x == c)
            .ok_or_else(|| ScriptError::InvalidAddress(format!("bad character '{}'", c as char)))?;
        values.push(v as u8);
    }

    if polymod(prefix_values(prefix).chain(std::iter::once(0)).chain(values.iter().copied())) != 0 {
        return Err(ScriptError::InvalidAddress("checksum mismatch".to_string()));
    }

    let data = &values[..values.len() - CHECKSUM_LEN];
    let raw = convert_bits(data, 5, 8, false)
        .ok_or_else(|| ScriptError::InvalidAddress("invalid padding".to_string()))?;
    let (version, payload) = raw
        .split_first()
        .ok_or_else(|| ScriptError::InvalidAddress("missing version".to_string()))?;
    Ok((prefix.to_string(), *version, payload.to_vec()))
}

/// Compute the eight 5-bit checksum groups for `data` under `prefix`.
fn checksum(prefix: &str, data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let values = prefix_values(prefix)
        .chain(std::iter::once(0))
        .chain(data.iter().copied())
        .chain(std::iter::repeat(0).take(CHECKSUM_LEN));
    let code = polymod(values);
    let mut out = [0u8; CHECKSUM_LEN];
    for (i, group) in out.iter_mut().enumerate() {
        *group = ((code >> (5 * (CHECKSUM_LEN - 1 - i))) & 0x1f) as u8;
    }
    out
}

fn prefix_values(prefix: &str) -> impl Iterator<Item = u8> + '_ {
    prefix.bytes().map(|b| b & 0x1f)
}

fn polymod(values: impl Iterator<Item = u8>) -> u64 {
    let mut c: u64 = 1;
    for d in values {
        let c0 = c >> 35;
        c = ((c & 0x07_ffff_ffff) << 5) ^ d as u64;
        for (i, generator) in GENERATORS.iter().enumerate() {
            if (c0 >> i) & 1 == 1 {
                c ^= generator;
            }
        }
    }
    c ^ 1
}

/// Regroup bits from `from`-bit to `to`-bit words.
///
/// Without padding, leftover bits must be fewer than `from` and all zero.
fn convert_bits(data: &[u8], from: u32, to: u32, pad: bool) -> Option<Vec<u8>> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let max_value: u32 = (1 << to) - 1;
    let max_acc: u32 = (1 << (from + to - 1)) - 1;
    let mut out = Vec::with_capacity(data.len() * from as usize / to as usize + 1);
    for &value in data {
        let value = value as u32;
        if value >> from != 0 {
            return None;
        }
        acc = ((acc << from) | value) & max_acc;
        bits += from;
        while bits >= to {
            bits -= to;
            out.push(((acc >> bits) & max_value) as u8);
        }
    }
    if pad {
        if bits > 0 {
            out.push(((acc << (to - bits)) & max_value) as u8);
        }
    } else if bits >= from || ((acc << (to - bits)) & max_value) != 0 {
        return None;
    }
    Some(out)
}
