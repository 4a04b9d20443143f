//! Amount parsing and formatting.
//!
//! Amounts are integers of sompi; 1 KAS = 100,000,000 sompi. Text forms are
//! exact decimal strings, never floating point.

use crate::TransactionError;

/// Number of sompi in one KAS.
pub const SOMPI_PER_KASPA: u64 = 100_000_000;

/// Maximum number of KAS that will ever exist.
pub const MAX_KASPA: u64 = 29_000_000_000;

/// Maximum number of sompi that will ever exist.
pub const MAX_SOMPI: u64 = MAX_KASPA * SOMPI_PER_KASPA;

const KAS_DECIMALS: usize = 8;

/// Parse a plain decimal integer of sompi.
///
/// Rejects empty input, signs, whitespace and values above `u64::MAX`.
pub fn parse_sompi(text: &str) -> Result<u64, TransactionError> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TransactionError::InvalidAmount(format!("not a sompi amount: {:?}", text)));
    }
    text.parse::<u64>()
        .map_err(|_| TransactionError::InvalidAmount(format!("sompi amount out of range: {}", text)))
}

/// Convert a decimal KAS string (e.g. `"1.5"`) to sompi.
///
/// At most 8 fractional digits are accepted.
///
/// # Example
/// ```
/// use kas_transaction::amount::kas_to_sompi;
/// assert_eq!(kas_to_sompi("1.5").unwrap(), 150_000_000);
/// ```
pub fn kas_to_sompi(text: &str) -> Result<u64, TransactionError> {
    let invalid = || TransactionError::InvalidAmount(format!("not a KAS amount: {:?}", text));

    let (whole, frac) = match text.split_once('.') {
        Some((w, f)) => (w, f),
        None => (text, ""),
    };
    if whole.is_empty() || (text.contains('.') && frac.is_empty()) || frac.len() > KAS_DECIMALS {
        return Err(invalid());
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let whole: u64 = whole.parse().map_err(|_| TransactionError::AmountOverflow)?;
    let mut frac_sompi: u64 = 0;
    for (i, b) in frac.bytes().enumerate() {
        let digit = u64::from(b - b'0');
        frac_sompi += digit * 10u64.pow((KAS_DECIMALS - 1 - i) as u32);
    }

    whole
        .checked_mul(SOMPI_PER_KASPA)
        .and_then(|s| s.checked_add(frac_sompi))
        .ok_or(TransactionError::AmountOverflow)
}

/// Format sompi as a KAS decimal string without trailing zeros.
///
/// `150_000_000` formats as `"1.5"`, `3250` as `"0.0000325"`.
pub fn sompi_to_kas_string(sompi: u64) -> String {
    let whole = sompi / SOMPI_PER_KASPA;
    let frac = sompi % SOMPI_PER_KASPA;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:08}", frac);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

/// Serde helpers for `u64` fields written as decimal strings.
///
/// Serializes as a string so values above 2^53 survive JSON consumers;
/// deserializes from either a string or a number.
pub mod serde_u64_string {
    use std::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        deserializer.deserialize_any(U64Visitor)
    }

    struct U64Visitor;

    impl<'de> Visitor<'de> for U64Visitor {
        type Value = u64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an unsigned 64-bit integer or its decimal string")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u64, E> {
            u64::try_from(v).map_err(|_| E::custom(format!("negative value {}", v)))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
            super::parse_sompi(v).map_err(E::custom)
        }
    }
}
