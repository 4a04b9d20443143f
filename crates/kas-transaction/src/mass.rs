//! Transaction mass and fee calculation.
//!
//! Mass is the node's measure of the resources a transaction consumes:
//! serialized size, script-public-key bytes, signature operations and a
//! per-output storage charge. The minimum relay fee is the mass times the
//! fee rate, floored at a fixed minimum.

use kas_script::script::{P2PK_SCRIPT_LEN, SIGNATURE_SCRIPT_LEN};
use serde::{Deserialize, Serialize};

use crate::output::TransactionOutput;
use crate::transaction::Transaction;
use crate::TransactionError;

/// Fixed part of the size estimate: version, counts, lock-time,
/// subnetwork id, gas, payload hash and payload length.
pub const BASE_TX_SIZE: u64 = 94;

/// Size of an input excluding its signature script.
pub const INPUT_BASE_SIZE: u64 = 53;

/// Size of an output excluding its script.
pub const OUTPUT_BASE_SIZE: u64 = 18;

/// Fee rate applied when none is configured, in sompi per gram of mass.
pub const DEFAULT_FEE_RATE: u64 = 1;

// Extra bytes a spend of an output is assumed to cost when judging dust.
const DUST_SPEND_SIZE: u64 = 148;

/// Coefficients of the mass formula.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MassParams {
    pub mass_per_tx_byte: u64,
    pub mass_per_script_pub_key_byte: u64,
    pub mass_per_sig_op: u64,
    pub storage_mass_per_output: u64,
    /// Floor applied to every fee, in sompi.
    pub minimum_fee: u64,
    /// Dust threshold rate, in sompi per kilogram of mass.
    pub dust_relay_fee: u64,
}

impl Default for MassParams {
    fn default() -> Self {
        MassParams {
            mass_per_tx_byte: 1,
            mass_per_script_pub_key_byte: 10,
            mass_per_sig_op: 1000,
            storage_mass_per_output: 107,
            minimum_fee: 3250,
            dust_relay_fee: 1000,
        }
    }
}

/// Computes mass, fees and dust verdicts for a set of [`MassParams`].
#[derive(Clone, Copy, Debug, Default)]
pub struct MassCalculator {
    params: MassParams,
}

impl MassCalculator {
    pub fn new(params: MassParams) -> Self {
        MassCalculator { params }
    }

    pub fn params(&self) -> &MassParams {
        &self.params
    }

    /// Estimated serialized size of `tx` once signed.
    ///
    /// Inputs without a signature script are sized as if they carried a
    /// P2PK signature script, so the result does not change when the
    /// transaction is signed.
    pub fn estimated_size(&self, tx: &Transaction) -> u64 {
        let inputs = tx.inputs.iter().fold(0u64, |acc, input| {
            let script_len = if input.is_signed() {
                input.signature_script.len()
            } else {
                SIGNATURE_SCRIPT_LEN
            };
            acc.saturating_add(INPUT_BASE_SIZE + script_len as u64)
        });
        let outputs = tx.outputs.iter().fold(0u64, |acc, output| {
            acc.saturating_add(OUTPUT_BASE_SIZE + output.script_public_key.len() as u64)
        });
        BASE_TX_SIZE
            .saturating_add(tx.payload.len() as u64)
            .saturating_add(inputs)
            .saturating_add(outputs)
    }

    /// Mass of `tx` once signed.
    pub fn compute_mass(&self, tx: &Transaction) -> u64 {
        let p = &self.params;
        let spk_bytes = tx.outputs.iter().fold(0u64, |acc, output| {
            acc.saturating_add(2 + output.script_public_key.len() as u64)
        });
        let sig_ops = tx
            .inputs
            .iter()
            .fold(0u64, |acc, input| acc.saturating_add(u64::from(input.sig_op_count)));

        self.estimated_size(tx)
            .saturating_mul(p.mass_per_tx_byte)
            .saturating_add(spk_bytes.saturating_mul(p.mass_per_script_pub_key_byte))
            .saturating_add(sig_ops.saturating_mul(p.mass_per_sig_op))
            .saturating_add((tx.outputs.len() as u64).saturating_mul(p.storage_mass_per_output))
    }

    /// Mass of a standard-shape transaction: P2PK inputs with one sig-op and
    /// 34-byte P2PK outputs.
    pub fn standard_mass(&self, input_count: usize, output_count: usize, payload_size: usize) -> u64 {
        let p = &self.params;
        let inputs = input_count as u64;
        let outputs = output_count as u64;
        let spk_len = P2PK_SCRIPT_LEN as u64;

        let size = BASE_TX_SIZE
            .saturating_add(payload_size as u64)
            .saturating_add(inputs.saturating_mul(INPUT_BASE_SIZE + SIGNATURE_SCRIPT_LEN as u64))
            .saturating_add(outputs.saturating_mul(OUTPUT_BASE_SIZE + spk_len));

        size.saturating_mul(p.mass_per_tx_byte)
            .saturating_add(outputs.saturating_mul(2 + spk_len).saturating_mul(p.mass_per_script_pub_key_byte))
            .saturating_add(inputs.saturating_mul(p.mass_per_sig_op))
            .saturating_add(outputs.saturating_mul(p.storage_mass_per_output))
    }

    /// Mass one additional P2PK output adds.
    pub fn standard_output_mass(&self) -> u64 {
        self.standard_mass(0, 1, 0).saturating_sub(self.standard_mass(0, 0, 0))
    }

    /// `max(minimum_fee, mass * fee_rate)`.
    pub fn minimum_fee(&self, mass: u64, fee_rate: u64) -> Result<u64, TransactionError> {
        let fee = mass.checked_mul(fee_rate).ok_or(TransactionError::AmountOverflow)?;
        Ok(fee.max(self.params.minimum_fee))
    }

    /// Whether `output` is too small to be worth spending.
    pub fn is_dust(&self, output: &TransactionOutput) -> bool {
        let total_size = output.serialized_size() as u128 + u128::from(DUST_SPEND_SIZE);
        let value = u128::from(output.value);
        value * 1000 / (3 * total_size) < u128::from(self.params.dust_relay_fee)
    }

    /// Smallest value an output with a `script_len`-byte script may carry
    /// without being dust.
    pub fn dust_threshold(&self, script_len: usize) -> u64 {
        let total_size = (OUTPUT_BASE_SIZE + script_len as u64 + DUST_SPEND_SIZE) as u128;
        let bound = 3 * total_size * u128::from(self.params.dust_relay_fee);
        let threshold = (bound + 999) / 1000;
        u64::try_from(threshold).unwrap_or(u64::MAX)
    }
}

/// Minimum fee in sompi for a standard-shape transaction at the default
/// parameters and fee rate.
///
/// Never below 3250.
pub fn calculate_min_fee(input_count: usize, output_count: usize, payload_size: usize) -> u64 {
    let calc = MassCalculator::default();
    let mass = calc.standard_mass(input_count, output_count, payload_size);
    mass.saturating_mul(DEFAULT_FEE_RATE).max(calc.params.minimum_fee)
}
