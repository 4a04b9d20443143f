//! Builder configuration.

use kas_script::Network;

use crate::mass::{MassParams, DEFAULT_FEE_RATE};
use crate::sighash::SigHashType;

/// Recipient outputs allowed per transaction.
pub const MAX_RECIPIENTS: usize = 2;

/// Total outputs (recipients plus change) allowed per transaction.
pub const MAX_OUTPUTS: usize = 3;

/// DAA score distance before a coinbase output may be spent.
pub const COINBASE_MATURITY: u64 = 100;

/// Settings for a [`TransactionBuilder`](crate::TransactionBuilder).
///
/// # Example
/// ```
/// use kas_script::Network;
/// use kas_transaction::BuilderConfig;
///
/// let config = BuilderConfig::default()
///     .with_network(Network::Testnet)
///     .with_fee_rate(2);
/// assert_eq!(config.max_recipients, 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuilderConfig {
    /// Network every output address must belong to.
    pub network: Network,
    pub max_recipients: usize,
    pub max_outputs: usize,
    /// Sompi per gram of mass.
    pub fee_rate: u64,
    /// Sighash type written into every signature script.
    pub sighash_type: SigHashType,
    pub coinbase_maturity: u64,
    /// When set, immature coinbase UTXOs are rejected by `add_input`.
    pub current_daa_score: Option<u64>,
    pub mass: MassParams,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        BuilderConfig {
            network: Network::Mainnet,
            max_recipients: MAX_RECIPIENTS,
            max_outputs: MAX_OUTPUTS,
            fee_rate: DEFAULT_FEE_RATE,
            sighash_type: SigHashType::default(),
            coinbase_maturity: COINBASE_MATURITY,
            current_daa_score: None,
            mass: MassParams::default(),
        }
    }
}

impl BuilderConfig {
    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    pub fn with_fee_rate(mut self, fee_rate: u64) -> Self {
        self.fee_rate = fee_rate;
        self
    }

    pub fn with_sighash_type(mut self, sighash_type: SigHashType) -> Self {
        self.sighash_type = sighash_type;
        self
    }

    pub fn with_coinbase_maturity(mut self, coinbase_maturity: u64) -> Self {
        self.coinbase_maturity = coinbase_maturity;
        self
    }

    pub fn with_current_daa_score(mut self, current_daa_score: u64) -> Self {
        self.current_daa_score = Some(current_daa_score);
        self
    }

    pub fn with_mass_params(mut self, mass: MassParams) -> Self {
        self.mass = mass;
        self
    }
}
