//! Transaction builder.
//!
//! Turns a set of UTXOs and a payment intent into a signed transaction
//! through a fixed sequence of states:
//!
//! `Empty → HasInputs → HasOutputs → FeeSet → Built → Signed`
//!
//! Each call is accepted only in the states listed on it; anything else
//! fails with `InvalidState` and leaves the builder untouched. `clear()` is
//! the only way back to `Empty`.
//!
//! Keys handed to `add_input` are held until signing and dropped when
//! `sign` returns, whichever way it returns. `PrivateKey` wipes its secret
//! on drop.

use std::collections::HashSet;
use std::mem;

use kas_primitives::ec::PrivateKey;
use kas_script::Address;

use crate::config::BuilderConfig;
use crate::input::TransactionInput;
use crate::mass::MassCalculator;
use crate::output::TransactionOutput;
use crate::template::p2pk;
use crate::template::SignatureScriptTemplate;
use crate::transaction::Transaction;
use crate::utxo::UtxoEntry;
use crate::TransactionError;

/// Position of a [`TransactionBuilder`] in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuilderState {
    Empty,
    HasInputs,
    HasOutputs,
    FeeSet,
    Built,
    Signed,
}

/// Builds and signs a payment transaction.
///
/// # Example
/// ```
/// use kas_primitives::chainhash::Hash;
/// use kas_primitives::ec::SignatureScheme;
/// use kas_script::{KeyPair, Network};
/// use kas_transaction::{BuilderConfig, TransactionBuilder, TransactionOutpoint, UtxoEntry};
///
/// let sender = KeyPair::generate(Network::Mainnet, SignatureScheme::Schnorr);
/// let recipient = KeyPair::generate(Network::Mainnet, SignatureScheme::Schnorr);
/// let utxo = UtxoEntry::new(
///     TransactionOutpoint::new(Hash::new([1u8; 32]), 0),
///     100_000_000,
///     sender.script_public_key(),
/// );
///
/// let mut builder = TransactionBuilder::new(BuilderConfig::default());
/// builder
///     .add_input(utxo, None).unwrap()
///     .add_output(recipient.address(), 50_000_000).unwrap()
///     .set_fee(3_250).unwrap();
/// builder.add_change_output(sender.address()).unwrap();
/// let tx = builder.build_and_sign(Some(sender.private_key())).unwrap();
/// assert_eq!(tx.outputs.len(), 2);
/// ```
pub struct TransactionBuilder {
    config: BuilderConfig,
    mass: MassCalculator,
    state: BuilderState,
    entries: Vec<UtxoEntry>,
    keys: Vec<Option<PrivateKey>>,
    outputs: Vec<TransactionOutput>,
    recipients: usize,
    change_added: bool,
    fee: Option<u64>,
    lock_time: u64,
    payload: Vec<u8>,
    transaction: Option<Transaction>,
}

impl Default for TransactionBuilder {
    fn default() -> Self {
        Self::new(BuilderConfig::default())
    }
}

impl TransactionBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        TransactionBuilder {
            mass: MassCalculator::new(config.mass),
            config,
            state: BuilderState::Empty,
            entries: Vec::new(),
            keys: Vec::new(),
            outputs: Vec::new(),
            recipients: 0,
            change_added: false,
            fee: None,
            lock_time: 0,
            payload: Vec::new(),
            transaction: None,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn state(&self) -> BuilderState {
        self.state
    }

    /// The fee, once set explicitly or applied by `build`.
    pub fn fee(&self) -> Option<u64> {
        self.fee
    }

    /// The UTXO entries being spent, in input order.
    pub fn utxo_entries(&self) -> &[UtxoEntry] {
        &self.entries
    }

    /// The built (and possibly signed) transaction.
    pub fn transaction(&self) -> Option<&Transaction> {
        self.transaction.as_ref()
    }

    /// Sum of the input amounts.
    pub fn input_total(&self) -> Result<u64, TransactionError> {
        self.entries
            .iter()
            .try_fold(0u64, |acc, e| acc.checked_add(e.amount))
            .ok_or(TransactionError::AmountOverflow)
    }

    /// Sum of the output values added so far.
    pub fn output_total(&self) -> Result<u64, TransactionError> {
        self.outputs
            .iter()
            .try_fold(0u64, |acc, o| acc.checked_add(o.value))
            .ok_or(TransactionError::AmountOverflow)
    }

    /// Mass the transaction will have once signed, for the current inputs,
    /// outputs and payload.
    pub fn estimated_mass(&self) -> u64 {
        self.mass.compute_mass(&self.draft())
    }

    // -----------------------------------------------------------------------
    // Inputs and outputs
    // -----------------------------------------------------------------------

    /// Spend `entry`, optionally with the key that signs it.
    ///
    /// Inputs use sequence 0 and one signature operation.
    pub fn add_input(&mut self, entry: UtxoEntry, key: Option<PrivateKey>) -> Result<&mut Self, TransactionError> {
        self.expect_state("add an input", &[BuilderState::Empty, BuilderState::HasInputs])?;

        if self.entries.iter().any(|e| e.outpoint == entry.outpoint) {
            return Err(TransactionError::DuplicateOutpoint(entry.outpoint));
        }
        if let Some(current) = self.config.current_daa_score {
            if !entry.is_mature(current, self.config.coinbase_maturity) {
                return Err(TransactionError::ImmatureCoinbase {
                    outpoint: entry.outpoint,
                    mature_at: entry.mature_at(self.config.coinbase_maturity),
                });
            }
        }
        self.input_total()?
            .checked_add(entry.amount)
            .ok_or(TransactionError::AmountOverflow)?;

        log::debug!("input {} added: {} ({} sompi)", self.entries.len(), entry.outpoint, entry.amount);
        self.entries.push(entry);
        self.keys.push(key);
        self.state = BuilderState::HasInputs;
        Ok(self)
    }

    /// Pay `amount` sompi to `address`.
    ///
    /// At most `max_recipients` recipients are accepted. The amount must be
    /// non-zero and not dust; the address must be on the configured network.
    pub fn add_output(&mut self, address: &Address, amount: u64) -> Result<&mut Self, TransactionError> {
        self.expect_state("add an output", &[BuilderState::HasInputs, BuilderState::HasOutputs])?;

        if self.recipients >= self.config.max_recipients {
            return Err(TransactionError::TooManyRecipients {
                max: self.config.max_recipients,
            });
        }
        if self.outputs.len() >= self.config.max_outputs {
            return Err(TransactionError::TooManyOutputs {
                max: self.config.max_outputs,
            });
        }
        if amount == 0 {
            return Err(TransactionError::InvalidAmount("output amount must be positive".to_string()));
        }
        self.check_network(address)?;

        let output = TransactionOutput::new(amount, p2pk::lock(address));
        if self.mass.is_dust(&output) {
            return Err(TransactionError::InvalidAmount(format!(
                "{} sompi is below the dust threshold of {}",
                amount,
                self.mass.dust_threshold(output.script_public_key.len())
            )));
        }
        self.output_total()?
            .checked_add(amount)
            .ok_or(TransactionError::AmountOverflow)?;

        log::debug!("output {} added: {} sompi to {}", self.outputs.len(), amount, address);
        self.outputs.push(output);
        self.recipients += 1;
        self.state = BuilderState::HasOutputs;
        Ok(self)
    }

    // -----------------------------------------------------------------------
    // Fee, change and metadata
    // -----------------------------------------------------------------------

    /// Use exactly `fee` sompi as the fee.
    ///
    /// The value is taken as given; a fee below the relay minimum is logged
    /// but not raised.
    pub fn set_fee(&mut self, fee: u64) -> Result<&mut Self, TransactionError> {
        self.expect_fee_open("set the fee")?;

        let minimum = self.minimum_fee(self.change_slot_free())?;
        if fee < minimum {
            log::warn!("fee {} sompi is below the relay minimum of {}", fee, minimum);
        }
        log::debug!("fee set: {} sompi", fee);
        self.fee = Some(fee);
        self.state = BuilderState::FeeSet;
        Ok(self)
    }

    /// Set the fee to the minimum relay fee for the current shape plus the
    /// change output that `add_change_output` would add.
    ///
    /// # Returns
    /// The fee chosen.
    pub fn set_minimum_fee(&mut self) -> Result<u64, TransactionError> {
        self.expect_fee_open("set the fee")?;

        let fee = self.minimum_fee(self.change_slot_free())?;
        log::debug!("minimum fee chosen: {} sompi (rate {})", fee, self.config.fee_rate);
        self.fee = Some(fee);
        self.state = BuilderState::FeeSet;
        Ok(fee)
    }

    /// Send whatever the inputs leave after outputs and fee back to
    /// `address`.
    ///
    /// # Returns
    /// The change amount, or `None` when it was dust and no change output
    /// was added.
    pub fn add_change_output(&mut self, address: &Address) -> Result<Option<u64>, TransactionError> {
        self.expect_state("add change", &[BuilderState::FeeSet])?;
        if self.change_added {
            return Err(TransactionError::InvalidState {
                operation: "add a second change output",
                state: self.state,
            });
        }
        self.check_network(address)?;

        let available = self.input_total()?;
        let needed = self.required_total()?;
        let change = available
            .checked_sub(needed)
            .ok_or(TransactionError::InsufficientFunds { needed, available })?;

        let output = TransactionOutput::new(change, p2pk::lock(address));
        if self.mass.is_dust(&output) {
            log::debug!("change of {} sompi is dust, omitted", change);
            self.change_added = true;
            return Ok(None);
        }
        if self.outputs.len() >= self.config.max_outputs {
            return Err(TransactionError::TooManyOutputs {
                max: self.config.max_outputs,
            });
        }

        log::debug!("change output added: {} sompi to {}", change, address);
        self.outputs.push(output);
        self.change_added = true;
        Ok(Some(change))
    }

    /// Set the absolute lock-time (0 disables it).
    pub fn set_lock_time(&mut self, lock_time: u64) -> Result<&mut Self, TransactionError> {
        self.expect_not_built("set the lock time")?;
        self.lock_time = lock_time;
        Ok(self)
    }

    /// Attach an arbitrary payload.
    ///
    /// The payload counts towards mass, so it must be set before the fee.
    pub fn set_payload(&mut self, payload: Vec<u8>) -> Result<&mut Self, TransactionError> {
        self.expect_state(
            "set the payload",
            &[BuilderState::Empty, BuilderState::HasInputs, BuilderState::HasOutputs],
        )?;
        self.payload = payload;
        Ok(self)
    }

    // -----------------------------------------------------------------------
    // Build and sign
    // -----------------------------------------------------------------------

    /// Assemble the unsigned transaction.
    ///
    /// Applies the minimum fee if none was set, then checks every limit
    /// and that `outputs + fee` is covered by the inputs.
    pub fn build(&mut self) -> Result<Transaction, TransactionError> {
        let fee = match self.state {
            BuilderState::Empty => return Err(TransactionError::NoInputs),
            BuilderState::HasInputs => return Err(TransactionError::NoOutputs),
            BuilderState::HasOutputs => self.minimum_fee(false)?,
            BuilderState::FeeSet => self.fee.unwrap_or_default(),
            BuilderState::Built | BuilderState::Signed => {
                return Err(TransactionError::InvalidState {
                    operation: "build",
                    state: self.state,
                })
            }
        };

        if self.entries.is_empty() {
            return Err(TransactionError::NoInputs);
        }
        if self.outputs.is_empty() {
            return Err(TransactionError::NoOutputs);
        }
        if self.outputs.len() > self.config.max_outputs {
            return Err(TransactionError::TooManyOutputs {
                max: self.config.max_outputs,
            });
        }
        if self.recipients > self.config.max_recipients {
            return Err(TransactionError::TooManyRecipients {
                max: self.config.max_recipients,
            });
        }
        let mut seen = HashSet::with_capacity(self.entries.len());
        if let Some(dup) = self.entries.iter().find(|e| !seen.insert(e.outpoint)) {
            return Err(TransactionError::DuplicateOutpoint(dup.outpoint));
        }

        let available = self.input_total()?;
        let needed = self
            .output_total()?
            .checked_add(fee)
            .ok_or(TransactionError::AmountOverflow)?;
        if needed > available {
            return Err(TransactionError::InsufficientFunds { needed, available });
        }

        let tx = self.draft();
        self.fee = Some(fee);
        self.state = BuilderState::Built;
        log::debug!(
            "built {} with fee {} sompi, mass {}",
            tx.id(),
            fee,
            self.mass.compute_mass(&tx)
        );
        self.transaction = Some(tx.clone());
        Ok(tx)
    }

    /// Sign every input of the built transaction.
    ///
    /// Each input uses the key given to `add_input`, or `fallback_key` when
    /// none was given. Every signature is verified before returning. Once
    /// signing starts, all held keys are dropped when this returns, on
    /// success or failure.
    pub fn sign(&mut self, fallback_key: Option<&PrivateKey>) -> Result<Transaction, TransactionError> {
        self.expect_state("sign", &[BuilderState::Built])?;
        let keys = mem::take(&mut self.keys);

        let mut tx = self.transaction.clone().ok_or(TransactionError::InvalidState {
            operation: "sign",
            state: self.state,
        })?;

        for (index, entry) in self.entries.iter().enumerate() {
            let key = keys
                .get(index)
                .and_then(Option::as_ref)
                .or(fallback_key)
                .ok_or(TransactionError::MissingKey { index })?;
            let script = p2pk::unlock(key, self.config.sighash_type).sign(&tx, entry, index)?;
            tx.inputs[index].signature_script = script;
            log::trace!("input {} signed", index);
        }

        for (index, entry) in self.entries.iter().enumerate() {
            if !p2pk::verify_input(&tx, entry, index)? {
                return Err(TransactionError::SigningError(format!(
                    "signature for input {} failed verification",
                    index
                )));
            }
        }

        log::debug!("signed {} ({} inputs)", tx.id(), tx.inputs.len());
        self.transaction = Some(tx.clone());
        self.state = BuilderState::Signed;
        Ok(tx)
    }

    /// `build` followed by `sign`.
    pub fn build_and_sign(&mut self, fallback_key: Option<&PrivateKey>) -> Result<Transaction, TransactionError> {
        if let Err(e) = self.build() {
            self.keys.clear();
            return Err(e);
        }
        self.sign(fallback_key)
    }

    /// Drop all inputs, outputs, keys and settings and return to `Empty`.
    ///
    /// The configuration is kept.
    pub fn clear(&mut self) {
        *self = Self::new(self.config.clone());
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn expect_state(&self, operation: &'static str, allowed: &[BuilderState]) -> Result<(), TransactionError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(TransactionError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    /// The fee may be replaced until change has been derived from it.
    fn expect_fee_open(&self, operation: &'static str) -> Result<(), TransactionError> {
        self.expect_state(operation, &[BuilderState::HasOutputs, BuilderState::FeeSet])?;
        if self.change_added {
            return Err(TransactionError::InvalidState {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }

    fn expect_not_built(&self, operation: &'static str) -> Result<(), TransactionError> {
        match self.state {
            BuilderState::Built | BuilderState::Signed => Err(TransactionError::InvalidState {
                operation,
                state: self.state,
            }),
            _ => Ok(()),
        }
    }

    fn check_network(&self, address: &Address) -> Result<(), TransactionError> {
        if address.network() != self.config.network {
            return Err(TransactionError::InvalidAddress(format!(
                "{} is a {} address, builder is configured for {}",
                address,
                address.network(),
                self.config.network
            )));
        }
        Ok(())
    }

    fn change_slot_free(&self) -> bool {
        !self.change_added && self.outputs.len() < self.config.max_outputs
    }

    fn required_total(&self) -> Result<u64, TransactionError> {
        self.output_total()?
            .checked_add(self.fee.unwrap_or_default())
            .ok_or(TransactionError::AmountOverflow)
    }

    fn minimum_fee(&self, with_change: bool) -> Result<u64, TransactionError> {
        let mut mass = self.estimated_mass();
        if with_change {
            mass = mass.saturating_add(self.mass.standard_output_mass());
        }
        self.mass.minimum_fee(mass, self.config.fee_rate)
    }

    fn draft(&self) -> Transaction {
        let mut tx = Transaction::new();
        tx.inputs = self
            .entries
            .iter()
            .map(|e| TransactionInput::new(e.outpoint))
            .collect();
        tx.outputs = self.outputs.clone();
        tx.lock_time = self.lock_time;
        tx.payload = self.payload.clone();
        tx
    }
}

impl std::fmt::Debug for TransactionBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionBuilder")
            .field("state", &self.state)
            .field("inputs", &self.entries.len())
            .field("outputs", &self.outputs.len())
            .field("fee", &self.fee)
            .finish_non_exhaustive()
    }
}
