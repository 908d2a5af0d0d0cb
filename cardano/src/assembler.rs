//! Transaction Assembler
//!
//! Drives one build through selection, outputs, change, fee, size check,
//! signing and serialization. Fee and change depend on each other, so they are
//! settled together in a fixed-point loop that may pull extra inputs from the
//! unselected part of the pool.

use std::{collections::HashSet, mem};

use horrocard_codec::decode_transaction;
use horrocard_common::{
    Address, AssetUnit, Lovelace, NetworkId, ProtocolParameters, UTxOIdentifier, UnspentOutput,
    Value,
};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::{
    change::{change_lovelace_required, split_change_if_needed},
    coin_selection::{select, select_values},
    draft::{SignedTransaction, TransactionDraft},
    error::TxBuilderError,
    fees::{min_fee, validate_balance, validate_tx_size},
    output::{TransactionOutput, build_output},
    signer::{KeySource, required_signers, sign},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblerState {
    Idle,
    ParametersSet,
    InputsSelected,
    OutputsBuilt,
    ChangeResolved,
    FeeComputed,
    SizeChecked,
    Signed,
    Serialized,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblerConfig {
    /// Network every output address must belong to
    pub network: NetworkId,

    /// Inputs the selector tries to reach, to keep the UTxO set from fragmenting
    pub min_input_count: usize,

    /// Last slot the transaction is valid in
    pub ttl: Option<u64>,

    /// Rounds of the fee/change loop before giving up
    pub max_fee_iterations: usize,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            network: NetworkId::Mainnet,
            min_input_count: 2,
            ttl: None,
            max_fee_iterations: 16,
        }
    }
}

/// One payment the caller wants made
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    pub address: Address,
    pub value: Value,
}

impl PaymentRequest {
    pub fn new(address: Address, value: Value) -> Self {
        Self { address, value }
    }
}

pub struct TransactionAssembler<R> {
    config: AssemblerConfig,
    rng: R,
    state: AssemblerState,
    params: Option<ProtocolParameters>,
}

impl<R: Rng> TransactionAssembler<R> {
    pub fn new(config: AssemblerConfig, rng: R) -> Self {
        Self {
            config,
            rng,
            state: AssemblerState::Idle,
            params: None,
        }
    }

    pub fn state(&self) -> &AssemblerState {
        &self.state
    }

    fn transition(&mut self, next: AssemblerState) {
        debug!(from = ?self.state, to = ?next, "Assembler state change");
        self.state = next;
    }

    pub fn set_parameters(&mut self, params: ProtocolParameters) {
        debug!(epoch = params.epoch, "Protocol parameters set");
        self.params = Some(params);
        self.transition(AssemblerState::ParametersSet);
    }

    /// Build, sign and serialize a transaction paying `requests` from `pool`,
    /// sending change to `change_address`. On failure the assembler ends in
    /// [`AssemblerState::Failed`] and nothing is returned.
    pub fn build(
        &mut self,
        requests: &[PaymentRequest],
        pool: Vec<UnspentOutput>,
        excluded: &HashSet<UTxOIdentifier>,
        change_address: &Address,
        keys: &dyn KeySource,
    ) -> Result<SignedTransaction, TxBuilderError> {
        let result = self.run(requests, pool, excluded, change_address, keys);
        if let Err(error) = &result {
            warn!("Transaction build failed: {error}");
            self.transition(AssemblerState::Failed(error.to_string()));
        }
        result
    }

    fn run(
        &mut self,
        requests: &[PaymentRequest],
        pool: Vec<UnspentOutput>,
        excluded: &HashSet<UTxOIdentifier>,
        change_address: &Address,
        keys: &dyn KeySource,
    ) -> Result<SignedTransaction, TxBuilderError> {
        let params = self
            .params
            .clone()
            .ok_or_else(|| TxBuilderError::InvalidInput("Protocol parameters not set".into()))?;
        if self.state != AssemblerState::ParametersSet {
            self.transition(AssemblerState::ParametersSet);
        }

        if requests.is_empty() {
            return Err(TxBuilderError::InvalidInput("No payments requested".into()));
        }
        self.check_network(change_address)?;
        let mut payments = Vec::with_capacity(requests.len());
        for request in requests {
            self.check_network(&request.address)?;
            payments.push(build_output(request.address.clone(), request.value.clone(), &params)?);
        }

        let pool: Vec<UnspentOutput> =
            pool.into_iter().filter(|utxo| !excluded.contains(&utxo.utxo)).collect();
        if pool.is_empty() {
            let requested: Lovelace = payments.iter().map(|p| p.value().lovelace).sum();
            return Err(TxBuilderError::InsufficientFunds {
                unit: AssetUnit::Lovelace,
                requested,
                available: 0,
            });
        }

        let selection =
            select(&mut self.rng, pool, &payments, self.config.min_input_count, excluded)?;
        self.transition(AssemblerState::InputsSelected);

        // Payment outputs are final from here; change is settled with the fee
        self.transition(AssemblerState::OutputsBuilt);

        let (draft, signers) =
            self.balance(selection.inputs, &payments, selection.remaining, change_address, &params)?;

        let size = draft.placeholder_size(signers)?;
        validate_tx_size(&params, size)?;
        self.transition(AssemblerState::SizeChecked);

        let body = draft.body_bytes()?;
        let witness_set = sign(keys, &body, draft.inputs())?;
        self.transition(AssemblerState::Signed);

        let signed = SignedTransaction::new(draft, witness_set)?;
        self.self_check(&signed, &params)?;
        self.transition(AssemblerState::Serialized);

        info!(
            hash = %signed.hash(),
            fee = signed.fee(),
            size = signed.bytes().len(),
            inputs = signed.draft().inputs().len(),
            outputs = signed.draft().outputs().len(),
            "Transaction built"
        );
        Ok(signed)
    }

    fn check_network(&self, address: &Address) -> Result<(), TxBuilderError> {
        match address.network() {
            Some(network) if network != self.config.network => Err(TxBuilderError::InvalidInput(
                format!("Address {address} is not on {}", self.config.network),
            )),
            _ => Ok(()),
        }
    }

    /// Settle change and fee together. Returns the draft and its signer count.
    fn balance(
        &mut self,
        mut inputs: Vec<UnspentOutput>,
        payments: &[TransactionOutput],
        mut remaining: Vec<UnspentOutput>,
        change_address: &Address,
        params: &ProtocolParameters,
    ) -> Result<(TransactionDraft, usize), TxBuilderError> {
        let paid = Value::sum(payments.iter().map(|p| p.value()))
            .ok_or_else(|| TxBuilderError::overflow("payment total"))?;
        let mut fee = params.min_fee_b;

        for round in 0..self.config.max_fee_iterations {
            let signers = required_signers(&inputs)?.len();
            let consumed = Value::sum(inputs.iter().map(|i| &i.value))
                .ok_or_else(|| TxBuilderError::overflow("input total"))?;
            let spent = paid
                .checked_add(&Value::from_lovelace(fee))
                .ok_or_else(|| TxBuilderError::overflow("fee"))?;

            let change = match consumed.checked_sub(&spent) {
                Ok(change) => change,
                Err(shortfall) => {
                    let deficit = unit_value(shortfall.unit, shortfall.required - shortfall.available);
                    self.top_up(&mut inputs, &mut remaining, deficit, &consumed, &spent)?;
                    continue;
                }
            };

            let mut outputs = payments.to_vec();
            let mut dust = 0;
            if change != Value::default() {
                let needed = change_lovelace_required(&change, params)?;
                if change.lovelace < needed {
                    let missing = needed - change.lovelace;
                    if change.is_lovelace_only() && !covers_lovelace(&remaining, missing) {
                        debug!(dust = change.lovelace, "Folding change dust into the fee");
                        dust = change.lovelace;
                    } else {
                        let wanted = spent
                            .checked_add(&Value::from_lovelace(needed))
                            .ok_or_else(|| TxBuilderError::overflow("change"))?;
                        self.top_up(
                            &mut inputs,
                            &mut remaining,
                            Value::from_lovelace(missing),
                            &consumed,
                            &wanted,
                        )?;
                        continue;
                    }
                } else {
                    let split = split_change_if_needed(&change, change_address, params)?;
                    outputs.extend(split.extra_outputs);
                    outputs.push(build_output(change_address.clone(), split.remainder, params)?);
                }
            }

            let draft = TransactionDraft {
                inputs: inputs.clone(),
                outputs,
                fee: fee + dust,
                ttl: self.config.ttl,
            };
            let size = draft.placeholder_size(signers)?;
            let required = min_fee(params, size)?;
            debug!(round, fee = draft.fee, required, size, "Fee round");

            if draft.fee >= required {
                self.transition(AssemblerState::ChangeResolved);
                self.transition(AssemblerState::FeeComputed);
                return Ok((draft, signers));
            }
            fee = required;
        }

        Err(TxBuilderError::InvalidInput(format!(
            "Fee did not settle within {} rounds",
            self.config.max_fee_iterations
        )))
    }

    /// Pull inputs from the unselected pool to cover `deficit`
    fn top_up(
        &mut self,
        inputs: &mut Vec<UnspentOutput>,
        remaining: &mut Vec<UnspentOutput>,
        deficit: Value,
        consumed: &Value,
        wanted: &Value,
    ) -> Result<(), TxBuilderError> {
        let reserve = Value::sum(remaining.iter().map(|utxo| &utxo.value))
            .ok_or_else(|| TxBuilderError::overflow("pool total"))?;
        let report = |unit: AssetUnit| TxBuilderError::InsufficientFunds {
            unit,
            requested: wanted.quantity_of(&unit),
            available: consumed.quantity_of(&unit).saturating_add(reserve.quantity_of(&unit)),
        };

        if remaining.is_empty() {
            let unit = deficit.units().find(|(_, q)| *q > 0).map_or(AssetUnit::Lovelace, |(u, _)| u);
            return Err(report(unit));
        }

        let selection = select_values(
            &mut self.rng,
            mem::take(remaining),
            &[deficit],
            0,
            &HashSet::new(),
        )
        .map_err(|error| match error {
            TxBuilderError::InsufficientFunds { unit, .. } => report(unit),
            other => other,
        })?;

        debug!(added = selection.inputs.len(), "Topped up inputs");
        inputs.extend(selection.inputs);
        *remaining = selection.remaining;
        Ok(())
    }

    /// Decode the final bytes independently and check id, fee, balance and size
    fn self_check(
        &self,
        signed: &SignedTransaction,
        params: &ProtocolParameters,
    ) -> Result<(), TxBuilderError> {
        let decoded = decode_transaction(signed.bytes()).map_err(TxBuilderError::codec)?;
        if decoded.hash != signed.hash() {
            return Err(TxBuilderError::Codec(format!(
                "Decoded id {} differs from built id {}",
                decoded.hash,
                signed.hash()
            )));
        }
        validate_balance(params, &decoded, signed.draft().inputs())?;
        validate_tx_size(params, decoded.size)
    }
}

fn unit_value(unit: AssetUnit, quantity: u64) -> Value {
    match unit {
        AssetUnit::Lovelace => Value::from_lovelace(quantity),
        AssetUnit::Native(policy, name) => Value::default().with_asset(policy, name, quantity),
    }
}

fn covers_lovelace(pool: &[UnspentOutput], lovelace: Lovelace) -> bool {
    // An overflowing total certainly covers
    let total = pool.iter().try_fold(0u64, |acc, utxo| acc.checked_add(utxo.value.lovelace));
    total.is_none_or(|total| total >= lovelace)
}
