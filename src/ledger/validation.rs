// src/ledger/validation.rs
use std::collections::HashSet;

use super::pool::UtxoPool;
use super::transaction::{OutputRecord, Transaction};
use crate::crypto::verify_signature;
use crate::error::Rejection;

/// A transaction is valid iff:
/// 1. every output it claims is in `pool`,
/// 2. each input carries a valid signature from the owner of the claimed output,
/// 3. no output is claimed more than once,
/// 4. every declared output value is non-negative,
/// 5. claimed input value covers declared output value.
pub fn is_valid(tx: &Transaction, pool: &UtxoPool) -> bool {
    check_transaction(tx, pool).is_ok()
}

/// Same rules as [`is_valid`], reporting the first one that fails.
pub fn check_transaction(tx: &Transaction, pool: &UtxoPool) -> Result<(), Rejection> {
    check_with(tx, pool, |index, record| verify_input(tx, index, record))
}

/// Whether input `index` of `tx` is signed by `record.owner`.
///
/// Pure over its arguments; safe to evaluate concurrently.
pub fn verify_input(tx: &Transaction, index: usize, record: &OutputRecord) -> bool {
    let Some(input) = tx.inputs().get(index) else {
        return false;
    };
    match tx.signable_payload(index) {
        Some(payload) => verify_signature(&record.owner, &payload, &input.signature),
        None => false,
    }
}

/// Rule evaluation with a pluggable authorization predicate, so the epoch can
/// feed in verdicts computed ahead of time.
pub(crate) fn check_with<F>(tx: &Transaction, pool: &UtxoPool, authorized: F) -> Result<(), Rejection>
where
    F: Fn(usize, &OutputRecord) -> bool,
{
    let mut claimed = Vec::with_capacity(tx.inputs().len());
    for (index, utxo) in tx.claimed_utxos().enumerate() {
        match pool.get(&utxo) {
            Some(record) => claimed.push(record),
            None => return Err(Rejection::MissingInput { index, utxo }),
        }
    }

    for (index, &record) in claimed.iter().enumerate() {
        if !authorized(index, record) {
            return Err(Rejection::InvalidSignature { index });
        }
    }

    let mut seen = HashSet::with_capacity(tx.inputs().len());
    for (index, utxo) in tx.claimed_utxos().enumerate() {
        if !seen.insert(utxo) {
            return Err(Rejection::DuplicateInput { index, utxo });
        }
    }

    for (index, output) in tx.outputs().iter().enumerate() {
        if output.value < 0 {
            return Err(Rejection::NegativeOutput {
                index,
                value: output.value,
            });
        }
    }

    // i128 sums cannot overflow for any realistic count of i64 values.
    let inputs: i128 = claimed.iter().map(|r| r.value as i128).sum();
    let outputs: i128 = tx.outputs().iter().map(|o| o.value as i128).sum();
    if inputs < outputs {
        return Err(Rejection::InsufficientValue { inputs, outputs });
    }

    Ok(())
}
