// src/ledger/epoch.rs
use std::collections::HashSet;

use log::{debug, info};
use rayon::ThreadPool;

use super::pool::UtxoPool;
use super::transaction::{Transaction, TxHash, UtxoId};
use super::validation::{check_with, verify_input};
use super::verify::SignatureVerdicts;
use crate::config::LedgerConfig;
use crate::error::Rejection;

/// A candidate that was not accepted in an epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    /// Position in the candidate list.
    pub position: usize,
    pub tx_hash: TxHash,
    pub reason: Rejection,
}

#[derive(Debug, Clone, Default)]
pub struct EpochReport {
    /// Accepted transactions, in acceptance order.
    pub accepted: Vec<Transaction>,
    pub rejected: Vec<Rejected>,
}

/// Process one epoch with the default configuration, returning the accepted transactions.
pub fn process_epoch(candidates: &[Transaction], pool: &mut UtxoPool) -> Vec<Transaction> {
    run_epoch(candidates, pool, &LedgerConfig::default()).accepted
}

/// Process one epoch of candidates against `pool`.
///
/// Candidates are taken in the given order, each checked against the pool as left by
/// the ones accepted before it. An accepted candidate's inputs are removed and its
/// outputs inserted before the next candidate is looked at. A rejected candidate is
/// not reconsidered in this epoch.
///
/// Parallel verification runs on rayon's global pool here; a [`Ledger`](super::Ledger)
/// keeps a dedicated pool sized by `verification_threads`.
pub fn run_epoch(candidates: &[Transaction], pool: &mut UtxoPool, config: &LedgerConfig) -> EpochReport {
    run_epoch_on(candidates, pool, config, None)
}

/// [`run_epoch`], verifying on `thread_pool` when one is given.
pub fn run_epoch_on(
    candidates: &[Transaction],
    pool: &mut UtxoPool,
    config: &LedgerConfig,
    thread_pool: Option<&ThreadPool>,
) -> EpochReport {
    let verdicts = if config.parallel_verification {
        SignatureVerdicts::precompute(candidates, pool, thread_pool)
    } else {
        SignatureVerdicts::empty()
    };

    let mut report = EpochReport::default();
    // Ids consumed this epoch; none of them may be created again.
    let mut spent: HashSet<UtxoId> = HashSet::new();

    for (position, tx) in candidates.iter().enumerate() {
        let tx_hash = tx.hash();
        match admit(position, tx, tx_hash, pool, &spent, &verdicts) {
            Ok(()) => {
                apply(tx, tx_hash, pool, &mut spent);
                report.accepted.push(tx.clone());
            }
            Err(reason) => {
                debug!("rejected candidate #{} ({}): {}", position, tx_hash, reason);
                report.rejected.push(Rejected {
                    position,
                    tx_hash,
                    reason,
                });
            }
        }
    }

    info!(
        "epoch done: {} accepted, {} rejected, {} utxo(s) in pool",
        report.accepted.len(),
        report.rejected.len(),
        pool.len()
    );

    report
}

fn admit(
    position: usize,
    tx: &Transaction,
    tx_hash: TxHash,
    pool: &UtxoPool,
    spent: &HashSet<UtxoId>,
    verdicts: &SignatureVerdicts,
) -> Result<(), Rejection> {
    check_with(tx, pool, |index, record| {
        verdicts
            .get(position, index)
            .unwrap_or_else(|| verify_input(tx, index, record))
    })?;

    // Only an input-less transaction can hash to ids that exist or existed this epoch.
    if let Some((utxo, _)) = tx
        .output_utxos(tx_hash)
        .find(|(id, _)| pool.contains(id) || spent.contains(id))
    {
        return Err(Rejection::OutputCollision { utxo });
    }

    Ok(())
}

fn apply(tx: &Transaction, tx_hash: TxHash, pool: &mut UtxoPool, spent: &mut HashSet<UtxoId>) {
    for utxo in tx.claimed_utxos() {
        pool.remove(&utxo);
        spent.insert(utxo);
    }
    for (utxo, record) in tx.output_utxos(tx_hash) {
        pool.insert(utxo, record.clone());
    }
}
