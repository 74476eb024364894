// src/ledger/verify.rs
use std::sync::Arc;

use log::{info, warn};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use super::pool::UtxoPool;
use super::transaction::Transaction;
use super::validation::verify_input;

/// Signature verdicts computed ahead of the sequential epoch pass.
///
/// `verdicts[c][i]` is the result for input `i` of candidate `c`, or `None` when the
/// claimed output did not exist in the starting pool. A verdict stays correct for the
/// whole epoch: records never change and the epoch refuses to recreate a spent id.
#[derive(Debug, Default)]
pub struct SignatureVerdicts {
    verdicts: Vec<Vec<Option<bool>>>,
}

impl SignatureVerdicts {
    /// No precomputed verdicts; every lookup falls through to inline verification.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Verify every input whose claimed output is in `pool`, on `thread_pool` if given,
    /// otherwise on rayon's global pool.
    pub fn precompute(
        candidates: &[Transaction],
        pool: &UtxoPool,
        thread_pool: Option<&ThreadPool>,
    ) -> Self {
        let run = || {
            candidates
                .par_iter()
                .map(|tx| verdicts_for(tx, pool))
                .collect::<Vec<_>>()
        };

        let verdicts = match thread_pool {
            Some(threads) => threads.install(run),
            None => run(),
        };

        SignatureVerdicts { verdicts }
    }

    pub fn get(&self, candidate: usize, input: usize) -> Option<bool> {
        self.verdicts
            .get(candidate)
            .and_then(|inputs| inputs.get(input))
            .copied()
            .flatten()
    }

    /// Number of inputs that were resolved ahead of time.
    pub fn resolved(&self) -> usize {
        self.verdicts
            .iter()
            .map(|inputs| inputs.iter().filter(|v| v.is_some()).count())
            .sum()
    }
}

/// Build the dedicated verification pool for `threads` workers, once per ledger.
///
/// `None` (or a failed build) means verification runs on rayon's global pool.
pub fn build_thread_pool(threads: Option<usize>) -> Option<Arc<ThreadPool>> {
    let n = threads?;
    match ThreadPoolBuilder::new()
        .num_threads(n)
        .thread_name(|i| format!("ledger-verify-{}", i))
        .build()
    {
        Ok(pool) => {
            info!("signature verification pool started with {} thread(s)", n);
            Some(Arc::new(pool))
        }
        Err(e) => {
            warn!("failed to build {}-thread verification pool, using global pool: {}", n, e);
            None
        }
    }
}

fn verdicts_for(tx: &Transaction, pool: &UtxoPool) -> Vec<Option<bool>> {
    tx.claimed_utxos()
        .enumerate()
        .map(|(index, utxo)| pool.get(&utxo).map(|record| verify_input(tx, index, record)))
        .collect()
}
