pub mod epoch;
pub mod pool;
pub mod transaction;
pub mod validation;
pub mod verify;

use std::sync::Arc;

use log::info;
use rayon::ThreadPool;

use crate::config::LedgerConfig;
use epoch::{run_epoch_on, EpochReport};
use pool::UtxoPool;
use transaction::Transaction;
use validation::is_valid;
use verify::build_thread_pool;

/// Public ledger holding the current UTXO pool between epochs.
///
/// Owns its pool; pass `pool.clone()` to keep an untouched copy on the caller's side.
#[derive(Debug, Clone)]
pub struct Ledger {
    pool: UtxoPool,
    config: LedgerConfig,
    /// Dedicated verification workers, built once from `verification_threads`.
    verifiers: Option<Arc<ThreadPool>>,
}

impl Ledger {
    pub fn new(pool: UtxoPool) -> Self {
        Self::with_config(pool, LedgerConfig::default())
    }

    /// Open a ledger over `pool`. Config errors are logged and the offending
    /// setting falls back to its default.
    pub fn with_config(pool: UtxoPool, config: LedgerConfig) -> Self {
        config.validate().print_summary();
        let config = config.sanitized();
        let verifiers = if config.parallel_verification {
            build_thread_pool(config.verification_threads)
        } else {
            None
        };
        info!(
            "ledger opened with {} utxo(s), parallel verification {}",
            pool.len(),
            if config.parallel_verification { "on" } else { "off" }
        );
        Ledger {
            pool,
            config,
            verifiers,
        }
    }

    pub fn is_valid_tx(&self, tx: &Transaction) -> bool {
        is_valid(tx, &self.pool)
    }

    /// Handle one epoch of proposed transactions and return the accepted ones.
    pub fn handle_txs(&mut self, candidates: &[Transaction]) -> Vec<Transaction> {
        self.handle_txs_with_report(candidates).accepted
    }

    pub fn handle_txs_with_report(&mut self, candidates: &[Transaction]) -> EpochReport {
        run_epoch_on(
            candidates,
            &mut self.pool,
            &self.config,
            self.verifiers.as_deref(),
        )
    }

    pub fn pool(&self) -> &UtxoPool {
        &self.pool
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn into_pool(self) -> UtxoPool {
        self.pool
    }
}
