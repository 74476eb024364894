//! UTXO ledger core.
//!
//! Validates batches of proposed transactions against a pool of unspent
//! transaction outputs and commits the mutually valid subset, one epoch at
//! a time.
//!
//! ```ignore
//! use utxo_ledger::{process_epoch, UtxoPool};
//!
//! let mut pool: UtxoPool = genesis_outputs().into_iter().collect();
//! let accepted = process_epoch(&candidates, &mut pool);
//! ```

pub mod config;
pub mod crypto;
pub mod error;
pub mod ledger;

pub use config::LedgerConfig;
pub use error::{LedgerError, Rejection};
pub use ledger::epoch::{process_epoch, run_epoch, run_epoch_on, EpochReport, Rejected};
pub use ledger::pool::UtxoPool;
pub use ledger::transaction::{Amount, Input, MAX_ENTRIES, OutputRecord, Transaction, TxHash, UtxoId};
pub use ledger::validation::{check_transaction, is_valid};
pub use ledger::Ledger;

/// Install `env_logger` as the `log` backend. Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
