//! Error and rejection types.

use thiserror::Error;

use crate::ledger::transaction::{Amount, UtxoId};

/// Why a candidate transaction was not accepted.
///
/// A rejection is a classification of the candidate, not a fault in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("input #{index} claims {utxo}, which is not in the pool")]
    MissingInput { index: usize, utxo: UtxoId },

    #[error("input #{index} is not signed by the owner of the claimed output")]
    InvalidSignature { index: usize },

    #[error("input #{index} claims {utxo} a second time")]
    DuplicateInput { index: usize, utxo: UtxoId },

    #[error("output #{index} has negative value {value}")]
    NegativeOutput { index: usize, value: Amount },

    #[error("insufficient input value: inputs={inputs}, outputs={outputs}")]
    InsufficientValue { inputs: i128, outputs: i128 },

    #[error("output {utxo} already exists in the pool")]
    OutputCollision { utxo: UtxoId },
}

/// Recoverable failures surfaced to the host process.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid transaction hash: {0}")]
    InvalidHash(String),

    #[error("duplicate utxo in pool snapshot: {0}")]
    DuplicateUtxo(UtxoId),

    #[error("invalid configuration value for {key}: {value}")]
    InvalidConfig { key: &'static str, value: String },
}
