// src/config.rs
// Ledger configuration loaded from the environment

use std::env;

use anyhow::{Context, Result};
use log::{error, info, warn};

use crate::error::LedgerError;

const PARALLEL_VERIFY_VAR: &str = "LEDGER_PARALLEL_VERIFY";
const VERIFY_THREADS_VAR: &str = "LEDGER_VERIFY_THREADS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Verify signatures for all candidates in parallel before the sequential pass.
    pub parallel_verification: bool,
    /// Size of a dedicated verification thread pool. `None` uses rayon's global pool.
    pub verification_threads: Option<usize>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            parallel_verification: true,
            verification_threads: None,
        }
    }
}

impl LedgerConfig {
    /// Sequential verification only.
    pub fn sequential() -> Self {
        Self {
            parallel_verification: false,
            verification_threads: None,
        }
    }

    /// Load from `LEDGER_PARALLEL_VERIFY` / `LEDGER_VERIFY_THREADS`, reading `.env` if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(
            env::var(PARALLEL_VERIFY_VAR).ok().as_deref(),
            env::var(VERIFY_THREADS_VAR).ok().as_deref(),
        )
    }

    fn from_vars(parallel: Option<&str>, threads: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = parallel {
            config.parallel_verification = parse_bool(PARALLEL_VERIFY_VAR, raw)
                .with_context(|| format!("failed to read {}", PARALLEL_VERIFY_VAR))?;
        }

        if let Some(raw) = threads {
            let n = raw
                .trim()
                .parse::<usize>()
                .map_err(|_| LedgerError::InvalidConfig {
                    key: VERIFY_THREADS_VAR,
                    value: raw.to_string(),
                })
                .with_context(|| format!("failed to read {}", VERIFY_THREADS_VAR))?;
            config.verification_threads = Some(n);
        }

        Ok(config)
    }

    pub fn validate(&self) -> ConfigValidation {
        let mut validation = ConfigValidation::new();

        match self.verification_threads {
            Some(0) => validation.add_error(format!("{} must be at least 1", VERIFY_THREADS_VAR)),
            Some(n) => {
                let cpus = num_cpus::get();
                if n > cpus {
                    validation.add_warning(format!(
                        "{} is {} but only {} CPU(s) are available",
                        VERIFY_THREADS_VAR, n, cpus
                    ));
                }
                if !self.parallel_verification {
                    validation.add_warning(format!(
                        "{} is set but parallel verification is disabled - it will be ignored",
                        VERIFY_THREADS_VAR
                    ));
                }
            }
            None => {}
        }

        validation
    }

    /// Replace settings that [`validate`](Self::validate) reports as errors with their defaults.
    pub fn sanitized(mut self) -> Self {
        if self.verification_threads == Some(0) {
            warn!("{} is 0, using rayon's global pool", VERIFY_THREADS_VAR);
            self.verification_threads = None;
        }
        self
    }
}

fn parse_bool(key: &'static str, raw: &str) -> std::result::Result<bool, LedgerError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(LedgerError::InvalidConfig {
            key,
            value: raw.to_string(),
        }),
    }
}

/// Validation result for configuration checks
#[derive(Debug)]
pub struct ConfigValidation {
    pub valid: bool,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ConfigValidation {
    fn new() -> Self {
        Self {
            valid: true,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn add_warning(&mut self, msg: String) {
        self.warnings.push(msg);
    }

    fn add_error(&mut self, msg: String) {
        self.errors.push(msg);
        self.valid = false;
    }

    pub fn print_summary(&self) {
        for w in &self.warnings {
            warn!("ledger config: {}", w);
        }
        for e in &self.errors {
            error!("ledger config: {}", e);
        }
        if self.valid && self.warnings.is_empty() {
            info!("✅ Ledger configuration validation passed");
        }
    }
}
