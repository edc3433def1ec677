//! # Runtime Configuration
//!
//! Layering, lowest to highest priority:
//!
//! 1. Defaults of each subsystem config
//! 2. `.env` in the working directory (loaded into the environment by `main`)
//! 3. Environment variables
//! 4. CLI flags
//!
//! Everything is validated before any network work starts.

use shared_types::{parse_decimal, Address, BlockNumber};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use wa_02_withdrawal_ledger::LedgerConfig;
use wa_03_balance_scanner::ScannerConfig;
use wa_04_reconciliation::{ReconciliationConfig, Scale};

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required setting is absent.
    #[error("Missing required setting {var}")]
    Missing {
        /// Variable name.
        var: &'static str,
    },

    /// A setting could not be used.
    #[error("Invalid {var}={value:?}: {reason}")]
    Invalid {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl ConfigError {
    fn invalid(var: &'static str, value: &str, reason: impl ToString) -> Self {
        ConfigError::Invalid {
            var,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Default per-request RPC timeout.
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 30;

/// Full runtime configuration.
#[derive(Clone, Debug)]
pub struct AuditConfig {
    /// JSON-RPC endpoint (`PROVIDER_URL`).
    pub provider_url: Option<String>,
    /// Claim token (`TOKEN_ADDRESS`).
    pub token_address: Option<Address>,
    /// Deposit contract, the sender of claims (`DEPOSIT_CONTRACT_ADDRESS`).
    pub deposit_contract: Option<Address>,
    /// Directory holding the cache documents (`WA_DATA_DIR`).
    pub data_dir: PathBuf,
    /// Per-request RPC timeout (`WA_RPC_TIMEOUT_SECS`).
    pub rpc_timeout: Duration,
    /// Log filter (`WA_LOG_LEVEL`, falling back to `RUST_LOG`).
    pub log_level: String,
    /// JSON log lines (`WA_JSON_LOGS`).
    pub json_logs: bool,
    /// Withdrawal ledger.
    pub ledger: LedgerConfig,
    /// Balance scanner.
    pub scanner: ScannerConfig,
    /// Reconciliation.
    pub reconciliation: ReconciliationConfig,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            provider_url: None,
            token_address: None,
            deposit_contract: None,
            data_dir: PathBuf::from("."),
            rpc_timeout: Duration::from_secs(DEFAULT_RPC_TIMEOUT_SECS),
            log_level: "info".to_string(),
            json_logs: false,
            ledger: LedgerConfig::default(),
            scanner: ScannerConfig::default(),
            reconciliation: ReconciliationConfig::default(),
        }
    }
}

/// Values given on the command line. `None` keeps the lower layer.
#[derive(Clone, Debug, Default)]
pub struct CliOverrides {
    /// `--provider-url`
    pub provider_url: Option<String>,
    /// `--data-dir`
    pub data_dir: Option<PathBuf>,
    /// `--chunk-size`
    pub chunk_size: Option<u64>,
    /// `--batch-size`
    pub batch_size: Option<u64>,
    /// `--workers`
    pub worker_count: Option<usize>,
    /// `--activation-block`
    pub activation_block: Option<BlockNumber>,
    /// `--claims-start-block`
    pub claims_start_block: Option<BlockNumber>,
}

impl AuditConfig {
    /// Build from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        config.provider_url = get("PROVIDER_URL");
        if let Some(raw) = get("TOKEN_ADDRESS") {
            config.token_address = Some(parse_var("TOKEN_ADDRESS", &raw)?);
        }
        if let Some(raw) = get("DEPOSIT_CONTRACT_ADDRESS") {
            let address: Address = parse_var("DEPOSIT_CONTRACT_ADDRESS", &raw)?;
            config.deposit_contract = Some(address);
            config.reconciliation.claim_source = address;
        }
        if let Some(raw) = get("WA_DATA_DIR") {
            config.data_dir = PathBuf::from(raw);
        }
        if let Some(raw) = get("WA_RPC_TIMEOUT_SECS") {
            config.rpc_timeout = Duration::from_secs(parse_var("WA_RPC_TIMEOUT_SECS", &raw)?);
        }
        if let Some(raw) = get("WA_LOG_LEVEL").or_else(|| get("RUST_LOG")) {
            config.log_level = raw;
        }
        if let Some(raw) = get("WA_JSON_LOGS") {
            config.json_logs = parse_var("WA_JSON_LOGS", &raw)?;
        }
        if let Some(raw) = get("WA_CHUNK_SIZE") {
            config.ledger.chunk_size = parse_var("WA_CHUNK_SIZE", &raw)?;
        }
        if let Some(raw) = get("WA_BATCH_SIZE") {
            config.scanner.batch_size = parse_var("WA_BATCH_SIZE", &raw)?;
        }
        if let Some(raw) = get("WA_WORKER_COUNT") {
            config.scanner.worker_count = parse_var("WA_WORKER_COUNT", &raw)?;
        }
        if let Some(raw) = get("WA_ACTIVATION_BLOCK") {
            config.scanner.activation_block = parse_var("WA_ACTIVATION_BLOCK", &raw)?;
        }
        if let Some(raw) = get("WA_CLAIMS_START_BLOCK") {
            config.reconciliation.claims_start_block =
                Some(parse_var("WA_CLAIMS_START_BLOCK", &raw)?);
        }

        let numerator = get("WA_SCALE_NUMERATOR");
        let denominator = get("WA_SCALE_DENOMINATOR");
        if numerator.is_some() || denominator.is_some() {
            let default = Scale::default();
            let num = match &numerator {
                Some(raw) => parse_decimal(raw)
                    .map_err(|e| ConfigError::invalid("WA_SCALE_NUMERATOR", raw, e))?,
                None => default.numerator(),
            };
            let den = match &denominator {
                Some(raw) => parse_decimal(raw)
                    .map_err(|e| ConfigError::invalid("WA_SCALE_DENOMINATOR", raw, e))?,
                None => default.denominator(),
            };
            config.reconciliation.scale = Scale::new(num, den).map_err(|e| {
                ConfigError::invalid("WA_SCALE_DENOMINATOR", &den.to_string(), e)
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI flags on top and re-validate.
    pub fn apply_cli(&mut self, cli: &CliOverrides) -> Result<(), ConfigError> {
        if let Some(url) = &cli.provider_url {
            self.provider_url = Some(url.clone());
        }
        if let Some(dir) = &cli.data_dir {
            self.data_dir = dir.clone();
        }
        if let Some(size) = cli.chunk_size {
            self.ledger.chunk_size = size;
        }
        if let Some(size) = cli.batch_size {
            self.scanner.batch_size = size;
        }
        if let Some(workers) = cli.worker_count {
            self.scanner.worker_count = workers;
        }
        if let Some(block) = cli.activation_block {
            self.scanner.activation_block = block;
        }
        if let Some(block) = cli.claims_start_block {
            self.reconciliation.claims_start_block = Some(block);
        }
        self.validate()
    }

    /// Reject values no subsystem can run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ledger.chunk_size == 0 {
            return Err(ConfigError::invalid("WA_CHUNK_SIZE", "0", "must be positive"));
        }
        if self.scanner.batch_size == 0 {
            return Err(ConfigError::invalid("WA_BATCH_SIZE", "0", "must be positive"));
        }
        if self.scanner.worker_count == 0 {
            return Err(ConfigError::invalid("WA_WORKER_COUNT", "0", "must be positive"));
        }
        if self.rpc_timeout.is_zero() {
            return Err(ConfigError::invalid("WA_RPC_TIMEOUT_SECS", "0", "must be positive"));
        }
        Ok(())
    }

    /// RPC endpoint, required by network commands.
    pub fn require_provider(&self) -> Result<&str, ConfigError> {
        self.provider_url
            .as_deref()
            .ok_or(ConfigError::Missing { var: "PROVIDER_URL" })
    }

    /// Token contract, required by transfer and balance commands.
    pub fn require_token(&self) -> Result<Address, ConfigError> {
        self.token_address
            .ok_or(ConfigError::Missing { var: "TOKEN_ADDRESS" })
    }

    /// Deposit contract, required by `check`.
    pub fn require_deposit_contract(&self) -> Result<Address, ConfigError> {
        self.deposit_contract.ok_or(ConfigError::Missing {
            var: "DEPOSIT_CONTRACT_ADDRESS",
        })
    }
}

fn parse_var<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::invalid(var, raw, e))
}
