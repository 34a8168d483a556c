//! Server configuration, read from command-line flags or `LIBRARIAN_*`
//! environment variables.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;

use crate::domain::penalty_policy::{
    LendingPolicy, LOAN_PERIOD_DAYS, MAX_CONCURRENT_LOANS, MAX_POLICY_DAYS, PENALTY_DAYS,
};
use crate::storage::sqlite::connection::DEFAULT_DATABASE_URL;
use crate::storage::PoolSettings;

#[derive(Debug, Clone, Parser)]
#[command(name = "librarian")]
#[command(about = "Library lending service: books, members, borrowing and returns")]
pub struct ServerConfig {
    #[arg(long, env = "LIBRARIAN_DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    pub database_url: String,

    #[arg(long, env = "LIBRARIAN_BIND_ADDR", default_value = "127.0.0.1:3000")]
    pub bind_addr: SocketAddr,

    #[arg(long, env = "LIBRARIAN_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,

    #[arg(long, env = "LIBRARIAN_ACQUIRE_TIMEOUT_SECS", default_value_t = 5)]
    pub acquire_timeout_secs: u64,

    /// Seconds between background penalty sweeps, 0 disables the task
    #[arg(long, env = "LIBRARIAN_PENALTY_SWEEP_INTERVAL_SECS", default_value_t = 0)]
    pub penalty_sweep_interval_secs: u64,

    /// Allowed CORS origin; no CORS layer is installed when unset
    #[arg(long, env = "LIBRARIAN_CORS_ORIGIN")]
    pub cors_origin: Option<String>,

    #[arg(long, env = "LIBRARIAN_LOG_JSON", help = "Emit logs as JSON")]
    pub log_json: bool,

    #[arg(long, short, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, env = "LIBRARIAN_MAX_CONCURRENT_LOANS", default_value_t = MAX_CONCURRENT_LOANS)]
    pub max_concurrent_loans: u32,

    #[arg(long, env = "LIBRARIAN_LOAN_PERIOD_DAYS", default_value_t = LOAN_PERIOD_DAYS)]
    pub loan_period_days: i64,

    #[arg(long, env = "LIBRARIAN_PENALTY_DAYS", default_value_t = PENALTY_DAYS)]
    pub penalty_days: i64,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.database_url.trim().is_empty() {
            bail!("database_url must not be empty");
        }
        if self.max_connections == 0 {
            bail!("max_connections must be at least 1");
        }
        if self.max_concurrent_loans == 0 {
            bail!("max_concurrent_loans must be at least 1");
        }
        if !(0..=MAX_POLICY_DAYS).contains(&self.loan_period_days) {
            bail!(
                "loan_period_days must be between 0 and {} (got {})",
                MAX_POLICY_DAYS,
                self.loan_period_days
            );
        }
        if !(0..=MAX_POLICY_DAYS).contains(&self.penalty_days) {
            bail!("penalty_days must be between 0 and {} (got {})", MAX_POLICY_DAYS, self.penalty_days);
        }
        Ok(())
    }

    pub fn lending_policy(&self) -> LendingPolicy {
        LendingPolicy {
            max_concurrent_loans: self.max_concurrent_loans,
            loan_period_days: self.loan_period_days,
            penalty_days: self.penalty_days,
        }
    }

    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_connections: self.max_connections,
            acquire_timeout: Duration::from_secs(self.acquire_timeout_secs),
        }
    }

    pub fn penalty_sweep_interval(&self) -> Option<Duration> {
        (self.penalty_sweep_interval_secs > 0).then(|| Duration::from_secs(self.penalty_sweep_interval_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ServerConfig {
        let mut argv = vec!["librarian"];
        argv.extend_from_slice(args);
        ServerConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults_match_the_lending_constants() {
        let config = parse(&[]);

        assert_eq!(config.lending_policy(), LendingPolicy::default());
        assert_eq!(config.pool_settings().max_connections, 5);
        assert_eq!(config.pool_settings().acquire_timeout, Duration::from_secs(5));
        assert!(config.penalty_sweep_interval().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = parse(&[
            "--loan-period-days",
            "1",
            "--penalty-days",
            "10",
            "--max-concurrent-loans",
            "4",
            "--penalty-sweep-interval-secs",
            "60",
        ]);

        let policy = config.lending_policy();
        assert_eq!(policy.loan_period_days, 1);
        assert_eq!(policy.penalty_days, 10);
        assert_eq!(policy.max_concurrent_loans, 4);
        assert_eq!(config.penalty_sweep_interval(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(parse(&["--max-connections", "0"]).validate().is_err());
        assert!(parse(&["--max-concurrent-loans", "0"]).validate().is_err());
        assert!(parse(&["--penalty-days=-1"]).validate().is_err());
        assert!(parse(&["--loan-period-days=-2"]).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_day_counts() {
        assert!(parse(&["--penalty-days", "9999999999999999"]).validate().is_err());
        assert!(parse(&["--loan-period-days", "36501"]).validate().is_err());
        assert!(parse(&["--penalty-days", "36500", "--loan-period-days", "36500"]).validate().is_ok());
    }
}
