//! Configuration Module - TOML Scenario Description
//!
//! A scenario file names the run, the users with their balances, the
//! solvers with their liquidity positions, and the orders to post.
//! Tokens are spelled out inline everywhere they appear; the builder
//! checks that every occurrence of a ticker carries the same price.

pub mod loader;
pub mod scenario;

pub use loader::{load_config, parse_config};
pub use scenario::build_scenario;

use serde::Deserialize;

/// Top-level scenario configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioConfig {
  /// Run identity and timing.
  pub run: RunConfig,
  /// Metrics collection.
  #[serde(default)]
  pub metrics: MetricsConfig,
  /// File reporting.
  #[serde(default)]
  pub report: ReportConfig,
  /// Order owners.
  pub users: Vec<UserConfig>,
  /// Liquidity providers.
  #[serde(default)]
  pub solvers: Vec<SolverConfig>,
  /// Orders to post, in order per user.
  #[serde(default)]
  pub orders: Vec<OrderConfig>,
}

/// Run identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
  /// Human-readable run name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Pause between starting solvers and posting the first order.
  #[serde(default = "default_settle_delay")]
  pub settle_delay_ms: u64,
}

/// An amount of an asset on a named domain.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenConfig {
  /// Asset ticker.
  pub ticker: String,
  /// USD price per unit.
  pub usd: u64,
  /// Quantity.
  pub amount: u64,
  /// Domain name.
  pub domain: String,
}

/// An order owner and its balances.
#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
  pub name: String,
  #[serde(default)]
  pub tokens: Vec<TokenConfig>,
}

/// A solver and the positions it routes through.
#[derive(Debug, Clone, Deserialize)]
pub struct SolverConfig {
  pub name: String,
  #[serde(default)]
  pub positions: Vec<PositionConfig>,
}

/// A solver's slice of a pool, directed `pair[0] -> pair[1]`.
#[derive(Debug, Clone, Deserialize)]
pub struct PositionConfig {
  pub pair: [TokenConfig; 2],
  pub pool: PoolConfig,
}

/// A two-sided pool on one domain.
#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
  pub pair: [TokenConfig; 2],
  pub domain: String,
}

/// An order to post on behalf of a user.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderConfig {
  /// Owning user's name.
  pub user: String,
  /// Token offered.
  pub origin: TokenConfig,
  /// Token wanted.
  pub target: TokenConfig,
  /// Bid window; 0 never expires.
  #[serde(default)]
  pub timeout_ms: u64,
}

/// Metrics configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
  /// Collect Prometheus metrics.
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Metric name prefix.
  #[serde(default = "default_namespace")]
  pub namespace: String,
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      namespace: default_namespace(),
    }
  }
}

/// Report configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
  /// Write outcomes and metrics to `dir`.
  #[serde(default)]
  pub enabled: bool,
  /// Output directory.
  #[serde(default = "default_report_dir")]
  pub dir: String,
}

impl Default for ReportConfig {
  fn default() -> Self {
    Self {
      enabled: false,
      dir: default_report_dir(),
    }
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

fn default_settle_delay() -> u64 {
  10
}

fn default_true() -> bool {
  true
}

fn default_namespace() -> String {
  "intent_auction".to_string()
}

fn default_report_dir() -> String {
  "data".to_string()
}
