//! Configuration Loader - File Loading and Validation
//!
//! Handles loading a scenario file, checking the parts serde cannot
//! express, and reporting misconfiguration with the offending entry.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::{ScenarioConfig, TokenConfig};

/// Load and validate a scenario from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: impl AsRef<Path>) -> Result<ScenarioConfig> {
  let path = path.as_ref();

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;

  let config = parse_config(&content)
    .with_context(|| format!("Invalid scenario file: {}", path.display()))?;

  info!(
    run = %config.run.name,
    users = config.users.len(),
    solvers = config.solvers.len(),
    orders = config.orders.len(),
    "Scenario loaded successfully"
  );

  Ok(config)
}

/// Parse and validate a scenario from TOML text.
///
/// # Errors
/// Fails on malformed TOML or a violated validation rule.
pub fn parse_config(content: &str) -> Result<ScenarioConfig> {
  let config: ScenarioConfig =
    toml::from_str(content).context("Failed to parse scenario TOML")?;
  validate_config(&config)?;
  Ok(config)
}

/// Validate names, references and token fields.
fn validate_config(config: &ScenarioConfig) -> Result<()> {
  anyhow::ensure!(!config.run.name.is_empty(), "Run name must not be empty");
  anyhow::ensure!(
    !config.metrics.namespace.is_empty(),
    "Metrics namespace must not be empty"
  );

  // Users
  anyhow::ensure!(
    !config.users.is_empty(),
    "At least one user must be configured"
  );
  let mut user_names = HashSet::new();
  for (i, user) in config.users.iter().enumerate() {
    anyhow::ensure!(!user.name.is_empty(), "User {} has an empty name", i);
    anyhow::ensure!(
      user_names.insert(user.name.as_str()),
      "User name {} is configured twice",
      user.name
    );
    for token in &user.tokens {
      validate_token(token, &format!("user {}", user.name))?;
    }
  }

  // Solvers
  for (i, solver) in config.solvers.iter().enumerate() {
    anyhow::ensure!(!solver.name.is_empty(), "Solver {} has an empty name", i);
    for (j, position) in solver.positions.iter().enumerate() {
      let at = format!("solver {} position {}", solver.name, j);
      anyhow::ensure!(
        !position.pool.domain.is_empty(),
        "{} has a pool with an empty domain",
        at
      );
      for token in position.pair.iter().chain(&position.pool.pair) {
        validate_token(token, &at)?;
      }
    }
  }

  // Orders
  for (i, order) in config.orders.iter().enumerate() {
    anyhow::ensure!(
      user_names.contains(order.user.as_str()),
      "Order {} references unknown user {}",
      i,
      order.user
    );
    let at = format!("order {i}");
    validate_token(&order.origin, &at)?;
    validate_token(&order.target, &at)?;
  }

  Ok(())
}

fn validate_token(token: &TokenConfig, at: &str) -> Result<()> {
  anyhow::ensure!(!token.ticker.is_empty(), "{} has a token with an empty ticker", at);
  anyhow::ensure!(
    !token.domain.is_empty(),
    "{}: token {} has an empty domain",
    at,
    token.ticker
  );
  anyhow::ensure!(
    token.usd > 0,
    "{}: token {} must have a positive USD price",
    at,
    token.ticker
  );
  anyhow::ensure!(
    token.amount > 0,
    "{}: token {} must have a positive amount",
    at,
    token.ticker
  );
  Ok(())
}
