//! Scenario Builder - Configuration to Validated Entities
//!
//! Turns a parsed `ScenarioConfig` into users with their orders and
//! solvers with their positions. Domains and prices are tracked in
//! registries scoped to one build: the first time a domain name or a
//! ticker is seen fixes its id or price. Any invalid token, pool or
//! position stops the build.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::domain::pool::{Liquidity, Pool};
use crate::domain::token::{DomainRegistry, PriceTable, Token};
use crate::usecases::auction_engine::Scenario;
use crate::usecases::solver::Solver;
use crate::usecases::user::User;

use super::{PositionConfig, ScenarioConfig, TokenConfig};

/// Registries shared by every token built for one scenario.
#[derive(Debug, Default)]
struct Builder {
  domains: DomainRegistry,
  prices: PriceTable,
}

impl Builder {
  fn token(&mut self, cfg: &TokenConfig) -> Result<Token> {
    let token = Token::new(
      cfg.ticker.as_str(),
      cfg.usd,
      cfg.amount,
      self.domains.resolve(&cfg.domain),
    );
    token
      .validate(&mut self.prices)
      .with_context(|| format!("Invalid token {}", token.label()))?;
    Ok(token)
  }

  fn position(&mut self, cfg: &PositionConfig) -> Result<Liquidity> {
    let pool = Pool::new(
      self.token(&cfg.pool.pair[0])?,
      self.token(&cfg.pool.pair[1])?,
      self.domains.resolve(&cfg.pool.domain),
    );
    pool.validate().context("Invalid pool")?;

    let position = Liquidity::new(self.token(&cfg.pair[0])?, self.token(&cfg.pair[1])?, pool);
    position
      .validate()
      .with_context(|| format!("Invalid position {}", position.describe()))?;
    Ok(position)
  }
}

/// Build validated users, orders and solvers from configuration.
///
/// Orders are created here, so their timeouts start counting now.
///
/// # Errors
/// Fails on the first invalid token, pool, position or order, or on an
/// order that names an unknown user.
pub fn build_scenario(config: &ScenarioConfig) -> Result<Scenario> {
  let mut builder = Builder::default();

  let mut solvers = Vec::with_capacity(config.solvers.len());
  for cfg in &config.solvers {
    let positions = cfg
      .positions
      .iter()
      .enumerate()
      .map(|(i, p)| {
        builder
          .position(p)
          .with_context(|| format!("Solver {} position {}", cfg.name, i))
      })
      .collect::<Result<Vec<_>>>()?;
    debug!(solver = %cfg.name, positions = positions.len(), "Solver built");
    solvers.push(Solver::new(cfg.name.as_str(), positions));
  }

  let mut users = Vec::with_capacity(config.users.len());
  let mut by_name = HashMap::with_capacity(config.users.len());
  for cfg in &config.users {
    let tokens = cfg
      .tokens
      .iter()
      .map(|t| builder.token(t))
      .collect::<Result<Vec<_>>>()
      .with_context(|| format!("User {}", cfg.name))?;
    by_name.insert(cfg.name.as_str(), users.len());
    users.push(User::new(cfg.name.as_str(), tokens));
  }

  for (i, cfg) in config.orders.iter().enumerate() {
    let &idx = by_name
      .get(cfg.user.as_str())
      .with_context(|| format!("Order {} references unknown user {}", i, cfg.user))?;
    let origin = builder.token(&cfg.origin).with_context(|| format!("Order {i}"))?;
    let target = builder.token(&cfg.target).with_context(|| format!("Order {i}"))?;
    users[idx]
      .create_order(origin, target, Duration::from_millis(cfg.timeout_ms))
      .with_context(|| format!("Order {i}"))?;
  }

  let scenario = Scenario { users, solvers };
  info!(
    users = scenario.users.len(),
    solvers = scenario.solvers.len(),
    orders = scenario.order_count(),
    domains = builder.domains.len(),
    tickers = builder.prices.len(),
    "Scenario built"
  );
  Ok(scenario)
}
