//! Domains, tokens and the registries that keep them consistent.
//!
//! A token is an amount of an asset priced in USD on one domain. Tokens
//! compare at three levels:
//! - `partial_match`: same ticker and price (same asset, any venue)
//! - `matches`: partial match on the same domain (same asset instance)
//! - `equals`: match with the same amount
//!
//! `PriceTable` and `DomainRegistry` replace process-wide maps: they are
//! created once per run by whoever builds tokens and passed explicitly.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use super::ids::DomainId;

/// A settlement venue. Identity is name and id together.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Domain {
    /// Human-readable venue name.
    pub name: String,
    /// Stable identifier assigned by the `DomainRegistry`.
    pub id: DomainId,
}

impl Domain {
    pub fn new(name: impl Into<String>, id: DomainId) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// An amount of an asset on a domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    /// Asset ticker, e.g. `USDC`.
    pub ticker: String,
    /// USD price per unit.
    pub value_usd: u64,
    /// Quantity held.
    pub amount: u64,
    /// Venue the token lives on.
    pub domain: Domain,
}

impl Token {
    pub fn new(ticker: impl Into<String>, value_usd: u64, amount: u64, domain: Domain) -> Self {
        Self {
            ticker: ticker.into(),
            value_usd,
            amount,
            domain,
        }
    }

    /// Same asset, possibly on another domain.
    pub fn partial_match(&self, other: &Self) -> bool {
        self.ticker == other.ticker && self.value_usd == other.value_usd
    }

    /// Same asset on the same domain.
    pub fn matches(&self, other: &Self) -> bool {
        self.partial_match(other) && self.domain == other.domain
    }

    /// Same asset instance and the same amount.
    pub fn equals(&self, other: &Self) -> bool {
        self.matches(other) && self.amount == other.amount
    }

    /// Total USD value (`amount * value_usd`), widened so it cannot overflow.
    pub fn notional(&self) -> u128 {
        u128::from(self.amount) * u128::from(self.value_usd)
    }

    /// Check the token's price against the run-wide price table.
    ///
    /// The first token seen for a ticker fixes its price; later tokens
    /// with the same ticker must agree.
    ///
    /// # Errors
    /// Returns `ValidationError::PriceMismatch` when the ticker is already
    /// priced differently.
    pub fn validate(&self, prices: &mut PriceTable) -> Result<(), ValidationError> {
        prices.check_or_register(&self.ticker, self.value_usd)
    }

    /// `ticker@domain` label used in logs and reports.
    pub fn label(&self) -> String {
        format!("{}@{}", self.ticker, self.domain.name)
    }
}

/// Ticker to USD price, first write wins for the lifetime of the table.
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    prices: HashMap<String, u64>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the price for an unseen ticker, or check it against the recorded one.
    ///
    /// # Errors
    /// Returns `ValidationError::PriceMismatch` if the ticker has another price.
    pub fn check_or_register(&mut self, ticker: &str, value_usd: u64) -> Result<(), ValidationError> {
        match self.prices.get(ticker) {
            None => {
                self.prices.insert(ticker.to_string(), value_usd);
                Ok(())
            }
            Some(&want) if want == value_usd => Ok(()),
            Some(&want) => Err(ValidationError::PriceMismatch {
                ticker: ticker.to_string(),
                got: value_usd,
                want,
            }),
        }
    }

    pub fn price_of(&self, ticker: &str) -> Option<u64> {
        self.prices.get(ticker).copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

/// Domain name to stable identifier, assigned on first use.
#[derive(Debug, Clone, Default)]
pub struct DomainRegistry {
    domains: HashMap<String, DomainId>,
}

impl DomainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a domain by name, minting an id the first time the name is seen.
    pub fn resolve(&mut self, name: &str) -> Domain {
        let id = *self
            .domains
            .entry(name.to_string())
            .or_insert_with(DomainId::new);
        Domain::new(name, id)
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}
