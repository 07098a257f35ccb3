//! Pools and liquidity positions.
//!
//! A `Pool` is a two-sided venue on one domain whose volume and price
//! ratios are derived once at construction. A `Liquidity` position is a
//! solver's slice of a pool and doubles as a directed edge
//! `token_a -> token_b` in the solver's routing graph.

use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use super::token::{Domain, Token};

/// Two-sided liquidity venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub token_a: Token,
    pub token_b: Token,
    /// `amount_a / amount_b` at construction.
    pub volume_ratio: f64,
    /// `value_usd_a / value_usd_b` at construction.
    pub price_ratio: f64,
    pub domain: Domain,
}

impl Pool {
    /// Build a pool, deriving both ratios from the tokens.
    pub fn new(token_a: Token, token_b: Token, domain: Domain) -> Self {
        let volume_ratio = ratio(token_a.amount, token_b.amount);
        let price_ratio = ratio(token_a.value_usd, token_b.value_usd);
        Self {
            token_a,
            token_b,
            volume_ratio,
            price_ratio,
            domain,
        }
    }

    /// Check pairing, domain membership and that the stored ratios still hold exactly.
    ///
    /// # Errors
    /// Returns the first violated invariant.
    #[allow(clippy::float_cmp)]
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.token_a.matches(&self.token_b) {
            return Err(ValidationError::SameAssetPool {
                ticker: self.token_a.ticker.clone(),
            });
        }
        for token in [&self.token_a, &self.token_b] {
            if token.domain != self.domain {
                return Err(ValidationError::TokenOutsidePoolDomain {
                    ticker: token.ticker.clone(),
                    got: token.domain.name.clone(),
                    want: self.domain.name.clone(),
                });
            }
        }

        let vr = ratio(self.token_a.amount, self.token_b.amount);
        if vr != self.volume_ratio {
            return Err(ValidationError::VolumeRatioMismatch {
                got: vr,
                want: self.volume_ratio,
            });
        }

        let pr = ratio(self.token_a.value_usd, self.token_b.value_usd);
        if pr != self.price_ratio {
            return Err(ValidationError::PriceRatioMismatch {
                got: pr,
                want: self.price_ratio,
            });
        }
        Ok(())
    }
}

#[allow(clippy::cast_precision_loss)]
fn ratio(numerator: u64, denominator: u64) -> f64 {
    numerator as f64 / denominator as f64
}

/// A solver's position in a pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Liquidity {
    pub token_a: Token,
    pub token_b: Token,
    pub pool: Pool,
}

impl Liquidity {
    pub fn new(token_a: Token, token_b: Token, pool: Pool) -> Self {
        Self {
            token_a,
            token_b,
            pool,
        }
    }

    /// Validate the pool, then the position against it.
    ///
    /// Both sides must be worth the same in USD, each side must match
    /// the pool's token on that side, and neither side may exceed the
    /// pool's amount or price.
    ///
    /// # Errors
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.pool.validate()?;

        let (value_a, value_b) = (self.token_a.notional(), self.token_b.notional());
        if value_a != value_b {
            return Err(ValidationError::UnequalPositionValue { value_a, value_b });
        }

        check_side('A', &self.token_a, &self.pool.token_a)?;
        check_side('B', &self.token_b, &self.pool.token_b)
    }

    /// `[A@d -> B@d]` rendering for logs.
    pub fn describe(&self) -> String {
        format!("[{} -> {}]", self.token_a.label(), self.token_b.label())
    }
}

fn check_side(side: char, held: &Token, pooled: &Token) -> Result<(), ValidationError> {
    if !held.matches(pooled) {
        return Err(ValidationError::PositionTokenMismatch {
            side,
            got: held.ticker.clone(),
            want: pooled.ticker.clone(),
        });
    }
    if held.amount > pooled.amount {
        return Err(ValidationError::PositionExceedsPoolVolume {
            ticker: held.ticker.clone(),
            got: held.amount,
            pool: pooled.amount,
        });
    }
    if held.value_usd > pooled.value_usd {
        return Err(ValidationError::PositionExceedsPoolValue {
            ticker: held.ticker.clone(),
            got: held.value_usd,
            pool: pooled.value_usd,
        });
    }
    Ok(())
}
