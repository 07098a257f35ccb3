//! Shared fixtures for integration tests.

#![allow(dead_code)]

use intent_auction::domain::pool::{Liquidity, Pool};
use intent_auction::domain::token::{Domain, DomainRegistry, Token};

/// `ethereum` and `arbitrum`, resolved from one registry.
pub fn domains() -> (Domain, Domain) {
    let mut reg = DomainRegistry::new();
    (reg.resolve("ethereum"), reg.resolve("arbitrum"))
}

pub fn usdc(amount: u64, domain: &Domain) -> Token {
    Token::new("USDC", 1, amount, domain.clone())
}

pub fn eth(amount: u64, domain: &Domain) -> Token {
    Token::new("ETH", 2_000, amount, domain.clone())
}

pub fn dai(amount: u64, domain: &Domain) -> Token {
    Token::new("DAI", 1, amount, domain.clone())
}

/// Position `a -> b` in a pool ten times its size on `a`'s domain.
pub fn position(a: Token, b: Token) -> Liquidity {
    let domain = a.domain.clone();
    let pool = Pool::new(
        Token { amount: a.amount * 10, ..a.clone() },
        Token { amount: b.amount * 10, ..b.clone() },
        domain,
    );
    Liquidity::new(a, b, pool)
}
