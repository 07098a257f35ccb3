//! Route search over a solver's liquidity graph.
//!
//! Nodes are `(ticker, domain)` pairs. Two kinds of edges leave a node:
//! - swap edges: every position `A -> B` links A's node to B's node
//! - bridge edges: from any node to the `token_b` of a position whose
//!   `token_a` is the same asset on another domain; moving an asset
//!   across domains needs no pool
//!
//! The search is breadth-first from the order's origin, so the first
//! route found has the fewest hops, not the best price. Each node is
//! expanded once.
//!
//! Value floor: hops out of a node are skipped when the node's USD
//! notional is below the order's origin or target notional. Bridge
//! hops compare the bridged position's `token_a` instead and require it
//! to be strictly larger. The floor looks at the order's values, not at
//! what is left to route after each hop.

use std::collections::{HashMap, HashSet, VecDeque};

use super::pool::Liquidity;
use super::token::{Domain, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct NodeKey<'a> {
    ticker: &'a str,
    domain: &'a Domain,
}

impl<'a> NodeKey<'a> {
    fn of(token: &'a Token) -> Self {
        Self {
            ticker: &token.ticker,
            domain: &token.domain,
        }
    }
}

/// One hop of a token-level route.
#[derive(Debug, Clone, Copy)]
struct Leg<'a> {
    from: &'a Token,
    to: &'a Token,
}

struct Frontier<'a> {
    token: &'a Token,
    path: Vec<Leg<'a>>,
}

impl<'a> Frontier<'a> {
    fn extend(&self, from: &'a Token, to: &'a Token) -> Self {
        let mut path = Vec::with_capacity(self.path.len() + 1);
        path.extend_from_slice(&self.path);
        path.push(Leg { from, to });
        Self { token: to, path }
    }
}

/// Find a route from `origin` to `target` through `positions`.
///
/// Returns the positions to trade through, in order, or `None` when no
/// route exists (including the degenerate case where the origin already
/// is the target).
pub fn find_route(origin: &Token, target: &Token, positions: &[Liquidity]) -> Option<Vec<Liquidity>> {
    let legs = search(origin, target, positions)?;
    legs.iter()
        .map(|leg| {
            positions
                .iter()
                .find(|p| p.token_a.matches(leg.from) && p.token_b.matches(leg.to))
                .cloned()
        })
        .collect()
}

fn search<'a>(origin: &'a Token, target: &Token, positions: &'a [Liquidity]) -> Option<Vec<Leg<'a>>> {
    let mut graph: HashMap<NodeKey<'a>, Vec<&'a Token>> = HashMap::new();
    for p in positions {
        graph.entry(NodeKey::of(&p.token_a)).or_default().push(&p.token_b);
    }

    let origin_value = origin.notional();
    let target_value = target.notional();

    let mut visited: HashSet<NodeKey<'a>> = HashSet::new();
    let mut queue = VecDeque::from([Frontier {
        token: origin,
        path: Vec::new(),
    }]);

    while let Some(elem) = queue.pop_front() {
        if elem.token.matches(target) {
            return (!elem.path.is_empty()).then_some(elem.path);
        }
        if !visited.insert(NodeKey::of(elem.token)) {
            continue;
        }

        let value = elem.token.notional();
        if let Some(neighbours) = graph.get(&NodeKey::of(elem.token)) {
            for &next in neighbours {
                if visited.contains(&NodeKey::of(next)) {
                    continue;
                }
                if origin_value > value || target_value > value {
                    continue;
                }
                queue.push_back(elem.extend(elem.token, next));
            }
        }

        for p in positions {
            let bridged = &p.token_a;
            if !elem.token.partial_match(bridged) || elem.token.domain == bridged.domain {
                continue;
            }
            if visited.contains(&NodeKey::of(bridged)) {
                continue;
            }
            let bridged_value = bridged.notional();
            if origin_value >= bridged_value || target_value >= bridged_value {
                continue;
            }
            queue.push_back(elem.extend(bridged, &p.token_b));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pool::Pool;
    use crate::domain::token::DomainRegistry;

    fn position(a: &Token, b: &Token) -> Liquidity {
        let domain = a.domain.clone();
        let pool = Pool::new(
            Token { amount: a.amount * 10, ..a.clone() },
            Token { amount: b.amount * 10, ..b.clone() },
            domain,
        );
        Liquidity::new(a.clone(), b.clone(), pool)
    }

    #[test]
    fn test_direct_route() {
        let mut reg = DomainRegistry::new();
        let d1 = reg.resolve("ethereum");
        let pos = position(
            &Token::new("USDC", 1, 20_000, d1.clone()),
            &Token::new("ETH", 2_000, 10, d1.clone()),
        );
        let route = find_route(
            &Token::new("USDC", 1, 2_000, d1.clone()),
            &Token::new("ETH", 2_000, 1, d1),
            std::slice::from_ref(&pos),
        )
        .unwrap();
        assert_eq!(route, vec![pos]);
    }

    #[test]
    fn test_bridge_edge_reaches_other_domain() {
        let mut reg = DomainRegistry::new();
        let d1 = reg.resolve("ethereum");
        let d2 = reg.resolve("arbitrum");
        let on_d1 = position(
            &Token::new("USDC", 1, 20_000, d1.clone()),
            &Token::new("ETH", 2_000, 10, d1.clone()),
        );
        let on_d2 = position(
            &Token::new("USDC", 1, 20_000, d2.clone()),
            &Token::new("ETH", 2_000, 10, d2.clone()),
        );
        let route = find_route(
            &Token::new("USDC", 1, 2_000, d1),
            &Token::new("ETH", 2_000, 1, d2.clone()),
            &[on_d1, on_d2.clone()],
        )
        .unwrap();
        assert_eq!(route.len(), 1);
        assert_eq!(route[0], on_d2);
        assert_eq!(route[0].token_b.domain, d2);
    }

    #[test]
    fn test_bridge_requires_strictly_larger_position() {
        let mut reg = DomainRegistry::new();
        let d1 = reg.resolve("ethereum");
        let d2 = reg.resolve("arbitrum");
        let on_d2 = position(
            &Token::new("USDC", 1, 2_000, d2.clone()),
            &Token::new("ETH", 2_000, 1, d2.clone()),
        );
        let route = find_route(
            &Token::new("USDC", 1, 2_000, d1),
            &Token::new("ETH", 2_000, 1, d2),
            &[on_d2],
        );
        assert!(route.is_none());
    }

    #[test]
    fn test_multi_hop_route() {
        let mut reg = DomainRegistry::new();
        let d = reg.resolve("ethereum");
        let first = position(
            &Token::new("USDC", 1, 40_000, d.clone()),
            &Token::new("ETH", 2_000, 20, d.clone()),
        );
        let second = position(
            &Token::new("ETH", 2_000, 20, d.clone()),
            &Token::new("BTC", 40_000, 1, d.clone()),
        );
        let route = find_route(
            &Token::new("USDC", 1, 40_000, d.clone()),
            &Token::new("BTC", 40_000, 1, d),
            &[second.clone(), first.clone()],
        )
        .unwrap();
        assert_eq!(route, vec![first, second]);
    }

    #[test]
    fn test_value_floor_prunes_undersized_intermediate() {
        let mut reg = DomainRegistry::new();
        let d = reg.resolve("ethereum");
        let small = position(
            &Token::new("USDC", 1, 2_000, d.clone()),
            &Token::new("ETH", 2_000, 1, d.clone()),
        );
        let second = position(
            &Token::new("ETH", 2_000, 20, d.clone()),
            &Token::new("BTC", 40_000, 1, d.clone()),
        );
        let route = find_route(
            &Token::new("USDC", 1, 40_000, d.clone()),
            &Token::new("BTC", 40_000, 1, d),
            &[small, second],
        );
        assert!(route.is_none());
    }

    #[test]
    fn test_fewest_hops_wins() {
        let mut reg = DomainRegistry::new();
        let d = reg.resolve("ethereum");
        let via_dai = position(
            &Token::new("USDC", 1, 20_000, d.clone()),
            &Token::new("DAI", 1, 20_000, d.clone()),
        );
        let dai_eth = position(
            &Token::new("DAI", 1, 20_000, d.clone()),
            &Token::new("ETH", 2_000, 10, d.clone()),
        );
        let direct = position(
            &Token::new("USDC", 1, 20_000, d.clone()),
            &Token::new("ETH", 2_000, 10, d.clone()),
        );
        let route = find_route(
            &Token::new("USDC", 1, 2_000, d.clone()),
            &Token::new("ETH", 2_000, 1, d),
            &[via_dai, dai_eth, direct.clone()],
        )
        .unwrap();
        assert_eq!(route, vec![direct]);
    }

    #[test]
    fn test_edges_are_directional() {
        let mut reg = DomainRegistry::new();
        let d = reg.resolve("ethereum");
        let pos = position(
            &Token::new("USDC", 1, 20_000, d.clone()),
            &Token::new("ETH", 2_000, 10, d.clone()),
        );
        let route = find_route(
            &Token::new("ETH", 2_000, 1, d.clone()),
            &Token::new("USDC", 1, 2_000, d),
            &[pos],
        );
        assert!(route.is_none());
    }

    #[test]
    fn test_origin_equal_to_target_declines() {
        let mut reg = DomainRegistry::new();
        let d = reg.resolve("ethereum");
        let usdc = Token::new("USDC", 1, 2_000, d.clone());
        let pos = position(
            &Token::new("USDC", 1, 20_000, d.clone()),
            &Token::new("ETH", 2_000, 10, d),
        );
        assert!(find_route(&usdc, &usdc, &[pos]).is_none());
    }
}
