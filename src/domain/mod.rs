//! Domain layer - Core auction model and routing.
//!
//! Value types for domains, tokens, pools, liquidity positions, orders
//! and bids, together with the invariants that make a proposed route
//! and its acceptance valid. The route search lives here too: it is a
//! pure function of an order and a solver's positions.

pub mod error;
pub mod ids;
pub mod order;
pub mod pool;
pub mod routing;
pub mod token;

// Re-export core types for convenience
pub use error::{AuctionError, ValidationError};
pub use ids::{DomainId, OrderId, SolverId, UserId};
pub use order::{Bid, CloseReason, Order, OrderTicket};
pub use pool::{Liquidity, Pool};
pub use routing::find_route;
pub use token::{Domain, DomainRegistry, PriceTable, Token};
