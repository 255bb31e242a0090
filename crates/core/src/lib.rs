pub mod batch;
pub mod chain;
pub mod error;
pub mod reconcile;
pub mod refresh;
pub mod subgraph;
pub mod time;
pub mod tx;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use chain::*;
pub use error::*;
pub use reconcile::*;
pub use refresh::*;
pub use subgraph::*;
pub use types::*;
