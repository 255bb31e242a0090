//! Read-side joins of pool state, bid logs and indexer metadata.
//!
//! Every resolver fans out one job per token and keeps whatever settles; a
//! single bad token is logged and dropped rather than failing the batch.

mod collection;
mod positions;
mod submissions;
mod views;

pub use collection::CollectionResolver;
pub use positions::UserPositionResolver;
pub use submissions::{SubmissionResolver, lifecycle_from, pending_from};
pub use views::AuctionViewBuilder;
