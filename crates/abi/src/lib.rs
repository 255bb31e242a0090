pub mod domain_token;
pub mod pool;

pub use domain_token::IDomainToken;
pub use pool::IAuctionPool;
