pub mod action;
pub mod bid;
pub mod metadata;
pub mod primitives;
pub mod state;
pub mod submission;
pub mod view;

pub use action::*;
pub use bid::*;
pub use metadata::*;
pub use primitives::*;
pub use state::*;
pub use submission::*;
pub use view::*;
