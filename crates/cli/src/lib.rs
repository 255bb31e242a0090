pub mod amount;
pub mod commands;
pub mod config;
pub mod provider;
pub mod votes;
