pub mod account;
pub mod api;
pub mod cli;
pub mod commission;
pub mod config;
pub mod confirm;
pub mod error;
pub mod gateway;
pub mod hierarchy;
pub mod listing;
pub mod notify;
pub mod payment;
pub mod session;
pub mod types;

#[cfg(test)]
pub mod testing;
