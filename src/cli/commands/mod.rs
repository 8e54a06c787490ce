pub mod account;
pub mod commission;
pub mod level;
pub mod list;
pub mod payment;
pub mod session;
