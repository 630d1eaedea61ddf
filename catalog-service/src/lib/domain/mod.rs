pub mod account;
pub mod catalog;
