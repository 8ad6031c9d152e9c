//! Core domain types and logic.

pub mod error;
pub mod fetcher;
pub mod period;
pub mod product;
pub mod rate;
pub mod settings;
