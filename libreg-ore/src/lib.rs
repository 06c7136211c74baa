//! Odds and ends shared by the `libreg` crates.

pub mod assert;
pub mod env;
