//! Core utilities shared by every layer (logging).

#[macro_use]
pub mod utils;
