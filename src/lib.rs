//! lpool - Terminal Liquidity Pool Manager Library
//!
//! Generates a testnet keypair, funds it through the faucet, creates an
//! XLM/custom-asset constant-product liquidity pool and withdraws from it.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
