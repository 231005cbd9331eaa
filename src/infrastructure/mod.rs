//! Infrastructure layer providing external service integrations.
//!
//! HTTP access to the faucet and ledger RPC, the worker threads that run
//! those calls, configuration, logging and the system clipboard.

pub mod clipboard;
pub mod config;
pub mod logging;
pub mod rpc;
pub mod worker;

pub use clipboard::*;
pub use config::*;
pub use logging::*;
pub use rpc::*;
pub use worker::*;
