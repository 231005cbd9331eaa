pub mod amount;
pub mod asset;
pub mod client;
pub mod errors;
pub mod keypair;
pub mod models;
pub mod transaction;
pub mod xdr;

pub use amount::*;
pub use asset::*;
pub use client::*;
pub use errors::*;
pub use keypair::*;
pub use models::*;
pub use transaction::*;
