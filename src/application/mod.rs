//! Application layer managing session state and the user actions.
//!
//! This module coordinates between the domain layer and presentation layer:
//! it owns the session state, validates button presses and folds the results
//! of ledger calls back into state and notifications.

pub mod actions;
pub mod notifications;
pub mod state;

pub use actions::*;
pub use notifications::*;
pub use state::*;
