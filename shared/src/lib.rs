//! Shared types and models for the Livestock Farm Management backend
//!
//! Holds the pieces that carry no storage concerns: domain enums, ledger
//! arithmetic, plan scheduling rules and input validation helpers.

pub mod ledger;
pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
