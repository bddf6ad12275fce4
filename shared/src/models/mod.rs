//! Domain models for the Livestock Farm Management backend

mod circle;
mod consumable;
mod plan;

pub use circle::*;
pub use consumable::*;
pub use plan::*;
