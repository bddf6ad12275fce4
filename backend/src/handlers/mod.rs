//! HTTP request handlers

mod barn;
mod barn_plan;
mod breed;
mod catalog;
mod circle;
mod consumption;
mod daily_report;
mod health;

pub use barn::*;
pub use barn_plan::*;
pub use breed::*;
pub use catalog::*;
pub use circle::*;
pub use consumption::*;
pub use daily_report::*;
pub use health::*;
