//! Business logic services for the Livestock Farm Management backend

pub mod barn;
pub mod barn_plan;
pub mod breed;
pub mod catalog;
pub mod circle;
pub mod consumption;
pub mod daily_report;

pub use barn::BarnService;
pub use barn_plan::BarnPlanService;
pub use breed::BreedService;
pub use catalog::CatalogService;
pub use circle::CircleService;
pub use consumption::ConsumptionService;
pub use daily_report::DailyReportService;
