pub mod auth_service;
pub mod catalog_io_service;
pub mod inventory_service;
pub mod planning_service;
pub mod prep_service;
pub mod procurement_service;
pub mod recipe_service;
pub mod reporting_service;
pub mod rounding;
pub mod schedule_service;

pub use auth_service::AuthService;
pub use catalog_io_service::CatalogIoService;
pub use inventory_service::InventoryService;
pub use planning_service::PlanningService;
pub use prep_service::PrepService;
pub use procurement_service::ProcurementService;
pub use recipe_service::RecipeService;
pub use reporting_service::ReportingService;
pub use schedule_service::ScheduleService;
