pub mod dashboard;
pub mod error;
pub mod project_service;
pub mod task_service;
pub mod user_service;

pub use dashboard::DashboardService;
pub use error::{ServiceError, ServiceResult};
pub use project_service::ProjectService;
pub use task_service::TaskService;
pub use user_service::UserService;
